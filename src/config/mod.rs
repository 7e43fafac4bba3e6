// Configuration module entry point
// Loads layered configuration and builds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

pub use state::AppState;
pub use types::{
    Config, HookCommand, HttpConfig, LogLevel, LoggingConfig, PerformanceConfig, RoutesConfig,
    ServerConfig, UploadConfig,
};

/// Default configuration file name (looked up without requiring it to exist)
pub const DEFAULT_CONFIG_FILE: &str = "devserve";

/// Values given on the command line; they win over every other source
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub root: Option<PathBuf>,
    pub inject_coop_headers: Option<bool>,
    pub enforce_root: Option<bool>,
}

impl Config {
    /// Load configuration from the default file, environment and built-in defaults
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None, &Overrides::default())
    }

    /// Load configuration from specified file path
    /// Default config file is "devserve.toml" when no path specified; it may be absent
    pub fn load_from(
        config_path: Option<&str>,
        overrides: &Overrides,
    ) -> Result<Self, config::ConfigError> {
        let cwd = std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;

        let file = match config_path {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.root", cwd.to_string_lossy().into_owned())?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", true)?
            .set_default("performance.connection_timeout", 300)?
            .set_default("http.server_name", concat!("devserve/", env!("CARGO_PKG_VERSION")))?
            .set_default("http.max_body_size", 104_857_600)? // 100MB
            .set_default("http.inject_coop_headers", false)?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("DEVSERVE")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", overrides.host.clone())?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option(
                "server.root",
                overrides
                    .root
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("http.inject_coop_headers", overrides.inject_coop_headers)?
            .set_override_option("upload.enforce_root", overrides.enforce_root)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
