// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served and written to
    pub root: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub access_log: bool,
    /// Dump request headers after each GET
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Log severity, ordered from most to least severe
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    /// Upper bound on a single connection's lifetime, in seconds
    pub connection_timeout: u64,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
    /// Add `Cross-Origin-Opener-Policy` / `Cross-Origin-Embedder-Policy` to every response
    pub inject_coop_headers: bool,
}

/// Routes configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RoutesConfig {
    pub index_files: Vec<String>,
    pub directory_listing: bool,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
            directory_listing: true,
        }
    }
}

/// Upload (PUT) configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadConfig {
    /// Reject PUT paths that resolve outside `server.root`
    #[serde(default = "default_enforce_root")]
    pub enforce_root: bool,
    /// Command run after every successful upload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_upload_hook: Option<HookCommand>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_enforce_root() -> bool {
    true
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            enforce_root: default_enforce_root(),
            post_upload_hook: None,
        }
    }
}

/// External command; `${NAME}` is expanded from the environment at run time
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct HookCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}
