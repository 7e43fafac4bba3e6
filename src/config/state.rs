// Application state module
// Immutable per-process state shared by every connection

use std::io;
use std::path::PathBuf;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Canonical absolute form of `config.server.root`
    pub root: PathBuf,
}

impl AppState {
    /// Resolve the serving root once; requests never consult the process working directory
    pub fn new(config: Config) -> io::Result<Self> {
        let root = config.server.root.canonicalize().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("root directory '{}': {e}", config.server.root.display()),
            )
        })?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("root '{}' is not a directory", root.display()),
            ));
        }
        Ok(Self { config, root })
    }
}
