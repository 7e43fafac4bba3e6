//! Post-upload hook
//!
//! Runs a configured external command after a successful upload, detached from
//! the request. Its outcome is only ever logged.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::config::HookCommand;
use crate::logger;

/// Environment variable carrying the uploaded file's absolute path to the hook
pub const UPLOADED_PATH_ENV: &str = "DEVSERVE_UPLOADED_PATH";

#[derive(Debug)]
pub enum HookError {
    UnsetVariable(String),
    Unterminated(String),
    Spawn { program: String, source: io::Error },
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsetVariable(name) => write!(f, "environment variable {name} is not set"),
            Self::Unterminated(template) => write!(f, "unterminated ${{...}} in '{template}'"),
            Self::Spawn { program, source } => write!(f, "cannot start '{program}': {source}"),
        }
    }
}

impl std::error::Error for HookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Fire and forget: the returned handle is only awaited by tests
pub fn spawn_post_upload(command: HookCommand, root: PathBuf, uploaded: PathBuf) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = run(&command, &root, &uploaded).await {
            logger::log_hook_failed(&command.program, &e);
        }
    })
}

/// Expand the command, run it in `root` and wait for it to exit
pub async fn run(command: &HookCommand, root: &Path, uploaded: &Path) -> Result<ExitStatus, HookError> {
    let lookup = |name: &str| std::env::var(name).ok();
    let program = expand(&command.program, lookup)?;
    let args = command
        .args
        .iter()
        .map(|a| expand(a, lookup))
        .collect::<Result<Vec<_>, _>>()?;

    let status = Command::new(&program)
        .args(&args)
        .current_dir(root)
        .env(UPLOADED_PATH_ENV, uploaded)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|source| HookError::Spawn {
            program: program.clone(),
            source,
        })?;

    logger::log_hook_finished(&program, status);
    Ok(status)
}

/// Replace every `${NAME}` in `template` using `lookup`; a bare `$` is literal
pub fn expand(template: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String, HookError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| HookError::Unterminated(template.to_string()))?;
        let name = &after[..end];
        let value = lookup(name).ok_or_else(|| HookError::UnsetVariable(name.to_string()))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
