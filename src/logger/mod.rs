//! Logger module
//!
//! Logging utilities for the server:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Upload and hook reporting
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{AppState, Config, LogLevel};
use hyper::HeaderMap;
use std::net::SocketAddr;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write(level: LogLevel, message: &str) {
    match writer::get() {
        Some(w) => w.write(level, message),
        None => match level {
            LogLevel::Error | LogLevel::Warn => eprintln!("{message}"),
            LogLevel::Info => println!("{message}"),
            LogLevel::Debug => {}
        },
    }
}

pub fn log_server_start(addr: &SocketAddr, state: &AppState) {
    let config = &state.config;
    write(LogLevel::Info, "======================================");
    write(LogLevel::Info, "devserve started");
    write(LogLevel::Info, &format!("Listening on: http://{addr}"));
    write(LogLevel::Info, &format!("Serving root: {}", state.root.display()));
    if let Some(workers) = config.server.workers {
        write(LogLevel::Info, &format!("Worker threads: {workers}"));
    }
    if config.http.inject_coop_headers {
        write(LogLevel::Info, "Cross-origin isolation headers: enabled");
    }
    if !config.upload.enforce_root {
        write(
            LogLevel::Warn,
            "Root containment for PUT is disabled; uploads may write outside the root",
        );
    }
    if let Some(hook) = &config.upload.post_upload_hook {
        write(LogLevel::Info, &format!("Post-upload hook: {}", hook.program));
    }
    write(LogLevel::Info, "======================================");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write(LogLevel::Debug, &format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write(LogLevel::Error, &format!("[Connection] Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    write(LogLevel::Error, message);
}

pub fn log_warning(message: &str) {
    write(LogLevel::Warn, message);
}

pub fn log_info(message: &str) {
    write(LogLevel::Info, message);
}

/// Dump every request header; a debugging aid, logged at warning level
pub fn log_request_headers(headers: &HeaderMap) {
    let dump = headers
        .iter()
        .map(|(name, value)| format!("{name}: {}", value.to_str().unwrap_or("<binary>")))
        .collect::<Vec<_>>()
        .join("\n");
    write(LogLevel::Warn, &format!("[Headers]\n{dump}"));
}

pub fn log_upload_saved(root: &Path, target: &Path, bytes: usize) {
    write(
        LogLevel::Info,
        &format!("[Upload] root = {} file = {} ({bytes} bytes)", root.display(), target.display()),
    );
}

pub fn log_upload_rejected(path: &str, reason: &impl std::fmt::Display) {
    write(LogLevel::Warn, &format!("[Upload] Rejected {path}: {reason}"));
}

pub fn log_hook_finished(program: &str, status: std::process::ExitStatus) {
    if status.success() {
        write(LogLevel::Info, &format!("[Hook] {program} finished"));
    } else {
        write(LogLevel::Warn, &format!("[Hook] {program} exited with {status}"));
    }
}

pub fn log_hook_failed(program: &str, err: &impl std::fmt::Display) {
    write(LogLevel::Error, &format!("[Hook] {program} failed: {err}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

pub fn log_shutdown(in_flight: usize) {
    write(
        LogLevel::Info,
        &format!("[Shutdown] Signal received, draining {in_flight} connection(s)"),
    );
}

pub fn log_stopped() {
    write(LogLevel::Info, "[Shutdown] Server stopped");
}
