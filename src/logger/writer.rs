//! Log writer module
//!
//! Thread-safe log sink writing to files or stdout/stderr, with a severity filter.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

use chrono::Local;

use crate::config::LogLevel;

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl LogTarget {
    fn open(path: Option<&str>, fallback: Self) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File(Mutex::new(open_log_file(p)?))),
            None => Ok(fallback),
        }
    }

    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                let mut f = file.lock().unwrap_or_else(PoisonError::into_inner);
                let _ = writeln!(f, "{message}");
            }
        }
    }
}

/// Thread-safe log writer
pub struct LogWriter {
    level: LogLevel,
    /// Access log and informational messages
    access: LogTarget,
    /// Warnings and errors
    error: LogTarget,
}

impl LogWriter {
    fn new(
        level: LogLevel,
        access_log_file: Option<&str>,
        error_log_file: Option<&str>,
    ) -> io::Result<Self> {
        Ok(Self {
            level,
            access: LogTarget::open(access_log_file, LogTarget::Stdout)?,
            error: LogTarget::open(error_log_file, LogTarget::Stderr)?,
        })
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }

    /// Write a leveled message; info/debug go to the access target, warn/error to the error target
    pub fn write(&self, level: LogLevel, message: &str) {
        if !self.enabled(level) {
            return;
        }
        let line = format!(
            "{} {:<5} {message}",
            Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"),
            level_label(level)
        );
        match level {
            LogLevel::Error | LogLevel::Warn => self.error.write_line(&line),
            LogLevel::Info | LogLevel::Debug => self.access.write_line(&line),
        }
    }

    /// Access log lines are pre-formatted and bypass the level filter
    pub fn write_access(&self, message: &str) {
        self.access.write_line(message);
    }
}

const fn level_label(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "ERROR",
        LogLevel::Warn => "WARN",
        LogLevel::Info => "INFO",
        LogLevel::Debug => "DEBUG",
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer
///
/// Returns error if log files cannot be opened or the writer is already set.
pub fn init(
    level: LogLevel,
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
) -> io::Result<()> {
    let writer = LogWriter::new(level, access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, if initialized
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        let writer = LogWriter::new(LogLevel::Warn, None, None).unwrap();
        assert!(writer.enabled(LogLevel::Error));
        assert!(writer.enabled(LogLevel::Warn));
        assert!(!writer.enabled(LogLevel::Info));
        assert!(!writer.enabled(LogLevel::Debug));
    }

    #[test]
    fn test_file_target_appends() {
        let dir = std::env::temp_dir().join(format!("devserve-log-{}", std::process::id()));
        let path = dir.join("nested").join("access.log");
        let path_str = path.to_string_lossy().into_owned();

        let writer = LogWriter::new(LogLevel::Info, Some(&path_str), None).unwrap();
        writer.write(LogLevel::Info, "first");
        writer.write(LogLevel::Debug, "filtered");
        writer.write_access("second");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("INFO  first"));
        assert!(!content.contains("filtered"));
        assert!(content.ends_with("second\n"));

        let _ = std::fs::remove_dir_all(dir);
    }
}
