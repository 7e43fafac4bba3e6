// Signal handling module
//
// SIGINT (Ctrl+C) and SIGTERM both request a graceful shutdown.

use crate::logger;

/// Resolves on the first shutdown signal the process receives.
///
/// If a handler cannot be installed, that signal source is treated as never firing.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            logger::log_error(&format!("Failed to install Ctrl+C handler: {e}"));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                logger::log_error(&format!("Failed to install SIGTERM handler: {e}"));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => logger::log_info("[SIGNAL] SIGINT received"),
        () = terminate => logger::log_info("[SIGNAL] SIGTERM received"),
    }
}
