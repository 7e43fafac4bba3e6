// Connection handling module
// Serves one accepted TCP connection in its own task

use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::config;
use crate::handler;
use crate::logger;

/// Spawn a task serving `stream` into `tasks`, so shutdown can wait for it.
///
/// The task:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Serves HTTP/1.1 with keep-alive through the request handler
/// 3. Closes gracefully once `shutdown` flips to `true`: an idle keep-alive
///    connection closes at once, a request in flight gets its response first
/// 4. Gives up after `performance.connection_timeout` seconds
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<config::AppState>,
    shutdown: watch::Receiver<bool>,
    tasks: &mut JoinSet<()>,
) {
    logger::log_connection_accepted(&peer_addr);

    let state = Arc::clone(state);
    tasks.spawn(async move {
        let io = TokioIo::new(stream);
        let timeout_duration = Duration::from_secs(state.config.performance.connection_timeout);

        let mut builder = http1::Builder::new();
        builder.keep_alive(true);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&state), peer_addr)),
        );
        tokio::pin!(conn);

        let mut shutdown = shutdown;
        let served = async {
            tokio::select! {
                result = conn.as_mut() => result,
                _ = shutdown.changed() => {
                    conn.as_mut().graceful_shutdown();
                    conn.as_mut().await
                }
            }
        };

        match tokio::time::timeout(timeout_duration, served).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }
    });
}
