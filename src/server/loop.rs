// Server loop module
// Accepts connections until the shutdown future resolves, then drains in-flight ones

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// Run the accept loop on `listener`.
///
/// A failed accept or a failed connection is logged and the loop goes on;
/// only `shutdown` ends it. Open connections are then told to close after their
/// current response, and this returns once every connection task is done.
#[allow(clippy::ignored_unit_patterns)]
pub async fn serve<S>(listener: TcpListener, state: Arc<config::AppState>, shutdown: S)
where
    S: Future<Output = ()>,
{
    let mut tasks = JoinSet::new();
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                logger::log_shutdown(tasks.len());
                break;
            }

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, stop_rx.clone(), &mut tasks);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            // reap finished connections so the set stays small
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    drop(listener);
    stop_tx.send_replace(true);
    while tasks.join_next().await.is_some() {}
}
