// Server loop module
// Accepts connections until shutdown, then waits for in-flight ones

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time::Instant;

use super::connection::{accept_connection, ConnectionSettings, SharedHandler};
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept connections on `listener` and serve them with `handler` until
/// `shutdown` resolves.
///
/// Accept errors are logged and the loop keeps going. After shutdown the
/// listener is closed immediately, idle keep-alive connections are closed
/// and busy ones get up to `settings.timeout` to finish.
pub async fn run_accept_loop<F>(
    listener: TcpListener,
    handler: SharedHandler,
    settings: ConnectionSettings,
    shutdown: F,
    name: &'static str,
) where
    F: Future<Output = ()>,
{
    let settings = Arc::new(settings);
    let active_connections = Arc::new(AtomicUsize::new(0));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &handler,
                            &settings,
                            &active_connections,
                            &shutdown_rx,
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("[{name}] Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => {
                logger::log_shutdown_started(name);
                break;
            }
        }
    }

    drop(listener);
    shutdown_tx.send_replace(true);
    drain_connections(&active_connections, settings.timeout, name).await;
}

/// Wait until every open connection has finished or `grace` has elapsed
async fn drain_connections(active: &AtomicUsize, grace: Duration, name: &str) {
    let deadline = Instant::now() + grace;

    while active.load(Ordering::SeqCst) > 0 && Instant::now() < deadline {
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }

    logger::log_server_stopped(name, active.load(Ordering::SeqCst));
}
