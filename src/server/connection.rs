// Connection handling module
// Serves a single accepted TCP connection with HTTP/1.1

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::handler::{Handler, HttpResponse};
use crate::logger::{self, AccessLogEntry};

/// Handler shared by every connection of a server
pub type SharedHandler = Arc<dyn Handler<Incoming>>;

/// Per-connection behaviour
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub keep_alive: bool,
    /// Upper bound for the whole connection, keep-alive included
    pub timeout: Duration,
    /// Connections beyond this many are closed right after accept
    pub max_connections: Option<usize>,
    /// Access log format; `None` disables access logging
    pub access_log_format: Option<String>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            keep_alive: true,
            timeout: Duration::from_secs(30),
            max_connections: None,
            access_log_format: Some("combined".to_string()),
        }
    }
}

/// Accept a connection, enforce the connection limit and spawn its task.
///
/// Once `shutdown` flips to `true` the connection finishes its in-flight
/// request and closes instead of waiting for the next one.
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    handler: &SharedHandler,
    settings: &Arc<ConnectionSettings>,
    conn_counter: &Arc<AtomicUsize>,
    shutdown: &watch::Receiver<bool>,
) {
    // Increment first, then check, so concurrent accepts cannot overshoot
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = settings.max_connections {
        if prev_count >= max_conn {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_connection_rejected(&peer_addr, prev_count, max_conn);
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(handler),
        Arc::clone(settings),
        Arc::clone(conn_counter),
        shutdown.clone(),
    );
}

fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    handler: SharedHandler,
    settings: Arc<ConnectionSettings>,
    conn_counter: Arc<AtomicUsize>,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(settings.keep_alive);

        let access_log_format = settings.access_log_format.clone();
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let handler = Arc::clone(&handler);
                let access_log_format = access_log_format.clone();
                async move {
                    let resp =
                        serve_request(req, peer_addr, &*handler, access_log_format.as_deref())
                            .await;
                    Ok::<_, Infallible>(resp)
                }
            }),
        );

        tokio::pin!(conn);

        let serve = async {
            let mut draining = false;
            loop {
                tokio::select! {
                    result = conn.as_mut() => break result,
                    _ = shutdown.changed(), if !draining => {
                        draining = true;
                        conn.as_mut().graceful_shutdown();
                    }
                }
            }
        };

        match tokio::time::timeout(settings.timeout, serve).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&peer_addr, &err),
            Err(_) => logger::log_connection_timeout(&peer_addr, settings.timeout),
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Run the handler, recording an access log entry when enabled
async fn serve_request(
    req: Request<Incoming>,
    peer_addr: SocketAddr,
    handler: &dyn Handler<Incoming>,
    access_log_format: Option<&str>,
) -> HttpResponse {
    let Some(log_format) = access_log_format else {
        return handler.call(req).await;
    };

    let started = Instant::now();
    let mut entry = AccessLogEntry::from_request(&req, peer_addr);
    let resp = handler.call(req).await;
    entry.complete(&resp, started.elapsed());
    logger::log_access(&entry, log_format);
    resp
}
