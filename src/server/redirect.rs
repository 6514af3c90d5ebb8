// HTTPS redirect server module
// Answers every plain-HTTP request with a permanent redirect to https://

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::header::HOST;
use hyper::{Request, StatusCode};
use tokio::net::TcpListener;

use super::connection::{ConnectionSettings, SharedHandler};
use super::listener::bind_listener;
use super::server_loop::run_accept_loop;
use crate::error::ServeError;
use crate::handler::HttpResponse;
use crate::http::{build_redirect_response, text_error};
use crate::logger;

/// The request URL rewritten to the `https` scheme.
///
/// The host comes from the request target when it is in absolute form
/// (userinfo dropped), otherwise from the `Host` header; any port is kept
/// as sent. Targets that are not origin-form paths redirect to `/`.
pub fn https_url<B>(req: &Request<B>) -> Option<String> {
    let host = match req.uri().authority() {
        Some(authority) => match authority.port_u16() {
            Some(port) => format!("{}:{port}", authority.host()),
            None => authority.host().to_string(),
        },
        None => req.headers().get(HOST)?.to_str().ok()?.to_string(),
    };
    if host.is_empty() {
        return None;
    }

    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .filter(|pq| pq.starts_with('/'))
        .unwrap_or("/");

    Some(format!("https://{host}{path_and_query}"))
}

/// `301 Moved Permanently` to the same URL under `https`
pub fn redirect_to_https<B>(req: &Request<B>) -> HttpResponse {
    match https_url(req) {
        Some(location) => {
            build_redirect_response(&location, StatusCode::MOVED_PERMANENTLY, req.method())
        }
        None => text_error("missing Host header", StatusCode::BAD_REQUEST),
    }
}

/// Plain-HTTP listener that sends every client to the HTTPS origin.
///
/// Meant to run next to the real server listening on port 443.
#[derive(Debug, Clone)]
pub struct HttpsRedirectServer {
    addr: SocketAddr,
    settings: ConnectionSettings,
}

impl HttpsRedirectServer {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            settings: ConnectionSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ConnectionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Handler answering every request with [`redirect_to_https`]
    pub fn handler() -> SharedHandler {
        Arc::new(|req: Request<Incoming>| async move { redirect_to_https(&req) })
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServeError>
    where
        F: Future<Output = ()>,
    {
        let listener = bind_listener(self.addr)?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServeError>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        logger::log_server_start("redirect", &local_addr);
        run_accept_loop(listener, Self::handler(), self.settings, shutdown, "redirect").await;
        Ok(())
    }
}
