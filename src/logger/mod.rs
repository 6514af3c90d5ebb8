//! Logger module
//!
//! Thin facade over `tracing` used by the server layer:
//! - Subscriber initialisation from [`LoggingConfig`]
//! - Server lifecycle and connection events
//! - Access logging with multiple formats
//!
//! The version router never logs; request events are recorded by the
//! serving layer around it.

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::config::{Config, LoggingConfig};
use crate::error::ServeError;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Should be called
/// once at application startup; a second call fails with
/// [`ServeError::Logging`].
pub fn init(config: &LoggingConfig) -> Result<(), ServeError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(ServeError::Logging)
}

pub fn log_config(config: &Config) {
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        redirect_enabled = config.redirect.enabled,
        default_version = %config.versions.default,
        access_log = config.logging.access_log,
        "Configuration loaded"
    );
    if let Some(workers) = config.server.workers {
        tracing::info!(workers, "Using configured worker threads");
    }
}

pub fn log_server_start(name: &str, addr: &SocketAddr) {
    tracing::info!(server = name, "Listening on http://{addr}");
}

pub fn log_shutdown_started(name: &str) {
    tracing::info!(server = name, "Shutdown requested, no longer accepting connections");
}

pub fn log_server_stopped(name: &str, remaining: usize) {
    if remaining == 0 {
        tracing::info!(server = name, "Server stopped");
    } else {
        tracing::warn!(
            server = name,
            remaining,
            "Server stopped with connections still open"
        );
    }
}

pub fn log_signal(signal: &str) {
    tracing::info!(signal, "Received signal, initiating graceful shutdown");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(peer = %peer_addr, "Connection accepted");
}

pub fn log_connection_rejected(peer_addr: &SocketAddr, active: usize, max: usize) {
    tracing::warn!(
        peer = %peer_addr,
        "Max connections reached: {active}/{max}. Connection rejected."
    );
}

pub fn log_connection_error(peer_addr: &SocketAddr, err: &impl std::fmt::Debug) {
    tracing::error!(peer = %peer_addr, "Failed to serve connection: {err:?}");
}

pub fn log_connection_timeout(peer_addr: &SocketAddr, timeout: Duration) {
    tracing::warn!(
        peer = %peer_addr,
        "Connection timeout after {} seconds",
        timeout.as_secs()
    );
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}
