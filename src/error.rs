//! Error types
//!
//! Routing and response building never fail; these types cover the edges
//! that do: reading JSON request bodies and bringing servers up.

use std::net::SocketAddr;

use thiserror::Error;

/// Failure while reading a JSON request body
#[derive(Debug, Error)]
pub enum JsonBodyError {
    /// The request body could not be read to completion
    #[error("failed to read request body: {0}")]
    Read(String),

    /// The body was read but is not valid JSON for the target type
    #[error("invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure while configuring or starting a server
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("failed to install log subscriber: {0}")]
    Logging(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
