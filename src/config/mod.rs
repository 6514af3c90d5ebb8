// Configuration module entry point
// Layers the config file, APIUTIL_* environment variables and defaults

mod types;

use std::net::SocketAddr;
use std::time::Duration;

pub use types::{
    Config, LoggingConfig, PerformanceConfig, RedirectConfig, ServerConfig, VersionsConfig,
};

use crate::error::ServeError;
use crate::server::ConnectionSettings;

/// Default config file name (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "config";

const ENV_PREFIX: &str = "APIUTIL";

impl Config {
    /// Load configuration from specified file path (without extension).
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(config_path: &str) -> Result<Self, ServeError> {
        Self::load_with_env(config_path, environment())
    }

    pub fn load() -> Result<Self, ServeError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    fn load_with_env(
        config_path: &str,
        env: ::config::Environment,
    ) -> Result<Self, ServeError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(config_path).required(false))
            .add_source(env)
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("redirect.enabled", false)?
            .set_default("redirect.host", "0.0.0.0")?
            .set_default("redirect.port", 8081)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.request_timeout", 30)?
            .set_default("versions.default", "")?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ServeError> {
        parse_addr(&self.server.host, self.server.port)
    }

    pub fn get_redirect_socket_addr(&self) -> Result<SocketAddr, ServeError> {
        parse_addr(&self.redirect.host, self.redirect.port)
    }

    /// Per-connection settings shared by both servers
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            keep_alive: self.performance.keep_alive,
            timeout: Duration::from_secs(self.performance.request_timeout),
            max_connections: self
                .performance
                .max_connections
                .map(|max| usize::try_from(max).unwrap_or(usize::MAX)),
            access_log_format: self
                .logging
                .access_log
                .then(|| self.logging.access_log_format.clone()),
        }
    }
}

fn environment() -> ::config::Environment {
    ::config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn parse_addr(host: &str, port: u16) -> Result<SocketAddr, ServeError> {
    // Bracket bare IPv6 literals so "::1" and port combine correctly
    let addr = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    };
    addr.parse()
        .map_err(|e| ServeError::InvalidAddress(format!("{addr}: {e}")))
}
