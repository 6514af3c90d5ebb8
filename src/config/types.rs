// Configuration sections
// One struct per table in the config file: [server], [redirect], [logging],
// [performance] and [versions]

use serde::{Deserialize, Serialize};

/// Whole configuration, as deserialized by [`super::Config::load_from`]
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub redirect: RedirectConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub versions: VersionsConfig,
}

/// Versioned API server
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// HTTP-to-HTTPS redirect server
#[derive(Debug, Deserialize, Clone)]
pub struct RedirectConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

/// Subscriber level and access log settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Connection handling limits
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Upper bound for a whole connection, in seconds
    pub request_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Which demo API version answers requests without a known version.
/// Empty means no default handler is registered.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct VersionsConfig {
    #[serde(default)]
    pub default: String,
}
