//! Server configuration, read once from the environment at startup.

use std::path::PathBuf;

/// Default allowed CORS origins.
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
/// Default demo request database path.
pub const DEFAULT_DEMO_DB_PATH: &str = "data/demo_requests.db";

/// Runtime settings of the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Deployment environment, reported by the health endpoints.
    pub environment: String,
    /// Serve synthetic competitors.
    pub use_mock_data: bool,
    /// Log emails instead of delivering them.
    pub use_mock_email: bool,
    /// Sender address of analysis emails.
    pub from_email: String,
    /// API title.
    pub api_title: String,
    /// API version.
    pub api_version: String,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    /// Listen address.
    pub bind_addr: String,
    /// Listen port.
    pub port: u16,
    /// `SQLite` file holding demo requests.
    pub demo_db_path: PathBuf,
    /// Maximum number of cached mock datasets.
    pub mock_cache_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults
    /// for missing or unparsable values.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let string = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let flag = |key: &str, default: bool| {
            lookup(key).map_or(default, |v| {
                parse_bool(&v).unwrap_or_else(|| {
                    log::warn!("from_env: {key}={v:?} is not a boolean, using {default}");
                    default
                })
            })
        };

        Self {
            environment: string("ENVIRONMENT", "development"),
            use_mock_data: flag("USE_MOCK_DATA", true),
            use_mock_email: flag("USE_MOCK_EMAIL", true),
            from_email: string("FROM_EMAIL", "noreply@competeintel.com.br"),
            api_title: string("API_TITLE", "CompeteIntel API"),
            api_version: string("API_VERSION", env!("CARGO_PKG_VERSION")),
            cors_origins: parse_origins(&string("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)),
            bind_addr: string("BIND_ADDR", "127.0.0.1"),
            port: lookup("PORT").and_then(|p| p.trim().parse().ok()).unwrap_or(8080),
            demo_db_path: PathBuf::from(string("DEMO_DB_PATH", DEFAULT_DEMO_DB_PATH)),
            mock_cache_capacity: lookup("MOCK_CACHE_CAPACITY")
                .and_then(|c| c.trim().parse().ok())
                .unwrap_or(compete_intel_source::mock::DEFAULT_CACHE_CAPACITY),
        }
    }
}

/// Parses `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off`, ignoring case.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Splits a comma-separated origin list, dropping blanks.
#[must_use]
pub fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(ToString::to_string)
        .collect()
}
