//! Geodata service configuration parsed from environment variables.

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_OVERPASS_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OVERPASS_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_OVERPASS_QUERY_TIMEOUT_SECS: u64 = 25;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid OVERPASS_URL '{0}': expected an http(s) URL")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverpassTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
    /// Server-side budget sent as `[timeout:N]` in the query.
    pub query_secs: u64,
}

impl Default for OverpassTimeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_OVERPASS_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_OVERPASS_CONNECT_TIMEOUT_SECS,
            query_secs: DEFAULT_OVERPASS_QUERY_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassConfig {
    pub url: String,
    pub timeouts: OverpassTimeouts,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self { url: DEFAULT_OVERPASS_URL.to_owned(), timeouts: OverpassTimeouts::default() }
    }
}

impl OverpassConfig {
    /// Build typed Overpass config from environment variables.
    ///
    /// Optional:
    /// - `OVERPASS_URL`: interpreter endpoint, default public instance
    /// - `OVERPASS_REQUEST_TIMEOUT_SECS`: default 30
    /// - `OVERPASS_CONNECT_TIMEOUT_SECS`: default 10
    /// - `OVERPASS_QUERY_TIMEOUT_SECS`: default 25
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] when `OVERPASS_URL` is set but is
    /// not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = match std::env::var("OVERPASS_URL") {
            Ok(raw) => parse_url(&raw)?,
            Err(_) => DEFAULT_OVERPASS_URL.to_owned(),
        };
        let timeouts = OverpassTimeouts {
            request_secs: env_parse_u64("OVERPASS_REQUEST_TIMEOUT_SECS", DEFAULT_OVERPASS_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("OVERPASS_CONNECT_TIMEOUT_SECS", DEFAULT_OVERPASS_CONNECT_TIMEOUT_SECS),
            query_secs: env_parse_u64("OVERPASS_QUERY_TIMEOUT_SECS", DEFAULT_OVERPASS_QUERY_TIMEOUT_SECS),
        };
        Ok(Self { url, timeouts })
    }
}

fn parse_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidUrl(raw.to_owned()))
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).map_or(default, |v| v.trim().parse::<u64>().unwrap_or(default))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
