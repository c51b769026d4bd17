//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const SESSION_FILE_NAME: &str = "session.json";
const APP_DIR: &str = "book-catalog";

/// Errors produced while building a [`ClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL: {0} (expected http:// or https://)")]
    InvalidBaseUrl(String),

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service origin without a trailing slash; endpoint paths carry `/api`.
    pub base_url: String,
    /// Durable session storage location.
    pub session_file: PathBuf,
    /// When false the list loads at startup without a login gate.
    pub require_auth: bool,
    pub timeouts: HttpTimeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `BOOKS_API_URL`: default `http://127.0.0.1:8000`
    /// - `BOOKS_SESSION_FILE`: default `<config dir>/book-catalog/session.json`
    /// - `BOOKS_REQUIRE_AUTH`: `1/true/yes/on` or `0/false/no/off`, default true
    /// - `BOOKS_REQUEST_TIMEOUT_SECS`: default 30
    /// - `BOOKS_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or the auth flag cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or the auth flag cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = normalize_base_url(lookup("BOOKS_API_URL").as_deref().unwrap_or(DEFAULT_API_URL))?;
        let session_file = lookup("BOOKS_SESSION_FILE")
            .filter(|raw| !raw.trim().is_empty())
            .map_or_else(default_session_file, PathBuf::from);
        let require_auth = match lookup("BOOKS_REQUIRE_AUTH") {
            None => true,
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidValue { var: "BOOKS_REQUIRE_AUTH", value: raw })?,
        };
        let timeouts = HttpTimeouts {
            request_secs: parse_u64_or(lookup("BOOKS_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64_or(lookup("BOOKS_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { base_url, session_file, require_auth, timeouts })
    }

    /// Replace the base URL, applying the same validation as the env path.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no http(s) scheme.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(raw)?;
        Ok(self)
    }
}

/// Trim trailing slashes and require an http(s) scheme.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] for anything else.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| ConfigError::InvalidBaseUrl(raw.to_owned()))?;
    if host.is_empty() {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_u64_or(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(default)
}

fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(SESSION_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR}-{SESSION_FILE_NAME}")))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
