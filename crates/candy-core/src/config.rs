//! Client Configuration
//!
//! Settings are read through a key lookup so the browser build can feed
//! compile-time values and tests can feed a map.

use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;

pub const API_BASE_URL_KEY: &str = "CANDY_API_BASE_URL";
pub const REQUEST_TIMEOUT_KEY: &str = "CANDY_REQUEST_TIMEOUT_MS";
pub const NOTIFICATION_TTL_KEY: &str = "CANDY_TOAST_MS";
pub const CACHE_RESPONSES_KEY: &str = "CANDY_CACHE_RESPONSES";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(8000);
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Collection endpoint, e.g. `https://example.com/api/houses`
    pub api_base_url: Url,
    pub request_timeout: Duration,
    /// How long a toast stays visible
    pub notification_ttl: Duration,
    /// Keep the last list response until a mutating call
    pub cache_responses: bool,
}

impl Config {
    /// Defaults for everything except the endpoint
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            cache_responses: false,
        }
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup(API_BASE_URL_KEY)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing { key: API_BASE_URL_KEY })?;
        let mut config = Self::new(parse_base_url(API_BASE_URL_KEY, raw_url.trim())?);

        if let Some(value) = lookup(REQUEST_TIMEOUT_KEY) {
            config.request_timeout = parse_millis(REQUEST_TIMEOUT_KEY, &value)?;
        }
        if let Some(value) = lookup(NOTIFICATION_TTL_KEY) {
            config.notification_ttl = parse_millis(NOTIFICATION_TTL_KEY, &value)?;
        }
        if let Some(value) = lookup(CACHE_RESPONSES_KEY) {
            config.cache_responses = parse_flag(CACHE_RESPONSES_KEY, &value)?;
        }
        Ok(config)
    }
}

fn parse_base_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl { key, reason: e.to_string() })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl { key, reason: format!("unsupported scheme {}", url.scheme()) });
    }
    // Record URLs are built by appending a path segment
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl { key, reason: "URL cannot be a base".to_string() });
    }
    Ok(url)
}

fn parse_millis(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidNumber { key, value: value.to_string() }),
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { key, value: value.to_string() }),
    }
}
