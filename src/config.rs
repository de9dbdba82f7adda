//! Environment-driven configuration.
//!
//! `AppConfig::from_env` loads `.env` (if present) and reads the process
//! environment; `AppConfig::from_lookup` applies the same parsing to any key
//! lookup. Unset variables take their defaults; set but invalid ones are errors.

use crate::caption::{CaptionConfig, DEFAULT_MODEL};
use crate::error::ConfigError;
use crate::rate_limit::cleanup::DEFAULT_CLEANUP_INTERVAL;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const APP_NAME: &str = "MoodChick";
pub const APP_DESCRIPTION: &str = "AI-Powered Caption Generator";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const API_URL_BASE: &str = "https://api-inference.huggingface.co/models/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_window: u32,
    pub cleanup_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { requests_per_window: 60, cleanup_interval: DEFAULT_CLEANUP_INTERVAL }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_owned(), port: 3000 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub caption: CaptionConfig,
    pub rate_limit: RateLimitConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let model = get("HUGGINGFACE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned());
        let api_url = get("HUGGINGFACE_API_URL").unwrap_or_else(|| format!("{API_URL_BASE}{model}"));

        let caption = CaptionConfig {
            api_key: get("HUGGINGFACE_API_KEY").unwrap_or_default(),
            api_url,
            model,
            timeout: Duration::from_millis(positive(&get, "HUGGINGFACE_TIMEOUT_MS", 10_000)?),
            max_retries: positive(&get, "HUGGINGFACE_MAX_RETRIES", 3)?,
            retry_delay: Duration::from_millis(parse(&get, "HUGGINGFACE_RETRY_DELAY_MS", 1_000)?),
        };

        let rate_limit = RateLimitConfig {
            requests_per_window: positive(&get, "RATE_LIMIT_REQUESTS_PER_MINUTE", 60)?,
            cleanup_interval: Duration::from_secs(positive(
                &get,
                "RATE_LIMIT_CLEANUP_INTERVAL_SECS",
                DEFAULT_CLEANUP_INTERVAL.as_secs(),
            )?),
        };

        let server = ServerConfig {
            host: get("SERVER_HOST").unwrap_or_else(|| ServerConfig::default().host),
            port: parse(&get, "SERVER_PORT", 3000)?,
        };

        Ok(Self { caption, rate_limit, server })
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn positive<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default + ToString,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    let value = parse(get, key, default)?;
    if value > T::default() {
        Ok(value)
    } else {
        Err(ConfigError::Invalid { key, value: value.to_string(), reason: "must be greater than zero".into() })
    }
}
