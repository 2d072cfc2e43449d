//! Environment-driven configuration

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://api.raihanpratama.xyz/gemini";
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub endpoint: String,
    /// Minimum time the typing marker stays visible
    pub reply_delay: Duration,
    pub request_timeout: Duration,
    /// Keyed JSON file holding the access token
    pub store_path: PathBuf,
    pub log_path: PathBuf,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
        let data_dir = PathBuf::from(home).join(".gemini-chat");

        let reply_delay = parse_u64(&lookup, "GEMINI_CHAT_REPLY_DELAY_MS")?
            .map_or(DEFAULT_REPLY_DELAY, Duration::from_millis);
        let request_timeout = parse_u64(&lookup, "GEMINI_CHAT_TIMEOUT_SECS")?
            .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs);

        Ok(Self {
            endpoint: lookup("GEMINI_CHAT_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            reply_delay,
            request_timeout,
            store_path: lookup("GEMINI_CHAT_STORE_PATH")
                .map_or_else(|| data_dir.join("storage.json"), PathBuf::from),
            log_path: lookup("GEMINI_CHAT_LOG_PATH")
                .map_or_else(|| data_dir.join("gemini-chat.log"), PathBuf::from),
        })
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<u64>, ConfigError> {
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { name, value })
        })
        .transpose()
}
