//! Environment-driven configuration

use crate::backend::find_model;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000/api/chat/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("CHAT_REQUEST_TIMEOUT_SECS must be a positive integer, got {0:?}")]
    InvalidTimeout(String),

    #[error("CHAT_MODEL {0:?} is not in the model catalog")]
    UnknownModel(String),

    #[error("CHAT_BACKEND_URL must not be empty")]
    EmptyBackendUrl,
}

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend_url: String,
    /// Model forwarded with every request; `None` lets the backend choose
    pub model: Option<String>,
    /// Directory holding the session record
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = lookup("CHAT_BACKEND_URL")
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
            .trim()
            .to_string();
        if backend_url.is_empty() {
            return Err(ConfigError::EmptyBackendUrl);
        }

        let model = match lookup("CHAT_MODEL").filter(|m| !m.trim().is_empty()) {
            Some(model) if find_model(&model).is_none() => {
                return Err(ConfigError::UnknownModel(model))
            }
            other => other,
        };

        let data_dir = lookup("CHAT_DATA_DIR").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".chat-sessions")
            },
            PathBuf::from,
        );

        let request_timeout = match lookup("CHAT_REQUEST_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
        };

        Ok(Self {
            backend_url,
            model,
            data_dir,
            request_timeout,
        })
    }
}
