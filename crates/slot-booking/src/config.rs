//! Configuration for the booking backend.
//!
//! Values come from an optional TOML file and are then overridden by
//! environment variables:
//!
//! | key            | env var             | default                                  |
//! |----------------|---------------------|------------------------------------------|
//! | `calendar_id`  | `SLOT_CALENDAR_ID`  | `primary`                                |
//! | `api_base_url` | `SLOT_API_BASE_URL` | `https://www.googleapis.com/calendar/v3` |
//! | `access_token` | `SLOT_ACCESS_TOKEN` | none                                     |
//! | `max_attempts` | `SLOT_MAX_ATTEMPTS` | `3`                                      |
//! | `backoff_ms`   | `SLOT_BACKOFF_MS`   | `1000`                                   |
//! | `timeout_secs` | `SLOT_TIMEOUT_SECS` | `30`                                     |

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::backend::{CredentialProvider, MissingCredentials, StaticToken};
use crate::error::ConfigError;
use crate::google::DEFAULT_BASE_URL;
use crate::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};

#[derive(Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub calendar_id: String,
    pub api_base_url: String,
    pub access_token: Option<String>,
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_ms: 1000,
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("calendar_id", &self.calendar_id)
            .field("api_base_url", &self.api_base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("max_attempts", &self.max_attempts)
            .field("backoff_ms", &self.backoff_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load from `path` (if given) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Override fields from variables visible through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SLOT_CALENDAR_ID") {
            self.calendar_id = v;
        }
        if let Some(v) = lookup("SLOT_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("SLOT_ACCESS_TOKEN") {
            self.access_token = Some(v).filter(|t| !t.is_empty());
        }
        if let Some(v) = lookup("SLOT_MAX_ATTEMPTS") {
            self.max_attempts = parse_var("SLOT_MAX_ATTEMPTS", &v)?;
        }
        if let Some(v) = lookup("SLOT_BACKOFF_MS") {
            self.backoff_ms = parse_var("SLOT_BACKOFF_MS", &v)?;
        }
        if let Some(v) = lookup("SLOT_TIMEOUT_SECS") {
            self.timeout_secs = parse_var("SLOT_TIMEOUT_SECS", &v)?;
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.backoff_ms))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Credential provider for the configured token.
    pub fn credentials(&self) -> Box<dyn CredentialProvider> {
        match &self.access_token {
            Some(token) => Box::new(StaticToken::new(token.clone())),
            None => Box::new(MissingCredentials),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
