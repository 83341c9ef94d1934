use std::str::FromStr;

use thiserror::Error;
use tracing::Level;

pub const LOG_FORMAT_ENV: &str = "COMPLIANCE_RULE_LOG_FORMAT";
pub const LOG_LEVEL_ENV: &str = "COMPLIANCE_RULE_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            _ => Err(ConfigError::InvalidValue {
                key: LOG_FORMAT_ENV,
                value: value.to_string(),
                expected: "json or text",
            }),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Settings read once per execution environment, at cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub log_format: LogFormat,
    pub log_level: Level,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            log_level: Level::INFO,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let log_format = match non_empty(lookup(LOG_FORMAT_ENV)) {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };
        let log_level = match non_empty(lookup(LOG_LEVEL_ENV)) {
            Some(value) => Level::from_str(value.trim()).map_err(|_| ConfigError::InvalidValue {
                key: LOG_LEVEL_ENV,
                value,
                expected: "one of trace, debug, info, warn, error",
            })?,
            None => defaults.log_level,
        };

        Ok(Self {
            log_format,
            log_level,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
