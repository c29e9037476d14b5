//! # Service Configuration
//!
//! Read once at startup from the environment:
//!
//! | Variable       | Default | Meaning                                  |
//! |----------------|---------|------------------------------------------|
//! | `PORT`         | `8080`  | TCP port to listen on                    |
//! | `GRC_SNAPSHOT` | unset   | JSON/YAML snapshot seeding the store     |
//! | `GRC_LOG_JSON` | `false` | emit logs as JSON lines                  |

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT {value:?}: expected an integer in 1..=65535")]
    InvalidPort { value: String },

    #[error("invalid {name} {value:?}: expected true/false/1/0")]
    InvalidFlag { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub port: u16,
    pub snapshot: Option<PathBuf>,
    pub log_json: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            snapshot: None,
            log_json: false,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("PORT") {
            config.port = match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(ConfigError::InvalidPort { value: raw }),
            };
        }
        config.snapshot = lookup("GRC_SNAPSHOT")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        if let Some(raw) = lookup("GRC_LOG_JSON") {
            config.log_json = parse_flag("GRC_LOG_JSON", &raw)?;
        }

        Ok(config)
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: raw.to_string(),
        }),
    }
}
