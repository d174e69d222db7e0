//! Runtime configuration loaded from the environment.

use std::env;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PRACTICE_ID: &str = "1";
const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_ADDRESS_DEBOUNCE_MS: u64 = 500;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer")]
    InvalidNumber { var: &'static str },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tracing controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Fallback filter when `RUST_LOG` is unset
    pub log_level: String,
}

/// Settings shared by the orchestrator and the HTTP adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    pub practice_id: String,
    pub api_base_url: String,
    pub fetch_timeout: Duration,
    pub address_debounce: Duration,
    pub telemetry: TelemetryConfig,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            practice_id: DEFAULT_PRACTICE_ID.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            address_debounce: Duration::from_millis(DEFAULT_ADDRESS_DEBOUNCE_MS),
            telemetry: TelemetryConfig {
                log_level: DEFAULT_LOG_LEVEL.to_string(),
            },
        }
    }
}

impl IntakeConfig {
    /// Read `.env` (if present) and then the process environment.
    pub fn load() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build from any variable source; unset variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |var: &'static str, default: &str| -> ConfigResult<String> {
            match lookup(var) {
                None => Ok(default.to_string()),
                Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { var }),
                Some(value) => Ok(value.trim().to_string()),
            }
        };
        let millis = |var: &'static str, default: u64| -> ConfigResult<Duration> {
            let value = match lookup(var) {
                None => default,
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidNumber { var })?,
            };
            Ok(Duration::from_millis(value))
        };

        Ok(Self {
            practice_id: text("INTAKE_PRACTICE_ID", DEFAULT_PRACTICE_ID)?,
            api_base_url: text("INTAKE_API_BASE_URL", DEFAULT_API_BASE_URL)?
                .trim_end_matches('/')
                .to_string(),
            fetch_timeout: millis("INTAKE_FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS)?,
            address_debounce: millis("INTAKE_ADDRESS_DEBOUNCE_MS", DEFAULT_ADDRESS_DEBOUNCE_MS)?,
            telemetry: TelemetryConfig {
                log_level: text("INTAKE_LOG_LEVEL", DEFAULT_LOG_LEVEL)?,
            },
        })
    }
}
