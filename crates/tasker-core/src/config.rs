//! Shared configuration for Tasker.
//!
//! Settings come from environment variables, with defaults for anything
//! unset or unparsable.
//!
//! # Environment Variables
//!
//! - `TASKER_FETCH_TIMEOUT_SECS`: Timeout for remote payload requests
//! - `TASKER_USER_AGENT`: User agent sent with remote requests
//! - `TASKER_DEFAULT_CELL_SIZE`: Default grid cell size in projected metres

use std::time::Duration;

use tracing::warn;

/// Environment variable for the remote fetch timeout.
pub const FETCH_TIMEOUT_ENV: &str = "TASKER_FETCH_TIMEOUT_SECS";

/// Environment variable for the HTTP user agent.
pub const USER_AGENT_ENV: &str = "TASKER_USER_AGENT";

/// Environment variable for the default grid cell size.
pub const DEFAULT_CELL_SIZE_ENV: &str = "TASKER_DEFAULT_CELL_SIZE";

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CELL_SIZE: f64 = 1000.0;

/// Runtime settings for ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskerConfig {
    /// Timeout for a single remote request.
    pub fetch_timeout: Duration,
    /// User agent for remote requests.
    pub user_agent: String,
    /// Grid cell size used when none is given.
    pub default_cell_size: f64,
}

impl Default for TaskerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            user_agent: default_user_agent(),
            default_cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl TaskerConfig {
    /// Loads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(FETCH_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.fetch_timeout = Duration::from_secs(secs),
                _ => warn!(variable = FETCH_TIMEOUT_ENV, value = %raw, "Ignoring invalid timeout"),
            }
        }

        if let Some(agent) = lookup(USER_AGENT_ENV) {
            if !agent.trim().is_empty() {
                config.user_agent = agent.trim().to_string();
            }
        }

        if let Some(raw) = lookup(DEFAULT_CELL_SIZE_ENV) {
            match raw.trim().parse::<f64>() {
                Ok(size) if size.is_finite() && size > 0.0 => config.default_cell_size = size,
                _ => warn!(variable = DEFAULT_CELL_SIZE_ENV, value = %raw, "Ignoring invalid cell size"),
            }
        }

        config
    }
}

fn default_user_agent() -> String {
    format!("tasker/{}", env!("CARGO_PKG_VERSION"))
}
