//! Runtime options for the weather tools.
//!
//! The library never reads the environment itself: the host builds a
//! [`WeatherConfig`] (usually via [`WeatherConfig::from_env`]) and hands it to
//! the gateway and handlers.

use std::time::Duration;

use anyhow::{ensure, Context, Result};
use ::config::{Config, Environment};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_FORECAST_PERIODS, DEFAULT_TIMEOUT_SECS, NWS_API_BASE, USER_AGENT};

/// Environment prefix read by [`WeatherConfig::from_env`]
pub const ENV_PREFIX: &str = "NWS_WEATHER";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL that relative endpoints are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sent on every request; the NWS API requires it
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Timeout for each outbound call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Cap on forecast periods returned per call
    #[serde(default = "default_max_forecast_periods")]
    pub max_forecast_periods: usize,
}

fn default_base_url() -> String {
    NWS_API_BASE.to_string()
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_forecast_periods() -> usize {
    DEFAULT_MAX_FORECAST_PERIODS
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_forecast_periods: default_max_forecast_periods(),
        }
    }
}

impl WeatherConfig {
    /// Loads defaults overridden by `NWS_WEATHER_*` variables,
    /// e.g. `NWS_WEATHER_TIMEOUT_SECS=15`.
    pub fn from_env() -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read weather configuration")?
            .try_deserialize()
            .context("Invalid weather configuration")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.base_url.trim().is_empty(), "base_url must not be empty");
        ensure!(!self.user_agent.trim().is_empty(), "user_agent must not be empty");
        ensure!(self.timeout_secs > 0, "timeout_secs must be greater than zero");
        ensure!(
            self.max_forecast_periods > 0,
            "max_forecast_periods must be greater than zero"
        );
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
