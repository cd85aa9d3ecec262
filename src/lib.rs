//! MCP tools for National Weather Service alerts and forecasts.
//!
//! [`service::Weather`] exposes `get_alerts` and `get_forecast`. Each tool call
//! either returns its result mapping or an [`error::ErrorEnvelope`]; handler
//! failures are never surfaced as protocol errors.

pub mod alerts;
pub mod config;
pub mod constants;
pub mod error;
pub mod fields;
pub mod forecast;
pub mod gateway;
pub mod models;
pub mod service;

#[cfg(test)]
mod testutils;

pub use crate::config::WeatherConfig;
pub use crate::error::{ErrorEnvelope, FetchError};
pub use crate::service::Weather;
