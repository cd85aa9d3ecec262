use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN;

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetAlertsRequest {
    /// Two-letter US state or territory code, e.g. CA, NY, TX
    pub state: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetForecastRequest {
    /// Latitude in degrees, e.g. 39.7456
    pub latitude: f64,
    /// Longitude in degrees, e.g. -97.0892
    pub longitude: f64,
}

// ============================================================================
// Shared Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<&GetForecastRequest> for Coordinate {
    fn from(request: &GetForecastRequest) -> Self {
        Self::new(request.latitude, request.longitude)
    }
}

/// Forecast temperature: the upstream number, or the placeholder text when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Temperature {
    Value(serde_json::Number),
    Text(String),
}

impl Default for Temperature {
    fn default() -> Self {
        Temperature::Text(UNKNOWN.to_string())
    }
}

// ============================================================================
// Alerts Results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub event: String,
    pub headline: String,
    pub description: String,
    pub severity: String,
    pub urgency: String,
    pub areas: String,
    pub effective: String,
    pub expires: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertsResult {
    pub state: String,
    pub total_alerts: usize,
    pub alerts: Vec<AlertRecord>,
}

// ============================================================================
// Forecast Results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPeriodRecord {
    pub name: String,
    pub temperature: Temperature,
    pub temperature_unit: String,
    pub wind_speed: String,
    pub wind_direction: String,
    pub short_forecast: String,
    pub detailed_forecast: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub location: Location,
    pub forecast_periods: usize,
    pub forecasts: Vec<ForecastPeriodRecord>,
    pub updated: String,
}
