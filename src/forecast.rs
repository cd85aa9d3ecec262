use std::sync::Arc;

use serde_json::Value;
use tracing::{Instrument, Span};

use crate::constants::{DEFAULT_MAX_FORECAST_PERIODS, UNKNOWN};
use crate::error::{ErrorEnvelope, FetchError, RequestEcho};
use crate::fields::{
    as_object, field_or, lookup_str, required_array, required_object, required_str,
    text_or_unknown,
};
use crate::gateway::{Endpoint, HttpGateway};
use crate::models::{Coordinate, ForecastPeriodRecord, ForecastResult, Location, Temperature};

/// Which of the two chained calls failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Points,
    Forecast,
}

#[derive(Debug)]
struct StepError {
    step: Step,
    error: FetchError,
}

trait AtStep<T> {
    fn at(self, step: Step) -> Result<T, StepError>;
}

impl<T> AtStep<T> for Result<T, FetchError> {
    fn at(self, step: Step) -> Result<T, StepError> {
        self.map_err(|error| StepError { step, error })
    }
}

/// Multi-day forecast for a coordinate: points lookup, then the forecast URL it returns.
#[derive(Clone)]
pub struct ForecastHandler {
    gateway: Arc<dyn HttpGateway>,
    max_periods: usize,
    span: Span,
}

impl ForecastHandler {
    pub fn new(gateway: Arc<dyn HttpGateway>) -> Self {
        Self {
            gateway,
            max_periods: DEFAULT_MAX_FORECAST_PERIODS,
            span: Span::none(),
        }
    }

    pub fn with_max_periods(mut self, max_periods: usize) -> Self {
        self.max_periods = max_periods;
        self
    }

    /// Parent span for every call. Each call opens its own `get_forecast` span beneath it.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Fetches the forecast for `coord`.
    ///
    /// The second request goes to the forecast URL from the points response,
    /// verbatim, and is never sent if the first step fails. Errors echo the
    /// supplied coordinate.
    pub async fn get_forecast(&self, coord: Coordinate) -> Result<ForecastResult, ErrorEnvelope> {
        let call_span = tracing::info_span!(
            parent: &self.span,
            "get_forecast",
            latitude = coord.latitude,
            longitude = coord.longitude
        );

        async {
            tracing::info!(
                latitude = coord.latitude,
                longitude = coord.longitude,
                "Fetching weather forecast"
            );

            match self.fetch(coord).await {
                Ok(result) => {
                    tracing::info!(periods = result.forecast_periods, "Fetched weather forecast");
                    Ok(result)
                }
                Err(StepError { step, error }) => {
                    let envelope = envelope(coord, step, error);
                    tracing::error!(?step, kind = ?envelope.kind, "{}", envelope.error);
                    Err(envelope)
                }
            }
        }
        .instrument(call_span)
        .await
    }

    async fn fetch(&self, coord: Coordinate) -> Result<ForecastResult, StepError> {
        let points_endpoint =
            Endpoint::path(format!("/points/{},{}", coord.latitude, coord.longitude));
        let points = self.gateway.get_json(&points_endpoint).await.at(Step::Points)?;

        let grid = required_object(&points, "properties", "properties").at(Step::Points)?;
        let forecast_url = required_str(grid, "forecast", "properties.forecast").at(Step::Points)?;

        let city = lookup_str(grid, &["relativeLocation", "properties", "city"]).unwrap_or(UNKNOWN);
        let state =
            lookup_str(grid, &["relativeLocation", "properties", "state"]).unwrap_or(UNKNOWN);

        tracing::debug!(%forecast_url, "Resolved forecast grid");

        let forecast = self
            .gateway
            .get_json(&Endpoint::absolute(forecast_url))
            .await
            .at(Step::Forecast)?;

        let props = required_object(&forecast, "properties", "properties").at(Step::Forecast)?;
        let forecasts = required_array(props, "periods", "properties.periods")
            .at(Step::Forecast)?
            .iter()
            .take(self.max_periods)
            .map(project_period)
            .collect::<Result<Vec<_>, _>>()
            .at(Step::Forecast)?;
        let updated = text_or_unknown(props, "updated").at(Step::Forecast)?;

        Ok(ForecastResult {
            location: Location {
                latitude: coord.latitude,
                longitude: coord.longitude,
                city: city.to_string(),
                state: state.to_string(),
            },
            forecast_periods: forecasts.len(),
            forecasts,
            updated,
        })
    }
}

fn project_period(period: &Value) -> Result<ForecastPeriodRecord, FetchError> {
    let period = as_object(period, "period")?;

    Ok(ForecastPeriodRecord {
        name: text_or_unknown(period, "name")?,
        temperature: field_or(period, "temperature", Temperature::default())?,
        temperature_unit: text_or_unknown(period, "temperatureUnit")?,
        wind_speed: text_or_unknown(period, "windSpeed")?,
        wind_direction: text_or_unknown(period, "windDirection")?,
        short_forecast: text_or_unknown(period, "shortForecast")?,
        detailed_forecast: text_or_unknown(period, "detailedForecast")?,
    })
}

fn envelope(coord: Coordinate, step: Step, error: FetchError) -> ErrorEnvelope {
    let (lat, lon) = (coord.latitude, coord.longitude);
    let message = match &error {
        FetchError::Timeout => format!("Timed out fetching forecast for ({lat}, {lon})"),
        FetchError::HttpStatus { status: 404 } if step == Step::Points => format!(
            "Failed to fetch forecast for ({lat}, {lon}): HTTP 404. \
             The location is outside the NWS forecast grid coverage area."
        ),
        FetchError::HttpStatus { status } => {
            format!("Failed to fetch forecast for ({lat}, {lon}): HTTP {status}")
        }
        FetchError::Parse { detail } => format!("Failed to parse forecast data: {detail}"),
        FetchError::Transport { detail } => {
            format!("Error fetching forecast for ({lat}, {lon}): {detail}")
        }
    };
    ErrorEnvelope::new(error.kind(), message, RequestEcho::Location(coord))
}
