use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use serde::Serialize;
use tracing::Span;

use crate::alerts::AlertsHandler;
use crate::config::WeatherConfig;
use crate::error::ErrorEnvelope;
use crate::forecast::ForecastHandler;
use crate::gateway::{HttpGateway, ReqwestGateway};
use crate::models::{Coordinate, GetAlertsRequest, GetForecastRequest};

/// Main weather service that handles MCP requests
#[derive(Clone)]
pub struct Weather {
    alerts: AlertsHandler,
    forecast: ForecastHandler,
    tool_router: ToolRouter<Self>,
}

impl Weather {
    /// Creates a service talking to the NWS API described by `config`
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let gateway = Arc::new(ReqwestGateway::new(config)?);
        Ok(Self::with_gateway(gateway, config))
    }

    /// Creates a service over an arbitrary gateway
    pub fn with_gateway(gateway: Arc<dyn HttpGateway>, config: &WeatherConfig) -> Self {
        Self {
            alerts: AlertsHandler::new(gateway.clone()),
            forecast: ForecastHandler::new(gateway).with_max_periods(config.max_forecast_periods),
            tool_router: Self::tool_router(),
        }
    }

    /// Nests every tool call's log events under `span`, owned by the host
    pub fn with_span(self, span: Span) -> Self {
        Self {
            alerts: self.alerts.with_span(span.clone()),
            forecast: self.forecast.with_span(span),
            tool_router: self.tool_router,
        }
    }
}

/// Wraps a handler outcome as tool output. Failures are flagged `is_error`
/// but still carry the envelope as JSON content.
fn reply<T: Serialize>(outcome: Result<T, ErrorEnvelope>) -> Result<CallToolResult, McpError> {
    match outcome {
        Ok(result) => Ok(CallToolResult::success(vec![Content::json(result)?])),
        Err(envelope) => Ok(CallToolResult::error(vec![Content::json(envelope)?])),
    }
}

#[tool_handler]
impl ServerHandler for Weather {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Weather alerts and forecasts for US locations from the National Weather \
                Service API. Results are JSON; failures carry an 'error' field."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl Weather {
    /// Gets active weather alerts for a US state
    #[tool(description = "Get active weather alerts for a US state. Provide a two-letter state code (e.g., 'CA' for California, 'NY' for New York).")]
    async fn get_alerts(
        &self,
        Parameters(request): Parameters<GetAlertsRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(self.alerts.get_alerts(&request.state).await)
    }

    /// Gets a multi-day forecast for a US coordinate
    #[tool(description = "Get the weather forecast for a US location. Provide latitude and longitude (e.g., latitude: 39.7456, longitude: -97.0892). Returns up to 7 forecast periods.")]
    async fn get_forecast(
        &self,
        Parameters(request): Parameters<GetForecastRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(self.forecast.get_forecast(Coordinate::from(&request)).await)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    use crate::error::FetchError;
    use crate::testutils::{CapturedEvents, FakeGateway};

    fn weather(gateway: FakeGateway) -> Weather {
        Weather::with_gateway(Arc::new(gateway), &WeatherConfig::default())
    }

    #[tokio::test]
    async fn alerts_success_is_not_flagged() {
        let weather = weather(
            FakeGateway::new().respond("/alerts/active?area=CA", json!({ "features": [] })),
        );

        let result = weather
            .get_alerts(Parameters(GetAlertsRequest {
                state: "ca".to_string(),
            }))
            .await
            .unwrap();
        assert_ne!(result.is_error, Some(true));
        assert_eq!(result.content.len(), 1);
    }

    #[tokio::test]
    async fn forecast_failure_is_flagged_not_raised() {
        let weather = weather(
            FakeGateway::new().fail("/points/40,-74", FetchError::HttpStatus { status: 503 }),
        );

        let result = weather
            .get_forecast(Parameters(GetForecastRequest {
                latitude: 40.0,
                longitude: -74.0,
            }))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.content.len(), 1);
    }

    #[tokio::test]
    async fn handler_events_nest_under_host_span() {
        let captured = CapturedEvents::new();
        let subscriber = tracing_subscriber::registry().with(captured.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let weather = weather(
            FakeGateway::new()
                .respond("/alerts/active?area=CA", json!({ "features": [] }))
                .fail("/alerts/active?area=NY", FetchError::Timeout),
        )
        .with_span(tracing::info_span!("weather_host"));

        for state in ["ca", "ny"] {
            weather
                .get_alerts(Parameters(GetAlertsRequest {
                    state: state.to_string(),
                }))
                .await
                .unwrap();
        }

        let events = captured.events();
        let infos: Vec<_> = events.iter().filter(|e| e.level == Level::INFO).collect();
        let errors: Vec<_> = events.iter().filter(|e| e.level == Level::ERROR).collect();
        // request + success for CA, request for NY
        assert_eq!(infos.len(), 3);
        assert_eq!(errors.len(), 1);
        for event in infos.iter().chain(errors.iter()) {
            assert_eq!(event.spans, vec!["weather_host", "get_alerts"]);
        }
    }

    #[test]
    fn advertises_tools() {
        let weather = weather(FakeGateway::new());
        let info = weather.get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, "nws-weather-mcp");
    }
}
