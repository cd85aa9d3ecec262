use std::sync::Arc;

use serde_json::Value;
use tracing::{Instrument, Span};

use crate::error::{ErrorEnvelope, FetchError, RequestEcho};
use crate::fields::{array_or_empty, as_object, object_or_empty, text_or_unknown};
use crate::gateway::{Endpoint, HttpGateway};
use crate::models::{AlertRecord, AlertsResult};

/// Active weather alerts for a US state.
#[derive(Clone)]
pub struct AlertsHandler {
    gateway: Arc<dyn HttpGateway>,
    span: Span,
}

impl AlertsHandler {
    pub fn new(gateway: Arc<dyn HttpGateway>) -> Self {
        Self {
            gateway,
            span: Span::none(),
        }
    }

    /// Parent span for every call. Each call opens its own `get_alerts` span beneath it.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Fetches and projects active alerts for `state` (case-insensitive).
    ///
    /// Every failure comes back as an [`ErrorEnvelope`] carrying the
    /// uppercased state code.
    pub async fn get_alerts(&self, state: &str) -> Result<AlertsResult, ErrorEnvelope> {
        let state = state.to_uppercase();
        let call_span = tracing::info_span!(parent: &self.span, "get_alerts", state = %state);

        async {
            tracing::info!(state = %state, "Fetching active weather alerts");

            match self.fetch(&state).await {
                Ok(result) => {
                    tracing::info!(state = %state, count = result.total_alerts, "Fetched weather alerts");
                    Ok(result)
                }
                Err(error) => {
                    let envelope = envelope(&state, error);
                    tracing::error!(state = %state, kind = ?envelope.kind, "{}", envelope.error);
                    Err(envelope)
                }
            }
        }
        .instrument(call_span)
        .await
    }

    async fn fetch(&self, state: &str) -> Result<AlertsResult, FetchError> {
        let endpoint = Endpoint::path("/alerts/active").with_query("area", state);
        let payload = self.gateway.get_json(&endpoint).await?;

        let alerts = array_or_empty(&payload, "features")?
            .iter()
            .map(project_alert)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AlertsResult {
            state: state.to_string(),
            total_alerts: alerts.len(),
            alerts,
        })
    }
}

fn project_alert(feature: &Value) -> Result<AlertRecord, FetchError> {
    let feature = as_object(feature, "feature")?;
    let props = object_or_empty(feature, "properties")?;

    Ok(AlertRecord {
        event: text_or_unknown(&props, "event")?,
        headline: text_or_unknown(&props, "headline")?,
        description: text_or_unknown(&props, "description")?,
        severity: text_or_unknown(&props, "severity")?,
        urgency: text_or_unknown(&props, "urgency")?,
        areas: text_or_unknown(&props, "areaDesc")?,
        effective: text_or_unknown(&props, "effective")?,
        expires: text_or_unknown(&props, "expires")?,
    })
}

fn envelope(state: &str, error: FetchError) -> ErrorEnvelope {
    let message = match &error {
        FetchError::Timeout => format!("Timed out fetching weather alerts for {state}"),
        FetchError::HttpStatus { status } => {
            format!("Failed to fetch weather alerts for {state}: HTTP {status}")
        }
        FetchError::Parse { detail } => format!("Failed to parse weather alert data: {detail}"),
        FetchError::Transport { detail } => {
            format!("Failed to fetch weather alerts for {state}: {detail}")
        }
    };
    ErrorEnvelope::new(error.kind(), message, RequestEcho::State(state.to_string()))
}
