//! In-memory gateway and log capture for handler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::error::FetchError;
use crate::fields::JsonMap;
use crate::gateway::{Endpoint, HttpGateway};

/// Replies from a fixed route table keyed by the endpoint's display form and
/// records every call. Unrouted endpoints fail as transport errors.
#[derive(Default)]
pub struct FakeGateway {
    routes: HashMap<String, Result<JsonMap, FetchError>>,
    calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, endpoint: &str, body: Value) -> Self {
        let map = body.as_object().cloned().unwrap_or_default();
        self.routes.insert(endpoint.to_string(), Ok(map));
        self
    }

    pub fn fail(mut self, endpoint: &str, error: FetchError) -> Self {
        self.routes.insert(endpoint.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpGateway for FakeGateway {
    async fn get_json(&self, endpoint: &Endpoint) -> Result<JsonMap, FetchError> {
        let key = endpoint.to_string();
        self.calls.lock().unwrap().push(key.clone());
        self.routes
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::transport(format!("no route for {key}"))))
    }
}

/// An event as seen by [`CapturedEvents`]: its level and the names of the
/// spans it was emitted in, outermost first.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub spans: Vec<String>,
}

/// Layer recording every event with its span scope.
#[derive(Clone, Default)]
pub struct CapturedEvents {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl<S> Layer<S> for CapturedEvents
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let spans = ctx
            .event_scope(event)
            .map(|scope| scope.from_root().map(|span| span.name().to_string()).collect())
            .unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            spans,
        });
    }
}
