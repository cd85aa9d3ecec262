use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value;

use crate::config::WeatherConfig;
use crate::constants::ACCEPT_JSON;
use crate::error::FetchError;
use crate::fields::JsonMap;

/// Target of a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Path resolved against the gateway's base URL.
    Path {
        path: String,
        query: Vec<(String, String)>,
    },
    /// Full URL used verbatim, e.g. a link returned by a previous response.
    Absolute(String),
}

impl Endpoint {
    pub fn path<S: Into<String>>(path: S) -> Self {
        Endpoint::Path {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn absolute<S: Into<String>>(url: S) -> Self {
        Endpoint::Absolute(url.into())
    }

    pub fn with_query<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        if let Endpoint::Path { query, .. } = &mut self {
            query.push((key.into(), value.into()));
        }
        self
    }
}

/// Unencoded form for logs and test route keys. The wire query is encoded by
/// `reqwest` and may differ for values with reserved characters.
impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Path { path, query } => {
                write!(f, "{path}")?;
                for (i, (key, value)) in query.iter().enumerate() {
                    let sep = if i == 0 { '?' } else { '&' };
                    write!(f, "{sep}{key}={value}")?;
                }
                Ok(())
            }
            Endpoint::Absolute(url) => write!(f, "{url}"),
        }
    }
}

/// One outbound JSON GET.
///
/// Implementations hold no per-call state; each call either yields the decoded
/// top-level object or exactly one [`FetchError`]. No retries.
#[async_trait]
pub trait HttpGateway: Send + Sync {
    async fn get_json(&self, endpoint: &Endpoint) -> Result<JsonMap, FetchError>;
}

/// [`HttpGateway`] backed by `reqwest`.
///
/// One pooled `Client` is shared by every call rather than built per call.
/// A call owns only its request and response: dropping the future returned by
/// `get_json` aborts the in-flight request and closes its connection, but idle
/// keep-alive connections stay in the pool after the call returns.
#[derive(Debug, Clone)]
pub struct ReqwestGateway {
    client: Client,
    base_url: String,
}

impl ReqwestGateway {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl HttpGateway for ReqwestGateway {
    async fn get_json(&self, endpoint: &Endpoint) -> Result<JsonMap, FetchError> {
        tracing::debug!(%endpoint, "GET");

        let request = match endpoint {
            Endpoint::Path { path, query } => self
                .client
                .get(format!("{}{}", self.base_url, path))
                .query(query),
            Endpoint::Absolute(url) => self.client.get(url),
        };

        let response = request.send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        match response.json::<Value>().await.map_err(classify)? {
            Value::Object(map) => Ok(map),
            _ => Err(FetchError::parse("response body is not a JSON object")),
        }
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_decode() {
        FetchError::parse(format!("invalid JSON body: {e}"))
    } else if let Some(status) = e.status() {
        FetchError::HttpStatus {
            status: status.as_u16(),
        }
    } else {
        FetchError::transport(e.to_string())
    }
}
