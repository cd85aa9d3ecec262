/// User agent string for HTTP requests. The NWS API rejects requests without one.
pub const USER_AGENT: &str = "nws-weather-mcp/0.1.0";

/// National Weather Service API base URL
pub const NWS_API_BASE: &str = "https://api.weather.gov";

/// Per-request timeout applied to every outbound call
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Number of forecast periods returned by `get_forecast`
pub const DEFAULT_MAX_FORECAST_PERIODS: usize = 7;

/// Placeholder for fields missing from the upstream payload
pub const UNKNOWN: &str = "unknown";

/// Accept header sent with every request
pub const ACCEPT_JSON: &str = "application/geo+json, application/json";
