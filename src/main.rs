use anyhow::Result;
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nws_weather_mcp::{Weather, WeatherConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP stream
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nws_weather_mcp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = WeatherConfig::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        timeout_secs = config.timeout_secs,
        max_forecast_periods = config.max_forecast_periods,
        "Starting MCP weather server"
    );

    let weather = Weather::new(&config)?.with_span(tracing::info_span!("weather_tools"));
    let server = weather.serve(rmcp::transport::stdio()).await?;
    server.waiting().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
