/// meteorandom Entry Point
///
/// Reads the configuration from the environment, sets up logging on stderr,
/// builds the single generator instance shared by every transport, then
/// starts the STDIO and/or HTTP server. See `core::config` for the variables.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use meteorandom::core::config::{Config, LogFormat, TransportMode};
use meteorandom::core::server::{self, AppState};
use meteorandom::generator::{SeededGenerator, SharedGenerator};
use meteorandom::weather::OpenMeteoClient;

/// Install the global tracing subscriber.
///
/// Output goes to stderr so it never interleaves with JSON-RPC on stdout.
/// `RUST_LOG` overrides the default `info` filter.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);

    let weather = OpenMeteoClient::new(config.weather.base_url.clone(), config.weather.timeout)
        .context("failed to build weather client")?;
    let generator = match config.coordinate {
        Some(coordinate) => SeededGenerator::with_coordinate(Arc::new(weather), coordinate),
        None => SeededGenerator::new(Arc::new(weather)),
    };
    let generator = Arc::new(SharedGenerator::new(generator));
    let registry = server::initialize_tools(generator);

    let state = AppState {
        server_name: config.server_name.clone(),
        server_version: config.server_version.clone(),
    };

    match config.transport {
        TransportMode::Stdio => server::run_server_stdio(state, registry).await?,
        TransportMode::Http => server::run_server_http(state, registry, config.http.clone()).await?,
        TransportMode::Both => {
            // STDIO in the background, HTTP in the foreground; both share
            // the same registry and therefore the same generator.
            let stdio_state = state.clone();
            let stdio_registry = registry.clone();
            let stdio_handle = tokio::spawn(async move {
                if let Err(e) = server::run_server_stdio(stdio_state, stdio_registry).await {
                    tracing::error!(error = %e, "STDIO server error");
                }
            });

            let http_result = server::run_server_http(state, registry, config.http.clone()).await;

            // If HTTP server exits, abort STDIO task
            stdio_handle.abort();
            http_result?;
        }
    }

    tracing::info!("server stopped");
    Ok(())
}
