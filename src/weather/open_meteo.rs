/// Open-Meteo Forecast Client
///
/// Fetches current conditions from the Open-Meteo forecast API. Only the
/// temperature is consumed; the other requested fields are part of the query
/// the endpoint has always been called with.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{WeatherError, WeatherSource};
use crate::generator::Coordinate;

/// Public forecast endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Longitude sent with every request, independent of the stored coordinate.
pub const FIXED_LONGITUDE: &str = "120";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,precipitation";

/// Subset of the forecast body we read.
#[derive(Deserialize, Debug)]
pub struct ForecastResponse {
    pub current: CurrentConditions,
}

#[derive(Deserialize, Debug)]
pub struct CurrentConditions {
    pub temperature_2m: f64,
}

/// Build the forecast URL for a coordinate.
///
/// Only the latitude comes from `coordinate`; longitude is always
/// [`FIXED_LONGITUDE`]. Latitude uses the shortest round-trip rendering
/// (`42.5255`, `50.0`).
pub fn forecast_url(base_url: &str, coordinate: Coordinate) -> String {
    format!(
        "{}?latitude={:?}&longitude={}&current={}&wind_speed_unit=ms&temperature_unit=fahrenheit",
        base_url, coordinate.latitude, FIXED_LONGITUDE, CURRENT_FIELDS
    )
}

/// Extract `current.temperature_2m` from a forecast body.
pub fn parse_temperature(body: &[u8]) -> Result<f64, WeatherError> {
    let parsed: ForecastResponse = serde_json::from_slice(body).map_err(WeatherError::Parse)?;
    Ok(parsed.current.temperature_2m)
}

/// HTTP client for the forecast endpoint.
///
/// The underlying `reqwest::Client` is built once and reused, so connections
/// are pooled across reseeds.
#[derive(Clone, Debug)]
pub struct OpenMeteoClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenMeteoClient {
    /// Create a client against `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(WeatherError::Transport)?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn current_temperature(&self, coordinate: Coordinate) -> Result<f64, WeatherError> {
        let url = forecast_url(&self.base_url, coordinate);
        tracing::debug!(%url, "requesting forecast");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(WeatherError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            // The body usually carries the API's reason; keep it for the log.
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(WeatherError::Transport)?;
        parse_temperature(&body)
    }
}
