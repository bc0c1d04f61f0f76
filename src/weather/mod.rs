/// Weather Data Sources
///
/// The generator reseeds itself from the current temperature at a coordinate.
/// This module defines the seam it talks to (`WeatherSource`) and the error
/// taxonomy for a failed reading. `open_meteo` holds the HTTP implementation.

pub mod open_meteo;

use async_trait::async_trait;

use crate::generator::Coordinate;

pub use open_meteo::{ForecastResponse, OpenMeteoClient};

/// Reasons a temperature reading could not be obtained.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// Connection, DNS, timeout or body read failure
    #[error("request error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The endpoint answered with a non-2xx status
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not JSON or had no numeric `current.temperature_2m`
    #[error("malformed forecast body: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Source of current temperature readings.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current temperature near `coordinate`.
    async fn current_temperature(&self, coordinate: Coordinate) -> Result<f64, WeatherError>;
}
