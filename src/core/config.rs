/// Server Configuration
///
/// All settings come from environment variables and are read once at
/// startup. `Config::from_lookup` takes the lookup as a function so the
/// parsing rules can be exercised without touching the process environment.
///
/// Environment Variables:
/// - SERVER_NAME: Name of the server (default: "meteorandom")
/// - SERVER_VERSION: Version string (default: the crate version)
/// - MCP_TRANSPORT_MODE: "stdio", "http", or "both" (default: "stdio")
/// - HOST: Bind address for HTTP mode (default: "0.0.0.0")
/// - PORT: Port number for HTTP mode (default: 3000)
/// - WORKER_THREADS: HTTP worker count (default: CPU count, max 16)
/// - WEATHER_API_URL: Forecast endpoint (default: Open-Meteo public API)
/// - WEATHER_TIMEOUT_SECS: Outbound request timeout (default: 10)
/// - GENERATOR_LATITUDE / GENERATOR_LONGITUDE: Starting coordinate override
/// - LOG_FORMAT: "text" or "json" (default: "text")

use std::str::FromStr;
use std::time::Duration;

use crate::core::server::HttpOptions;
use crate::generator::Coordinate;
use crate::weather::open_meteo::DEFAULT_BASE_URL;

pub const DEFAULT_SERVER_NAME: &str = "meteorandom";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid transport mode '{0}', must be 'stdio', 'http', or 'both'")]
    InvalidTransport(String),

    #[error("invalid log format '{0}', must be 'text' or 'json'")]
    InvalidLogFormat(String),

    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("GENERATOR_LATITUDE and GENERATOR_LONGITUDE must be set together")]
    PartialCoordinate,
}

/// Which transports to serve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportMode {
    /// Read from stdin, write to stdout
    Stdio,
    /// JSON-RPC over HTTP
    Http,
    /// STDIO in the background, HTTP in the foreground
    Both,
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(TransportMode::Stdio),
            "http" => Ok(TransportMode::Http),
            "both" => Ok(TransportMode::Both),
            other => Err(ConfigError::InvalidTransport(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidLogFormat(other.to_string())),
        }
    }
}

/// Outbound weather request settings.
#[derive(Clone, Debug, PartialEq)]
pub struct WeatherConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_name: String,
    pub server_version: String,
    pub transport: TransportMode,
    pub http: HttpOptions,
    pub weather: WeatherConfig,
    /// None means the generator's default coordinate.
    pub coordinate: Option<Coordinate>,
    pub log_format: LogFormat,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let transport: TransportMode = get("MCP_TRANSPORT_MODE", "stdio").parse()?;
        let log_format: LogFormat = get("LOG_FORMAT", "text").parse()?;

        // An unparseable port falls back to the default rather than failing.
        let port = lookup("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let workers = lookup("WORKER_THREADS")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or_else(|| num_cpus::get().clamp(1, 16));

        let timeout_secs = match lookup("WEATHER_TIMEOUT_SECS") {
            Some(value) => parse_number::<u64>("WEATHER_TIMEOUT_SECS", value)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let coordinate = match (lookup("GENERATOR_LATITUDE"), lookup("GENERATOR_LONGITUDE")) {
            (Some(lat), Some(long)) => Some(Coordinate::new(
                parse_number("GENERATOR_LATITUDE", lat)?,
                parse_number("GENERATOR_LONGITUDE", long)?,
            )),
            (None, None) => None,
            _ => return Err(ConfigError::PartialCoordinate),
        };

        Ok(Config {
            server_name: get("SERVER_NAME", DEFAULT_SERVER_NAME),
            server_version: get("SERVER_VERSION", env!("CARGO_PKG_VERSION")),
            transport,
            http: HttpOptions {
                host: get("HOST", "0.0.0.0"),
                port,
                workers,
            },
            weather: WeatherConfig {
                base_url: get("WEATHER_API_URL", DEFAULT_BASE_URL),
                timeout: Duration::from_secs(timeout_secs),
            },
            coordinate,
            log_format,
        })
    }
}

fn parse_number<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.server_name, "meteorandom");
        assert_eq!(config.server_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.transport, TransportMode::Stdio);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 3000);
        assert!((1..=16).contains(&config.http.workers));
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1/forecast");
        assert_eq!(config.weather.timeout, Duration::from_secs(10));
        assert_eq!(config.coordinate, None);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("SERVER_NAME", "weather-rng"),
            ("MCP_TRANSPORT_MODE", "both"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("WORKER_THREADS", "4"),
            ("WEATHER_API_URL", "http://localhost:9000/v1/forecast"),
            ("WEATHER_TIMEOUT_SECS", "3"),
            ("GENERATOR_LATITUDE", "51.5"),
            ("GENERATOR_LONGITUDE", "-0.12"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.server_name, "weather-rng");
        assert_eq!(config.transport, TransportMode::Both);
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.workers, 4);
        assert_eq!(config.weather.base_url, "http://localhost:9000/v1/forecast");
        assert_eq!(config.weather.timeout, Duration::from_secs(3));
        assert_eq!(config.coordinate, Some(Coordinate::new(51.5, -0.12)));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = config_with(&[("PORT", "http")]).unwrap();
        assert_eq!(config.http.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_transport() {
        let err = config_with(&[("MCP_TRANSPORT_MODE", "sse")]).unwrap_err();
        assert_eq!(err, ConfigError::InvalidTransport("sse".to_string()));
        assert_eq!(
            err.to_string(),
            "invalid transport mode 'sse', must be 'stdio', 'http', or 'both'"
        );
    }

    #[test]
    fn test_invalid_timeout() {
        let err = config_with(&[("WEATHER_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { name: "WEATHER_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn test_partial_coordinate() {
        let err = config_with(&[("GENERATOR_LATITUDE", "10")]).unwrap_err();
        assert_eq!(err, ConfigError::PartialCoordinate);
    }

    #[test]
    fn test_invalid_coordinate() {
        let err = config_with(&[("GENERATOR_LATITUDE", "north"), ("GENERATOR_LONGITUDE", "10")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { name: "GENERATOR_LATITUDE", .. }));
    }
}
