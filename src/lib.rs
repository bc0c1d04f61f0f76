//! meteorandom: an MCP server whose single tool returns random numbers from
//! a linear congruential generator seeded by live temperature readings.
//!
//! - `generator`: the seeded LCG and its shared, lock-guarded wrapper
//! - `weather`: temperature sources (Open-Meteo over HTTP)
//! - `tools`: MCP tool definitions
//! - `core`: JSON-RPC dispatch, transports and configuration

pub mod core;
pub mod generator;
pub mod tools;
pub mod weather;

pub use crate::core::config::{Config, ConfigError, TransportMode};
pub use generator::{Coordinate, RandomSource, SeededGenerator, SharedGenerator};
pub use weather::{OpenMeteoClient, WeatherError, WeatherSource};
