/// Weather-Seeded Random Number Generator
///
/// A linear congruential generator whose seed comes from the current
/// temperature at a coordinate that drifts on every reseed.
///
/// Seed lifecycle:
/// - A seed of exactly `0` means "not seeded". `random()` reseeds first.
/// - A failed reseed leaves the seed at `0` and the same call advances from
///   it, landing on `C`. Every attempt, failed or not, rotates the coordinate.
/// - Once off the sentinel the generator only advances. Advancing from
///   `5353071` yields `0`, which sends the following call back through a
///   reseed.

pub mod coordinate;
pub mod lcg;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::weather::{WeatherError, WeatherSource};

pub use coordinate::Coordinate;

/// Sentinel seed for "never seeded".
pub const UNSEEDED: f64 = 0.0;

/// LCG generator reseeded from a weather source.
pub struct SeededGenerator {
    coordinate: Coordinate,
    seed: f64,
    source: Arc<dyn WeatherSource>,
}

impl SeededGenerator {
    /// Create an unseeded generator at the default coordinate.
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self::with_coordinate(source, Coordinate::default())
    }

    /// Create an unseeded generator at `coordinate`.
    ///
    /// # Arguments
    /// * `source` - Where reseeds read the current temperature from
    /// * `coordinate` - First coordinate sampled; rotates on every reseed
    pub fn with_coordinate(source: Arc<dyn WeatherSource>, coordinate: Coordinate) -> Self {
        tracing::info!(%coordinate, "random number generator initialized");
        Self {
            coordinate,
            seed: UNSEEDED,
            source,
        }
    }

    /// Start from a known seed instead of the sentinel.
    pub fn with_seed(mut self, seed: f64) -> Self {
        self.seed = seed;
        self
    }

    pub fn seed(&self) -> f64 {
        self.seed
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Replace the seed with the current temperature reading.
    ///
    /// The coordinate rotates whether or not the reading succeeds. On failure
    /// the seed is untouched.
    ///
    /// # Returns
    /// The coordinate that was sampled (the one held before rotation) and the
    /// reading, or the reason it could not be obtained.
    async fn reseed(&mut self) -> (Coordinate, Result<f64, WeatherError>) {
        // Rotate first so a failed fetch still moves the next attempt along
        let sampled = self.coordinate;
        self.coordinate = sampled.rotated();

        let result = self.source.current_temperature(sampled).await;
        if let Ok(temperature) = result {
            self.seed = temperature;
        }
        (sampled, result)
    }

    /// Produce the next value of the sequence.
    ///
    /// When the seed is still the `UNSEEDED` sentinel, the generator first
    /// asks its weather source for a reading. Reseed errors are logged and
    /// swallowed; the generator then advances from whatever seed it holds,
    /// so this call never fails.
    ///
    /// # Returns
    /// A value in `[0, 1)`: the advanced seed divided by `M`.
    pub async fn random(&mut self) -> f64 {
        if self.seed == UNSEEDED {
            let (sampled, result) = self.reseed().await;
            match result {
                Ok(seed) => tracing::info!(seed, coordinate = %sampled, "seeded from weather"),
                Err(err) => tracing::error!(error = %err, coordinate = %sampled, "reseed failed"),
            }
        }

        // Always advance, including from a seed left at 0 by a failed reseed
        self.seed = lcg::advance(self.seed);
        lcg::normalize(self.seed)
    }
}

/// Producer of random values for the tool layer.
///
/// `None` stands for "no value available".
#[async_trait]
pub trait RandomSource: Send + Sync {
    async fn next_f64(&self) -> Option<f64>;
}

/// A `SeededGenerator` behind an async lock.
///
/// The lock covers the whole check, reseed and advance sequence, so callers
/// sharing one instance observe a single ordered stream of values.
pub struct SharedGenerator {
    inner: Mutex<SeededGenerator>,
}

impl SharedGenerator {
    pub fn new(generator: SeededGenerator) -> Self {
        Self {
            inner: Mutex::new(generator),
        }
    }

    /// Next value from the wrapped generator, taken under the lock.
    pub async fn random(&self) -> f64 {
        self.inner.lock().await.random().await
    }

    /// Current `(seed, coordinate)` pair.
    pub async fn snapshot(&self) -> (f64, Coordinate) {
        let generator = self.inner.lock().await;
        (generator.seed(), generator.coordinate())
    }
}

#[async_trait]
impl RandomSource for SharedGenerator {
    async fn next_f64(&self) -> Option<f64> {
        Some(self.random().await)
    }
}
