/// Geographic coordinate the generator samples weather at.

use std::fmt;

/// Latitude/longitude pair in degrees.
///
/// Ranges are not enforced; rotation can carry the latitude past 90.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Step added to each axis on every reseed attempt.
    pub const ROTATION_STEP: f64 = 10.0;
    /// Modulus applied to each axis after the step.
    pub const ROTATION_MODULUS: f64 = 180.0;

    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Shift both axes by `ROTATION_STEP` and reduce modulo `ROTATION_MODULUS`.
    ///
    /// Uses the truncated remainder, so a negative axis stays negative until
    /// it crosses zero: `-71.7642` becomes `-61.7642`.
    pub fn rotated(self) -> Self {
        Self {
            latitude: (self.latitude + Self::ROTATION_STEP) % Self::ROTATION_MODULUS,
            longitude: (self.longitude + Self::ROTATION_STEP) % Self::ROTATION_MODULUS,
        }
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::new(42.5255, -71.7642)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Coordinate, latitude: f64, longitude: f64) {
        assert!((actual.latitude - latitude).abs() < 1e-9, "latitude {}", actual.latitude);
        assert!((actual.longitude - longitude).abs() < 1e-9, "longitude {}", actual.longitude);
    }

    #[test]
    fn test_default_coordinate() {
        assert_eq!(Coordinate::default(), Coordinate::new(42.5255, -71.7642));
    }

    #[test]
    fn test_rotate_default() {
        assert_close(Coordinate::default().rotated(), 52.5255, -61.7642);
    }

    #[test]
    fn test_rotate_wraps_at_180() {
        assert_close(Coordinate::new(172.5, 175.0).rotated(), 2.5, 5.0);
    }

    #[test]
    fn test_rotate_negative_crosses_zero() {
        assert_close(Coordinate::new(-5.0, -180.0).rotated(), 5.0, -170.0);
    }

    #[test]
    fn test_rotation_cycle_returns_home() {
        // 18 steps of 10 degrees is one full turn of the 180 modulus.
        let start = Coordinate::new(40.0, 60.0);
        let mut c = start;
        for _ in 0..18 {
            c = c.rotated();
        }
        assert_close(c, 40.0, 60.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Coordinate::new(42.5255, -71.7642).to_string(), "(42.5255, -71.7642)");
    }
}
