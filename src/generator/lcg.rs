/// Linear congruential step shared by every generator instance.

/// Multiplier.
pub const A: f64 = 8191.0;
/// Increment.
pub const C: f64 = 524287.0;
/// Modulus. Also the divisor that maps a seed into `[0, 1)`.
pub const M: f64 = 6700417.0;

/// Largest `f64` strictly below `M`.
pub const MAX_SEED: f64 = f64::from_bits(M.to_bits() - 1);

/// One LCG step: `(A * seed + C) mod M`.
///
/// Uses the Euclidean remainder so a negative seed (a sub-zero temperature
/// reading) still lands in `[0, M)`. For integer seeds in `[0, M)` the
/// product stays below 2^53 and the result is exact.
///
/// `rem_euclid` rounds `r + M` up to `M` itself when `A * seed + C` is a tiny
/// negative number. That case is clamped to [`MAX_SEED`], the nearest value
/// to the true remainder, rather than wrapped to `0`, which would land on
/// the unseeded sentinel.
///
/// # Arguments
/// * `seed` - Current seed. Any finite value, including negative or
///   fractional temperature readings.
///
/// # Returns
/// The next seed, always in `[0, M)`.
pub fn advance(seed: f64) -> f64 {
    let r = (A * seed + C).rem_euclid(M);
    if r >= M { MAX_SEED } else { r }
}

/// Map a seed in `[0, M)` onto `[0, 1)`.
pub fn normalize(seed: f64) -> f64 {
    seed / M
}
