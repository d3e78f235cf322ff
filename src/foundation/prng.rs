//! Seeded Park-Miller generator used by the generative overlays.
//!
//! The arithmetic is carried out in `f64` exactly as a double-precision
//! implementation would, so a given seed and call count reproduce the same
//! stream bit for bit on every platform.

const MODULUS: f64 = 2_147_483_647.0;
const MULTIPLIER: f64 = 16_807.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeededRandom {
    state: f64,
}

impl SeededRandom {
    /// Start a stream from a seed. Seeds outside `[0, 1)` are wrapped by
    /// [`normalize_seed`] first.
    pub fn new(seed: f64) -> Self {
        Self {
            state: normalize_seed(seed) * MODULUS,
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * MULTIPLIER) % MODULUS;
        let v = (self.state - 1.0) / (MODULUS - 1.0);
        // States below 1 (seed 0, tiny seeds) would go negative.
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }

    /// `lo + floor(next * span)`.
    pub fn next_count(&mut self, lo: u32, span: u32) -> u32 {
        lo + (self.next_f64() * f64::from(span)).floor() as u32
    }
}

/// Fractional part of `seed` in `[0, 1)`; non-finite seeds become 0. Seeds
/// already in range are returned unchanged.
pub fn normalize_seed(seed: f64) -> f64 {
    if !seed.is_finite() {
        return 0.0;
    }
    let wrapped = seed.rem_euclid(1.0);
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}
