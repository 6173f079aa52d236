//! Seeded pseudo-random number generation.
//!
//! Every random draw in the simulation (tool outputs, variant choice) goes
//! through a [`RandomSource`] constructed from a string seed, so the same seed
//! always replays the same sequence.

/// Errors produced by range draws.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum RngError {
    #[error("invalid range: max ({max}) must be greater than min ({min})")]
    InvalidRange { min: f64, max: f64 },
}

/// Source of uniformly distributed floats in `[0, 1)`.
///
/// Implementations must be deterministic for a given construction seed. The
/// derived range helpers are provided so alternative generators only supply
/// [`next`](RandomSource::next).
pub trait RandomSource {
    /// Next value in `[0, 1)`.
    fn next(&mut self) -> f64;

    /// Uniform integer in `[min, max)`.
    fn next_int(&mut self, min: i64, max: i64) -> Result<i64, RngError> {
        if max <= min {
            return Err(RngError::InvalidRange {
                min: min as f64,
                max: max as f64,
            });
        }
        let span = (max - min) as f64;
        Ok((self.next() * span).floor() as i64 + min)
    }

    /// Uniform float in `[min, max)`.
    fn next_float(&mut self, min: f64, max: f64) -> Result<f64, RngError> {
        if max <= min {
            return Err(RngError::InvalidRange { min, max });
        }
        Ok(self.next() * (max - min) + min)
    }

    /// Uniform float in `[0, 1)`.
    fn next_unit_float(&mut self) -> f64 {
        self.next()
    }
}

/// Mulberry32 generator seeded by an FNV-1a hash of a string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
    const FNV_PRIME: u32 = 16_777_619;
    const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;
    const OUTPUT_SCALE: f64 = 4_294_967_296.0;

    pub fn new(seed: &str) -> Self {
        Self {
            state: Self::hash_seed(seed),
        }
    }

    /// FNV-1a over the UTF-16 code units of `seed`.
    pub fn hash_seed(seed: &str) -> u32 {
        seed.encode_utf16().fold(Self::FNV_OFFSET_BASIS, |hash, unit| {
            (hash ^ u32::from(unit)).wrapping_mul(Self::FNV_PRIME)
        })
    }

    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(Self::MULBERRY_INCREMENT);
        let t = self.state;
        let mut r = (t ^ (t >> 15)).wrapping_mul(t | 1);
        r ^= r.wrapping_add((r ^ (r >> 7)).wrapping_mul(r | 61));
        r ^ (r >> 14)
    }
}

impl RandomSource for SeededRng {
    fn next(&mut self) -> f64 {
        f64::from(self.next_u32()) / Self::OUTPUT_SCALE
    }
}
