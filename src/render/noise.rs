use std::sync::{Arc, OnceLock};

use crate::foundation::math::hash_u32;

pub const NOISE_TILE_SIZE: u32 = 512;

/// Square black/white tile repeated across the frame for film grain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoiseTile {
    size: u32,
    values: Vec<u8>,
}

impl NoiseTile {
    /// Each texel is independently 0 or 255 with probability one half.
    pub fn generate(size: u32, seed: u64) -> Self {
        let size = size.max(1);
        let mut values = Vec::with_capacity((size as usize) * (size as usize));
        for y in 0..size {
            for x in 0..size {
                let bit = hash_u32(seed, x, y) & 1;
                values.push(if bit == 0 { 0 } else { 255 });
            }
        }
        Self { size, values }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Texel value with wrap-around addressing.
    pub fn sample(&self, x: u32, y: u32) -> u8 {
        let tx = (x % self.size) as usize;
        let ty = (y % self.size) as usize;
        self.values[ty * (self.size as usize) + tx]
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }
}

/// Lazily built tile shared by every render of one compositor.
#[derive(Debug)]
pub struct NoiseCache {
    size: u32,
    seed: u64,
    tile: OnceLock<Arc<NoiseTile>>,
}

impl NoiseCache {
    pub fn new(size: u32, seed: u64) -> Self {
        Self {
            size,
            seed,
            tile: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Arc<NoiseTile> {
        self.tile
            .get_or_init(|| {
                tracing::debug!(size = self.size, "generating noise tile");
                Arc::new(NoiseTile::generate(self.size, self.seed))
            })
            .clone()
    }

    pub fn is_built(&self) -> bool {
        self.tile.get().is_some()
    }
}
