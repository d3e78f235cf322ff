use std::sync::Arc;

use crate::model::FilmFilter;
use crate::render::blend::{BlendMode, Layer, Paint};
use crate::render::noise::NoiseTile;

pub const DEFAULT_GRAIN_STRENGTH: f32 = 0.18;

/// Grain opacity for a stock. Chosen by the filter alone, whatever other
/// overlays are on.
pub fn grain_strength(filter: FilmFilter) -> f32 {
    match filter {
        FilmFilter::Ektar => 0.22,
        FilmFilter::Velvia => 0.15,
        FilmFilter::Pro400H => 0.12,
        FilmFilter::Cinestill => 0.15,
        FilmFilter::Polaroid => 0.2,
        FilmFilter::Expired => 0.5,
        FilmFilter::BWHigh => 0.4,
        _ => DEFAULT_GRAIN_STRENGTH,
    }
}

/// The noise tile repeated over the frame, overlay-blended.
pub fn grain_layer(tile: Arc<NoiseTile>, filter: FilmFilter) -> Layer {
    Layer::new(
        Paint::Pattern(tile),
        BlendMode::Overlay,
        grain_strength(filter),
    )
}
