//! Storyframe composes a photo onto a 9:16 story canvas (or its own canvas) and
//! runs it through a film-emulation chain:
//!
//! - tone curve on the image draw, then per-pixel monochrome or dither
//! - per-stock color washes and vignettes
//! - optional grain, light leaks and prism flares, each seeded and reproducible
//!
//! Renders are pure functions of the source bitmap and [`RenderParams`].
//! [`Compositor`] caches the grain tile and can be shared between threads.
#![forbid(unsafe_code)]

mod foundation;

pub mod compositor;
/// Decode, JPEG encode and export naming.
pub mod export;
pub mod model;
/// Generative overlays drawn after the image.
pub mod overlay;
/// Raster primitives: curves, blending, gradients, sampling.
pub mod render;

pub use crate::foundation::core::{Affine, Canvas, Point, Rgb8, Rgba};
pub use crate::foundation::error::{StoryError, StoryResult};
pub use crate::foundation::math::luma;
pub use crate::foundation::prng::{SeededRandom, normalize_seed};

pub use crate::compositor::{Compositor, CompositorOpts, render};
pub use crate::export::{ExportNaming, JPEG_QUALITY, decode_image, encode_jpeg, export_file_name};
pub use crate::model::{
    EmptyState, FAVORITE_PRESET, FilmFilter, FrameRgba, LayoutStrategy, MAX_SCALE, MIN_SCALE,
    RenderMode, RenderOutput, RenderParams, SCALE_PRESETS, SourceImage, clamp_scale,
};
pub use crate::render::blend::BlendMode;
pub use crate::render::draw::initial_scale;
