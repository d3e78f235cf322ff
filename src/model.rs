use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::{
    core::{Canvas, Rgb8},
    error::{StoryError, StoryResult},
};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 3.0;

/// Quick-pick scales offered next to the scale slider.
pub const SCALE_PRESETS: [f64; 4] = [0.85, 0.96, 1.0, 1.15];
/// The preset highlighted as the favorite.
pub const FAVORITE_PRESET: f64 = 0.96;

/// Film emulation selected for a render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilmFilter {
    #[default]
    None,
    Portra,
    Ektar,
    Velvia,
    Pro400H,
    Cinestill,
    Polaroid,
    Expired,
    BWHigh,
    Ilford,
    /// Legacy 4-level ordered-dither look.
    Dither,
}

impl FilmFilter {
    pub const ALL: [FilmFilter; 11] = [
        FilmFilter::None,
        FilmFilter::Portra,
        FilmFilter::Ektar,
        FilmFilter::Velvia,
        FilmFilter::Pro400H,
        FilmFilter::Cinestill,
        FilmFilter::Polaroid,
        FilmFilter::Expired,
        FilmFilter::BWHigh,
        FilmFilter::Ilford,
        FilmFilter::Dither,
    ];

    /// Parse a filter name. Unknown names fall back to [`FilmFilter::None`].
    pub fn from_name(name: &str) -> Self {
        let key = name.trim().to_ascii_lowercase().replace(['_', '-', ' '], "");
        match key.as_str() {
            "portra" => Self::Portra,
            "ektar" => Self::Ektar,
            "velvia" => Self::Velvia,
            "pro400h" => Self::Pro400H,
            "cinestill" => Self::Cinestill,
            "polaroid" => Self::Polaroid,
            "expired" => Self::Expired,
            "bwhigh" => Self::BWHigh,
            "ilford" => Self::Ilford,
            "dither" => Self::Dither,
            _ => Self::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Portra => "portra",
            Self::Ektar => "ektar",
            Self::Velvia => "velvia",
            Self::Pro400H => "pro400h",
            Self::Cinestill => "cinestill",
            Self::Polaroid => "polaroid",
            Self::Expired => "expired",
            Self::BWHigh => "bwhigh",
            Self::Ilford => "ilford",
            Self::Dither => "dither",
        }
    }

    /// Black-and-white stocks; generative overlays switch to grayscale.
    pub fn is_monochrome(self) -> bool {
        matches!(self, Self::Ilford | Self::BWHigh)
    }
}

impl std::fmt::Display for FilmFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for FilmFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for FilmFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_name(&s))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Fixed 9:16 story canvas.
    #[default]
    Story,
    /// Canvas sized to the source image.
    Photo,
}

/// How the source image is sized inside the story canvas before `scale` applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStrategy {
    /// Natural pixel size times `scale`.
    #[default]
    NaturalScale,
    /// Contain-fit to the canvas aspect, then times `scale`.
    ContainFitScale,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    pub mode: RenderMode,
    pub layout: LayoutStrategy,
    pub scale: f64,
    pub background: Rgb8,
    pub filter: FilmFilter,
    pub grain: bool,
    pub leak: bool,
    pub prism: bool,
    pub leak_seed: f64,
    pub prism_seed: f64,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            mode: RenderMode::Story,
            layout: LayoutStrategy::NaturalScale,
            scale: 1.0,
            background: Rgb8::WHITE,
            filter: FilmFilter::None,
            grain: false,
            leak: false,
            prism: false,
            leak_seed: 0.5,
            prism_seed: 0.5,
        }
    }
}

impl RenderParams {
    /// `scale` clamped into `[MIN_SCALE, MAX_SCALE]`; non-finite values read as 1.
    pub fn clamped_scale(&self) -> f64 {
        clamp_scale(self.scale)
    }
}

pub fn clamp_scale(scale: f64) -> f64 {
    if !scale.is_finite() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Decoded straight RGBA8 source bitmap.
#[derive(Clone, Debug)]
pub struct SourceImage {
    width: u32,
    height: u32,
    rgba8: Arc<Vec<u8>>,
}

impl SourceImage {
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> StoryResult<Self> {
        let img = Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        };
        img.validate()?;
        Ok(img)
    }

    /// Single-color image, handy for fixtures and previews.
    pub fn solid(width: u32, height: u32, px: [u8; 4]) -> StoryResult<Self> {
        let n = (width as usize).saturating_mul(height as usize);
        Self::from_rgba8(width, height, px.repeat(n))
    }

    pub fn validate(&self) -> StoryResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StoryError::malformed(format!(
                "source image must have non-zero dimensions (got {}x{})",
                self.width, self.height
            )));
        }
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| StoryError::malformed("source image size overflow"))?;
        if self.rgba8.len() != expected {
            return Err(StoryError::malformed(format!(
                "source image buffer has {} bytes, expected {expected}",
                self.rgba8.len()
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn rgba8(&self) -> &[u8] {
        &self.rgba8
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.rgba8[i],
            self.rgba8[i + 1],
            self.rgba8[i + 2],
            self.rgba8[i + 3],
        ]
    }
}

/// Rendered straight (non-premultiplied) RGBA8 frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRgba {
    pub fn filled(canvas: Canvas, px: [u8; 4]) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: px.repeat(canvas.pixel_count()),
        }
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

/// What photo mode hands back when there is nothing to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyState {
    pub canvas: Canvas,
    pub fill: Rgb8,
}

impl Default for EmptyState {
    fn default() -> Self {
        Self {
            canvas: Canvas::PHOTO_PLACEHOLDER,
            fill: Rgb8::new(0x1a, 0x1a, 0x1a),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RenderOutput {
    Frame(FrameRgba),
    Empty(EmptyState),
}

impl RenderOutput {
    pub fn frame(&self) -> Option<&FrameRgba> {
        match self {
            Self::Frame(f) => Some(f),
            Self::Empty(_) => None,
        }
    }

    pub fn into_frame(self) -> Option<FrameRgba> {
        match self {
            Self::Frame(f) => Some(f),
            Self::Empty(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }
}
