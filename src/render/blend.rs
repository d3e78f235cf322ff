use std::sync::Arc;

use kurbo::Rect;
use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Rgba};
use crate::foundation::math::unit_to_u8;
use crate::model::FrameRgba;
use crate::render::gradient::RadialGradient;
use crate::render::noise::NoiseTile;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Plain source-over.
    #[default]
    Normal,
    Screen,
    Multiply,
    Overlay,
    Lighten,
    SoftLight,
}

impl BlendMode {
    /// Per-channel blend `B(s, d)` of source `s` onto backdrop `d`, both in `0..1`.
    pub fn mix(self, s: f32, d: f32) -> f32 {
        match self {
            Self::Normal => s,
            Self::Screen => screen(s, d),
            Self::Multiply => s * d,
            Self::Overlay => overlay(s, d),
            Self::Lighten => s.max(d),
            Self::SoftLight => soft_light(s, d),
        }
    }
}

fn screen(s: f32, d: f32) -> f32 {
    s + d - s * d
}

fn overlay(s: f32, d: f32) -> f32 {
    if d < 0.5 {
        2.0 * s * d
    } else {
        1.0 - 2.0 * (1.0 - s) * (1.0 - d)
    }
}

fn soft_light(s: f32, d: f32) -> f32 {
    if s <= 0.5 {
        d - (1.0 - 2.0 * s) * d * (1.0 - d)
    } else {
        let g = if d <= 0.25 {
            ((16.0 * d - 12.0) * d + 4.0) * d
        } else {
            d.sqrt()
        };
        d + (2.0 * s - 1.0) * (g - d)
    }
}

/// Source of color for a fill.
#[derive(Clone, Debug)]
pub enum Paint {
    Solid(Rgba),
    Radial(RadialGradient),
    /// Repeating tile anchored at the frame origin.
    Pattern(Arc<NoiseTile>),
}

impl Paint {
    fn sample(&self, x: u32, y: u32) -> Rgba {
        match self {
            Self::Solid(c) => *c,
            Self::Radial(g) => g.sample(f64::from(x) + 0.5, f64::from(y) + 0.5),
            Self::Pattern(tile) => {
                let v = f32::from(tile.sample(x, y)) / 255.0;
                Rgba::new(v, v, v, 1.0)
            }
        }
    }

    /// Device-space area outside of which the paint is fully transparent.
    fn coverage(&self) -> Option<Rect> {
        match self {
            Self::Solid(c) if c.a <= 0.0 => Some(Rect::ZERO),
            Self::Radial(g) => g.device_bounds(),
            _ => None,
        }
    }
}

/// One full-frame fill: a paint, a blend mode and a global alpha.
#[derive(Clone, Debug)]
pub struct Layer {
    pub paint: Paint,
    pub blend: BlendMode,
    pub opacity: f32,
}

impl Layer {
    pub fn new(paint: Paint, blend: BlendMode, opacity: f32) -> Self {
        Self {
            paint,
            blend,
            opacity,
        }
    }

    pub fn solid(color: Rgba, blend: BlendMode) -> Self {
        Self::new(Paint::Solid(color), blend, 1.0)
    }
}

/// Composite `layer` over the whole frame.
pub fn fill_layer(frame: &mut FrameRgba, layer: &Layer) {
    let opacity = layer.opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }
    let Some((x0, y0, x1, y1)) = pixel_span(frame.canvas(), layer.paint.coverage()) else {
        return;
    };

    // Blend dispatch happens once per fill; each arm gets its own kernel.
    match layer.blend {
        BlendMode::Normal => fill_span(frame, layer, opacity, (x0, y0, x1, y1), |s, _| s),
        BlendMode::Screen => fill_span(frame, layer, opacity, (x0, y0, x1, y1), screen),
        BlendMode::Multiply => fill_span(frame, layer, opacity, (x0, y0, x1, y1), |s, d| s * d),
        BlendMode::Overlay => fill_span(frame, layer, opacity, (x0, y0, x1, y1), overlay),
        BlendMode::Lighten => fill_span(frame, layer, opacity, (x0, y0, x1, y1), f32::max),
        BlendMode::SoftLight => fill_span(frame, layer, opacity, (x0, y0, x1, y1), soft_light),
    }
}

#[inline(always)]
fn fill_span<F>(
    frame: &mut FrameRgba,
    layer: &Layer,
    opacity: f32,
    (x0, y0, x1, y1): (u32, u32, u32, u32),
    blend_fn: F,
) where
    F: Fn(f32, f32) -> f32,
{
    let width = frame.width as usize;
    for y in y0..y1 {
        let row = (y as usize) * width;
        for x in x0..x1 {
            let src = layer.paint.sample(x, y);
            let idx = (row + x as usize) * 4;
            composite_px(&mut frame.data[idx..idx + 4], src, opacity, &blend_fn);
        }
    }
}

/// Source-over with a separable blend, on straight colors:
/// `Cs' = (1 - ab) Cs + ab B(Cb, Cs)`, `co = as Cs' + ab Cb (1 - as)`,
/// `ao = as + ab (1 - as)`.
#[inline(always)]
pub(crate) fn composite_px<F>(dst: &mut [u8], src: Rgba, opacity: f32, blend_fn: &F)
where
    F: Fn(f32, f32) -> f32,
{
    let sa = (src.a * opacity).clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }

    let s = [src.r, src.g, src.b];
    for c in 0..3 {
        let sc = s[c].clamp(0.0, 1.0);
        let dc = f32::from(dst[c]) / 255.0;
        let mixed = blend_fn(sc, dc).clamp(0.0, 1.0);
        let sc_prime = (1.0 - da) * sc + da * mixed;
        let co = sa * sc_prime + da * dc * (1.0 - sa);
        dst[c] = unit_to_u8(co / out_a);
    }
    dst[3] = unit_to_u8(out_a);
}

fn pixel_span(canvas: Canvas, coverage: Option<Rect>) -> Option<(u32, u32, u32, u32)> {
    let (w, h) = (canvas.width, canvas.height);
    let Some(r) = coverage else {
        return Some((0, 0, w, h));
    };
    if r.width() <= 0.0 || r.height() <= 0.0 {
        return None;
    }
    let clamp_x = |v: f64| v.clamp(0.0, f64::from(w)) as u32;
    let clamp_y = |v: f64| v.clamp(0.0, f64::from(h)) as u32;
    let (x0, x1) = (clamp_x(r.x0.floor()), clamp_x(r.x1.ceil()));
    let (y0, y1) = (clamp_y(r.y0.floor()), clamp_y(r.y1.ceil()));
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0, y0, x1, y1))
}
