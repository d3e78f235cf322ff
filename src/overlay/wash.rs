use kurbo::Point;

use crate::foundation::core::{Canvas, Rgba};
use crate::model::FilmFilter;
use crate::render::blend::{BlendMode, Layer, Paint};
use crate::render::gradient::{ColorStop, RadialGradient};

/// Fixed tint/vignette sequence for `filter`. Empty for filters without a wash.
pub fn wash_layers(filter: FilmFilter, canvas: Canvas) -> Vec<Layer> {
    match filter {
        FilmFilter::Pro400H => vec![
            // Cool cyan cast, then lifted shadows.
            Layer::solid(Rgba::rgba8(0, 50, 50, 0.1), BlendMode::Overlay),
            Layer::solid(Rgba::rgba8(20, 40, 40, 0.2), BlendMode::Lighten),
        ],
        FilmFilter::Cinestill => vec![
            Layer::solid(Rgba::rgba8(0, 40, 120, 0.15), BlendMode::SoftLight),
            Layer::solid(Rgba::rgba8(80, 0, 0, 0.08), BlendMode::Screen),
        ],
        FilmFilter::Polaroid => vec![
            Layer::solid(Rgba::rgba8(255, 180, 100, 0.12), BlendMode::Overlay),
            Layer::solid(Rgba::rgba8(255, 245, 220, 0.3), BlendMode::Multiply),
            vignette(canvas, 0.35, 0.75, 0.35),
        ],
        FilmFilter::Expired => vec![
            Layer::solid(Rgba::rgba8(255, 0, 100, 0.05), BlendMode::Screen),
            Layer::solid(Rgba::rgba8(100, 100, 0, 0.1), BlendMode::Multiply),
            vignette(canvas, 0.3, 0.7, 0.4),
        ],
        _ => Vec::new(),
    }
}

/// Centered darkening ring from `inner` to `outer` (fractions of the longer
/// side), reaching black at `darkness` alpha on the edges.
fn vignette(canvas: Canvas, inner: f64, outer: f64, darkness: f32) -> Layer {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let side = w.max(h);
    let gradient = RadialGradient::new(
        Point::new(w / 2.0, h / 2.0),
        side * inner,
        side * outer,
        vec![
            ColorStop::new(0.0, Rgba::TRANSPARENT),
            ColorStop::new(1.0, Rgba::new(0.0, 0.0, 0.0, darkness)),
        ],
    );
    Layer::new(Paint::Radial(gradient), BlendMode::Normal, 1.0)
}
