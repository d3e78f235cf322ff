use kurbo::Point;

use crate::foundation::core::{Canvas, Rgba};
use crate::foundation::prng::SeededRandom;
use crate::render::blend::{BlendMode, Layer, Paint};
use crate::render::gradient::{ColorStop, RadialGradient};

const LEAK_ALPHA: f32 = 0.6;

/// One warm (or gray) radial blob.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightLeak {
    pub center: Point,
    pub radius: f64,
    pub inner: Rgba,
    pub outer: Rgba,
}

impl LightLeak {
    pub fn gradient(&self) -> RadialGradient {
        RadialGradient::circle(
            self.center,
            self.radius,
            vec![
                ColorStop::new(0.0, self.inner),
                ColorStop::new(1.0, self.outer),
            ],
        )
    }
}

/// Geometry and colors of the light leaks for one render, derived from the
/// stored seed each time.
#[derive(Clone, Debug, PartialEq)]
pub struct LeakPlan {
    pub leaks: Vec<LightLeak>,
}

impl LeakPlan {
    pub fn new(seed: f64, canvas: Canvas, monochrome: bool) -> Self {
        let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
        let mut rng = SeededRandom::new(seed);

        let count = rng.next_count(2, 2);
        let leaks = (0..count)
            .map(|_| {
                let x = rng.next_f64() * w;
                let y = rng.next_f64() * h;
                let radius = (w + h) / 3.0 * (0.5 + rng.next_f64());
                let (inner, outer) = if monochrome {
                    let l = 70.0 + rng.next_f64() * 20.0;
                    (
                        Rgba::hsla(0.0, 0.0, l, LEAK_ALPHA),
                        Rgba::hsla(0.0, 0.0, l - 20.0, 0.0),
                    )
                } else {
                    let hue = 10.0 + rng.next_f64() * 40.0;
                    (
                        Rgba::hsla(hue, 100.0, 70.0, LEAK_ALPHA),
                        Rgba::hsla(hue, 100.0, 50.0, 0.0),
                    )
                };
                LightLeak {
                    center: Point::new(x, y),
                    radius,
                    inner,
                    outer,
                }
            })
            .collect();

        Self { leaks }
    }

    pub fn layers(&self) -> Vec<Layer> {
        self.leaks
            .iter()
            .map(|leak| Layer::new(Paint::Radial(leak.gradient()), BlendMode::Screen, 1.0))
            .collect()
    }
}
