use std::f64::consts::PI;

use kurbo::{Affine, Point};

use crate::foundation::core::{Canvas, Rgba};
use crate::foundation::prng::SeededRandom;
use crate::render::blend::{BlendMode, Layer, Paint};
use crate::render::gradient::{ColorStop, RadialGradient};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlarePalette {
    WarmAmber,
    CoolEthereal,
    /// Four-stop rainbow.
    Spectral,
}

impl FlarePalette {
    fn pick(r: f64) -> Self {
        if r < 0.4 {
            Self::WarmAmber
        } else if r < 0.7 {
            Self::CoolEthereal
        } else {
            Self::Spectral
        }
    }

    /// Color stops; `monochrome` keeps the lightness ramp with zero saturation.
    pub fn stops(self, monochrome: bool) -> Vec<ColorStop> {
        let hsla = |h: f64, s: f64, l: f64, a: f32| {
            Rgba::hsla(h, if monochrome { 0.0 } else { s }, l, a)
        };
        match self {
            Self::WarmAmber => vec![
                ColorStop::new(0.0, hsla(35.0, 100.0, 70.0, 0.35)),
                ColorStop::new(0.5, hsla(25.0, 100.0, 60.0, 0.15)),
                ColorStop::new(1.0, hsla(25.0, 100.0, 50.0, 0.0)),
            ],
            Self::CoolEthereal => vec![
                ColorStop::new(0.0, hsla(200.0, 80.0, 75.0, 0.3)),
                ColorStop::new(0.5, hsla(260.0, 70.0, 65.0, 0.12)),
                ColorStop::new(1.0, hsla(260.0, 70.0, 50.0, 0.0)),
            ],
            Self::Spectral => vec![
                ColorStop::new(0.0, hsla(0.0, 100.0, 65.0, 0.25)),
                ColorStop::new(0.33, hsla(60.0, 100.0, 65.0, 0.2)),
                ColorStop::new(0.66, hsla(180.0, 100.0, 65.0, 0.15)),
                ColorStop::new(1.0, hsla(270.0, 100.0, 65.0, 0.0)),
            ],
        }
    }
}

/// Large soft flare near the left or right edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Flare {
    pub center: Point,
    pub radius: f64,
    pub palette: FlarePalette,
    /// Horizontal stretch, `1..1.5`.
    pub squash: f64,
    /// Radians.
    pub rotation: f64,
    pub stops: Vec<ColorStop>,
}

impl Flare {
    pub fn gradient(&self) -> RadialGradient {
        let transform = Affine::translate(self.center.to_vec2())
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.squash, 1.0);
        RadialGradient::circle(Point::ORIGIN, self.radius, self.stops.clone())
            .with_transform(transform)
    }
}

/// Faint white circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bokeh {
    pub center: Point,
    pub radius: f64,
}

impl Bokeh {
    pub fn gradient(&self) -> RadialGradient {
        let white = |a: f32| Rgba::new(1.0, 1.0, 1.0, a);
        RadialGradient::circle(
            self.center,
            self.radius,
            vec![
                ColorStop::new(0.0, white(0.08)),
                ColorStop::new(0.7, white(0.04)),
                ColorStop::new(1.0, white(0.0)),
            ],
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrismPlan {
    pub flares: Vec<Flare>,
    pub bokeh: Vec<Bokeh>,
}

impl PrismPlan {
    pub fn new(seed: f64, canvas: Canvas, monochrome: bool) -> Self {
        let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
        let mut rng = SeededRandom::new(seed);

        let flare_count = rng.next_count(2, 2);
        let mut flares = Vec::with_capacity(flare_count as usize);
        for _ in 0..flare_count {
            let from_left = rng.next_f64() < 0.5;
            let offset = rng.next_f64() * w * 0.25;
            let x = if from_left { offset } else { w - offset };
            let y = rng.next_f64() * h;
            let radius = w.max(h) * (0.4 + rng.next_f64() * 0.4);
            let palette = FlarePalette::pick(rng.next_f64());
            let squash = 1.0 + rng.next_f64() * 0.5;
            let rotation = rng.next_f64() * PI;
            flares.push(Flare {
                center: Point::new(x, y),
                radius,
                palette,
                squash,
                rotation,
                stops: palette.stops(monochrome),
            });
        }

        let bokeh_count = rng.next_count(3, 5);
        let bokeh = (0..bokeh_count)
            .map(|_| {
                let x = rng.next_f64() * w;
                let y = rng.next_f64() * h;
                let radius = w * (0.1 + rng.next_f64() * 0.2);
                Bokeh {
                    center: Point::new(x, y),
                    radius,
                }
            })
            .collect();

        Self { flares, bokeh }
    }

    /// Flares first, then bokeh, all screen-blended.
    pub fn layers(&self) -> Vec<Layer> {
        let flares = self.flares.iter().map(Flare::gradient);
        let bokeh = self.bokeh.iter().map(Bokeh::gradient);
        flares
            .chain(bokeh)
            .map(|g| Layer::new(Paint::Radial(g), BlendMode::Screen, 1.0))
            .collect()
    }
}
