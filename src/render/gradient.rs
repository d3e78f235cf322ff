use kurbo::{Affine, Point, Rect};

use crate::foundation::core::Rgba;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba,
}

impl ColorStop {
    pub fn new(offset: f32, color: Rgba) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

/// Concentric radial gradient between radii `r0` and `r1`, optionally drawn
/// through an affine transform (gradient space to device space).
///
/// Inside `r0` the first stop is padded, outside `r1` the last one.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradient {
    center: Point,
    r0: f64,
    r1: f64,
    stops: Vec<ColorStop>,
    transform: Affine,
    inverse: Affine,
}

impl RadialGradient {
    pub fn new(center: Point, r0: f64, r1: f64, mut stops: Vec<ColorStop>) -> Self {
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        let r0 = r0.max(0.0);
        Self {
            center,
            r0,
            r1: r1.max(r0),
            stops,
            transform: Affine::IDENTITY,
            inverse: Affine::IDENTITY,
        }
    }

    /// Gradient from the center out to `radius`.
    pub fn circle(center: Point, radius: f64, stops: Vec<ColorStop>) -> Self {
        Self::new(center, 0.0, radius, stops)
    }

    pub fn with_transform(mut self, transform: Affine) -> Self {
        if transform.determinant().abs() > f64::EPSILON {
            self.transform = transform;
            self.inverse = transform.inverse();
        }
        self
    }

    pub fn center(&self) -> Point {
        self.transform * self.center
    }

    /// Straight color at device position `(x, y)`.
    pub fn sample(&self, x: f64, y: f64) -> Rgba {
        let p = self.inverse * Point::new(x, y);
        let d = p.distance(self.center);
        let span = self.r1 - self.r0;
        let t = if span <= 0.0 {
            if d < self.r0 { 0.0 } else { 1.0 }
        } else {
            ((d - self.r0) / span).clamp(0.0, 1.0)
        };
        self.color_at(t as f32)
    }

    fn color_at(&self, t: f32) -> Rgba {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Rgba::TRANSPARENT;
        };
        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                if span <= 0.0 {
                    return b.color;
                }
                return a.color.lerp(b.color, (t - a.offset) / span);
            }
        }
        last.color
    }

    /// Device bounding box of the painted disc when everything past `r1` is
    /// transparent; `None` when the gradient covers the whole plane.
    pub fn device_bounds(&self) -> Option<Rect> {
        let last = self.stops.last()?;
        if last.color.a > 0.0 {
            return None;
        }
        let disc = Rect::from_center_size(self.center, (2.0 * self.r1, 2.0 * self.r1));
        Some(self.transform.transform_rect_bbox(disc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white_fade(center: Point, radius: f64) -> RadialGradient {
        RadialGradient::circle(
            center,
            radius,
            vec![
                ColorStop::new(0.0, Rgba::new(1.0, 1.0, 1.0, 1.0)),
                ColorStop::new(1.0, Rgba::new(1.0, 1.0, 1.0, 0.0)),
            ],
        )
    }

    #[test]
    fn alpha_falls_off_with_distance() {
        let g = white_fade(Point::new(10.0, 10.0), 10.0);
        assert!((g.sample(10.0, 10.0).a - 1.0).abs() < 1e-6);
        assert!((g.sample(15.0, 10.0).a - 0.5).abs() < 1e-6);
        assert_eq!(g.sample(30.0, 10.0).a, 0.0);
    }

    #[test]
    fn inner_radius_pads_first_stop() {
        let g = RadialGradient::new(
            Point::new(0.0, 0.0),
            5.0,
            10.0,
            vec![
                ColorStop::new(0.0, Rgba::new(0.0, 0.0, 0.0, 0.0)),
                ColorStop::new(1.0, Rgba::new(0.0, 0.0, 0.0, 1.0)),
            ],
        );
        assert_eq!(g.sample(3.0, 0.0).a, 0.0);
        assert!((g.sample(7.5, 0.0).a - 0.5).abs() < 1e-6);
        assert_eq!(g.sample(20.0, 0.0).a, 1.0);
        assert!(g.device_bounds().is_none());
    }

    #[test]
    fn squash_transform_stretches_along_x() {
        let g = white_fade(Point::ORIGIN, 10.0)
            .with_transform(Affine::translate((50.0, 50.0)) * Affine::scale_non_uniform(1.5, 1.0));
        // 12px right of center is inside the squashed ellipse, 12px down is not.
        assert!(g.sample(62.0, 50.0).a > 0.0);
        assert_eq!(g.sample(50.0, 62.0).a, 0.0);

        let b = g.device_bounds().unwrap();
        assert!((b.width() - 30.0).abs() < 1e-9);
        assert!((b.height() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn multi_stop_interpolates_between_neighbours() {
        let g = RadialGradient::circle(
            Point::ORIGIN,
            1.0,
            vec![
                ColorStop::new(0.0, Rgba::new(1.0, 0.0, 0.0, 1.0)),
                ColorStop::new(0.5, Rgba::new(0.0, 1.0, 0.0, 1.0)),
                ColorStop::new(1.0, Rgba::new(0.0, 0.0, 1.0, 0.0)),
            ],
        );
        let c = g.sample(0.25, 0.0);
        assert!((c.r - 0.5).abs() < 1e-6);
        assert!((c.g - 0.5).abs() < 1e-6);
    }
}
