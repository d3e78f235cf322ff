//! Global color grades applied to the source image as it is drawn.
//!
//! Every operation is one of the standard filter-effect primitives. They are
//! compiled into 3x4 affine color matrices and run in order, clamping to
//! `0..1` after each step like a filter chain does.

use crate::foundation::math::unit_to_u8;
use crate::model::FilmFilter;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorOp {
    /// Scale the distance from mid-gray.
    Contrast(f32),
    /// Scale chroma distance from luma.
    Saturate(f32),
    /// Multiply channels.
    Brightness(f32),
    /// Blend toward the sepia matrix by `amount`.
    Sepia(f32),
    /// Rotate hue by degrees.
    HueRotate(f32),
}

const PORTRA: &[ColorOp] = &[
    ColorOp::Contrast(1.15),
    ColorOp::Saturate(1.3),
    ColorOp::Brightness(1.05),
    ColorOp::Sepia(0.15),
];
const EKTAR: &[ColorOp] = &[
    ColorOp::Contrast(1.25),
    ColorOp::Saturate(1.4),
    ColorOp::Brightness(1.02),
    ColorOp::Sepia(0.05),
];
const VELVIA: &[ColorOp] = &[
    ColorOp::Contrast(1.3),
    ColorOp::Saturate(1.8),
    ColorOp::Brightness(0.95),
    ColorOp::HueRotate(-5.0),
];
const PRO400H: &[ColorOp] = &[
    ColorOp::Contrast(0.9),
    ColorOp::Saturate(1.05),
    ColorOp::Brightness(1.2),
    ColorOp::Sepia(0.1),
];
const CINESTILL: &[ColorOp] = &[
    ColorOp::Contrast(1.1),
    ColorOp::Saturate(1.2),
    ColorOp::Brightness(1.05),
    ColorOp::HueRotate(-10.0),
];
const POLAROID: &[ColorOp] = &[
    ColorOp::Contrast(0.9),
    ColorOp::Saturate(0.8),
    ColorOp::Brightness(1.1),
    ColorOp::Sepia(0.25),
];
const EXPIRED: &[ColorOp] = &[
    ColorOp::Contrast(0.85),
    ColorOp::Saturate(0.7),
    ColorOp::Brightness(1.2),
    ColorOp::Sepia(0.5),
];

/// Ordered grade for `filter`; empty for the identity filters.
pub fn base_curve(filter: FilmFilter) -> &'static [ColorOp] {
    match filter {
        FilmFilter::Portra => PORTRA,
        FilmFilter::Ektar => EKTAR,
        FilmFilter::Velvia => VELVIA,
        FilmFilter::Pro400H => PRO400H,
        FilmFilter::Cinestill => CINESTILL,
        FilmFilter::Polaroid => POLAROID,
        FilmFilter::Expired => EXPIRED,
        FilmFilter::None | FilmFilter::BWHigh | FilmFilter::Ilford | FilmFilter::Dither => &[],
    }
}

/// Row-major 3x4 matrix: `out_c = m[4c]*r + m[4c+1]*g + m[4c+2]*b + m[4c+3]`.
type ColorMatrix = [f32; 12];

impl ColorOp {
    fn matrix(self) -> ColorMatrix {
        match self {
            Self::Contrast(k) => {
                let o = 0.5 - 0.5 * k;
                [k, 0.0, 0.0, o, 0.0, k, 0.0, o, 0.0, 0.0, k, o]
            }
            Self::Brightness(k) => [k, 0.0, 0.0, 0.0, 0.0, k, 0.0, 0.0, 0.0, 0.0, k, 0.0],
            Self::Saturate(s) => [
                0.213 + 0.787 * s,
                0.715 - 0.715 * s,
                0.072 - 0.072 * s,
                0.0,
                0.213 - 0.213 * s,
                0.715 + 0.285 * s,
                0.072 - 0.072 * s,
                0.0,
                0.213 - 0.213 * s,
                0.715 - 0.715 * s,
                0.072 + 0.928 * s,
                0.0,
            ],
            Self::Sepia(amount) => {
                let i = 1.0 - amount.clamp(0.0, 1.0);
                [
                    0.393 + 0.607 * i,
                    0.769 - 0.769 * i,
                    0.189 - 0.189 * i,
                    0.0,
                    0.349 - 0.349 * i,
                    0.686 + 0.314 * i,
                    0.168 - 0.168 * i,
                    0.0,
                    0.272 - 0.272 * i,
                    0.534 - 0.534 * i,
                    0.131 + 0.869 * i,
                    0.0,
                ]
            }
            Self::HueRotate(deg) => {
                let (sin, cos) = deg.to_radians().sin_cos();
                [
                    0.213 + cos * 0.787 - sin * 0.213,
                    0.715 - cos * 0.715 - sin * 0.715,
                    0.072 - cos * 0.072 + sin * 0.928,
                    0.0,
                    0.213 - cos * 0.213 + sin * 0.143,
                    0.715 + cos * 0.285 + sin * 0.140,
                    0.072 - cos * 0.072 - sin * 0.283,
                    0.0,
                    0.213 - cos * 0.213 - sin * 0.787,
                    0.715 - cos * 0.715 + sin * 0.715,
                    0.072 + cos * 0.928 + sin * 0.072,
                    0.0,
                ]
            }
        }
    }
}

/// Compiled grade, built once per render.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorCurve {
    steps: Vec<ColorMatrix>,
}

impl ColorCurve {
    pub fn from_ops(ops: &[ColorOp]) -> Self {
        Self {
            steps: ops.iter().map(|op| op.matrix()).collect(),
        }
    }

    pub fn for_filter(filter: FilmFilter) -> Self {
        Self::from_ops(base_curve(filter))
    }

    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    /// Grade one straight RGB pixel.
    pub fn apply(&self, rgb: [u8; 3]) -> [u8; 3] {
        if self.is_identity() {
            return rgb;
        }
        let mut c = rgb.map(|v| f32::from(v) / 255.0);
        for m in &self.steps {
            let [r, g, b] = c;
            c = [
                (m[0] * r + m[1] * g + m[2] * b + m[3]).clamp(0.0, 1.0),
                (m[4] * r + m[5] * g + m[6] * b + m[7]).clamp(0.0, 1.0),
                (m[8] * r + m[9] * g + m[10] * b + m[11]).clamp(0.0, 1.0),
            ];
        }
        c.map(unit_to_u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_filters_have_no_ops() {
        for f in [
            FilmFilter::None,
            FilmFilter::BWHigh,
            FilmFilter::Ilford,
            FilmFilter::Dither,
        ] {
            assert!(base_curve(f).is_empty());
            assert_eq!(ColorCurve::for_filter(f).apply([12, 34, 56]), [12, 34, 56]);
        }
    }

    #[test]
    fn velvia_and_cinestill_rotate_hue() {
        assert!(base_curve(FilmFilter::Velvia).contains(&ColorOp::HueRotate(-5.0)));
        assert!(base_curve(FilmFilter::Cinestill).contains(&ColorOp::HueRotate(-10.0)));
    }

    #[test]
    fn contrast_pushes_away_from_mid_gray() {
        let c = ColorCurve::from_ops(&[ColorOp::Contrast(1.5)]);
        let [lo, ..] = c.apply([64, 64, 64]);
        let [hi, ..] = c.apply([192, 192, 192]);
        assert!(lo < 64);
        assert!(hi > 192);
        assert_eq!(c.apply([128, 128, 128])[0], 128);
    }

    #[test]
    fn zero_saturation_is_gray_and_unit_ops_are_identity() {
        let gray = ColorCurve::from_ops(&[ColorOp::Saturate(0.0)]).apply([200, 40, 90]);
        assert!(gray[0].abs_diff(gray[1]) <= 1 && gray[1].abs_diff(gray[2]) <= 1);

        let unit = ColorCurve::from_ops(&[
            ColorOp::Contrast(1.0),
            ColorOp::Saturate(1.0),
            ColorOp::Brightness(1.0),
            ColorOp::Sepia(0.0),
            ColorOp::HueRotate(0.0),
        ]);
        for px in [[0, 0, 0], [255, 255, 255], [10, 200, 99]] {
            let out = unit.apply(px);
            for c in 0..3 {
                assert!(out[c].abs_diff(px[c]) <= 1, "{px:?} -> {out:?}");
            }
        }
    }

    #[test]
    fn sepia_warms_neutral_gray() {
        let [r, g, b] = ColorCurve::from_ops(&[ColorOp::Sepia(1.0)]).apply([128, 128, 128]);
        assert!(r > g && g > b);
    }
}
