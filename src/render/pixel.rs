use crate::foundation::math::{clamp_u8, luma};
use crate::model::{FilmFilter, FrameRgba};

/// Four gray levels of the dither look, ascending.
pub const DITHER_PALETTE: [u8; 4] = [0, 85, 170, 255];

/// 4x4 ordered-dither thresholds (0..15).
pub const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

const DITHER_STRENGTH: f64 = 64.0;

/// Run the per-pixel stage for `filter`, if it has one. Returns whether
/// anything ran.
pub fn apply_pixel_transform(frame: &mut FrameRgba, filter: FilmFilter) -> bool {
    match filter {
        FilmFilter::Ilford => ilford_in_place(&mut frame.data),
        FilmFilter::BWHigh => bw_high_in_place(&mut frame.data),
        FilmFilter::Dither => dither_in_place(&mut frame.data, frame.width),
        _ => return false,
    }
    true
}

pub fn ilford_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let v = ilford_level(luma(px[0], px[1], px[2]));
        px[..3].fill(v);
    }
}

fn ilford_level(l: f64) -> u8 {
    let curved = (l / 255.0).powf(0.9) * 255.0;
    clamp_u8(curved * 1.15)
}

pub fn bw_high_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let v = bw_high_level(luma(px[0], px[1], px[2]));
        px[..3].fill(v);
    }
}

fn bw_high_level(l: f64) -> u8 {
    clamp_u8(((l - 128.0) * 1.5 + 128.0) * 1.05)
}

pub fn dither_in_place(rgba: &mut [u8], width: u32) {
    let width = width.max(1) as usize;
    for (i, px) in rgba.chunks_exact_mut(4).enumerate() {
        let (x, y) = (i % width, i / width);
        let threshold = f64::from(BAYER_4X4[y % 4][x % 4]) / 16.0 - 0.5;
        let dithered = luma(px[0], px[1], px[2]) + threshold * DITHER_STRENGTH;
        px[..3].fill(nearest_palette_level(dithered));
    }
}

/// Closest palette entry by absolute distance; ties keep the earlier entry.
pub fn nearest_palette_level(v: f64) -> u8 {
    let mut best = DITHER_PALETTE[0];
    let mut best_dist = (v - f64::from(best)).abs();
    for &level in &DITHER_PALETTE[1..] {
        let dist = (v - f64::from(level)).abs();
        if dist < best_dist {
            best = level;
            best_dist = dist;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_rgba(n: usize) -> Vec<u8> {
        (0..n)
            .flat_map(|i| {
                let v = (i * 255 / n.max(1)) as u8;
                [v, v.wrapping_mul(3), 255 - v, 200]
            })
            .collect()
    }

    #[test]
    fn ilford_is_achromatic_and_keeps_alpha() {
        let mut px = gradient_rgba(64);
        ilford_in_place(&mut px);
        for c in px.chunks_exact(4) {
            assert_eq!(c[0], c[1]);
            assert_eq!(c[1], c[2]);
            assert_eq!(c[3], 200);
        }
    }

    #[test]
    fn ilford_brightens_relative_to_plain_luma() {
        // (L/255)^0.9 * 255 * 1.15 lifts every mid-tone above L.
        for l in [32u8, 96, 128, 180] {
            let mut px = [l, l, l, 255];
            ilford_in_place(&mut px);
            assert!(px[0] > l, "{l} -> {}", px[0]);
        }
        let mut white = [250, 250, 250, 255];
        ilford_in_place(&mut white);
        assert_eq!(white[0], 255);
    }

    #[test]
    fn bw_high_spreads_tones() {
        let mut dark = [60, 60, 60, 255];
        let mut light = [200, 200, 200, 255];
        bw_high_in_place(&mut dark);
        bw_high_in_place(&mut light);
        assert!(dark[0] < 60);
        assert!(light[0] > 200);
        assert_eq!(bw_high_level(0.0), 0);
        assert_eq!(bw_high_level(255.0), 255);
    }

    #[test]
    fn dither_output_stays_in_palette() {
        let mut px = gradient_rgba(97);
        dither_in_place(&mut px, 7);
        for c in px.chunks_exact(4) {
            assert!(DITHER_PALETTE.contains(&c[0]));
            assert_eq!(c[0], c[1]);
            assert_eq!(c[1], c[2]);
        }
    }

    #[test]
    fn nearest_palette_ties_prefer_lower_level() {
        assert_eq!(nearest_palette_level(42.5), 0);
        assert_eq!(nearest_palette_level(127.5), 85);
        assert_eq!(nearest_palette_level(-20.0), 0);
        assert_eq!(nearest_palette_level(400.0), 255);
    }

    #[test]
    fn exact_midpoints_resolve_in_double_precision() {
        // Luma sits on the 85/170 boundary; threshold cell (1, 0) is zero.
        let mut px = [0, 0, 0, 255, 15, 195, 75, 255];
        dither_in_place(&mut px, 2);
        assert_eq!(px[4..7], [85, 85, 85]);

        // ((116 - 128) * 1.5 + 128) * 1.05 = 115.5 rounds to even.
        let mut px = [37, 171, 40, 255];
        bw_high_in_place(&mut px);
        assert_eq!(px, [116, 116, 116, 255]);
        assert_eq!(bw_high_level(116.0), 116);
    }

    #[test]
    fn dither_uses_bayer_position() {
        // Mid-gray 128 lands on different levels depending on the threshold cell.
        let mut px = [128u8, 128, 128, 255].repeat(16);
        dither_in_place(&mut px, 4);
        let levels: Vec<u8> = px.chunks_exact(4).map(|c| c[0]).collect();
        assert!(levels.contains(&85));
        assert!(levels.contains(&170));
    }
}
