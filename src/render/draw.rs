use kurbo::Rect;

use crate::foundation::core::{Canvas, Rgba};
use crate::model::{FrameRgba, LayoutStrategy, SourceImage, clamp_scale};
use crate::render::blend::composite_px;
use crate::render::curve::ColorCurve;

/// Destination rectangle for a story-mode image, centered on the canvas.
pub fn story_placement(
    strategy: LayoutStrategy,
    canvas: Canvas,
    src: Canvas,
    scale: f64,
) -> Rect {
    let scale = clamp_scale(scale);
    let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
    let (sw, sh) = (f64::from(src.width), f64::from(src.height));

    let (w, h) = match strategy {
        LayoutStrategy::NaturalScale => (sw * scale, sh * scale),
        LayoutStrategy::ContainFitScale => {
            let img_aspect = src.aspect();
            if img_aspect > canvas.aspect() {
                (cw * scale, cw / img_aspect * scale)
            } else {
                (ch * img_aspect * scale, ch * scale)
            }
        }
    };

    let x = (cw - w) / 2.0;
    let y = (ch - h) / 2.0;
    Rect::new(x, y, x + w, y + h)
}

/// Photo mode draws the image over the whole frame.
pub fn photo_placement(src: Canvas) -> Rect {
    Rect::new(0.0, 0.0, f64::from(src.width), f64::from(src.height))
}

/// Scale to start from when an image is loaded into story mode: images wider
/// than the canvas are fitted to its width.
pub fn initial_scale(src: Canvas, canvas: Canvas) -> f64 {
    if src.width > canvas.width {
        clamp_scale(f64::from(canvas.width) / f64::from(src.width))
    } else {
        1.0
    }
}

/// Draw `src` into `dst_rect`, grading each sample with `curve` and
/// compositing it source-over. Pixels whose centers fall inside the rectangle
/// are covered; samples are bilinear with clamp-to-edge addressing.
pub fn draw_image(frame: &mut FrameRgba, src: &SourceImage, dst_rect: Rect, curve: &ColorCurve) {
    if dst_rect.width() <= 0.0 || dst_rect.height() <= 0.0 {
        return;
    }
    let (fw, fh) = (frame.width, frame.height);
    let first = |lo: f64, max: u32| (lo - 0.5).ceil().clamp(0.0, f64::from(max)) as u32;
    let x0 = first(dst_rect.x0, fw);
    let x1 = first(dst_rect.x1, fw);
    let y0 = first(dst_rect.y0, fh);
    let y1 = first(dst_rect.y1, fh);

    let sx = f64::from(src.width()) / dst_rect.width();
    let sy = f64::from(src.height()) / dst_rect.height();
    let normal = |s: f32, _d: f32| s;

    for y in y0..y1 {
        let v = (f64::from(y) + 0.5 - dst_rect.y0) * sy - 0.5;
        let row = (y as usize) * (fw as usize);
        for x in x0..x1 {
            let u = (f64::from(x) + 0.5 - dst_rect.x0) * sx - 0.5;
            let px = sample_bilinear(src, u, v);
            let [r, g, b] = curve.apply([px[0], px[1], px[2]]);

            let idx = (row + x as usize) * 4;
            let dst = &mut frame.data[idx..idx + 4];
            match px[3] {
                0 => {}
                255 => dst.copy_from_slice(&[r, g, b, 255]),
                a => composite_px(dst, Rgba::rgba8(r, g, b, f32::from(a) / 255.0), 1.0, &normal),
            }
        }
    }
}

fn sample_bilinear(src: &SourceImage, u: f64, v: f64) -> [u8; 4] {
    let max_x = f64::from(src.width() - 1);
    let max_y = f64::from(src.height() - 1);
    let u = u.clamp(0.0, max_x);
    let v = v.clamp(0.0, max_y);

    let (x0, y0) = (u.floor(), v.floor());
    let (fx, fy) = ((u - x0) as f32, (v - y0) as f32);
    let (x0, y0) = (x0 as u32, y0 as u32);
    if fx == 0.0 && fy == 0.0 {
        return src.pixel(x0, y0);
    }
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);

    let taps = [
        (src.pixel(x0, y0), (1.0 - fx) * (1.0 - fy)),
        (src.pixel(x1, y0), fx * (1.0 - fy)),
        (src.pixel(x0, y1), (1.0 - fx) * fy),
        (src.pixel(x1, y1), fx * fy),
    ];

    // Interpolate premultiplied so transparent texels don't bleed their color.
    let mut acc = [0.0f32; 4];
    for (px, w) in taps {
        let a = f32::from(px[3]) / 255.0;
        for c in 0..3 {
            acc[c] += f32::from(px[c]) * a * w;
        }
        acc[3] += a * w;
    }
    if acc[3] <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        out[c] = (acc[c] / acc[3]).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (acc[3] * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}
