use storyframe::overlay::leak::LeakPlan;
use storyframe::{
    Canvas, Compositor, CompositorOpts, FilmFilter, FrameRgba, LayoutStrategy, RenderMode,
    RenderOutput, RenderParams, Rgb8, SeededRandom, SourceImage, StoryError, luma,
};

fn small_compositor() -> Compositor {
    Compositor::with_opts(CompositorOpts::default().with_story_canvas(Canvas::new(90, 160).unwrap()))
}

/// Opaque image with distinct colors in every pixel.
fn colorful(w: u32, h: u32) -> SourceImage {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[
                (x * 7 % 256) as u8,
                (y * 5 % 256) as u8,
                ((x + y) * 3 % 256) as u8,
                255,
            ]);
        }
    }
    SourceImage::from_rgba8(w, h, data).unwrap()
}

fn frame(out: RenderOutput) -> FrameRgba {
    out.into_frame().expect("expected a frame")
}

fn all_achromatic(f: &FrameRgba) -> bool {
    f.data.chunks_exact(4).all(|p| p[0] == p[1] && p[1] == p[2])
}

#[test]
fn story_without_image_is_solid_background_at_full_size() {
    let params = RenderParams {
        background: Rgb8::WHITE,
        ..RenderParams::default()
    };
    let f = frame(Compositor::new().render(None, &params).unwrap());
    assert_eq!((f.width, f.height), (2790, 4960));
    assert_eq!(f.data.len(), 2790 * 4960 * 4);
    assert!(f.data.iter().all(|&v| v == 255));
}

#[test]
fn photo_mode_without_filter_reproduces_source() {
    let src = colorful(1080, 1080);
    let params = RenderParams {
        mode: RenderMode::Photo,
        ..RenderParams::default()
    };
    let f = frame(Compositor::new().render(Some(&src), &params).unwrap());
    assert_eq!((f.width, f.height), (1080, 1080));
    assert_eq!(f.data, src.rgba8());
}

#[test]
fn story_mode_without_filter_keeps_image_region_exact() {
    let c = small_compositor();
    let src = colorful(30, 40);
    let params = RenderParams {
        background: Rgb8::new(1, 2, 3),
        ..RenderParams::default()
    };
    let f = frame(c.render(Some(&src), &params).unwrap());

    // 30x40 centered on 90x160 at scale 1.
    let (ox, oy) = (30, 60);
    for y in 0..40 {
        for x in 0..30 {
            assert_eq!(f.pixel(ox + x, oy + y), src.pixel(x, y));
        }
    }
    assert_eq!(f.pixel(0, 0), [1, 2, 3, 255]);
    assert_eq!(f.pixel(89, 159), [1, 2, 3, 255]);
}

#[test]
fn ilford_is_achromatic_with_more_contrast_than_luma() {
    let c = small_compositor();
    let src = colorful(90, 160);
    let params = RenderParams {
        mode: RenderMode::Photo,
        filter: FilmFilter::Ilford,
        ..RenderParams::default()
    };
    let f = frame(c.render(Some(&src), &params).unwrap());
    assert!(all_achromatic(&f));

    let pair = SourceImage::from_rgba8(2, 1, vec![60, 60, 60, 255, 180, 180, 180, 255]).unwrap();
    let f = frame(c.render(Some(&pair), &params).unwrap());
    let spread = i32::from(f.pixel(1, 0)[0]) - i32::from(f.pixel(0, 0)[0]);
    let plain = (luma(180, 180, 180) - luma(60, 60, 60)).round() as i32;
    assert!(spread > plain, "ilford spread {spread} vs luma {plain}");
}

#[test]
fn bw_high_is_achromatic() {
    let c = small_compositor();
    let params = RenderParams {
        filter: FilmFilter::BWHigh,
        background: Rgb8::new(200, 30, 90),
        ..RenderParams::default()
    };
    let f = frame(c.render(Some(&colorful(40, 40)), &params).unwrap());
    assert!(all_achromatic(&f));
}

#[test]
fn dither_output_stays_in_palette() {
    let c = small_compositor();
    let params = RenderParams {
        filter: FilmFilter::Dither,
        background: Rgb8::new(123, 45, 210),
        ..RenderParams::default()
    };
    let f = frame(c.render(Some(&colorful(60, 60)), &params).unwrap());
    for px in f.data.chunks_exact(4) {
        for &v in &px[..3] {
            assert!([0, 85, 170, 255].contains(&v), "{v} not in palette");
        }
    }
}

#[test]
fn per_pixel_stage_runs_before_overlays() {
    let c = small_compositor();
    let src = colorful(60, 60);
    let dither = RenderParams {
        filter: FilmFilter::Dither,
        background: Rgb8::new(123, 45, 210),
        ..RenderParams::default()
    };
    let grainy = RenderParams {
        grain: true,
        ..dither.clone()
    };

    let in_palette = |v: u8| [0, 85, 170, 255].contains(&v);
    let plain = frame(c.render(Some(&src), &dither).unwrap());
    assert!(plain.data.iter().all(|&v| in_palette(v)));

    // Grain lands on top of the quantized frame, so mid levels drift off the palette.
    let f = frame(c.render(Some(&src), &grainy).unwrap());
    let off = f
        .data
        .chunks_exact(4)
        .filter(|p| !p[..3].iter().all(|&v| in_palette(v)))
        .count();
    assert!(off > 0);
}

#[test]
fn monochrome_overlays_stay_achromatic() {
    let c = small_compositor();
    for filter in [FilmFilter::Ilford, FilmFilter::BWHigh] {
        for seed in [0.1, 0.5, 0.87] {
            let params = RenderParams {
                filter,
                grain: true,
                leak: true,
                prism: true,
                leak_seed: seed,
                prism_seed: seed,
                background: Rgb8::new(10, 200, 40),
                ..RenderParams::default()
            };
            let f = frame(c.render(Some(&colorful(50, 70)), &params).unwrap());
            assert!(all_achromatic(&f), "{filter} seed {seed}");
        }
    }
}

#[test]
fn identical_inputs_render_identical_bytes() {
    let src = colorful(64, 48);
    let params = RenderParams {
        filter: FilmFilter::Expired,
        grain: true,
        leak: true,
        prism: true,
        leak_seed: 0.31,
        prism_seed: 0.77,
        scale: 1.3,
        ..RenderParams::default()
    };
    let a = frame(small_compositor().render(Some(&src), &params).unwrap());
    let b = frame(small_compositor().render(Some(&src), &params).unwrap());
    assert_eq!(a, b);

    // And with a shared compositor whose grain tile is already cached.
    let c = small_compositor();
    let first = frame(c.render(Some(&src), &params).unwrap());
    let second = frame(c.render(Some(&src), &params).unwrap());
    assert_eq!(first, second);
    assert_eq!(first, a);
}

#[test]
fn leak_count_comes_from_first_seeded_draw() {
    let canvas = Canvas::new(90, 160).unwrap();
    let plan = LeakPlan::new(0.5, canvas, false);
    let mut rng = SeededRandom::new(0.5);
    let expected = 2 + (rng.next_f64() * 2.0).floor() as usize;
    assert_eq!(plan.leaks.len(), expected);
    assert!((2..=3).contains(&plan.leaks.len()));
    assert_eq!(plan, LeakPlan::new(0.5, canvas, false));

    let c = small_compositor();
    let src = colorful(20, 20);
    let base = RenderParams::default();
    let leaky = RenderParams {
        leak: true,
        leak_seed: 0.5,
        ..RenderParams::default()
    };
    let plain = frame(c.render(Some(&src), &base).unwrap());
    let lit = frame(c.render(Some(&src), &leaky).unwrap());
    assert_ne!(plain, lit);
    assert_eq!(lit, frame(c.render(Some(&src), &leaky).unwrap()));
}

#[test]
fn oversized_scale_is_clamped_before_layout() {
    let c = Compositor::with_opts(
        CompositorOpts::default().with_story_canvas(Canvas::new(100, 100).unwrap()),
    );
    let src = SourceImage::solid(10, 10, [255, 0, 0, 255]).unwrap();
    let params = RenderParams {
        scale: 5.0,
        layout: LayoutStrategy::NaturalScale,
        ..RenderParams::default()
    };
    assert_eq!(params.clamped_scale(), 3.0);

    let f = frame(c.render(Some(&src), &params).unwrap());
    let red = f
        .data
        .chunks_exact(4)
        .filter(|p| *p == [255, 0, 0, 255])
        .count();
    assert_eq!(red, 30 * 30);
}

#[test]
fn photo_mode_without_image_is_empty_state() {
    let params = RenderParams {
        mode: RenderMode::Photo,
        ..RenderParams::default()
    };
    let out = Compositor::new().render(None, &params).unwrap();
    let RenderOutput::Empty(empty) = out else {
        panic!("expected empty state");
    };
    assert_eq!((empty.canvas.width, empty.canvas.height), (1080, 1080));
    assert_eq!(empty.fill.to_hex(), "#1a1a1a");
}

#[test]
fn malformed_source_is_rejected() {
    assert!(matches!(
        SourceImage::from_rgba8(4, 4, vec![0; 3]),
        Err(StoryError::MalformedInput(_))
    ));
    assert!(matches!(
        SourceImage::from_rgba8(0, 4, vec![]),
        Err(StoryError::MalformedInput(_))
    ));
}

#[test]
fn unknown_filter_in_json_is_identity() {
    let params: RenderParams =
        serde_json::from_str(r##"{"filter": "kodachrome", "background": "#000"}"##).unwrap();
    assert_eq!(params.filter, FilmFilter::None);
    assert_eq!(params.background, Rgb8::BLACK);
    assert_eq!(params.leak_seed, 0.5);
}

#[test]
fn rendered_frame_exports_as_jpeg() {
    let c = small_compositor();
    let params = RenderParams {
        filter: FilmFilter::Portra,
        grain: true,
        ..RenderParams::default()
    };
    let f = frame(c.render(Some(&colorful(40, 40)), &params).unwrap());
    let bytes = storyframe::encode_jpeg(&f, storyframe::JPEG_QUALITY).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

    let back = storyframe::decode_image(&bytes).unwrap();
    assert_eq!((back.width(), back.height()), (90, 160));
}
