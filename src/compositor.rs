use crate::foundation::core::Canvas;
use crate::foundation::error::StoryResult;
use crate::model::{
    EmptyState, FrameRgba, RenderMode, RenderOutput, RenderParams, SourceImage,
};
use crate::overlay::{grain, leak::LeakPlan, prism::PrismPlan, wash};
use crate::render::blend::{Layer, fill_layer};
use crate::render::curve::ColorCurve;
use crate::render::draw::{draw_image, photo_placement, story_placement};
use crate::render::noise::{NOISE_TILE_SIZE, NoiseCache};
use crate::render::pixel::apply_pixel_transform;

/// Fixed seed for the grain tile so renders match across processes.
const NOISE_SEED: u64 = 0x5EED_F11A;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositorOpts {
    /// Story-mode output size.
    pub story_canvas: Canvas,
    pub noise_tile_size: u32,
    pub noise_seed: u64,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            story_canvas: Canvas::STORY,
            noise_tile_size: NOISE_TILE_SIZE,
            noise_seed: NOISE_SEED,
        }
    }
}

impl CompositorOpts {
    /// Return options with a different story canvas (previews, tests).
    pub fn with_story_canvas(mut self, canvas: Canvas) -> Self {
        self.story_canvas = canvas;
        self
    }
}

/// Renders frames. Holds nothing between calls except the lazily built grain
/// tile, so one instance can serve any number of renders, from any thread.
#[derive(Debug)]
pub struct Compositor {
    opts: CompositorOpts,
    noise: NoiseCache,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self::with_opts(CompositorOpts::default())
    }

    pub fn with_opts(opts: CompositorOpts) -> Self {
        Self {
            noise: NoiseCache::new(opts.noise_tile_size, opts.noise_seed),
            opts,
        }
    }

    pub fn opts(&self) -> CompositorOpts {
        self.opts
    }

    /// Compose one frame.
    ///
    /// Story mode without an image yields the background alone; photo mode
    /// without an image yields [`RenderOutput::Empty`]. The only error is a
    /// malformed source image.
    #[tracing::instrument(
        skip(self, source, params),
        fields(mode = ?params.mode, filter = %params.filter)
    )]
    pub fn render(
        &self,
        source: Option<&SourceImage>,
        params: &RenderParams,
    ) -> StoryResult<RenderOutput> {
        if let Some(src) = source {
            src.validate()?;
        }

        let (mut frame, placement) = match (params.mode, source) {
            (RenderMode::Story, src) => {
                let canvas = self.opts.story_canvas;
                let frame = FrameRgba::filled(canvas, params.background.to_rgba8());
                let placement = src.map(|s| {
                    story_placement(params.layout, canvas, s.canvas(), params.clamped_scale())
                });
                (frame, placement)
            }
            (RenderMode::Photo, Some(src)) => {
                let frame = FrameRgba::filled(src.canvas(), [0, 0, 0, 0]);
                (frame, Some(photo_placement(src.canvas())))
            }
            (RenderMode::Photo, None) => {
                tracing::debug!("photo mode without an image");
                return Ok(RenderOutput::Empty(EmptyState::default()));
            }
        };

        let (Some(src), Some(rect)) = (source, placement) else {
            tracing::debug!("story mode without an image, background only");
            return Ok(RenderOutput::Frame(frame));
        };

        let curve = ColorCurve::for_filter(params.filter);
        draw_image(&mut frame, src, rect, &curve);
        tracing::debug!(?rect, graded = !curve.is_identity(), "image drawn");

        if apply_pixel_transform(&mut frame, params.filter) {
            tracing::debug!("per-pixel transform applied");
        }

        for layer in self.overlay_layers(params, frame.canvas()) {
            fill_layer(&mut frame, &layer);
        }

        Ok(RenderOutput::Frame(frame))
    }

    /// Overlay stack in application order.
    fn overlay_layers(&self, params: &RenderParams, canvas: Canvas) -> Vec<Layer> {
        let mono = params.filter.is_monochrome();
        let mut layers = wash::wash_layers(params.filter, canvas);

        if params.grain {
            layers.push(grain::grain_layer(self.noise.get(), params.filter));
        }
        if params.leak {
            let plan = LeakPlan::new(params.leak_seed, canvas, mono);
            tracing::debug!(leaks = plan.leaks.len(), "light leak planned");
            layers.extend(plan.layers());
        }
        if params.prism {
            let plan = PrismPlan::new(params.prism_seed, canvas, mono);
            tracing::debug!(
                flares = plan.flares.len(),
                bokeh = plan.bokeh.len(),
                "prism planned"
            );
            layers.extend(plan.layers());
        }
        layers
    }
}

/// One-shot render with default options.
pub fn render(source: Option<&SourceImage>, params: &RenderParams) -> StoryResult<RenderOutput> {
    Compositor::new().render(source, params)
}
