use std::io::Cursor;

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::foundation::error::{StoryError, StoryResult};
use crate::model::{FrameRgba, SourceImage};

pub const JPEG_QUALITY: u8 = 95;

/// Decode any format the `image` crate recognizes into a straight RGBA8 source.
pub fn decode_image(bytes: &[u8]) -> StoryResult<SourceImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    SourceImage::from_rgba8(width, height, rgba.into_raw())
}

/// Encode as baseline JPEG. Translucent pixels are flattened onto black.
pub fn encode_jpeg(frame: &FrameRgba, quality: u8) -> StoryResult<Vec<u8>> {
    let expected = frame.canvas().pixel_count() * 4;
    if frame.width == 0 || frame.height == 0 || frame.data.len() != expected {
        return Err(StoryError::encode(format!(
            "frame buffer has {} bytes for {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let rgb = flatten_onto_black(&frame.data);
    let mut buf = Cursor::new(Vec::new());
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder
        .encode(&rgb, frame.width, frame.height, image::ExtendedColorType::Rgb8)
        .map_err(|e| StoryError::encode(format!("jpeg: {e}")))?;
    Ok(buf.into_inner())
}

fn flatten_onto_black(rgba: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let a = u16::from(px[3]);
        for &c in &px[..3] {
            out.push(((u16::from(c) * a + 127) / 255) as u8);
        }
    }
    out
}

/// File name conventions of the two front-ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportNaming {
    /// `insta-story-<unix-millis>.jpg`
    #[default]
    InstaStory,
    /// `story-canvas-<YYYY-MM-DDTHH-MM-SS>.jpg`
    StoryCanvas,
}

pub fn export_file_name(naming: ExportNaming, at: DateTime<Utc>) -> String {
    match naming {
        ExportNaming::InstaStory => format!("insta-story-{}.jpg", at.timestamp_millis()),
        ExportNaming::StoryCanvas => {
            format!("story-canvas-{}.jpg", at.format("%Y-%m-%dT%H-%M-%S"))
        }
    }
}
