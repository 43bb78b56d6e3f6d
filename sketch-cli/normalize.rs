use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use sketch_core::GrayBuffer;

use crate::{ScoringError, ScoringResult};

/// An image resampled to the canonical square plus its luminance buffer
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub rgba: RgbaImage,
    pub gray: GrayBuffer,
}

/// Decode raw raster bytes in any format `image` understands
pub fn decode(bytes: &[u8], what: &'static str) -> ScoringResult<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|source| ScoringError::Decode { what, source })
}

/// Flatten onto white, resample to `size x size` and compute luminance.
///
/// Resampling is bilinear and fully deterministic.
pub fn normalize(img: &RgbaImage, size: u32) -> ScoringResult<NormalizedImage> {
    let flat = flatten_on_white(img);
    let rgba = if flat.dimensions() == (size, size) {
        flat
    } else {
        imageops::resize(&flat, size, size, FilterType::Triangle)
    };
    let gray = to_gray(&rgba)?;
    Ok(NormalizedImage { rgba, gray })
}

/// Luminance `0.299 R + 0.587 G + 0.114 B`; alpha is ignored
pub fn to_gray(img: &RgbaImage) -> ScoringResult<GrayBuffer> {
    let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
    Ok(GrayBuffer::from_rgb(
        img.width() as usize,
        img.height() as usize,
        rgb.as_raw(),
    )?)
}

/// Composite over an opaque white page so transparent canvas reads as paper
fn flatten_on_white(img: &RgbaImage) -> RgbaImage {
    let mut out = img.clone();
    for Rgba([r, g, b, a]) in out.pixels_mut() {
        if *a == 255 {
            continue;
        }
        let alpha = *a as f32 / 255.0;
        for c in [&mut *r, &mut *g, &mut *b] {
            *c = (*c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        }
        *a = 255;
    }
    out
}
