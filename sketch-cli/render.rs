use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use sketch_core::{EdgeMap, SketchResult, ensure_same_dims};

use crate::{ScoringError, ScoringResult};

/// Edge present in both maps
pub const MATCH_COLOR: Rgba<u8> = Rgba([0, 200, 0, 255]);
/// Edge only in the reference
pub const MISS_COLOR: Rgba<u8> = Rgba([220, 0, 0, 255]);
/// Edge only in the submission
pub const EXTRA_COLOR: Rgba<u8> = Rgba([0, 110, 255, 255]);
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
const GUTTER_COLOR: Rgba<u8> = Rgba([210, 210, 210, 255]);
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// The rendered diagnostic images of one comparison
#[derive(Debug, Clone)]
pub struct DiagnosticArtifacts {
    pub heatmap: RgbaImage,
    pub side_by_side: RgbaImage,
    pub overlay: RgbaImage,
    pub reference: RgbaImage,
    pub submission: RgbaImage,
}

/// Base64 PNG copies of every artifact
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedArtifacts {
    pub heatmap: String,
    pub side_by_side: String,
    pub overlay: String,
    pub reference: String,
    pub submission: String,
}

impl DiagnosticArtifacts {
    pub fn render(
        reference: &RgbaImage,
        submission: &RgbaImage,
        reference_edges: &EdgeMap,
        submission_edges: &EdgeMap,
        gutter: u32,
        overlay_alpha: f32,
    ) -> SketchResult<Self> {
        Ok(Self {
            heatmap: heatmap(reference_edges, submission_edges)?,
            side_by_side: side_by_side(reference, submission, gutter),
            overlay: overlay(reference, submission, overlay_alpha),
            reference: reference.clone(),
            submission: submission.clone(),
        })
    }

    /// Encode all five images in memory; nothing touches the filesystem
    pub fn encode(&self) -> ScoringResult<EncodedArtifacts> {
        Ok(EncodedArtifacts {
            heatmap: encode_png_base64(&self.heatmap)?,
            side_by_side: encode_png_base64(&self.side_by_side)?,
            overlay: encode_png_base64(&self.overlay)?,
            reference: encode_png_base64(&self.reference)?,
            submission: encode_png_base64(&self.submission)?,
        })
    }

    /// Write every artifact as a PNG under `dir`
    pub fn save_to(&self, dir: &Path) -> ScoringResult<()> {
        std::fs::create_dir_all(dir)?;
        let files = [
            ("heatmap.png", &self.heatmap),
            ("side_by_side.png", &self.side_by_side),
            ("overlay.png", &self.overlay),
            ("reference.png", &self.reference),
            ("submission.png", &self.submission),
        ];
        for (name, img) in files {
            img.save(dir.join(name)).map_err(ScoringError::Encode)?;
        }
        Ok(())
    }
}

/// Per-pixel match / miss / extra classification of two edge maps
pub fn heatmap(reference: &EdgeMap, submission: &EdgeMap) -> SketchResult<RgbaImage> {
    ensure_same_dims(reference, submission)?;
    let img = RgbaImage::from_fn(reference.width() as u32, reference.height() as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        match (reference.get(x, y), submission.get(x, y)) {
            (true, true) => MATCH_COLOR,
            (true, false) => MISS_COLOR,
            (false, true) => EXTRA_COLOR,
            (false, false) => TRANSPARENT,
        }
    });
    Ok(img)
}

/// Reference on the left, submission on the right, separated by a gutter
pub fn side_by_side(left: &RgbaImage, right: &RgbaImage, gutter: u32) -> RgbaImage {
    let width = left.width() + gutter + right.width();
    let height = left.height().max(right.height());
    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);
    if gutter > 0 && height > 0 {
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(left.width() as i32, 0).of_size(gutter, height),
            GUTTER_COLOR,
        );
    }
    image::imageops::replace(&mut canvas, left, 0, 0);
    image::imageops::replace(&mut canvas, right, (left.width() + gutter) as i64, 0);
    canvas
}

/// `top` blended over `base` at a fixed opacity; output is fully opaque
pub fn overlay(base: &RgbaImage, top: &RgbaImage, alpha: f32) -> RgbaImage {
    let alpha = alpha.clamp(0.0, 1.0);
    RgbaImage::from_fn(base.width(), base.height(), |x, y| {
        let b = base.get_pixel(x, y);
        let Some(t) = top.get_pixel_checked(x, y) else {
            return *b;
        };
        let mix = |i: usize| (b[i] as f32 * (1.0 - alpha) + t[i] as f32 * alpha).round() as u8;
        Rgba([mix(0), mix(1), mix(2), 255])
    })
}

/// PNG-encode in memory and return the standard base64 text
pub fn encode_png_base64(img: &RgbaImage) -> ScoringResult<String> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
        .map_err(ScoringError::Encode)?;
    Ok(STANDARD.encode(bytes))
}
