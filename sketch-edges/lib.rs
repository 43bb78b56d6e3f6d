use rayon::prelude::*;
use sketch_core::{EdgeMap, GrayBuffer};

pub mod contour;

pub use contour::{ContourMatch, match_contours};

pub const DEFAULT_EDGE_THRESHOLD: f32 = 30.0;

/// Sobel gradient magnitude filter followed by a fixed binarization threshold
#[derive(Debug, Clone, Copy)]
pub struct EdgeExtractor {
    threshold: f32,
}

impl Default for EdgeExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_THRESHOLD)
    }
}

impl EdgeExtractor {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Binary edge map: strength strictly above the threshold
    pub fn extract(&self, img: &GrayBuffer) -> EdgeMap {
        let map = edge_strength(img).threshold_above(self.threshold);
        log::debug!(
            "extracted {} edge pixels from {}x{} buffer",
            map.count(),
            img.width(),
            img.height()
        );
        map
    }
}

/// Continuous edge strength in [0, 255], one value per pixel.
///
/// Pixels without a full 3x3 neighbourhood get zero.
pub fn edge_strength(img: &GrayBuffer) -> GrayBuffer {
    let (w, h) = (img.width(), img.height());
    let mut out = GrayBuffer::filled(w, h, 0.0);
    if w < 3 || h < 3 {
        return out;
    }

    out.data_mut()
        .par_chunks_mut(w)
        .enumerate()
        .skip(1)
        .take(h - 2)
        .for_each(|(y, row)| {
            let above = img.row(y - 1);
            let here = img.row(y);
            let below = img.row(y + 1);
            for x in 1..w - 1 {
                // Sobel X kernel: [-1, 0, 1; -2, 0, 2; -1, 0, 1]
                let gx = above[x + 1] + 2.0 * here[x + 1] + below[x + 1]
                    - above[x - 1]
                    - 2.0 * here[x - 1]
                    - below[x - 1];
                // Sobel Y kernel: [-1, -2, -1; 0, 0, 0; 1, 2, 1]
                let gy = below[x - 1] + 2.0 * below[x] + below[x + 1]
                    - above[x - 1]
                    - 2.0 * above[x]
                    - above[x + 1];
                row[x] = (gx * gx + gy * gy).sqrt().min(255.0);
            }
        });

    out
}
