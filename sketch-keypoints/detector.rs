use rayon::prelude::*;
use sketch_core::{GrayBuffer, Keypoint};

use crate::config::HarrisConfig;
use crate::error::HarrisResult;

/// Harris corner detector sampled on a coarse candidate grid
#[derive(Debug, Clone)]
pub struct HarrisDetector {
    cfg: HarrisConfig,
}

impl HarrisDetector {
    /// Creates a new Harris detector with validation
    pub fn new(cfg: HarrisConfig) -> HarrisResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Get detector configuration
    pub fn config(&self) -> &HarrisConfig {
        &self.cfg
    }

    /// Strongest corners, sorted by descending response and capped at
    /// `max_keypoints`. Ties are broken by position so the order is stable.
    pub fn detect(&self, img: &GrayBuffer) -> Vec<Keypoint> {
        let mut keypoints = self.detect_all(img);
        keypoints.sort_by(|a, b| {
            b.strength
                .total_cmp(&a.strength)
                .then(a.y.cmp(&b.y))
                .then(a.x.cmp(&b.x))
        });
        keypoints.truncate(self.cfg.max_keypoints);
        log::debug!(
            "harris: kept {} keypoints on {}x{} buffer",
            keypoints.len(),
            img.width(),
            img.height()
        );
        keypoints
    }

    /// Every candidate whose response clears the threshold, unsorted
    pub fn detect_all(&self, img: &GrayBuffer) -> Vec<Keypoint> {
        let (w, h) = (img.width(), img.height());
        if w < self.cfg.min_image_size() || h < self.cfg.min_image_size() {
            return Vec::new();
        }

        let (ix, iy) = gradients(img);
        // Window plus the one-pixel gradient border must fit
        let lo = self.cfg.window_radius + 1;
        let (hi_x, hi_y) = (w - lo - 1, h - lo - 1);
        let rows: Vec<usize> = (lo..=hi_y).step_by(self.cfg.stride).collect();

        rows.into_par_iter()
            .flat_map_iter(|y| {
                let mut v = Vec::new();
                for x in (lo..=hi_x).step_by(self.cfg.stride) {
                    let response = self.response(&ix, &iy, w, x, y);
                    if response > self.cfg.threshold {
                        v.push(Keypoint {
                            x: x as u32,
                            y: y as u32,
                            strength: response,
                        });
                    }
                }
                v
            })
            .collect()
    }

    /// Harris response at one pixel: `det(M) - k * trace(M)^2`
    pub fn response_at(&self, img: &GrayBuffer, x: usize, y: usize) -> f32 {
        let lo = self.cfg.window_radius + 1;
        let (w, h) = (img.width(), img.height());
        if x < lo || y < lo || x + lo >= w || y + lo >= h {
            return 0.0;
        }
        let (ix, iy) = gradients(img);
        self.response(&ix, &iy, w, x, y)
    }

    fn response(&self, ix: &[f32], iy: &[f32], w: usize, x: usize, y: usize) -> f32 {
        let r = self.cfg.window_radius;
        let mut sxx = 0.0f64;
        let mut syy = 0.0f64;
        let mut sxy = 0.0f64;
        for yy in y - r..=y + r {
            for xx in x - r..=x + r {
                let gx = ix[yy * w + xx] as f64;
                let gy = iy[yy * w + xx] as f64;
                sxx += gx * gx;
                syy += gy * gy;
                sxy += gx * gy;
            }
        }
        let det = sxx * syy - sxy * sxy;
        let trace = sxx + syy;
        (det - self.cfg.k as f64 * trace * trace) as f32
    }
}

/// Central-difference gradients, zero on the one-pixel border
fn gradients(img: &GrayBuffer) -> (Vec<f32>, Vec<f32>) {
    let (w, h) = (img.width(), img.height());
    let mut ix = vec![0.0f32; w * h];
    let mut iy = vec![0.0f32; w * h];
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            ix[y * w + x] = img.get(x + 1, y) - img.get(x - 1, y);
            iy[y * w + x] = img.get(x, y + 1) - img.get(x, y - 1);
        }
    }
    (ix, iy)
}
