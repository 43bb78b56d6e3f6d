use sketch_core::ScoringConfig;

use crate::error::{HarrisError, HarrisResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Harris detector settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HarrisConfig {
    /// Sensitivity `k` in `det(M) - k * trace(M)^2`
    pub k: f32,
    /// Second-moment window is `(2r + 1) x (2r + 1)`
    pub window_radius: usize,
    /// Only every `stride`-th pixel in each direction is a candidate
    pub stride: usize,
    /// Responses at or below this are discarded
    pub threshold: f32,
    pub max_keypoints: usize,
}

impl Default for HarrisConfig {
    fn default() -> Self {
        Self {
            k: 0.04,
            window_radius: 2,
            stride: 3,
            threshold: 1.0e8,
            max_keypoints: 200,
        }
    }
}

impl From<&ScoringConfig> for HarrisConfig {
    fn from(cfg: &ScoringConfig) -> Self {
        Self {
            k: cfg.harris_k,
            window_radius: cfg.harris_window_radius,
            stride: cfg.keypoint_stride,
            threshold: cfg.keypoint_threshold,
            max_keypoints: cfg.max_keypoints,
        }
    }
}

impl HarrisConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> HarrisResult<()> {
        if !(self.k > 0.0 && self.k < 0.25) {
            return Err(HarrisError::InvalidSensitivity(self.k));
        }
        if self.window_radius == 0 {
            return Err(HarrisError::InvalidWindowRadius(self.window_radius));
        }
        if self.stride == 0 {
            return Err(HarrisError::InvalidStride(self.stride));
        }
        if self.max_keypoints == 0 {
            return Err(HarrisError::InvalidMaxKeypoints(self.max_keypoints));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(HarrisError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }

    /// Smallest image side that has at least one candidate pixel
    pub fn min_image_size(&self) -> usize {
        2 * (self.window_radius + 1) + 1
    }
}
