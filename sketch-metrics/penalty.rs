//! Anti-scribble penalties.
//!
//! Recall alone rewards covering the canvas with ink, so two multiplicative
//! factors pull such submissions down: a global one comparing how much ink
//! each image carries, and a spatial one counting regions where the
//! reference is blank but the submission is not.

use sketch_core::{GrayBuffer, ScoringConfig, SketchError, SketchResult, ensure_same_dims};

pub const DEFAULT_INK_THRESHOLD: f32 = 200.0;
pub const DEFAULT_SPATIAL_PATCH: usize = 32;

/// Submission may carry this much more ink than the reference for free
const INK_ALLOWANCE: f64 = 1.2;
/// Reference ink ratio floor used when computing the excess ratio
const MIN_REFERENCE_INK: f64 = 0.01;

/// Fraction of samples darker than `threshold`; 0 for an empty buffer
pub fn ink_ratio(img: &GrayBuffer, threshold: f32) -> f64 {
    let data = img.data();
    if data.is_empty() {
        return 0.0;
    }
    data.iter().filter(|&&v| v < threshold).count() as f64 / data.len() as f64
}

/// Global ink-density factor in [0.05, 1.0]
pub fn ink_density_penalty(reference_ratio: f64, submission_ratio: f64) -> f64 {
    if submission_ratio <= reference_ratio * INK_ALLOWANCE {
        return 1.0;
    }

    // Absolute coverage breakpoints
    if submission_ratio > 0.6 {
        return 0.05;
    }
    if submission_ratio > 0.4 {
        return 0.15;
    }
    if submission_ratio > 0.3 {
        return 0.3;
    }

    let excess = submission_ratio / reference_ratio.max(MIN_REFERENCE_INK);
    if excess > 5.0 {
        0.15
    } else if excess > 3.0 {
        0.35
    } else if excess > 2.0 {
        0.55
    } else {
        // A near-blank reference can push `excess` below the allowance; never reward that
        (1.0 - (excess - INK_ALLOWANCE) * 0.4).clamp(0.4, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InkDensity {
    pub reference_ratio: f64,
    pub submission_ratio: f64,
    pub factor: f64,
}

/// Ink ratios of both buffers and the resulting density factor
pub fn ink_density(reference: &GrayBuffer, submission: &GrayBuffer, threshold: f32) -> SketchResult<InkDensity> {
    ensure_same_dims(reference, submission)?;
    let reference_ratio = ink_ratio(reference, threshold);
    let submission_ratio = ink_ratio(submission, threshold);
    let factor = ink_density_penalty(reference_ratio, submission_ratio);
    log::debug!("ink density: reference={reference_ratio:.4}, submission={submission_ratio:.4}, factor={factor:.2}");
    Ok(InkDensity {
        reference_ratio,
        submission_ratio,
        factor,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialPenaltyConfig {
    pub patch: usize,
    pub ink_threshold: f32,
    /// Reference patch below this ink ratio is empty
    pub empty_ratio: f64,
    /// Submission patch above this ink ratio is drawn on
    pub meaningful_ratio: f64,
}

impl Default for SpatialPenaltyConfig {
    fn default() -> Self {
        Self {
            patch: DEFAULT_SPATIAL_PATCH,
            ink_threshold: DEFAULT_INK_THRESHOLD,
            empty_ratio: 0.02,
            meaningful_ratio: 0.05,
        }
    }
}

impl From<&ScoringConfig> for SpatialPenaltyConfig {
    fn from(cfg: &ScoringConfig) -> Self {
        Self {
            patch: cfg.spatial_patch,
            ink_threshold: cfg.ink_threshold,
            empty_ratio: cfg.empty_patch_ratio,
            meaningful_ratio: cfg.meaningful_patch_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialPenalty {
    pub extra_patches: usize,
    pub total_patches: usize,
    pub factor: f64,
}

/// Factor in [0.7, 1.0] from the share of patches with ink only in the submission
pub fn spatial_extra_penalty(
    reference: &GrayBuffer,
    submission: &GrayBuffer,
    cfg: &SpatialPenaltyConfig,
) -> SketchResult<SpatialPenalty> {
    ensure_same_dims(reference, submission)?;
    if cfg.patch == 0 {
        return Err(SketchError::InvalidConfig("spatial patch size must be positive".into()));
    }

    let tiles_x = reference.width() / cfg.patch;
    let tiles_y = reference.height() / cfg.patch;
    let total_patches = tiles_x * tiles_y;
    let mut extra_patches = 0;
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let (x0, y0) = (tx * cfg.patch, ty * cfg.patch);
            let reference_ink = patch_ink_ratio(reference, x0, y0, cfg.patch, cfg.ink_threshold);
            if reference_ink >= cfg.empty_ratio {
                continue;
            }
            let submission_ink = patch_ink_ratio(submission, x0, y0, cfg.patch, cfg.ink_threshold);
            if submission_ink > cfg.meaningful_ratio {
                extra_patches += 1;
            }
        }
    }

    let factor = if total_patches == 0 {
        1.0
    } else {
        (1.0 - (extra_patches as f64 / total_patches as f64) * 1.5).max(0.7)
    };
    log::debug!("spatial penalty: {extra_patches}/{total_patches} extra patches, factor={factor:.3}");

    Ok(SpatialPenalty {
        extra_patches,
        total_patches,
        factor,
    })
}

fn patch_ink_ratio(img: &GrayBuffer, x0: usize, y0: usize, patch: usize, threshold: f32) -> f64 {
    let dark: usize = (y0..y0 + patch)
        .map(|y| img.row(y)[x0..x0 + patch].iter().filter(|&&v| v < threshold).count())
        .sum();
    dark as f64 / (patch * patch) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// White canvas with the rectangle `[x0, x1) x [y0, y1)` painted black
    fn with_block(size: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> GrayBuffer {
        let mut data = vec![255.0; size * size];
        for y in y0..y1 {
            for x in x0..x1 {
                data[y * size + x] = 0.0;
            }
        }
        GrayBuffer::new(size, size, data).unwrap()
    }

    #[test]
    fn ink_ratio_counts_dark_pixels() {
        let img = with_block(10, 0, 0, 5, 2);
        assert!((ink_ratio(&img, 200.0) - 0.1).abs() < 1e-12);
        assert_eq!(ink_ratio(&GrayBuffer::filled(4, 4, 200.0), 200.0), 0.0);
        assert_eq!(ink_ratio(&GrayBuffer::filled(0, 0, 0.0), 200.0), 0.0);
    }

    #[test]
    fn allowance_means_no_penalty() {
        assert_eq!(ink_density_penalty(0.05, 0.05), 1.0);
        assert_eq!(ink_density_penalty(0.05, 0.059), 1.0);
        assert_eq!(ink_density_penalty(0.2, 0.1), 1.0);
    }

    #[test]
    fn absolute_coverage_breakpoints() {
        assert_eq!(ink_density_penalty(0.05, 0.7), 0.05);
        assert_eq!(ink_density_penalty(0.05, 0.5), 0.15);
        assert_eq!(ink_density_penalty(0.05, 0.35), 0.3);
    }

    #[test]
    fn excess_ratio_breakpoints() {
        assert_eq!(ink_density_penalty(0.05, 0.29), 0.15);
        assert_eq!(ink_density_penalty(0.05, 0.2), 0.35);
        assert_eq!(ink_density_penalty(0.05, 0.125), 0.55);
        assert!((ink_density_penalty(0.1, 0.15) - 0.88).abs() < 1e-9);
    }

    #[test]
    fn reference_floor_applies() {
        // excess = 0.04 / 0.01 = 4
        assert_eq!(ink_density_penalty(0.0, 0.04), 0.35);
    }

    #[test]
    fn blank_reference_never_rewards() {
        assert_eq!(ink_density_penalty(0.0, 0.005), 1.0);
    }

    #[test]
    fn all_black_submission_is_crushed() {
        let reference = with_block(64, 10, 30, 54, 32);
        let black = GrayBuffer::filled(64, 64, 0.0);
        let density = ink_density(&reference, &black, 200.0).unwrap();
        assert_eq!(density.submission_ratio, 1.0);
        assert!(density.factor <= 0.15);
    }

    #[test]
    fn spatial_penalty_counts_extra_patches() {
        let reference = GrayBuffer::filled(64, 64, 255.0);
        // Fill the top-left 32x32 patch only
        let submission = with_block(64, 0, 0, 32, 32);
        let result = spatial_extra_penalty(&reference, &submission, &SpatialPenaltyConfig::default()).unwrap();
        assert_eq!(result.total_patches, 4);
        assert_eq!(result.extra_patches, 1);
        assert!((result.factor - 0.7).abs() < 1e-12);
    }

    #[test]
    fn spatial_penalty_ignores_inked_reference_patches() {
        let reference = with_block(64, 0, 0, 32, 4);
        let submission = with_block(64, 0, 0, 32, 32);
        let result = spatial_extra_penalty(&reference, &submission, &SpatialPenaltyConfig::default()).unwrap();
        assert_eq!(result.extra_patches, 0);
        assert_eq!(result.factor, 1.0);
    }

    #[test]
    fn spatial_penalty_partial_share() {
        let reference = GrayBuffer::filled(256, 256, 255.0);
        // 4 of 64 patches get ink: 1 - 4/64 * 1.5 = 0.90625
        let submission = with_block(256, 0, 0, 128, 32);
        let result = spatial_extra_penalty(&reference, &submission, &SpatialPenaltyConfig::default()).unwrap();
        assert_eq!(result.extra_patches, 4);
        assert!((result.factor - 0.90625).abs() < 1e-12);
    }

    #[test]
    fn spatial_penalty_without_patches() {
        let a = GrayBuffer::filled(16, 16, 255.0);
        let b = GrayBuffer::filled(16, 16, 0.0);
        let result = spatial_extra_penalty(&a, &b, &SpatialPenaltyConfig::default()).unwrap();
        assert_eq!(result.total_patches, 0);
        assert_eq!(result.factor, 1.0);
    }

    proptest! {
        #[test]
        fn ink_factor_is_bounded(reference in 0.0f64..=1.0, submission in 0.0f64..=1.0) {
            let factor = ink_density_penalty(reference, submission);
            prop_assert!((0.05..=1.0).contains(&factor));
        }

        #[test]
        fn no_penalty_without_extra_ink(reference in 0.0f64..=1.0, scale in 0.0f64..=1.2) {
            prop_assert_eq!(ink_density_penalty(reference, reference * scale), 1.0);
        }
    }
}
