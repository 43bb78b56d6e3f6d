use rayon::prelude::*;
use sketch_core::{GrayBuffer, SketchError, SketchResult, ensure_same_dims};

pub const DEFAULT_SIMILARITY_PATCH: usize = 16;

/// SSIM stabilizers for an 8-bit dynamic range: `(0.01 * 255)^2`, `(0.03 * 255)^2`
const C1: f64 = (0.01 * 255.0) * (0.01 * 255.0);
const C2: f64 = (0.03 * 255.0) * (0.03 * 255.0);

/// Mean structural similarity over non-overlapping `patch x patch` tiles.
///
/// Trailing partial tiles at the right and bottom are dropped. When no
/// complete tile fits, the result is 1.0 for identical buffers and 0.0
/// otherwise.
pub fn local_similarity(reference: &GrayBuffer, submission: &GrayBuffer, patch: usize) -> SketchResult<f64> {
    ensure_same_dims(reference, submission)?;
    if patch == 0 {
        return Err(SketchError::InvalidConfig("similarity patch size must be positive".into()));
    }

    let tiles_x = reference.width() / patch;
    let tiles_y = reference.height() / patch;
    if tiles_x == 0 || tiles_y == 0 {
        return Ok(if reference == submission { 1.0 } else { 0.0 });
    }

    // Collected in tile order so the final sum does not depend on scheduling
    let scores: Vec<f64> = (0..tiles_x * tiles_y)
        .into_par_iter()
        .map(|t| patch_ssim(reference, submission, (t % tiles_x) * patch, (t / tiles_x) * patch, patch))
        .collect();

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    log::debug!("local similarity over {} patches: {mean:.4}", scores.len());
    Ok(mean)
}

/// SSIM of one tile with population statistics, clamped to be non-negative
fn patch_ssim(a: &GrayBuffer, b: &GrayBuffer, x0: usize, y0: usize, patch: usize) -> f64 {
    let n = (patch * patch) as f64;

    let mut sum_a = 0.0f64;
    let mut sum_b = 0.0f64;
    for y in y0..y0 + patch {
        let (ra, rb) = (&a.row(y)[x0..x0 + patch], &b.row(y)[x0..x0 + patch]);
        for (&va, &vb) in ra.iter().zip(rb) {
            sum_a += va as f64;
            sum_b += vb as f64;
        }
    }
    let mean_a = sum_a / n;
    let mean_b = sum_b / n;

    let mut var_a = 0.0f64;
    let mut var_b = 0.0f64;
    let mut cov = 0.0f64;
    for y in y0..y0 + patch {
        let (ra, rb) = (&a.row(y)[x0..x0 + patch], &b.row(y)[x0..x0 + patch]);
        for (&va, &vb) in ra.iter().zip(rb) {
            let da = va as f64 - mean_a;
            let db = vb as f64 - mean_b;
            var_a += da * da;
            var_b += db * db;
            cov += da * db;
        }
    }
    var_a /= n;
    var_b /= n;
    cov /= n;

    let numerator = (2.0 * mean_a * mean_b + C1) * (2.0 * cov + C2);
    let denominator = (mean_a * mean_a + mean_b * mean_b + C1) * (var_a + var_b + C2);
    (numerator / denominator).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(size: usize) -> GrayBuffer {
        let data = (0..size * size).map(|i| ((i % size) * 255 / size) as f32).collect();
        GrayBuffer::new(size, size, data).unwrap()
    }

    #[test]
    fn identical_buffers_score_one() {
        let img = gradient(64);
        let score = local_similarity(&img, &img, 16).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn inverted_content_scores_low() {
        let img = gradient(64);
        let inverted = GrayBuffer::new(64, 64, img.data().iter().map(|v| 255.0 - v).collect()).unwrap();
        let score = local_similarity(&img, &inverted, 16).unwrap();
        assert!(score < 0.2, "score {score}");
        assert!(score >= 0.0);
    }

    #[test]
    fn blank_against_blank_is_one() {
        let a = GrayBuffer::filled(32, 32, 255.0);
        assert!((local_similarity(&a, &a, 16).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn partial_tiles_are_dropped() {
        // Only the top-left 16x16 tile is complete; differences outside it are ignored
        let a = GrayBuffer::filled(20, 20, 255.0);
        let mut data = vec![255.0; 400];
        for y in 0..20 {
            data[y * 20 + 18] = 0.0;
        }
        let b = GrayBuffer::new(20, 20, data).unwrap();
        assert!((local_similarity(&a, &b, 16).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn too_small_for_any_tile() {
        let a = GrayBuffer::filled(8, 8, 10.0);
        let b = GrayBuffer::filled(8, 8, 200.0);
        assert_eq!(local_similarity(&a, &a, 16).unwrap(), 1.0);
        assert_eq!(local_similarity(&a, &b, 16).unwrap(), 0.0);
    }

    #[test]
    fn rejects_zero_patch_and_mismatch() {
        let a = GrayBuffer::filled(32, 32, 0.0);
        assert!(matches!(local_similarity(&a, &a, 0), Err(SketchError::InvalidConfig(_))));
        let b = GrayBuffer::filled(32, 16, 0.0);
        assert!(matches!(local_similarity(&a, &b, 16), Err(SketchError::DimensionMismatch { .. })));
    }
}
