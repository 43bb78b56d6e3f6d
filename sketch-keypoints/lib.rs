pub mod config;
pub mod detector;
pub mod error;
pub mod matcher;

pub use config::HarrisConfig;
pub use detector::HarrisDetector;
pub use error::{HarrisError, HarrisResult};
pub use matcher::{EMPTY_REFERENCE_KEYPOINT_SCORE, KeypointMatch, match_keypoints};

use sketch_core::{GrayBuffer, SketchResult, ensure_same_dims};

/// Detect keypoints on both buffers and match reference against submission
pub fn compare_keypoints(
    detector: &HarrisDetector,
    reference: &GrayBuffer,
    submission: &GrayBuffer,
    tolerance: f64,
) -> SketchResult<KeypointMatch> {
    ensure_same_dims(reference, submission)?;
    let (ref_kps, sub_kps) = rayon::join(|| detector.detect(reference), || detector.detect(submission));
    Ok(match_keypoints(&ref_kps, &sub_kps, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxes(size: usize, offset: usize) -> GrayBuffer {
        let mut data = vec![255.0; size * size];
        for y in 20 + offset..60 + offset {
            for x in 20 + offset..60 + offset {
                data[y * size + x] = 0.0;
            }
        }
        GrayBuffer::new(size, size, data).unwrap()
    }

    #[test]
    fn self_comparison_is_perfect() {
        let detector = HarrisDetector::new(HarrisConfig::default()).unwrap();
        let img = boxes(128, 0);
        let result = compare_keypoints(&detector, &img, &img, 6.4).unwrap();
        assert!(result.reference_count > 0);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn far_shift_loses_matches() {
        let detector = HarrisDetector::new(HarrisConfig::default()).unwrap();
        let result = compare_keypoints(&detector, &boxes(128, 0), &boxes(128, 40), 6.4).unwrap();
        assert!(result.score < 1.0);
    }

    #[test]
    fn blank_reference_scores_neutral() {
        let detector = HarrisDetector::new(HarrisConfig::default()).unwrap();
        let blank = GrayBuffer::filled(128, 128, 255.0);
        let result = compare_keypoints(&detector, &blank, &boxes(128, 0), 6.4).unwrap();
        assert_eq!(result.reference_count, 0);
        assert_eq!(result.score, EMPTY_REFERENCE_KEYPOINT_SCORE);
    }

    #[test]
    fn mismatched_buffers_are_rejected() {
        let detector = HarrisDetector::new(HarrisConfig::default()).unwrap();
        let a = GrayBuffer::filled(32, 32, 0.0);
        let b = GrayBuffer::filled(16, 32, 0.0);
        assert!(compare_keypoints(&detector, &a, &b, 6.4).is_err());
    }
}
