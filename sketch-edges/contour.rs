//! Tolerance-window contour matching.
//!
//! Hand-drawn strokes never land on the exact reference pixels, so a pixel
//! counts as matched when the other map has an edge anywhere inside the
//! `(2r + 1) x (2r + 1)` window around it. Precision punishes extraneous
//! strokes and recall punishes missing ones; their harmonic mean is the
//! contour score. Intersection-over-union is deliberately not used since it
//! rewards covering the canvas with ink.

use sketch_core::{EdgeMap, SketchResult, ensure_same_dims};

pub const DEFAULT_CONTOUR_TOLERANCE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourMatch {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub matched_submission: usize,
    pub submission_edges: usize,
    pub matched_reference: usize,
    pub reference_edges: usize,
}

/// Precision, recall and F1 of `submission` edges against `reference` edges
pub fn match_contours(
    reference: &EdgeMap,
    submission: &EdgeMap,
    tolerance: usize,
) -> SketchResult<ContourMatch> {
    ensure_same_dims(reference, submission)?;

    let near_reference = dilate(reference, tolerance);
    let near_submission = dilate(submission, tolerance);

    let mut matched_submission = 0;
    let mut submission_edges = 0;
    let mut matched_reference = 0;
    let mut reference_edges = 0;
    for i in 0..reference.data().len() {
        if submission.data()[i] {
            submission_edges += 1;
            if near_reference[i] {
                matched_submission += 1;
            }
        }
        if reference.data()[i] {
            reference_edges += 1;
            if near_submission[i] {
                matched_reference += 1;
            }
        }
    }

    let precision = if submission_edges == 0 {
        0.0
    } else {
        matched_submission as f64 / submission_edges as f64
    };
    // Nothing to miss
    let recall = if reference_edges == 0 {
        1.0
    } else {
        matched_reference as f64 / reference_edges as f64
    };
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    log::debug!(
        "contour match: precision={precision:.4} ({matched_submission}/{submission_edges}), recall={recall:.4} ({matched_reference}/{reference_edges}), f1={f1:.4}"
    );

    Ok(ContourMatch {
        precision,
        recall,
        f1,
        matched_submission,
        submission_edges,
        matched_reference,
        reference_edges,
    })
}

/// Square-window dilation of an edge map, done as two separable box passes
/// over a dense grid so the cost stays `O(w * h)` per pass.
fn dilate(map: &EdgeMap, radius: usize) -> Vec<bool> {
    let (w, h) = (map.width(), map.height());
    let src = map.data();
    if radius == 0 {
        return src.to_vec();
    }

    let mut horizontal = vec![false; w * h];
    for y in 0..h {
        box_max(&src[y * w..(y + 1) * w], radius, &mut horizontal[y * w..(y + 1) * w]);
    }

    let mut out = vec![false; w * h];
    let mut column = vec![false; h];
    let mut dilated = vec![false; h];
    for x in 0..w {
        for y in 0..h {
            column[y] = horizontal[y * w + x];
        }
        box_max(&column, radius, &mut dilated);
        for y in 0..h {
            out[y * w + x] = dilated[y];
        }
    }
    out
}

/// `dst[i] = any(src[i - r ..= i + r])`, using a running count of set flags
fn box_max(src: &[bool], radius: usize, dst: &mut [bool]) {
    let n = src.len();
    let mut window = src[..radius.min(n)].iter().filter(|&&e| e).count();
    for i in 0..n {
        if i + radius < n {
            window += src[i + radius] as usize;
        }
        if i > radius {
            window -= src[i - radius - 1] as usize;
        }
        dst[i] = window > 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EdgeExtractor;
    use crate::test_support::lines_image;
    use proptest::prelude::*;
    use sketch_core::SketchError;

    fn edges_of_lines(size: usize, rows: &[usize]) -> EdgeMap {
        EdgeExtractor::default().extract(&lines_image(size, rows))
    }

    fn map_with(size: usize, points: &[(usize, usize)]) -> EdgeMap {
        let mut data = vec![false; size * size];
        for &(x, y) in points {
            data[y * size + x] = true;
        }
        EdgeMap::new(size, size, data).unwrap()
    }

    #[test]
    fn identical_line_matches_perfectly() {
        let reference = edges_of_lines(512, &[256]);
        let result = match_contours(&reference, &reference, 3).unwrap();
        assert_eq!(result.precision, 1.0);
        assert_eq!(result.recall, 1.0);
        assert_eq!(result.f1, 1.0);
    }

    #[test]
    fn line_shifted_beyond_tolerance_scores_zero() {
        let reference = edges_of_lines(512, &[256]);
        let submission = edges_of_lines(512, &[266]);
        let result = match_contours(&reference, &submission, 3).unwrap();
        assert_eq!(result.matched_submission, 0);
        assert_eq!(result.f1, 0.0);
    }

    #[test]
    fn small_shift_is_tolerated() {
        let reference = edges_of_lines(512, &[256]);
        let submission = edges_of_lines(512, &[258]);
        let result = match_contours(&reference, &submission, 3).unwrap();
        assert_eq!(result.f1, 1.0);
    }

    #[test]
    fn extra_strokes_lower_precision_only() {
        let reference = edges_of_lines(128, &[40]);
        let submission = edges_of_lines(128, &[40, 90]);
        let result = match_contours(&reference, &submission, 3).unwrap();
        assert_eq!(result.recall, 1.0);
        assert!((result.precision - 0.5).abs() < 1e-9);
        assert!(result.f1 < 1.0);
    }

    #[test]
    fn missing_strokes_lower_recall_only() {
        let reference = edges_of_lines(128, &[40, 90]);
        let submission = edges_of_lines(128, &[40]);
        let result = match_contours(&reference, &submission, 3).unwrap();
        assert_eq!(result.precision, 1.0);
        assert!((result.recall - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_reference_has_full_recall() {
        let reference = EdgeMap::empty(64, 64);
        let submission = map_with(64, &[(10, 10)]);
        let result = match_contours(&reference, &submission, 3).unwrap();
        assert_eq!(result.recall, 1.0);
        assert_eq!(result.precision, 0.0);
        assert_eq!(result.f1, 0.0);
    }

    #[test]
    fn empty_submission_has_zero_precision() {
        let reference = map_with(64, &[(10, 10)]);
        let result = match_contours(&reference, &EdgeMap::empty(64, 64), 3).unwrap();
        assert_eq!(result.precision, 0.0);
        assert_eq!(result.recall, 0.0);
        assert_eq!(result.f1, 0.0);
        assert!(!result.f1.is_nan());
    }

    #[test]
    fn window_is_square() {
        let reference = map_with(32, &[(10, 10)]);
        let corner = map_with(32, &[(13, 13)]);
        assert_eq!(match_contours(&reference, &corner, 3).unwrap().f1, 1.0);
        let outside = map_with(32, &[(14, 10)]);
        assert_eq!(match_contours(&reference, &outside, 3).unwrap().f1, 0.0);
    }

    #[test]
    fn window_clips_at_image_border() {
        let reference = map_with(16, &[(0, 0)]);
        let submission = map_with(16, &[(2, 1), (15, 15)]);
        let result = match_contours(&reference, &submission, 3).unwrap();
        assert_eq!(result.matched_submission, 1);
        assert_eq!(result.matched_reference, 1);
    }

    #[test]
    fn mismatched_maps_are_rejected() {
        let result = match_contours(&EdgeMap::empty(8, 8), &EdgeMap::empty(8, 4), 3);
        assert!(matches!(result, Err(SketchError::DimensionMismatch { .. })));
    }

    #[test]
    fn dilation_matches_brute_force() {
        let map = map_with(20, &[(0, 0), (5, 7), (19, 19), (10, 2)]);
        let fast = dilate(&map, 2);
        for y in 0..20usize {
            for x in 0..20usize {
                let expected = (y.saturating_sub(2)..=(y + 2).min(19)).any(|yy| {
                    (x.saturating_sub(2)..=(x + 2).min(19)).any(|xx| map.get(xx, yy))
                });
                assert_eq!(fast[y * 20 + x], expected, "mismatch at ({x}, {y})");
            }
        }
    }

    proptest! {
        #[test]
        fn metrics_stay_in_unit_range(
            a in proptest::collection::vec(any::<bool>(), 24 * 24),
            b in proptest::collection::vec(any::<bool>(), 24 * 24),
            tol in 0usize..5,
        ) {
            let reference = EdgeMap::new(24, 24, a).unwrap();
            let submission = EdgeMap::new(24, 24, b).unwrap();
            let result = match_contours(&reference, &submission, tol).unwrap();
            prop_assert!((0.0..=1.0).contains(&result.precision));
            prop_assert!((0.0..=1.0).contains(&result.recall));
            prop_assert!((0.0..=1.0).contains(&result.f1));
        }

        #[test]
        fn self_match_is_perfect(a in proptest::collection::vec(any::<bool>(), 16 * 16)) {
            prop_assume!(a.iter().any(|&e| e));
            let map = EdgeMap::new(16, 16, a).unwrap();
            let result = match_contours(&map, &map, 0).unwrap();
            prop_assert_eq!(result.f1, 1.0);
        }
    }
}
