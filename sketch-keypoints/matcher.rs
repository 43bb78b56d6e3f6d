use sketch_core::Keypoint;

/// Score used when the reference has no keypoints at all.
///
/// Nothing principled picks this value; it is a neutral midpoint kept for
/// compatibility and is safe to tune.
pub const EMPTY_REFERENCE_KEYPOINT_SCORE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeypointMatch {
    /// Reference keypoints with a submission keypoint within tolerance
    pub matched: usize,
    pub reference_count: usize,
    pub submission_count: usize,
    pub score: f64,
}

/// Fraction of reference keypoints whose nearest submission keypoint lies
/// within `tolerance` pixels (Euclidean).
pub fn match_keypoints(reference: &[Keypoint], submission: &[Keypoint], tolerance: f64) -> KeypointMatch {
    let tolerance_sq = tolerance * tolerance;
    let matched = reference
        .iter()
        .filter(|r| {
            submission
                .iter()
                .map(|s| r.distance_sq(s))
                .min_by(f64::total_cmp)
                .is_some_and(|d| d <= tolerance_sq)
        })
        .count();

    let score = if reference.is_empty() {
        EMPTY_REFERENCE_KEYPOINT_SCORE
    } else {
        matched as f64 / reference.len() as f64
    };

    log::debug!(
        "keypoint match: {matched}/{} reference keypoints within {tolerance:.1}px ({} submission)",
        reference.len(),
        submission.len()
    );

    KeypointMatch {
        matched,
        reference_count: reference.len(),
        submission_count: submission.len(),
        score,
    }
}
