use sketch_core::{Difficulty, ScoreBreakdown, Weights, to_percent};

/// Component scores on a unit scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentScores {
    pub contour: f64,
    pub keypoints: f64,
    pub local: f64,
}

/// Multiplicative penalty factors, 1.0 meaning no penalty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penalties {
    pub ink: f64,
    pub spatial: f64,
}

impl Default for Penalties {
    fn default() -> Self {
        Self { ink: 1.0, spatial: 1.0 }
    }
}

impl Penalties {
    pub fn factor(&self) -> f64 {
        self.ink * self.spatial
    }
}

/// Weighted sum before penalties
pub fn raw_composite(scores: &ComponentScores, weights: &Weights) -> f64 {
    weights.contour * scores.contour + weights.keypoints * scores.keypoints + weights.local * scores.local
}

/// Penalized composite on a unit scale, clamped to [0, 1]
pub fn final_composite(scores: &ComponentScores, difficulty: Difficulty, penalties: &Penalties) -> f64 {
    (raw_composite(scores, &difficulty.weights()) * penalties.factor()).clamp(0.0, 1.0)
}

/// Full breakdown in percentages rounded to two decimals
pub fn composite(scores: &ComponentScores, difficulty: Difficulty, penalties: &Penalties) -> ScoreBreakdown {
    let composite = final_composite(scores, difficulty, penalties);
    log::debug!(
        "composite ({difficulty}): contour={:.4} keypoints={:.4} local={:.4} penalty={:.3} -> {composite:.4}",
        scores.contour,
        scores.keypoints,
        scores.local,
        penalties.factor()
    );
    ScoreBreakdown {
        contour_score: to_percent(scores.contour),
        keypoint_score: to_percent(scores.keypoints),
        local_similarity_score: to_percent(scores.local),
        composite_score: to_percent(composite),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PERFECT: ComponentScores = ComponentScores { contour: 1.0, keypoints: 1.0, local: 1.0 };

    #[test]
    fn perfect_scores_give_one_hundred() {
        for d in Difficulty::ALL {
            let breakdown = composite(&PERFECT, d, &Penalties::default());
            assert_eq!(breakdown.composite_score, 100.0);
            assert_eq!(breakdown.contour_score, 100.0);
        }
    }

    #[test]
    fn weights_follow_difficulty() {
        let contour_only = ComponentScores { contour: 1.0, keypoints: 0.0, local: 0.0 };
        let easy = final_composite(&contour_only, Difficulty::Easy, &Penalties::default());
        let hard = final_composite(&contour_only, Difficulty::Hard, &Penalties::default());
        assert!((easy - 0.65).abs() < 1e-12);
        assert!((hard - 0.55).abs() < 1e-12);
    }

    #[test]
    fn penalties_scale_the_composite() {
        let penalties = Penalties { ink: 0.5, spatial: 0.8 };
        let breakdown = composite(&PERFECT, Difficulty::Medium, &penalties);
        assert_eq!(breakdown.composite_score, 40.0);
        // Components are reported unpenalized
        assert_eq!(breakdown.keypoint_score, 100.0);
    }

    #[test]
    fn rounding_to_two_decimals() {
        let scores = ComponentScores { contour: 0.123456, keypoints: 0.5, local: 0.0 };
        let breakdown = composite(&scores, Difficulty::Easy, &Penalties::default());
        assert_eq!(breakdown.contour_score, 12.35);
        // 0.65 * 0.123456 + 0.30 * 0.5 = 0.2302464
        assert_eq!(breakdown.composite_score, 23.02);
    }

    proptest! {
        #[test]
        fn composite_is_a_percentage(
            contour in 0.0f64..=1.0,
            keypoints in 0.0f64..=1.0,
            local in 0.0f64..=1.0,
            ink in 0.05f64..=1.0,
            spatial in 0.7f64..=1.0,
        ) {
            let scores = ComponentScores { contour, keypoints, local };
            for d in Difficulty::ALL {
                let b = composite(&scores, d, &Penalties { ink, spatial });
                prop_assert!((0.0..=100.0).contains(&b.composite_score));
            }
        }
    }
}
