use serde::{Deserialize, Serialize};
use sketch_core::{Difficulty, ScoreBreakdown};

use crate::ScoringResult;
use crate::render::DiagnosticArtifacts;

/// Raw measurements behind a breakdown, useful when tuning thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDetails {
    pub difficulty: Difficulty,
    pub precision: f64,
    pub recall: f64,
    pub reference_edges: usize,
    pub submission_edges: usize,
    pub reference_keypoints: usize,
    pub submission_keypoints: usize,
    pub matched_keypoints: usize,
    pub reference_ink: f64,
    pub submission_ink: f64,
    pub ink_penalty: f64,
    pub spatial_penalty: f64,
    pub extra_patches: usize,
    pub total_patches: usize,
}

/// Everything one scoring pass produces, before encoding
#[derive(Debug, Clone)]
pub struct ScoreReport {
    pub breakdown: ScoreBreakdown,
    pub details: ScoreDetails,
    pub artifacts: DiagnosticArtifacts,
}

/// Wire form of a scoring result; images are base64 PNG
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub heatmap: String,
    pub side_by_side: String,
    pub overlay: String,
    pub normalized_reference: String,
    pub normalized_submission: String,
    /// The reference could not be located and the submission was compared with itself
    pub used_fallback_reference: bool,
    pub details: ScoreDetails,
}

impl ScoreResponse {
    pub fn from_report(report: ScoreReport, used_fallback_reference: bool) -> ScoringResult<Self> {
        let encoded = report.artifacts.encode()?;
        Ok(Self {
            score: report.breakdown.composite_score,
            breakdown: report.breakdown,
            heatmap: encoded.heatmap,
            side_by_side: encoded.side_by_side,
            overlay: encoded.overlay,
            normalized_reference: encoded.reference,
            normalized_submission: encoded.submission,
            used_fallback_reference,
            details: report.details,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
