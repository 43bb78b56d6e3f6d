use std::sync::Arc;

use image::RgbaImage;
use sketch_core::{SketchError, ensure_same_dims};
use sketch_edges::{EdgeExtractor, match_contours};
use sketch_keypoints::{HarrisConfig, HarrisDetector, HarrisError, compare_keypoints};
use sketch_metrics::{
    ComponentScores, Penalties, SpatialPenaltyConfig, composite, ink_density, local_similarity,
    spatial_extra_penalty,
};
use thiserror::Error;

pub mod normalize;
pub mod reference;
pub mod render;
pub mod response;

pub use reference::{DirectoryStore, ReferenceSource, ReferenceStore};
pub use render::{DiagnosticArtifacts, EncodedArtifacts};
pub use response::{ScoreDetails, ScoreReport, ScoreResponse};
pub use sketch_core::{Difficulty, ScoreBreakdown, ScoringConfig};

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("failed to decode {what} image: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: image::ImageError,
    },
    #[error("reference image not found: {0}")]
    MissingReference(String),
    #[error(transparent)]
    Core(#[from] SketchError),
    #[error("Harris detector error: {0}")]
    Harris(#[from] HarrisError),
    #[error("failed to encode artifact: {0}")]
    Encode(#[source] image::ImageError),
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScoringResult<T> = Result<T, ScoringError>;

/// One submission to judge
#[derive(Debug, Clone)]
pub struct ScoreRequest {
    pub submission: Vec<u8>,
    pub reference: ReferenceSource,
    pub difficulty: Difficulty,
}

/// High-level scoring engine that runs the full comparison pipeline.
///
/// Holds only read-only configuration, so one instance can be shared across
/// threads and score any number of submissions concurrently.
pub struct SketchScorer {
    cfg: ScoringConfig,
    edges: EdgeExtractor,
    harris: HarrisDetector,
    spatial: SpatialPenaltyConfig,
    store: Option<Arc<dyn ReferenceStore>>,
}

impl SketchScorer {
    /// Create a new scorer with the given configuration
    pub fn new(cfg: ScoringConfig) -> ScoringResult<Self> {
        cfg.validate()?;
        let harris = HarrisDetector::new(HarrisConfig::from(&cfg))?;
        log::debug!("{}", cfg.summary());
        Ok(Self {
            edges: EdgeExtractor::new(cfg.edge_threshold),
            harris,
            spatial: SpatialPenaltyConfig::from(&cfg),
            store: None,
            cfg,
        })
    }

    /// Resolve `ReferenceSource::Stored` keys through `store`
    pub fn with_store(mut self, store: Arc<dyn ReferenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Get scorer configuration
    pub fn config(&self) -> &ScoringConfig {
        &self.cfg
    }

    /// Decode, score and encode one request.
    ///
    /// A reference that cannot be located is replaced by the submission
    /// itself; the response flags this with `used_fallback_reference`.
    pub fn score(&self, request: &ScoreRequest) -> ScoringResult<ScoreResponse> {
        let (report, used_fallback) = self.score_request(request)?;
        ScoreResponse::from_report(report, used_fallback)
    }

    /// Like `score`, but keeps the artifacts as images
    pub fn score_request(&self, request: &ScoreRequest) -> ScoringResult<(ScoreReport, bool)> {
        let submission = normalize::decode(&request.submission, "submission")?;
        let (reference, used_fallback) = match reference::resolve(&request.reference, self.store.as_deref()) {
            Ok(bytes) => (normalize::decode(&bytes, "reference")?, false),
            Err(ScoringError::MissingReference(reason)) => {
                log::warn!("reference unavailable ({reason}); scoring submission against itself");
                (submission.clone(), true)
            }
            Err(e) => return Err(e),
        };
        let report = self.score_images(&reference, &submission, request.difficulty)?;
        Ok((report, used_fallback))
    }

    /// Run the comparison pipeline on two decoded images
    pub fn score_images(
        &self,
        reference: &RgbaImage,
        submission: &RgbaImage,
        difficulty: Difficulty,
    ) -> ScoringResult<ScoreReport> {
        let size = self.cfg.canonical_size as u32;
        let (reference, submission) = rayon::join(
            || normalize::normalize(reference, size),
            || normalize::normalize(submission, size),
        );
        let (reference, submission) = (reference?, submission?);
        ensure_same_dims(&reference.gray, &submission.gray)?;

        let (reference_edges, submission_edges) = rayon::join(
            || self.edges.extract(&reference.gray),
            || self.edges.extract(&submission.gray),
        );
        let (contour, keypoints) = rayon::join(
            || match_contours(&reference_edges, &submission_edges, self.cfg.contour_tolerance),
            || {
                compare_keypoints(
                    &self.harris,
                    &reference.gray,
                    &submission.gray,
                    self.cfg.keypoint_tolerance(),
                )
            },
        );
        let (contour, keypoints) = (contour?, keypoints?);
        let local = local_similarity(&reference.gray, &submission.gray, self.cfg.similarity_patch)?;
        let ink = ink_density(&reference.gray, &submission.gray, self.cfg.ink_threshold)?;
        let spatial = spatial_extra_penalty(&reference.gray, &submission.gray, &self.spatial)?;

        let scores = ComponentScores {
            contour: contour.f1,
            keypoints: keypoints.score,
            local,
        };
        let penalties = Penalties {
            ink: ink.factor,
            spatial: spatial.factor,
        };
        let breakdown = composite(&scores, difficulty, &penalties);
        log::info!(
            "scored {difficulty} submission: {:.2}% (contour {:.2}, keypoints {:.2}, local {:.2}, penalty x{:.3})",
            breakdown.composite_score,
            breakdown.contour_score,
            breakdown.keypoint_score,
            breakdown.local_similarity_score,
            penalties.factor()
        );

        let artifacts = DiagnosticArtifacts::render(
            &reference.rgba,
            &submission.rgba,
            &reference_edges,
            &submission_edges,
            self.cfg.gutter,
            self.cfg.overlay_alpha,
        )?;

        Ok(ScoreReport {
            breakdown,
            details: ScoreDetails {
                difficulty,
                precision: contour.precision,
                recall: contour.recall,
                reference_edges: contour.reference_edges,
                submission_edges: contour.submission_edges,
                reference_keypoints: keypoints.reference_count,
                submission_keypoints: keypoints.submission_count,
                matched_keypoints: keypoints.matched,
                reference_ink: ink.reference_ratio,
                submission_ink: ink.submission_ratio,
                ink_penalty: ink.factor,
                spatial_penalty: spatial.factor,
                extra_patches: spatial.extra_patches,
                total_patches: spatial.total_patches,
            },
            artifacts,
        })
    }
}
