pub mod buffer;
pub mod config;
pub mod difficulty;
pub mod error;

pub use buffer::{Dimensions, EdgeMap, GrayBuffer, Keypoint, ensure_same_dims};
pub use config::ScoringConfig;
pub use difficulty::{Difficulty, Weights};
pub use error::{SketchError, SketchResult};

/// Four component percentages of one scoring request, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ScoreBreakdown {
    pub contour_score: f64,
    pub keypoint_score: f64,
    pub local_similarity_score: f64,
    pub composite_score: f64,
}

/// Scale a unit score to a percentage with two decimals
pub fn to_percent(unit: f64) -> f64 {
    (unit.clamp(0.0, 1.0) * 10_000.0).round() / 100.0
}

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}
