use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarrisError {
    #[error("Invalid Harris k: {0} (must be in (0, 0.25))")]
    InvalidSensitivity(f32),
    #[error("Invalid window radius: {0} (must be > 0)")]
    InvalidWindowRadius(usize),
    #[error("Invalid candidate stride: {0} (must be > 0)")]
    InvalidStride(usize),
    #[error("Invalid keypoint cap: {0} (must be > 0)")]
    InvalidMaxKeypoints(usize),
    #[error("Invalid response threshold: {0} (must be finite and >= 0)")]
    InvalidThreshold(f32),
}

pub type HarrisResult<T> = Result<T, HarrisError>;
