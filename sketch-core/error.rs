use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SketchError {
    #[error("Dimension mismatch: expected {}x{}, got {}x{}", expected.0, expected.1, actual.0, actual.1)]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("Buffer length mismatch: expected {expected_len}, got {actual_len}")]
    InvalidBuffer { expected_len: usize, actual_len: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type SketchResult<T> = Result<T, SketchError>;
