//! Error types for qnoise-solver.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] qnoise_core::Error),

    #[error("degenerate fit: slope {slope:e} is below {epsilon:e}, OIP2 is ill-defined")]
    FitDegenerate { slope: f64, epsilon: f64 },

    #[error("invalid dimensions: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("abscissa does not advance around point {index}")]
    FlatAbscissa { index: usize },

    #[error("invalid fit: {0}")]
    InvalidFit(String),
}

pub type Result<T> = std::result::Result<T, Error>;
