//! Error types for qnoise-core.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("domain error: {name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error(
        "domain error: {samples} phase samples cannot resolve harmonic {order} (need at least {required})"
    )]
    InsufficientSamples {
        samples: usize,
        order: usize,
        required: usize,
    },

    #[error("shape mismatch: expected {expected} operating points (or 1), got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

impl Error {
    /// True for inputs outside the physical or numerical domain of the model.
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            Error::NonPositive { .. } | Error::InsufficientSamples { .. }
        )
    }

    /// True for operands that cannot be broadcast against each other.
    pub fn is_shape_error(&self) -> bool {
        matches!(self, Error::ShapeMismatch { .. })
    }
}

/// Check that a physical parameter is strictly positive and finite.
pub fn ensure_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::NonPositive { name, value })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
