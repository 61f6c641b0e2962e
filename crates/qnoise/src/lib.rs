//! # qnoise
//!
//! Noise of tunnel junctions under periodic bias, written in Rust.
//!
//! qnoise provides:
//! - Zero- and finite-frequency noise spectral density of a tunnel junction
//! - Harmonic decomposition of the noise over one drive period
//! - Third-harmonic predictors for equilibrium, environment and feedback setups
//! - Photon-assisted noise with Bessel-weighted sidebands
//! - OIP2 calibration from measured noise moments
//!
//! ## Quick Start
//!
//! ```rust
//! use qnoise::prelude::*;
//!
//! let junction = TunnelJunction::new(50.0, 0.05).unwrap();
//! let bias = ModulatedBias::with_amplitude(DVector::from_vec(vec![0.0, 1e-7]), 5e-7);
//!
//! let d3 = dsii_harmonic(&junction, &bias, 3, &HarmonicConfig::default()).unwrap();
//! assert_eq!(d3.len(), 2);
//! ```
//!
//! ## Calibration
//!
//! ```rust
//! use qnoise::prelude::*;
//!
//! let s2 = DVector::from_vec(vec![0.2, 0.5, 0.9, 1.3]);
//! let s3 = s2.map(|v| 2.0 * v * v);
//! let result = oip2_from_moments(&s2, &s3, &CalibrationConfig::default().in_dbm()).unwrap();
//! assert!((result.oip2 - 40.05).abs() < 0.01);
//! ```
//!
//! ## Features
//!
//! - `parallel` - Sample operating points on the rayon thread pool

// Re-export member crates
pub use qnoise_core as core;
pub use qnoise_solver as solver;

// ============================================================================
// Convenient re-exports from qnoise_core
// ============================================================================

pub use qnoise_core::{
    // Errors
    Error as ModelError,
    // Units
    PowerUnit,
    SingularityGuard,
    // Junction model
    TunnelJunction,
    // Special functions
    bessel_jn,
    dbm_to_watts,
    dsii_dv,
    dxcothx,
    sii,
    sii_at_frequency,
    watts_to_dbm,
    xcothx,
};

// ============================================================================
// Convenient re-exports from qnoise_solver
// ============================================================================

pub use qnoise_solver::{
    // Calibration
    CalibrationConfig,
    // Composers
    ComposerConfig,
    // Fitting
    CurveFitResult,
    // Errors
    Error as SolverError,
    FeedbackGains,
    FitConfig,
    FitModel,
    FnModel,
    // Harmonics
    Harmonic,
    HarmonicConfig,
    LinearModel,
    // Sampling
    ModulatedBias,
    Oip2Result,
    PhaseGrid,
    // Sidebands
    SidebandConfig,
    calc_s_fb,
    calc_s3_env,
    calc_s3_eq,
    dsii_harmonic,
    fit_curve,
    fourier_coefficient,
    fourier_spectrum,
    // Quadrature helpers
    magnitude,
    model_harmonic,
    numerical_derivative,
    oip2_from_moments,
    oip2_from_slope,
    photo_assisted_noise,
    rotate,
    sii_harmonic,
    unwrapped_phase,
};

// ============================================================================
// Re-export commonly used external types
// ============================================================================

/// Re-export of nalgebra's dynamic vector type.
pub use nalgebra::DVector;

/// Re-export of nalgebra's dynamic matrix type.
pub use nalgebra::DMatrix;

/// Re-export of num_complex's Complex type.
pub use num_complex::Complex;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module containing commonly used types and functions.
///
/// ```rust
/// use qnoise::prelude::*;
/// ```
pub mod prelude {
    // Junction model
    pub use crate::{TunnelJunction, dsii_dv, sii, sii_at_frequency};

    // Sampling and harmonics
    pub use crate::{
        Harmonic, HarmonicConfig, ModulatedBias, PhaseGrid, dsii_harmonic, sii_harmonic,
    };

    // Composers
    pub use crate::{ComposerConfig, FeedbackGains, calc_s_fb, calc_s3_env, calc_s3_eq};

    // Sidebands
    pub use crate::{SidebandConfig, photo_assisted_noise};

    // Calibration
    pub use crate::{CalibrationConfig, Oip2Result, PowerUnit, oip2_from_moments};

    // Common external types
    pub use crate::{Complex, DMatrix, DVector};
}
