//! Harmonic noise analysis for qnoise.
//!
//! This crate provides:
//! - Periodic sampling of a junction under a cosine bias drive
//! - Fourier coefficient extraction (direct and FFT based)
//! - Harmonic composers for third-order and feedback noise moments
//! - Photon-assisted noise with Bessel-weighted sidebands
//! - Levenberg-Marquardt curve fitting and OIP2 calibration
//! - In-phase/quadrature helpers for swept measurements

pub mod calibration;
pub mod composer;
pub mod error;
pub mod fit;
pub mod fourier;
pub mod harmonics;
pub mod quadrature;
pub mod sampler;
pub mod sidebands;

pub use calibration::{CalibrationConfig, Oip2Result, oip2_from_moments, oip2_from_slope};
pub use composer::{ComposerConfig, FeedbackGains, calc_s_fb, calc_s3_env, calc_s3_eq};
pub use error::{Error, Result};
pub use fit::{CurveFitResult, FitConfig, FitModel, FnModel, LinearModel, fit_curve};
pub use fourier::{Harmonic, fourier_coefficient, fourier_spectrum};
pub use harmonics::{HarmonicConfig, dsii_harmonic, model_harmonic, sii_harmonic};
pub use quadrature::{magnitude, numerical_derivative, rotate, unwrapped_phase};
pub use sampler::{ModulatedBias, PhaseGrid};
pub use sidebands::{SidebandConfig, photo_assisted_noise};
