//! Effective OIP2 from measured second- and third-order noise moments.
//!
//! A second-order nonlinearity of the detection chain mixes the noise power
//! S2 into the third-order moment as `S3 = a·S2² + b`. Regressing S3 on S2²
//! gives the slope `a`, and the output intercept power follows as
//!
//! ```text
//! OIP2 = 81 / (2·a²)
//! ```
//!
//! A vanishing slope means the nonlinearity is below resolution and OIP2 is
//! unbounded; that case is reported as [`Error::FitDegenerate`].

use nalgebra::DVector;
use qnoise_core::PowerUnit;

use crate::error::{Error, Result};
use crate::fit::{CurveFitResult, FitConfig, LinearModel, fit_curve};

/// Slopes smaller than this in magnitude are treated as zero.
pub const DEFAULT_SLOPE_EPSILON: f64 = 1e-12;

/// Configuration for the OIP2 extraction.
#[derive(Debug, Clone)]
pub struct CalibrationConfig {
    /// Unit of the reported OIP2.
    pub unit: PowerUnit,
    /// Minimum |a| accepted from the fit.
    pub slope_epsilon: f64,
    /// Settings of the underlying least-squares fit.
    pub fit: FitConfig,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            unit: PowerUnit::Watt,
            slope_epsilon: DEFAULT_SLOPE_EPSILON,
            fit: FitConfig::default(),
        }
    }
}

impl CalibrationConfig {
    /// Report OIP2 in `unit`.
    pub fn with_unit(mut self, unit: PowerUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Report OIP2 in dBm.
    pub fn in_dbm(self) -> Self {
        self.with_unit(PowerUnit::Dbm)
    }

    /// Set the degenerate-slope threshold.
    pub fn with_slope_epsilon(mut self, epsilon: f64) -> Self {
        self.slope_epsilon = epsilon;
        self
    }

    /// Use custom fit settings.
    pub fn with_fit(mut self, fit: FitConfig) -> Self {
        self.fit = fit;
        self
    }
}

/// Result of an OIP2 extraction.
#[derive(Debug, Clone)]
pub struct Oip2Result {
    /// OIP2 in [`Oip2Result::unit`].
    pub oip2: f64,
    /// Unit of `oip2`.
    pub unit: PowerUnit,
    /// Fitted slope a of `S3 = a·S2² + b`.
    pub slope: f64,
    /// Fitted intercept b.
    pub intercept: f64,
    /// Full fit outcome, including covariance.
    pub fit: CurveFitResult,
}

/// OIP2 in watts from the slope of `S3 = a·S2² + b`.
pub fn oip2_from_slope(slope: f64, epsilon: f64) -> Result<f64> {
    if !slope.is_finite() || slope.abs() < epsilon {
        return Err(Error::FitDegenerate { slope, epsilon });
    }
    Ok(81.0 / 2.0 / (slope * slope))
}

/// Extract OIP2 from paired S2/S3 measurements over operating points.
///
/// Fits `S3 = a·S2² + b` by least squares from the guess `[1, 0]` and
/// converts the slope with [`oip2_from_slope`].
pub fn oip2_from_moments(
    s2: &DVector<f64>,
    s3: &DVector<f64>,
    config: &CalibrationConfig,
) -> Result<Oip2Result> {
    if s2.len() != s3.len() {
        return Err(Error::DimensionMismatch {
            expected: s2.len(),
            actual: s3.len(),
        });
    }

    let s2_squared = s2.map(|v| v * v);
    let fit = fit_curve(&LinearModel, &s2_squared, s3, &[1.0, 0.0], &config.fit)?;
    let slope = fit.parameters[0];
    let intercept = fit.parameters[1];

    let watts = oip2_from_slope(slope, config.slope_epsilon)?;
    let oip2 = config.unit.from_watts(watts);
    log::debug!(
        "OIP2 = {} {} (slope {:e}, {} points)",
        oip2,
        config.unit.symbol(),
        slope,
        s2.len()
    );

    Ok(Oip2Result {
        oip2,
        unit: config.unit,
        slope,
        intercept,
        fit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    fn quadratic_moments() -> (DVector<f64>, DVector<f64>) {
        let s2 = dvector![0.2, 0.5, 0.9, 1.3, 1.8, 2.4];
        let s3 = s2.map(|v| 2.0 * v * v);
        (s2, s3)
    }

    #[test]
    fn test_recovers_known_oip2() {
        let (s2, s3) = quadratic_moments();
        let result = oip2_from_moments(&s2, &s3, &CalibrationConfig::default()).unwrap();

        assert!((result.slope - 2.0).abs() < 1e-9);
        assert!(result.intercept.abs() < 1e-9);
        assert!((result.oip2 - 10.125).abs() < 1e-8);
        assert_eq!(result.unit, PowerUnit::Watt);
        assert!(result.fit.converged);
    }

    #[test]
    fn test_dbm_output() {
        let (s2, s3) = quadratic_moments();
        let config = CalibrationConfig::default().in_dbm();
        let result = oip2_from_moments(&s2, &s3, &config).unwrap();

        let expected = 10.0 * 10125f64.log10();
        assert!((result.oip2 - expected).abs() < 1e-8);
        assert!((result.oip2 - 40.05).abs() < 0.01);
    }

    #[test]
    fn test_zero_slope_is_degenerate() {
        assert!(matches!(
            oip2_from_slope(0.0, DEFAULT_SLOPE_EPSILON),
            Err(Error::FitDegenerate { slope, .. }) if slope == 0.0
        ));
        assert!(matches!(
            oip2_from_slope(f64::NAN, DEFAULT_SLOPE_EPSILON),
            Err(Error::FitDegenerate { .. })
        ));
    }

    #[test]
    fn test_flat_s3_is_degenerate() {
        let s2 = dvector![0.1, 0.4, 0.8, 1.5];
        let s3 = dvector![3.0, 3.0, 3.0, 3.0];
        let err = oip2_from_moments(&s2, &s3, &CalibrationConfig::default()).unwrap_err();
        assert!(matches!(err, Error::FitDegenerate { .. }));
    }

    #[test]
    fn test_negative_slope_gives_same_oip2() {
        let s2 = dvector![0.2, 0.5, 0.9, 1.3];
        let s3 = s2.map(|v| -2.0 * v * v + 0.3);
        let result = oip2_from_moments(&s2, &s3, &CalibrationConfig::default()).unwrap();
        assert!((result.oip2 - 10.125).abs() < 1e-8);
        assert!((result.intercept - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_length_mismatch() {
        let err = oip2_from_moments(
            &dvector![1.0, 2.0],
            &dvector![1.0],
            &CalibrationConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }
}
