//! Harmonics of the junction noise under a cosine bias modulation.
//!
//! With `I(t) = I_dc + I_ac·cos(2πt)` the noise `Sii(I(t))` and its derivative
//! `dSii/dV(I(t))` are periodic; their Fourier coefficients are what a
//! lock-in style measurement at `n·f` sees.

use qnoise_core::TunnelJunction;

use crate::error::Result;
use crate::fourier::{Harmonic, fourier_coefficient};
use crate::sampler::{ModulatedBias, PhaseGrid};

/// Phase samples per period used for harmonic extraction.
pub const DEFAULT_HARMONIC_SAMPLES: usize = 500;

/// Configuration for harmonic extraction.
#[derive(Debug, Clone)]
pub struct HarmonicConfig {
    /// Phase samples per period (M).
    pub phase_samples: usize,
}

impl Default for HarmonicConfig {
    fn default() -> Self {
        Self {
            phase_samples: DEFAULT_HARMONIC_SAMPLES,
        }
    }
}

impl HarmonicConfig {
    /// Use `samples` phase points per period.
    pub fn with_phase_samples(mut self, samples: usize) -> Self {
        self.phase_samples = samples;
        self
    }

    /// Build the phase grid for this configuration.
    pub fn grid(&self) -> Result<PhaseGrid> {
        Ok(PhaseGrid::new(self.phase_samples)?)
    }
}

/// Sample `f(I(t))` over one period and extract harmonic `order`.
pub fn model_harmonic<F>(
    bias: &ModulatedBias,
    order: usize,
    config: &HarmonicConfig,
    f: F,
) -> Result<Harmonic>
where
    F: Fn(f64) -> f64 + Sync,
{
    let grid = config.grid()?;
    grid.ensure_resolves(order)?;
    let values = bias.sample(&grid, f);
    fourier_coefficient(&values, &grid, order)
}

/// Fourier coefficients of `Sii(I(t))`.
pub fn sii_harmonic(
    junction: &TunnelJunction,
    bias: &ModulatedBias,
    order: usize,
    config: &HarmonicConfig,
) -> Result<Harmonic> {
    model_harmonic(bias, order, config, |i| junction.sii(i))
}

/// Fourier coefficients of `dSii/dV(I(t))`.
pub fn dsii_harmonic(
    junction: &TunnelJunction,
    bias: &ModulatedBias,
    order: usize,
    config: &HarmonicConfig,
) -> Result<Harmonic> {
    model_harmonic(bias, order, config, |i| junction.dsii_dv(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DVector, dvector};

    fn junction() -> TunnelJunction {
        TunnelJunction::new(50.0, 0.05).unwrap()
    }

    #[test]
    fn test_no_drive_gives_static_noise() {
        let j = junction();
        let dc = dvector![-1e-7, 0.0, 2e-7];
        let bias = ModulatedBias::with_amplitude(dc.clone(), 0.0);
        let config = HarmonicConfig::default();

        let s0 = sii_harmonic(&j, &bias, 0, &config).unwrap().in_phase();
        let d0 = dsii_harmonic(&j, &bias, 0, &config).unwrap().in_phase();
        for i in 0..3 {
            let expected = j.sii(dc[i]);
            assert!((s0[i] - expected).abs() < expected * 1e-12);
            assert!((d0[i] - j.dsii_dv(dc[i])).abs() < 1e-12 * j.dsii_dv(2e-7));
        }

        let s2 = sii_harmonic(&j, &bias, 2, &config).unwrap();
        assert!(s2.magnitude().amax() < 1e-12 * s0.amax());
    }

    #[test]
    fn test_shot_noise_regime_harmonics() {
        // Far above kT, Sii = e|I| is linear in I: only DC and first harmonic
        let j = junction();
        let dc = DVector::from_element(1, 1e-4);
        let bias = ModulatedBias::with_amplitude(dc, 1e-5);
        let config = HarmonicConfig::default();

        let s1 = sii_harmonic(&j, &bias, 1, &config).unwrap();
        let expected = qnoise_core::constants::ELECTRON_CHARGE * 1e-5;
        assert!((s1.in_phase()[0] - expected).abs() < expected * 1e-9);

        let s3 = sii_harmonic(&j, &bias, 3, &config).unwrap();
        assert!(s3.in_phase()[0].abs() < expected * 1e-9);
    }

    #[test]
    fn test_equilibrium_has_only_odd_derivative_harmonics() {
        // dSii/dV is odd in I; driven around I = 0 it has no even harmonics
        let j = junction();
        let bias = ModulatedBias::with_amplitude(dvector![0.0], 3e-7);
        let config = HarmonicConfig::default();

        let d1 = dsii_harmonic(&j, &bias, 1, &config).unwrap().in_phase()[0];
        let d2 = dsii_harmonic(&j, &bias, 2, &config).unwrap().in_phase()[0];
        let d3 = dsii_harmonic(&j, &bias, 3, &config).unwrap().in_phase()[0];
        assert!(d1.abs() > 0.0);
        assert!(d2.abs() < d1.abs() * 1e-12);
        assert!(d3.abs() > d1.abs() * 1e-4);
    }

    #[test]
    fn test_sine_coefficients_vanish_for_cosine_drive() {
        let j = junction();
        let bias = ModulatedBias::with_amplitude(dvector![1e-7, 4e-7], 2e-7);
        let config = HarmonicConfig::default().with_phase_samples(256);
        let s3 = sii_harmonic(&j, &bias, 3, &config).unwrap();
        let scale = s3.in_phase().amax();
        assert!(s3.quadrature().amax() < scale * 1e-10);
    }

    #[test]
    fn test_too_few_samples() {
        let j = junction();
        let bias = ModulatedBias::with_amplitude(dvector![0.0], 1e-7);
        let config = HarmonicConfig::default().with_phase_samples(6);
        assert!(sii_harmonic(&j, &bias, 3, &config).is_err());
        assert!(sii_harmonic(&j, &bias, 2, &config).is_ok());
    }
}
