//! Predicted third-harmonic noise signal under three circuit scenarios.
//!
//! Each predictor samples `Sii` and `dSii/dV` over one drive period and
//! combines their harmonics with caller-supplied circuit gains:
//!
//! | scenario                     | prediction                                   |
//! |------------------------------|----------------------------------------------|
//! | equilibrium (`I_dc = 0`)     | `g_env·D3 + g_lin·I_ac`                      |
//! | finite-temperature environment | `g_env·D3`                                 |
//! | finite-impedance feedback    | `g1·S0·D3 + g2·S3·D0 + g3·D6·S3`             |
//!
//! with `Sn = A_n[Sii]` and `Dn = A_n[dSii/dV]`. The drive is a cosine, so
//! every sampled quantity is even in `t` and only cosine coefficients
//! survive. Gains broadcast over operating points like any other operand.

use nalgebra::{DMatrix, DVector};
use qnoise_core::TunnelJunction;

use crate::error::Result;
use crate::fourier::fourier_coefficient;
use crate::sampler::{ModulatedBias, PhaseGrid, broadcast_len, broadcast_to};

/// Phase samples per period used by the composers.
pub const DEFAULT_COMPOSER_SAMPLES: usize = 1000;

/// Highest harmonic any composer reads (D6).
const HIGHEST_ORDER: usize = 6;

/// Configuration for the third-harmonic predictors.
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// Phase samples per period (M).
    pub phase_samples: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            phase_samples: DEFAULT_COMPOSER_SAMPLES,
        }
    }
}

impl ComposerConfig {
    /// Use `samples` phase points per period.
    pub fn with_phase_samples(mut self, samples: usize) -> Self {
        self.phase_samples = samples;
        self
    }
}

/// Gains of the finite-impedance feedback model.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackGains {
    /// Weight of `S0·D3`.
    pub g1: DVector<f64>,
    /// Weight of `S3·D0`.
    pub g2: DVector<f64>,
    /// Weight of `D6·S3`.
    pub g3: DVector<f64>,
}

impl FeedbackGains {
    pub fn new(g1: DVector<f64>, g2: DVector<f64>, g3: DVector<f64>) -> Self {
        Self { g1, g2, g3 }
    }

    /// Same scalar gains at every operating point.
    pub fn uniform(g1: f64, g2: f64, g3: f64) -> Self {
        Self {
            g1: DVector::from_element(1, g1),
            g2: DVector::from_element(1, g2),
            g3: DVector::from_element(1, g3),
        }
    }
}

/// Cosine coefficients of one sampled quantity.
struct SampledHarmonics {
    values: DMatrix<f64>,
    grid: PhaseGrid,
}

impl SampledHarmonics {
    fn new<F>(bias: &ModulatedBias, config: &ComposerConfig, f: F) -> Result<Self>
    where
        F: Fn(f64) -> f64 + Sync,
    {
        let grid = PhaseGrid::new(config.phase_samples)?;
        grid.ensure_resolves(HIGHEST_ORDER)?;
        let values = bias.sample(&grid, f);
        Ok(Self { values, grid })
    }

    fn cosine(&self, order: usize) -> Result<DVector<f64>> {
        Ok(fourier_coefficient(&self.values, &self.grid, order)?.in_phase())
    }
}

/// Repeat a scalar bias over `points` operating points.
fn expand(bias: &ModulatedBias, points: usize) -> Result<ModulatedBias> {
    if bias.points() == points {
        return Ok(bias.clone());
    }
    Ok(ModulatedBias::new(
        broadcast_to(bias.dc(), points)?,
        broadcast_to(bias.ac(), points)?,
    )?)
}

/// Third-harmonic signal at zero DC bias.
///
/// `gain_env` weights the third harmonic of `dSii/dV`; `gain_lin` weights a
/// linear leakage proportional to the drive amplitude.
///
/// # Arguments
/// * `junction` - Junction resistance and temperature
/// * `amplitude` - Drive amplitude I_ac (A), length P or 1
/// * `gain_env` - Environment gain, length P or 1
/// * `gain_lin` - Linear leakage gain, length P or 1
pub fn calc_s3_eq(
    junction: &TunnelJunction,
    amplitude: &DVector<f64>,
    gain_env: &DVector<f64>,
    gain_lin: &DVector<f64>,
    config: &ComposerConfig,
) -> Result<DVector<f64>> {
    let points = broadcast_len(&[amplitude, gain_env, gain_lin])?;
    let bias = ModulatedBias::new(DVector::zeros(1), broadcast_to(amplitude, points)?)?;
    let dsii = SampledHarmonics::new(&bias, config, |i| junction.dsii_dv(i))?;

    let d3 = dsii.cosine(3)?;
    let env = broadcast_to(gain_env, points)?.component_mul(&d3);
    let leak = broadcast_to(gain_lin, points)?.component_mul(&broadcast_to(amplitude, points)?);
    Ok(env + leak)
}

/// Third-harmonic signal from a finite-temperature environment.
///
/// # Arguments
/// * `junction` - Junction resistance and temperature
/// * `bias` - DC bias and drive amplitude
/// * `gain_env` - Environment gain, length P or 1
pub fn calc_s3_env(
    junction: &TunnelJunction,
    bias: &ModulatedBias,
    gain_env: &DVector<f64>,
    config: &ComposerConfig,
) -> Result<DVector<f64>> {
    let points = broadcast_len(&[&DVector::zeros(bias.points()), gain_env])?;
    let bias = expand(bias, points)?;
    let dsii = SampledHarmonics::new(&bias, config, |i| junction.dsii_dv(i))?;

    let d3 = dsii.cosine(3)?;
    Ok(broadcast_to(gain_env, points)?.component_mul(&d3))
}

/// Third-harmonic signal through a finite-impedance feedback loop.
///
/// Returns `g1·S0·D3 + g2·S3·D0 + g3·D6·S3`.
pub fn calc_s_fb(
    junction: &TunnelJunction,
    bias: &ModulatedBias,
    gains: &FeedbackGains,
    config: &ComposerConfig,
) -> Result<DVector<f64>> {
    let points = broadcast_len(&[
        &DVector::zeros(bias.points()),
        &gains.g1,
        &gains.g2,
        &gains.g3,
    ])?;
    let bias = expand(bias, points)?;
    let sii = SampledHarmonics::new(&bias, config, |i| junction.sii(i))?;
    let dsii = SampledHarmonics::new(&bias, config, |i| junction.dsii_dv(i))?;

    let s0 = sii.cosine(0)?;
    let s3 = sii.cosine(3)?;
    let d0 = dsii.cosine(0)?;
    let d3 = dsii.cosine(3)?;
    let d6 = dsii.cosine(6)?;

    let g1 = broadcast_to(&gains.g1, points)?;
    let g2 = broadcast_to(&gains.g2, points)?;
    let g3 = broadcast_to(&gains.g3, points)?;

    let first = g1.component_mul(&s0).component_mul(&d3);
    let second = g2.component_mul(&s3).component_mul(&d0);
    let third = g3.component_mul(&d6).component_mul(&s3);
    Ok(first + second + third)
}
