//! Periodic sampling of a cosine-modulated bias.
//!
//! A waveform is sampled on `M` equally spaced phases over exactly one
//! period, endpoint excluded, so that the discrete Fourier sums in
//! [`crate::fourier`] are exact for band-limited content.
//!
//! Array layout:
//! - operating-point axis: `DVector<f64>` of length P
//! - sampled waveform: `DMatrix<f64>` of shape P × M (row = operating point,
//!   column = phase)

use nalgebra::{DMatrix, DVector};
use qnoise_core::{Error as ModelError, Result};
use std::f64::consts::PI;

/// Smallest phase grid accepted.
pub const MIN_PHASE_SAMPLES: usize = 3;

/// Equally spaced phases `t_k = k/M`, `k = 0..M`, over one period.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseGrid {
    phases: DVector<f64>,
}

impl PhaseGrid {
    /// Create a grid of `samples` phases.
    pub fn new(samples: usize) -> Result<Self> {
        if samples < MIN_PHASE_SAMPLES {
            return Err(ModelError::InsufficientSamples {
                samples,
                order: 0,
                required: MIN_PHASE_SAMPLES,
            });
        }
        let m = samples as f64;
        Ok(Self {
            phases: DVector::from_fn(samples, |k, _| k as f64 / m),
        })
    }

    /// Number of phase samples M.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn phases(&self) -> &DVector<f64> {
        &self.phases
    }

    /// Check that harmonic `order` lies below the Nyquist limit (M ≥ 2n+1).
    pub fn ensure_resolves(&self, order: usize) -> Result<()> {
        let required = (2 * order + 1).max(MIN_PHASE_SAMPLES);
        if self.len() < required {
            return Err(ModelError::InsufficientSamples {
                samples: self.len(),
                order,
                required,
            });
        }
        Ok(())
    }
}

/// Resolve the operating-point count of several operands.
///
/// Operands of length 1 broadcast; all others must share one length.
pub fn broadcast_len(operands: &[&DVector<f64>]) -> Result<usize> {
    let mut points = 1;
    for operand in operands {
        let len = operand.len();
        if len == 1 {
            continue;
        }
        if points == 1 {
            points = len;
        } else if len != points {
            return Err(ModelError::ShapeMismatch {
                expected: points,
                actual: len,
            });
        }
    }
    Ok(points)
}

/// Element `i` of an operand already validated by [`broadcast_len`].
#[inline]
pub fn broadcast_at(operand: &DVector<f64>, i: usize) -> f64 {
    if operand.len() == 1 {
        operand[0]
    } else {
        operand[i]
    }
}

/// Expand an operand to `len` operating points.
pub fn broadcast_to(operand: &DVector<f64>, len: usize) -> Result<DVector<f64>> {
    if operand.len() != 1 && operand.len() != len {
        return Err(ModelError::ShapeMismatch {
            expected: len,
            actual: operand.len(),
        });
    }
    Ok(DVector::from_fn(len, |i, _| broadcast_at(operand, i)))
}

/// Bias current `I(t) = I_dc + I_ac·cos(2πt)` across operating points.
#[derive(Debug, Clone, PartialEq)]
pub struct ModulatedBias {
    dc: DVector<f64>,
    ac: DVector<f64>,
    points: usize,
}

impl ModulatedBias {
    /// Pair a DC bias vector with a drive amplitude.
    ///
    /// Either operand may have length 1; otherwise their lengths must match.
    pub fn new(dc: DVector<f64>, ac: DVector<f64>) -> Result<Self> {
        let points = broadcast_len(&[&dc, &ac])?;
        Ok(Self { dc, ac, points })
    }

    /// Constant drive amplitude over a DC sweep.
    pub fn with_amplitude(dc: DVector<f64>, amplitude: f64) -> Self {
        let points = dc.len();
        Self {
            dc,
            ac: DVector::from_element(1, amplitude),
            points,
        }
    }

    /// Number of operating points P.
    pub fn points(&self) -> usize {
        self.points
    }

    pub fn dc(&self) -> &DVector<f64> {
        &self.dc
    }

    pub fn ac(&self) -> &DVector<f64> {
        &self.ac
    }

    /// Instantaneous current at operating point `i` and phase `t`.
    #[inline]
    pub fn current_at(&self, i: usize, t: f64) -> f64 {
        broadcast_at(&self.dc, i) + broadcast_at(&self.ac, i) * (2.0 * PI * t).cos()
    }

    /// P × M matrix of instantaneous currents.
    pub fn currents(&self, grid: &PhaseGrid) -> DMatrix<f64> {
        self.sample(grid, |i| i)
    }

    /// Evaluate `f(I(t))` over the grid, giving a P × M matrix.
    ///
    /// With the `parallel` feature, operating points are evaluated on the
    /// rayon pool. The phase axis of a row is always evaluated in order.
    pub fn sample<F>(&self, grid: &PhaseGrid, f: F) -> DMatrix<f64>
    where
        F: Fn(f64) -> f64 + Sync,
    {
        let phases = grid.phases();
        let m = phases.len();

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            if self.points > 1 && rayon::current_num_threads() > 1 {
                log::debug!(
                    "sampling {} operating points x {} phases on {} threads",
                    self.points,
                    m,
                    rayon::current_num_threads()
                );
                let rows: Vec<Vec<f64>> = (0..self.points)
                    .into_par_iter()
                    .map(|i| phases.iter().map(|&t| f(self.current_at(i, t))).collect())
                    .collect();
                return DMatrix::from_fn(self.points, m, |i, k| rows[i][k]);
            }
        }

        DMatrix::from_fn(self.points, m, |i, k| f(self.current_at(i, phases[k])))
    }
}
