//! Discrete Fourier coefficients of periodically sampled waveforms.
//!
//! For a row `v_k` sampled at `t_k = k/M`:
//!
//! ```text
//! n = 0:  C_0 = 1/M · Σ v_k
//! n > 0:  A_n = 2/M · Σ v_k cos(2πn t_k)
//!         B_n = 2/M · Σ v_k sin(2πn t_k)
//! ```
//!
//! so that `v(t) = C_0 + Σ A_n cos(2πnt) + B_n sin(2πnt)`. The sums are exact
//! for content below the Nyquist limit of the grid.

use nalgebra::{DMatrix, DVector};
use num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;

use crate::error::Result;
use crate::sampler::PhaseGrid;
use qnoise_core::Error as ModelError;

/// Harmonic content of order `n` across operating points.
#[derive(Debug, Clone, PartialEq)]
pub enum Harmonic {
    /// Mean value (n = 0).
    Dc(DVector<f64>),
    /// Cosine/sine coefficient pair (n > 0), stored as `A_n + i·B_n`.
    Pair {
        order: usize,
        coefficients: DVector<Complex<f64>>,
    },
}

impl Harmonic {
    /// Harmonic order.
    pub fn order(&self) -> usize {
        match self {
            Harmonic::Dc(_) => 0,
            Harmonic::Pair { order, .. } => *order,
        }
    }

    /// Number of operating points.
    pub fn len(&self) -> usize {
        match self {
            Harmonic::Dc(values) => values.len(),
            Harmonic::Pair { coefficients, .. } => coefficients.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cosine coefficients A_n, or the mean for n = 0.
    pub fn in_phase(&self) -> DVector<f64> {
        match self {
            Harmonic::Dc(values) => values.clone(),
            Harmonic::Pair { coefficients, .. } => coefficients.map(|c| c.re),
        }
    }

    /// Sine coefficients B_n (zero for n = 0).
    pub fn quadrature(&self) -> DVector<f64> {
        match self {
            Harmonic::Dc(values) => DVector::zeros(values.len()),
            Harmonic::Pair { coefficients, .. } => coefficients.map(|c| c.im),
        }
    }

    /// Amplitude `sqrt(A_n² + B_n²)`; |C_0| for n = 0.
    pub fn magnitude(&self) -> DVector<f64> {
        match self {
            Harmonic::Dc(values) => values.abs(),
            Harmonic::Pair { coefficients, .. } => coefficients.map(|c| c.norm()),
        }
    }

    /// Phase `atan2(B_n, A_n)` in radians.
    pub fn phase(&self) -> DVector<f64> {
        match self {
            Harmonic::Dc(values) => values.map(|v| if v < 0.0 { PI } else { 0.0 }),
            Harmonic::Pair { coefficients, .. } => coefficients.map(|c| c.arg()),
        }
    }
}

/// Extract harmonic `order` from a P × M matrix sampled on `grid`.
pub fn fourier_coefficient(
    values: &DMatrix<f64>,
    grid: &PhaseGrid,
    order: usize,
) -> Result<Harmonic> {
    check_columns(values, grid)?;
    grid.ensure_resolves(order)?;
    let m = grid.len() as f64;

    if order == 0 {
        return Ok(Harmonic::Dc(values.column_sum() / m));
    }

    let n = order as f64;
    let cos_table = grid.phases().map(|t| (n * 2.0 * PI * t).cos());
    let sin_table = grid.phases().map(|t| (n * 2.0 * PI * t).sin());
    let a = values * cos_table * (2.0 / m);
    let b = values * sin_table * (2.0 / m);

    Ok(Harmonic::Pair {
        order,
        coefficients: a.zip_map(&b, Complex::new),
    })
}

/// Extract harmonics `0..=max_order` in one pass with an FFT per row.
///
/// Equivalent to calling [`fourier_coefficient`] for each order, at
/// `O(M log M)` per operating point instead of `O(M)` per order.
pub fn fourier_spectrum(
    values: &DMatrix<f64>,
    grid: &PhaseGrid,
    max_order: usize,
) -> Result<Vec<Harmonic>> {
    check_columns(values, grid)?;
    grid.ensure_resolves(max_order)?;
    let points = values.nrows();
    let m = grid.len();
    let scale = 2.0 / m as f64;

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(m);

    let mut dc = DVector::zeros(points);
    let mut pairs = vec![DVector::from_element(points, Complex::new(0.0, 0.0)); max_order];
    let mut buffer = vec![Complex::new(0.0, 0.0); m];

    for i in 0..points {
        for (slot, &v) in buffer.iter_mut().zip(values.row(i).iter()) {
            *slot = Complex::new(v, 0.0);
        }
        fft.process(&mut buffer);

        // X_n = Σ v_k e^{-2πink/M} = Σ v cos − i Σ v sin
        dc[i] = buffer[0].re / m as f64;
        for (n, pair) in pairs.iter_mut().enumerate() {
            let x = buffer[n + 1];
            pair[i] = Complex::new(scale * x.re, -scale * x.im);
        }
    }

    let mut spectrum = Vec::with_capacity(max_order + 1);
    spectrum.push(Harmonic::Dc(dc));
    spectrum.extend(
        pairs
            .into_iter()
            .enumerate()
            .map(|(n, coefficients)| Harmonic::Pair {
                order: n + 1,
                coefficients,
            }),
    );
    Ok(spectrum)
}

fn check_columns(values: &DMatrix<f64>, grid: &PhaseGrid) -> Result<()> {
    if values.ncols() != grid.len() {
        return Err(ModelError::ShapeMismatch {
            expected: grid.len(),
            actual: values.ncols(),
        }
        .into());
    }
    Ok(())
}
