//! Nonlinear least-squares curve fitting.
//!
//! Levenberg-Marquardt minimisation of `Σ (y_i − f(x_i; p))²` over the free
//! parameters of a [`FitModel`]. Any subset of parameters can be held at its
//! initial value through [`FitConfig::fixed`]; an empty set adjusts all of
//! them.
//!
//! Each damped step solves
//!
//! ```text
//! (JᵀJ + λ·diag(JᵀJ)) δ = Jᵀr
//! ```
//!
//! after scaling by `diag(JᵀJ)^-½`, so parameters of very different
//! magnitudes (S2² ~ 1e-20 next to an O(1) intercept) stay well conditioned.

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

/// Damping never drops below this.
const MIN_LAMBDA: f64 = 1e-15;

/// Damping above this means no downhill step exists at working precision.
const MAX_LAMBDA: f64 = 1e16;

/// A model `y = f(x; p)` with a fixed number of parameters.
pub trait FitModel {
    /// Number of parameters in `p`.
    fn num_parameters(&self) -> usize;

    /// Model value at `x`.
    fn evaluate(&self, x: f64, params: &[f64]) -> f64;

    /// Partial derivatives `∂f/∂p_j` at `x`, written into `grad`.
    ///
    /// Defaults to central differences.
    fn gradient(&self, x: f64, params: &[f64], grad: &mut [f64]) {
        let mut shifted = params.to_vec();
        for (j, g) in grad.iter_mut().enumerate() {
            let h = f64::EPSILON.cbrt() * params[j].abs().max(f64::EPSILON.sqrt());
            shifted[j] = params[j] + h;
            let up = self.evaluate(x, &shifted);
            shifted[j] = params[j] - h;
            let down = self.evaluate(x, &shifted);
            shifted[j] = params[j];
            *g = (up - down) / (2.0 * h);
        }
    }
}

/// A model built from a closure `f(x, p)`.
pub struct FnModel<F> {
    parameters: usize,
    f: F,
}

impl<F> FnModel<F>
where
    F: Fn(f64, &[f64]) -> f64,
{
    pub fn new(parameters: usize, f: F) -> Self {
        Self { parameters, f }
    }
}

impl<F> FitModel for FnModel<F>
where
    F: Fn(f64, &[f64]) -> f64,
{
    fn num_parameters(&self) -> usize {
        self.parameters
    }

    fn evaluate(&self, x: f64, params: &[f64]) -> f64 {
        (self.f)(x, params)
    }
}

/// Straight line `y = a·x + b`, parameters `[a, b]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearModel;

impl FitModel for LinearModel {
    fn num_parameters(&self) -> usize {
        2
    }

    fn evaluate(&self, x: f64, params: &[f64]) -> f64 {
        params[0] * x + params[1]
    }

    fn gradient(&self, x: f64, _params: &[f64], grad: &mut [f64]) {
        grad[0] = x;
        grad[1] = 1.0;
    }
}

/// Stopping criteria and parameter constraints for [`fit_curve`].
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Maximum Levenberg-Marquardt iterations.
    pub max_iterations: usize,
    /// Relative decrease of chi² below which the fit has converged.
    pub ftol: f64,
    /// Relative step size below which the fit has converged.
    pub xtol: f64,
    /// Initial damping λ.
    pub initial_lambda: f64,
    /// Indices of parameters held at their initial value.
    pub fixed: Vec<usize>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1e-12,
            xtol: 1e-12,
            initial_lambda: 1e-3,
            fixed: Vec::new(),
        }
    }
}

impl FitConfig {
    /// Hold the given parameters fixed.
    pub fn with_fixed(mut self, fixed: Vec<usize>) -> Self {
        self.fixed = fixed;
        self
    }

    /// Set the iteration limit.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Outcome of a curve fit.
#[derive(Debug, Clone)]
pub struct CurveFitResult {
    /// Best-fit parameters (fixed ones at their initial value).
    pub parameters: DVector<f64>,
    /// Parameter covariance, scaled by the reduced chi².
    ///
    /// Rows and columns of fixed parameters are zero. `None` when there are
    /// no degrees of freedom left or JᵀJ is singular at the optimum.
    pub covariance: Option<DMatrix<f64>>,
    /// Sum of squared residuals.
    pub chi_squared: f64,
    /// Number of points minus number of free parameters.
    pub degrees_of_freedom: usize,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether a stopping criterion was met before `max_iterations`.
    pub converged: bool,
}

impl CurveFitResult {
    /// chi² per degree of freedom.
    pub fn reduced_chi_squared(&self) -> Option<f64> {
        (self.degrees_of_freedom > 0).then(|| self.chi_squared / self.degrees_of_freedom as f64)
    }

    /// One-sigma parameter uncertainties, the square roots of the
    /// covariance diagonal.
    pub fn standard_errors(&self) -> Option<DVector<f64>> {
        self.covariance
            .as_ref()
            .map(|cov| cov.diagonal().map(|v| v.max(0.0).sqrt()))
    }
}

/// Fit `model` to the points `(x, y)` starting from `initial`.
///
/// # Arguments
/// * `model` - Function template
/// * `x`, `y` - Samples (same length)
/// * `initial` - Initial parameter guess
/// * `config` - Stopping criteria and fixed parameters
pub fn fit_curve(
    model: &dyn FitModel,
    x: &DVector<f64>,
    y: &DVector<f64>,
    initial: &[f64],
    config: &FitConfig,
) -> Result<CurveFitResult> {
    let k = model.num_parameters();
    if x.len() != y.len() {
        return Err(Error::DimensionMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    if initial.len() != k {
        return Err(Error::DimensionMismatch {
            expected: k,
            actual: initial.len(),
        });
    }
    if let Some(&bad) = config.fixed.iter().find(|&&j| j >= k) {
        return Err(Error::InvalidFit(format!(
            "fixed parameter index {} out of range for {} parameters",
            bad, k
        )));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(Error::InvalidFit("samples must be finite".into()));
    }

    let free: Vec<usize> = (0..k).filter(|j| !config.fixed.contains(j)).collect();
    if x.len() < free.len() {
        return Err(Error::InvalidFit(format!(
            "{} points cannot determine {} free parameters",
            x.len(),
            free.len()
        )));
    }
    let degrees_of_freedom = x.len() - free.len();

    let mut params = DVector::from_column_slice(initial);
    let mut r = residuals(model, x, y, &params);
    let mut chi2 = r.norm_squared();
    if !chi2.is_finite() {
        return Err(Error::InvalidFit(
            "model is not finite at the initial guess".into(),
        ));
    }

    let mut lambda = config.initial_lambda;
    let mut iterations = 0;
    let mut converged = free.is_empty();

    while !converged && iterations < config.max_iterations {
        iterations += 1;
        let jac = jacobian(model, x, &params, &free);
        let jtj = jac.transpose() * &jac;
        let gradient = jac.transpose() * &r;

        let mut accepted = false;
        while lambda <= MAX_LAMBDA {
            let Some(step) = damped_step(&jtj, &gradient, lambda) else {
                lambda *= 10.0;
                continue;
            };

            let mut trial = params.clone();
            for (s, &j) in step.iter().zip(&free) {
                trial[j] += s;
            }
            let r_trial = residuals(model, x, y, &trial);
            let chi2_trial = r_trial.norm_squared();

            if chi2_trial.is_finite() && chi2_trial <= chi2 {
                let decrease = chi2 - chi2_trial;
                let scale: f64 = free.iter().map(|&j| params[j].powi(2)).sum::<f64>().sqrt();
                let small_step = step.norm() <= config.xtol * (scale + config.xtol);

                params = trial;
                r = r_trial;
                chi2 = chi2_trial;
                lambda = (lambda / 10.0).max(MIN_LAMBDA);
                accepted = true;
                converged = chi2 == 0.0 || decrease <= config.ftol * chi2 || small_step;
                break;
            }
            lambda *= 10.0;
        }

        log::debug!(
            "fit iteration {}: chi2 = {:e}, lambda = {:e}",
            iterations,
            chi2,
            lambda
        );

        if !accepted {
            // No downhill direction left at working precision
            converged = true;
        }
    }

    if !converged {
        log::warn!(
            "curve fit did not converge after {} iterations (chi2 = {:e})",
            iterations,
            chi2
        );
    }

    let covariance = if degrees_of_freedom > 0 && !free.is_empty() {
        let jac = jacobian(model, x, &params, &free);
        let jtj = jac.transpose() * &jac;
        match scaled_inverse(&jtj) {
            Some(inv) => {
                let s2 = chi2 / degrees_of_freedom as f64;
                let mut cov = DMatrix::zeros(k, k);
                for (a, &ja) in free.iter().enumerate() {
                    for (b, &jb) in free.iter().enumerate() {
                        cov[(ja, jb)] = inv[(a, b)] * s2;
                    }
                }
                Some(cov)
            }
            None => {
                log::warn!("normal matrix is singular at the optimum; no covariance");
                None
            }
        }
    } else {
        None
    };

    Ok(CurveFitResult {
        parameters: params,
        covariance,
        chi_squared: chi2,
        degrees_of_freedom,
        iterations,
        converged,
    })
}

fn residuals(
    model: &dyn FitModel,
    x: &DVector<f64>,
    y: &DVector<f64>,
    params: &DVector<f64>,
) -> DVector<f64> {
    let p = params.as_slice();
    DVector::from_fn(x.len(), |i, _| y[i] - model.evaluate(x[i], p))
}

/// N × (free parameters) Jacobian of the model.
fn jacobian(
    model: &dyn FitModel,
    x: &DVector<f64>,
    params: &DVector<f64>,
    free: &[usize],
) -> DMatrix<f64> {
    let p = params.as_slice();
    let mut grad = vec![0.0; p.len()];
    let mut jac = DMatrix::zeros(x.len(), free.len());
    for i in 0..x.len() {
        model.gradient(x[i], p, &mut grad);
        for (c, &j) in free.iter().enumerate() {
            jac[(i, c)] = grad[j];
        }
    }
    jac
}

/// Column scaling `diag(A)^-½`, with 1 for empty columns.
fn column_scale(a: &DMatrix<f64>) -> DVector<f64> {
    a.diagonal()
        .map(|d| if d > 0.0 && d.is_finite() { 1.0 / d.sqrt() } else { 1.0 })
}

/// Solve `(A + λ·diag(A)) δ = g` in scaled coordinates.
fn damped_step(a: &DMatrix<f64>, g: &DVector<f64>, lambda: f64) -> Option<DVector<f64>> {
    let d = column_scale(a);
    let mut scaled = DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[(i, j)] * d[i] * d[j]);
    for i in 0..scaled.nrows() {
        let diag = scaled[(i, i)];
        scaled[(i, i)] += lambda * if diag > 0.0 { diag } else { 1.0 };
    }
    let rhs = g.component_mul(&d);

    let y = match scaled.clone().cholesky() {
        Some(chol) => chol.solve(&rhs),
        None => scaled.lu().solve(&rhs)?,
    };
    let step = y.component_mul(&d);
    step.iter().all(|v| v.is_finite()).then_some(step)
}

/// Inverse of a symmetric positive definite matrix in scaled coordinates.
fn scaled_inverse(a: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let d = column_scale(a);
    let scaled = DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[(i, j)] * d[i] * d[j]);
    let inv = scaled.cholesky()?.inverse();
    let out = DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| inv[(i, j)] * d[i] * d[j]);
    out.iter().all(|v| v.is_finite()).then_some(out)
}
