//! Helpers for in-phase/quadrature data and swept measurements.

use nalgebra::DVector;
use std::f64::consts::PI;

use crate::error::{Error, Result};

/// Amplitude `sqrt(x² + y²)` of in-phase/quadrature pairs.
pub fn magnitude(x: &DVector<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    check_same_len(x, y)?;
    Ok(x.zip_map(y, f64::hypot))
}

/// Angle `atan2(x, y)` unwrapped along the sweep.
///
/// The angle is measured from the `y` axis towards `x`. Jumps larger than π
/// between consecutive points are folded back by multiples of 2π.
pub fn unwrapped_phase(x: &DVector<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    check_same_len(x, y)?;
    let mut phase = x.zip_map(y, f64::atan2);
    let mut offset = 0.0;
    for i in 1..phase.len() {
        let raw = phase[i] + offset;
        let jump = raw - phase[i - 1];
        if jump > PI {
            offset -= 2.0 * PI * ((jump + PI) / (2.0 * PI)).floor();
        } else if jump < -PI {
            offset += 2.0 * PI * ((-jump + PI) / (2.0 * PI)).floor();
        }
        phase[i] += offset;
    }
    Ok(phase)
}

/// Rotate in-phase/quadrature pairs by `phi` radians.
pub fn rotate(
    x: &DVector<f64>,
    y: &DVector<f64>,
    phi: f64,
) -> Result<(DVector<f64>, DVector<f64>)> {
    check_same_len(x, y)?;
    let (sin, cos) = phi.sin_cos();
    let xr = x * cos - y * sin;
    let yr = x * sin + y * cos;
    Ok((xr, yr))
}

/// Numerical derivative dy/dx of a swept measurement.
///
/// Uses `gradient(y) / gradient(x)`: central differences inside the sweep
/// and one-sided differences at both ends, so non-uniform steps are
/// handled point by point.
pub fn numerical_derivative(x: &DVector<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    check_same_len(x, y)?;
    if x.len() < 2 {
        return Err(Error::DimensionMismatch {
            expected: 2,
            actual: x.len(),
        });
    }
    let dx = gradient(x);
    let dy = gradient(y);
    if let Some(index) = dx.iter().position(|&v| v == 0.0) {
        return Err(Error::FlatAbscissa { index });
    }
    Ok(dy.component_div(&dx))
}

/// Index-spaced gradient: one-sided at the ends, central inside.
fn gradient(v: &DVector<f64>) -> DVector<f64> {
    let n = v.len();
    DVector::from_fn(n, |i, _| match i {
        0 => v[1] - v[0],
        i if i == n - 1 => v[n - 1] - v[n - 2],
        i => (v[i + 1] - v[i - 1]) / 2.0,
    })
}

fn check_same_len(x: &DVector<f64>, y: &DVector<f64>) -> Result<()> {
    if x.len() != y.len() {
        return Err(Error::DimensionMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    Ok(())
}
