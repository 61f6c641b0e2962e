//! Special functions used by the finite-temperature shot-noise formulas.
//!
//! `x·coth(x)` and its derivative have a removable singularity at `x = 0`.
//! Both go through a single [`SingularityGuard`] so the replacement value is
//! defined in one place.

use std::f64::consts::PI;

/// Replacement value for arguments sitting on the removable singularity.
pub const SINGULARITY_EPSILON: f64 = 1e-16;

/// Below this |x| the derivative of `x·coth(x)` is taken from its Taylor
/// series; the closed form loses all digits to cancellation near zero.
const DXCOTHX_SERIES_LIMIT: f64 = 1e-2;

/// Substitutes a small nonzero value for arguments on a removable singularity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingularityGuard {
    /// Value substituted for guarded arguments.
    pub epsilon: f64,
}

impl Default for SingularityGuard {
    fn default() -> Self {
        Self {
            epsilon: SINGULARITY_EPSILON,
        }
    }
}

impl SingularityGuard {
    /// Create a guard with a custom replacement value.
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Replace `x` only when it is exactly zero.
    #[inline]
    pub fn exact(&self, x: f64) -> f64 {
        if x == 0.0 { self.epsilon } else { x }
    }

    /// Replace `x` whenever `|x| < epsilon`.
    #[inline]
    pub fn near(&self, x: f64) -> f64 {
        if x.abs() < self.epsilon {
            self.epsilon
        } else {
            x
        }
    }

    /// `x·coth(x)` with the singularity at zero removed.
    pub fn xcothx(&self, x: f64) -> f64 {
        let x = self.exact(x);
        x / x.tanh()
    }

    /// d/dx of `x·coth(x)`, i.e. `coth(x) + x·(1 − coth²(x))`.
    pub fn dxcothx(&self, x: f64) -> f64 {
        let x = self.near(x);
        if x.abs() < DXCOTHX_SERIES_LIMIT {
            // 2x/3 − 4x³/45 + 4x⁵/315 − 8x⁷/4725
            let x2 = x * x;
            x * (2.0 / 3.0 + x2 * (-4.0 / 45.0 + x2 * (4.0 / 315.0 - x2 * 8.0 / 4725.0)))
        } else {
            let coth = 1.0 / x.tanh();
            coth + x * (1.0 - coth * coth)
        }
    }
}

/// `x·coth(x)`, equal to 1 at `x = 0`.
///
/// Apply elementwise to arrays with `v.map(xcothx)`.
pub fn xcothx(x: f64) -> f64 {
    SingularityGuard::default().xcothx(x)
}

/// Derivative of [`xcothx`], equal to 0 at `x = 0`.
pub fn dxcothx(x: f64) -> f64 {
    SingularityGuard::default().dxcothx(x)
}

/// Above this |x| (and above n²) Bessel functions use the Hankel expansion.
const BESSEL_ASYMPTOTIC_LIMIT: f64 = 25.0;

/// Bessel function of the first kind J_n(x) at integer order.
///
/// Evaluates Bessel's integral `J_n(x) = 1/2π ∫ cos(nτ − x·sin τ) dτ` over
/// one period with the trapezoidal rule. The integrand is periodic and
/// entire, so the error is set by the aliased orders J_{n±M}(x), which are
/// negligible once M exceeds `2(|n| + |x|)` by a margin.
///
/// For `|x| > max(25, n²)` the Hankel asymptotic expansion is used instead,
/// keeping the cost independent of `x`.
pub fn bessel_jn(order: i32, x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == 0.0 {
        return if order == 0 { 1.0 } else { 0.0 };
    }
    if x.is_infinite() {
        return 0.0;
    }

    // J_{-n}(x) = (-1)^n J_n(x) and J_n(-x) = (-1)^n J_n(x)
    let n = order.unsigned_abs();
    let flips = u32::from(order < 0) + u32::from(x < 0.0);
    let sign = if n % 2 == 1 && flips == 1 { -1.0 } else { 1.0 };
    let ax = x.abs();

    let nf = f64::from(n);
    let value = if ax > BESSEL_ASYMPTOTIC_LIMIT.max(nf * nf) {
        bessel_jn_asymptotic(n, ax)
    } else {
        bessel_jn_quadrature(n, ax)
    };
    sign * value
}

/// Trapezoidal quadrature of Bessel's integral for `x > 0`.
fn bessel_jn_quadrature(n: u32, x: f64) -> f64 {
    let points = 2 * (n as usize + x.ceil() as usize) + 64;
    let step = 2.0 * PI / points as f64;
    let order = f64::from(n);

    let sum: f64 = (0..points)
        .map(|k| {
            let tau = k as f64 * step;
            (order * tau - x * tau.sin()).cos()
        })
        .sum();
    sum / points as f64
}

/// Hankel expansion `sqrt(2/πx)·(P cos χ − Q sin χ)`, `χ = x − (n/2 + 1/4)π`,
/// for `x > max(25, n²)`.
fn bessel_jn_asymptotic(n: u32, x: f64) -> f64 {
    let mu = 4.0 * f64::from(n) * f64::from(n);
    let eight_x = 8.0 * x;

    // Terms a_k = Π_{j=1..k} (μ − (2j−1)²) / (k!·(8x)^k); P takes the even
    // ones with alternating sign, Q the odd ones.
    let mut p = 1.0_f64;
    let mut q = 0.0_f64;
    let mut term = 1.0_f64;
    let mut previous = f64::INFINITY;
    for k in 1..64u32 {
        let odd = f64::from(2 * k - 1);
        term *= (mu - odd * odd) / (f64::from(k) * eight_x);
        let size = term.abs();
        if size >= previous || size < 1e-17 * p.abs() {
            break;
        }
        previous = size;
        match k % 4 {
            1 => q += term,
            2 => p -= term,
            3 => q -= term,
            _ => p += term,
        }
    }

    // cos χ and sin χ from the exact reduction of x, not of x − phase
    let (sin_x, cos_x) = x.sin_cos();
    let (sin_phi, cos_phi) = ((f64::from(n % 4) / 2.0 + 0.25) * PI).sin_cos();
    let cos_chi = cos_x * cos_phi + sin_x * sin_phi;
    let sin_chi = sin_x * cos_phi - cos_x * sin_phi;

    (2.0 / (PI * x)).sqrt() * (p * cos_chi - q * sin_chi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xcothx_at_zero() {
        assert!((xcothx(0.0) - 1.0).abs() < 1e-6);
        assert!(xcothx(0.0).is_finite());
    }

    #[test]
    fn test_xcothx_continuous_at_zero() {
        for &x in &[1e-300, -1e-300, 1e-12, -1e-12, 1e-6, -1e-6] {
            assert!((xcothx(x) - 1.0).abs() < 1e-6, "x={} gave {}", x, xcothx(x));
        }
    }

    #[test]
    fn test_xcothx_large_argument() {
        // coth(x) -> sign(x) so x·coth(x) -> |x|
        assert!((xcothx(50.0) - 50.0).abs() < 1e-12);
        assert!((xcothx(-50.0) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_xcothx_known_value() {
        let expected = 1.0 / 1f64.tanh();
        assert!((xcothx(1.0) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_dxcothx_at_zero() {
        assert!(dxcothx(0.0).abs() < 1e-15);
        assert!(dxcothx(1e-17).abs() < 1e-15);
    }

    #[test]
    fn test_dxcothx_is_odd() {
        for &x in &[1e-5, 5e-3, 0.3, 2.0, 20.0] {
            assert!((dxcothx(x) + dxcothx(-x)).abs() < 1e-14, "x={}", x);
        }
    }

    #[test]
    fn test_dxcothx_matches_finite_difference() {
        for &x in &[1e-3, 9e-3, 1.1e-2, 0.5, 3.0] {
            let h = 1e-6;
            let fd = (xcothx(x + h) - xcothx(x - h)) / (2.0 * h);
            assert!((dxcothx(x) - fd).abs() < 1e-8, "x={}: {} vs {}", x, dxcothx(x), fd);
        }
    }

    #[test]
    fn test_dxcothx_series_joins_closed_form() {
        let below = dxcothx(DXCOTHX_SERIES_LIMIT * (1.0 - 1e-9));
        let above = dxcothx(DXCOTHX_SERIES_LIMIT * (1.0 + 1e-9));
        assert!((below - above).abs() < 1e-10);
    }

    #[test]
    fn test_dxcothx_saturates() {
        assert!((dxcothx(40.0) - 1.0).abs() < 1e-12);
        assert!((dxcothx(-40.0) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_guard_near_vs_exact() {
        let guard = SingularityGuard::new(1e-10);
        assert_eq!(guard.exact(1e-12), 1e-12);
        assert_eq!(guard.near(1e-12), 1e-10);
        assert_eq!(guard.exact(0.0), 1e-10);
        assert_eq!(guard.near(0.5), 0.5);
    }

    #[test]
    fn test_bessel_at_zero() {
        assert_eq!(bessel_jn(0, 0.0), 1.0);
        for n in 1..6 {
            assert_eq!(bessel_jn(n, 0.0), 0.0);
            assert_eq!(bessel_jn(-n, 0.0), 0.0);
        }
    }

    #[test]
    fn test_bessel_reference_values() {
        // Abramowitz & Stegun table 9.1
        let cases = [
            (0, 1.0, 0.765_197_686_557_966_6),
            (1, 1.0, 0.440_050_585_744_933_5),
            (2, 1.0, 0.114_903_484_931_900_5),
            (0, 2.404_825_557_695_773, 0.0),
            (1, 10.0, 0.043_472_746_168_861_44),
            (5, 3.0, 0.043_028_434_877_047_58),
        ];
        for (n, x, expected) in cases {
            let got = bessel_jn(n, x);
            assert!((got - expected).abs() < 1e-12, "J_{}({}) = {} (expected {})", n, x, got, expected);
        }
    }

    #[test]
    fn test_bessel_negative_order() {
        for n in 1..5 {
            let sign = if n % 2 == 0 { 1.0 } else { -1.0 };
            assert!((bessel_jn(-n, 2.7) - sign * bessel_jn(n, 2.7)).abs() < 1e-14);
        }
    }

    #[test]
    fn test_bessel_sum_of_squares() {
        // J_0² + 2 Σ J_n² = 1
        let x = 4.2;
        let total: f64 = (-40..=40).map(|n| bessel_jn(n, x).powi(2)).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bessel_large_argument_reference_values() {
        let cases = [
            (0, 100.0, 0.019_985_850_304_223_122),
            (1, 100.0, -0.077_145_352_014_112_16),
            (0, -100.0, 0.019_985_850_304_223_122),
            (1, -100.0, 0.077_145_352_014_112_16),
        ];
        for (n, x, expected) in cases {
            let got = bessel_jn(n, x);
            assert!((got - expected).abs() < 1e-12, "J_{}({}) = {} (expected {})", n, x, got, expected);
        }
    }

    #[test]
    fn test_bessel_expansion_joins_quadrature() {
        for n in [0u32, 1, 2, 3, 5] {
            for x in [26.0, 30.5, 41.0] {
                let quad = bessel_jn_quadrature(n, x);
                let asym = bessel_jn_asymptotic(n, x);
                assert!((quad - asym).abs() < 1e-12, "J_{}({}): {} vs {}", n, x, quad, asym);
            }
        }
    }

    #[test]
    fn test_bessel_huge_argument() {
        // Leading term sqrt(2/πx)·cos(x − π/4); corrections are O(1/8x)
        let x = 1e8;
        let leading = (2.0 / (PI * x)).sqrt() * (x.cos() + x.sin()) / 2f64.sqrt();
        assert!((bessel_jn(0, x) - leading).abs() < 1e-12);

        for x in [1e19, -1e19, 1e300] {
            let j = bessel_jn(0, x);
            assert!(j.is_finite());
            assert!(j.abs() <= (2.0 / (PI * x.abs())).sqrt() * (1.0 + 1e-9));
        }
        assert_eq!(bessel_jn(3, f64::INFINITY), 0.0);
        assert!(bessel_jn(0, f64::NAN).is_nan());
    }
}
