//! Photon-assisted shot noise of a tunnel junction.
//!
//! Under an AC bias `I_ac` at frequency `f0` an electron tunnels while
//! absorbing or emitting `n` photons with probability `J_n(v_ac)²`,
//! `v_ac = e·I_ac·R / (h·f0)`. The measured noise at frequency `f` is the
//! weighted sum of finite-frequency noise at the shifted biases:
//!
//! ```text
//! S = Σ_{n=-N..N} J_n(v_ac)² · [x±(n)·coth x±(n)] · kT/R
//! x±(n) = (eIR ± hf − n·hf0) / 2kT
//! ```
//!
//! The series is truncated at a fixed order `N`. It is not summed until
//! convergence; raising `N` buys accuracy at large `v_ac` for linear cost.

use nalgebra::DVector;
use qnoise_core::constants::{BOLTZMANN, ELECTRON_CHARGE, PLANCK};
use qnoise_core::error::ensure_positive;
use qnoise_core::{TunnelJunction, bessel_jn, xcothx};

use crate::error::Result;
use crate::sampler::{broadcast_at, broadcast_len};

/// Default sideband truncation order.
pub const DEFAULT_SIDEBAND_ORDER: usize = 5;

/// Configuration for the sideband sum.
#[derive(Debug, Clone)]
pub struct SidebandConfig {
    /// Highest sideband index N; the sum runs over `2N + 1` terms.
    pub order: usize,
}

impl Default for SidebandConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_SIDEBAND_ORDER,
        }
    }
}

impl SidebandConfig {
    /// Truncate the sum at sideband `order`.
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }
}

/// Photon-assisted noise spectral density (A²/Hz) across operating points.
///
/// # Arguments
/// * `junction` - Junction resistance and temperature
/// * `current` - DC bias current I (A), length P or 1
/// * `frequency` - Detection frequency f (Hz)
/// * `ac_current` - Drive amplitude I_ac (A), length P or 1
/// * `drive_frequency` - Drive frequency f0 (Hz, > 0)
/// * `config` - Sideband truncation
pub fn photo_assisted_noise(
    junction: &TunnelJunction,
    current: &DVector<f64>,
    frequency: f64,
    ac_current: &DVector<f64>,
    drive_frequency: f64,
    config: &SidebandConfig,
) -> Result<DVector<f64>> {
    let drive_frequency = ensure_positive("drive frequency", drive_frequency)?;
    let points = broadcast_len(&[current, ac_current])?;

    let r = junction.resistance();
    let kt = BOLTZMANN * junction.temperature();
    let hf = PLANCK * frequency;
    let hf0 = PLANCK * drive_frequency;
    let n_max = config.order as i32;

    let noise = DVector::from_fn(points, |i, _| {
        let ev = ELECTRON_CHARGE * broadcast_at(current, i) * r;
        let v_ac = ELECTRON_CHARGE * broadcast_at(ac_current, i) * r / hf0;

        (-n_max..=n_max)
            .map(|n| {
                let weight = bessel_jn(n, v_ac).powi(2);
                let shift = n as f64 * hf0;
                let plus = (ev + hf - shift) / (2.0 * kt);
                let minus = (ev - hf - shift) / (2.0 * kt);
                weight * (xcothx(plus) + xcothx(minus))
            })
            .sum::<f64>()
            * kt
            / r
    });

    log::debug!(
        "photon-assisted noise: {} points, {} sidebands",
        points,
        2 * config.order + 1
    );
    Ok(noise)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use nalgebra::dvector;

    fn junction() -> TunnelJunction {
        TunnelJunction::new(50.0, 0.02).unwrap()
    }

    #[test]
    fn test_no_drive_reduces_to_finite_frequency_noise() {
        let j = junction();
        let currents = dvector![-4e-7, -1e-7, 0.0, 5e-8, 3e-7];
        let f = 5e9;

        let pat = photo_assisted_noise(
            &j,
            &currents,
            f,
            &dvector![0.0],
            6e9,
            &SidebandConfig::default(),
        )
        .unwrap();
        let expected = j.sii_at_frequency_vec(&currents, f);
        for i in 0..currents.len() {
            assert!(
                (pat[i] - expected[i]).abs() <= expected[i] * 1e-12,
                "I={}: {} vs {}",
                currents[i],
                pat[i],
                expected[i]
            );
        }
    }

    #[test]
    fn test_high_bias_insensitive_to_drive() {
        // Far above hf0 and kT the sidebands average the linear shot noise
        // back to e|I|, independently of the drive amplitude
        let j = junction();
        let current = dvector![2e-5];
        let config = SidebandConfig::default().with_order(20);
        let without = photo_assisted_noise(&j, &current, 0.0, &dvector![0.0], 6e9, &config).unwrap();
        let with = photo_assisted_noise(&j, &current, 0.0, &dvector![1e-6], 6e9, &config).unwrap();
        assert!((with[0] - without[0]).abs() <= without[0] * 1e-9);
    }

    #[test]
    fn test_drive_raises_equilibrium_noise() {
        let j = junction();
        let zero = dvector![0.0];
        let config = SidebandConfig::default();
        let quiet = photo_assisted_noise(&j, &zero, 0.0, &dvector![0.0], 6e9, &config).unwrap();
        let driven = photo_assisted_noise(&j, &zero, 0.0, &dvector![2e-7], 6e9, &config).unwrap();
        assert!(driven[0] > quiet[0]);
    }

    #[test]
    fn test_truncation_converges() {
        let j = junction();
        let current = dvector![1e-7];
        let ac = dvector![3e-7];
        let low = photo_assisted_noise(
            &j,
            &current,
            1e9,
            &ac,
            6e9,
            &SidebandConfig::default().with_order(15),
        )
        .unwrap();
        let high = photo_assisted_noise(
            &j,
            &current,
            1e9,
            &ac,
            6e9,
            &SidebandConfig::default().with_order(30),
        )
        .unwrap();
        assert!((low[0] - high[0]).abs() <= high[0] * 1e-12);
    }

    #[test]
    fn test_vector_drive_broadcasts() {
        let j = junction();
        let out = photo_assisted_noise(
            &j,
            &dvector![1e-7],
            0.0,
            &dvector![0.0, 1e-7, 2e-7],
            6e9,
            &SidebandConfig::default(),
        )
        .unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let j = junction();
        let err = photo_assisted_noise(
            &j,
            &dvector![0.0],
            0.0,
            &dvector![1e-7],
            0.0,
            &SidebandConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Model(qnoise_core::Error::NonPositive { .. })));

        let err = photo_assisted_noise(
            &j,
            &dvector![0.0, 1.0, 2.0],
            0.0,
            &dvector![1e-7, 2e-7],
            6e9,
            &SidebandConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Model(qnoise_core::Error::ShapeMismatch { .. })));
    }
}
