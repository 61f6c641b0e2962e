//! Zero- and finite-frequency noise of a tunnel junction.
//!
//! In the tunneling regime the non-symmetrized current noise spectral density
//! at zero frequency is
//!
//! ```text
//! Sii(I) = 2kT/R · x·coth(x),   x = eRI / 2kT
//! ```
//!
//! which interpolates between thermal noise `2kT/R` at `I = 0` and shot
//! noise `e|I|` at `eRI >> kT`.

use nalgebra::DVector;

use crate::constants::{BOLTZMANN, ELECTRON_CHARGE, PLANCK};
use crate::error::{Result, ensure_positive};
use crate::special::{dxcothx, xcothx};

/// A tunnel junction with its resistance and electron temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunnelJunction {
    resistance: f64,
    temperature: f64,
}

impl TunnelJunction {
    /// Create a junction.
    ///
    /// # Arguments
    /// * `resistance` - Tunnel resistance in Ohms (> 0)
    /// * `temperature` - Electron temperature in Kelvin (> 0)
    pub fn new(resistance: f64, temperature: f64) -> Result<Self> {
        Ok(Self {
            resistance: ensure_positive("resistance", resistance)?,
            temperature: ensure_positive("temperature", temperature)?,
        })
    }

    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Thermal energy scale 2kT (J).
    fn two_kt(&self) -> f64 {
        2.0 * BOLTZMANN * self.temperature
    }

    /// Reduced bias eRI / 2kT.
    pub fn reduced_bias(&self, current: f64) -> f64 {
        ELECTRON_CHARGE * self.resistance * current / self.two_kt()
    }

    /// Noise spectral density Sii (A²/Hz) at zero frequency.
    pub fn sii(&self, current: f64) -> f64 {
        self.two_kt() / self.resistance * xcothx(self.reduced_bias(current))
    }

    /// Derivative dSii/dV (A²/Hz/V) at zero frequency.
    pub fn dsii_dv(&self, current: f64) -> f64 {
        ELECTRON_CHARGE / self.resistance * dxcothx(self.reduced_bias(current))
    }

    /// Noise spectral density at finite frequency `frequency` (Hz).
    ///
    /// Sums the emission and absorption sides, `eV ± hf`, each weighted by
    /// `kT/R`. Reduces to [`sii`](Self::sii) at zero frequency.
    pub fn sii_at_frequency(&self, current: f64, frequency: f64) -> f64 {
        let ev = ELECTRON_CHARGE * current * self.resistance;
        let hf = PLANCK * frequency;
        let two_kt = self.two_kt();
        let sides = xcothx((ev - hf) / two_kt) + xcothx((ev + hf) / two_kt);
        sides * BOLTZMANN * self.temperature / self.resistance
    }

    /// [`sii`](Self::sii) over an operating-point vector.
    pub fn sii_vec(&self, currents: &DVector<f64>) -> DVector<f64> {
        currents.map(|i| self.sii(i))
    }

    /// [`dsii_dv`](Self::dsii_dv) over an operating-point vector.
    pub fn dsii_dv_vec(&self, currents: &DVector<f64>) -> DVector<f64> {
        currents.map(|i| self.dsii_dv(i))
    }

    /// [`sii_at_frequency`](Self::sii_at_frequency) over an operating-point vector.
    pub fn sii_at_frequency_vec(&self, currents: &DVector<f64>, frequency: f64) -> DVector<f64> {
        currents.map(|i| self.sii_at_frequency(i, frequency))
    }
}

/// Zero-frequency noise spectral density Sii(I, R, T) in A²/Hz.
pub fn sii(current: f64, resistance: f64, temperature: f64) -> Result<f64> {
    Ok(TunnelJunction::new(resistance, temperature)?.sii(current))
}

/// Voltage derivative dSii/dV(I, R, T) in A²/Hz/V.
pub fn dsii_dv(current: f64, resistance: f64, temperature: f64) -> Result<f64> {
    Ok(TunnelJunction::new(resistance, temperature)?.dsii_dv(current))
}

/// Finite-frequency noise spectral density S(I, f, R, T) in A²/Hz.
pub fn sii_at_frequency(
    current: f64,
    frequency: f64,
    resistance: f64,
    temperature: f64,
) -> Result<f64> {
    Ok(TunnelJunction::new(resistance, temperature)?.sii_at_frequency(current, frequency))
}
