//! Physical constants in SI units.
//!
//! Exact values of the 2019 SI redefinition (CODATA 2018).

/// Boltzmann constant (J/K)
pub const BOLTZMANN: f64 = 1.380_649e-23;

/// Elementary charge (C)
pub const ELECTRON_CHARGE: f64 = 1.602_176_634e-19;

/// Planck constant (J·s)
pub const PLANCK: f64 = 6.626_070_15e-34;

/// Thermal energy k·T (J).
pub fn thermal_energy(temperature: f64) -> f64 {
    BOLTZMANN * temperature
}

/// Photon energy h·f (J).
pub fn photon_energy(frequency: f64) -> f64 {
    PLANCK * frequency
}
