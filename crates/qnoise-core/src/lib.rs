//! Physical model layer for qnoise.
//!
//! This crate provides the pieces every higher-level computation is built on:
//! physical constants, the singularity-safe `x·coth(x)` family, integer-order
//! Bessel functions, and the noise spectral density of a tunnel junction.

pub mod constants;
pub mod error;
pub mod junction;
pub mod special;
pub mod units;

pub use error::{Error, Result};
pub use junction::{TunnelJunction, dsii_dv, sii, sii_at_frequency};
pub use special::{SingularityGuard, bessel_jn, dxcothx, xcothx};
pub use units::{PowerUnit, dbm_to_watts, watts_to_dbm};
