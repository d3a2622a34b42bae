//! Physical constants in SI units.
//!
//! Normalised-unit work (tests, scaled problems) passes `1.0` in place of
//! these wherever a constructor takes a constant explicitly.

use crate::engine::array::Real;

/// Speed of light in vacuum (m/s).
pub const C0: Real = 299_792_458.0 as Real;

/// Permittivity of free space (F/m).
pub const EPS0: Real = 8.854_187_812_8e-12 as Real;

/// Permeability of free space (H/m).
pub const MU0: Real = 1.256_637_062_12e-6 as Real;

/// Impedance of free space (Ohm).
pub const Z0: Real = 376.730_313_668 as Real;
