//! Material constitutive parameters and update-coefficient tables.
//!
//! Each material maps to five electric and five magnetic coefficients
//! `[self, curl/dx, curl/dy, curl/dz, curl]` built with the standard
//! semi-implicit loss averaging. The tables are built once and frozen;
//! kernels index them through the grid's ID array.

use ndarray::Array2;

use crate::engine::array::Real;
use crate::grid::NUM_COEFFS;

/// An isotropic material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Relative permittivity.
    pub er: Real,
    /// Electric conductivity (S/m).
    pub se: Real,
    /// Relative permeability.
    pub mr: Real,
    /// Magnetic loss (Ohm/m).
    pub sm: Real,
}

impl Material {
    /// Lossless free space.
    pub fn free_space() -> Self {
        Self {
            er: 1.0,
            se: 0.0,
            mr: 1.0,
            sm: 0.0,
        }
    }

    /// Electric update coefficients for this material.
    pub fn update_coeffs_e(
        &self,
        dt: Real,
        dx: Real,
        dy: Real,
        dz: Real,
        eps0: Real,
    ) -> [Real; NUM_COEFFS] {
        let eps = self.er * eps0;
        let denom = 1.0 + self.se * dt / (2.0 * eps);
        let ca = (1.0 - self.se * dt / (2.0 * eps)) / denom;
        let cb = dt / eps / denom;
        [ca, cb / dx, cb / dy, cb / dz, cb]
    }

    /// Magnetic update coefficients for this material.
    pub fn update_coeffs_h(
        &self,
        dt: Real,
        dx: Real,
        dy: Real,
        dz: Real,
        mu0: Real,
    ) -> [Real; NUM_COEFFS] {
        let mu = self.mr * mu0;
        let denom = 1.0 + self.sm * dt / (2.0 * mu);
        let da = (1.0 - self.sm * dt / (2.0 * mu)) / denom;
        let db = dt / mu / denom;
        [da, db / dx, db / dy, db / dz, db]
    }
}

/// Build the electric and magnetic coefficient tables for a material set.
#[allow(clippy::too_many_arguments)]
pub fn build_tables(
    materials: &[Material],
    dt: Real,
    dx: Real,
    dy: Real,
    dz: Real,
    eps0: Real,
    mu0: Real,
) -> (Array2<Real>, Array2<Real>) {
    let mut coeffs_e = Array2::zeros((materials.len(), NUM_COEFFS));
    let mut coeffs_h = Array2::zeros((materials.len(), NUM_COEFFS));
    for (m, mat) in materials.iter().enumerate() {
        let ce = mat.update_coeffs_e(dt, dx, dy, dz, eps0);
        let ch = mat.update_coeffs_h(dt, dx, dy, dz, mu0);
        for c in 0..NUM_COEFFS {
            coeffs_e[[m, c]] = ce[c];
            coeffs_h[[m, c]] = ch[c];
        }
    }
    (coeffs_e, coeffs_h)
}

/// CFL-limited time step for wave speed `c` on a uniform grid.
pub fn cfl_dt(dx: Real, dy: Real, dz: Real, c: Real) -> Real {
    1.0 / (c * (1.0 / (dx * dx) + 1.0 / (dy * dy) + 1.0 / (dz * dz)).sqrt())
}
