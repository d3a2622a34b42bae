//! Yee-grid field state container.
//!
//! [`FdtdGrid`] owns the six field component arrays, the per-cell
//! material index array and the material update-coefficient tables.
//! Kernels never own storage: each call borrows mutable views of the two
//! components it writes and read-only views of everything else, with the
//! borrow checker confirming non-aliasing at zero runtime cost.
//!
//! Component arrays carry one extra node per axis, `(nx+1, ny+1, nz+1)`,
//! so that every staggered Yee position of an `nx × ny × nz` cell domain
//! has a storage slot. Arrays are dense, row-major, last axis contiguous.

use ndarray::{Array2, Array3, Array4};

use crate::engine::array::Real;

/// Component index of Ex along axis 0 of the material ID array.
pub const EX: usize = 0;
/// Component index of Ey.
pub const EY: usize = 1;
/// Component index of Ez.
pub const EZ: usize = 2;
/// Component index of Hx.
pub const HX: usize = 3;
/// Component index of Hy.
pub const HY: usize = 4;
/// Component index of Hz.
pub const HZ: usize = 5;

/// Number of field components tracked by the ID array.
pub const NUM_COMPONENTS: usize = 6;

/// Coefficients stored per material: `[self, curl/dx, curl/dy, curl/dz, curl]`.
pub const NUM_COEFFS: usize = 5;

/// Column holding the curl weight without the spatial-step division; the
/// PML kernels apply their own 1/d along the slab normal.
pub const CURL: usize = 4;

/// Field state for one FDTD domain.
#[derive(Debug, Clone)]
pub struct FdtdGrid {
    /// Domain size in cells.
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    /// Grid spacing.
    pub dx: Real,
    pub dy: Real,
    pub dz: Real,
    /// Time step.
    pub dt: Real,
    /// Electric field components.
    pub ex: Array3<Real>,
    pub ey: Array3<Real>,
    pub ez: Array3<Real>,
    /// Magnetic field components.
    pub hx: Array3<Real>,
    pub hy: Array3<Real>,
    pub hz: Array3<Real>,
    /// Material index per component per cell, `[6, nx+1, ny+1, nz+1]`.
    pub id: Array4<u32>,
    /// Electric update coefficients, one row per material.
    pub updatecoeffs_e: Array2<Real>,
    /// Magnetic update coefficients, one row per material.
    pub updatecoeffs_h: Array2<Real>,
}

impl FdtdGrid {
    /// Create a zero-initialised grid. Material tables start empty; fill
    /// them with [`FdtdGrid::set_materials`] before stepping.
    pub fn new(
        nx: usize,
        ny: usize,
        nz: usize,
        dx: Real,
        dy: Real,
        dz: Real,
        dt: Real,
    ) -> Self {
        let dims = (nx + 1, ny + 1, nz + 1);
        Self {
            nx,
            ny,
            nz,
            dx,
            dy,
            dz,
            dt,
            ex: Array3::zeros(dims),
            ey: Array3::zeros(dims),
            ez: Array3::zeros(dims),
            hx: Array3::zeros(dims),
            hy: Array3::zeros(dims),
            hz: Array3::zeros(dims),
            id: Array4::zeros((NUM_COMPONENTS, dims.0, dims.1, dims.2)),
            updatecoeffs_e: Array2::zeros((0, NUM_COEFFS)),
            updatecoeffs_h: Array2::zeros((0, NUM_COEFFS)),
        }
    }

    /// Install the frozen update-coefficient tables. Every ID entry must
    /// index a row of both tables.
    pub fn set_materials(&mut self, coeffs_e: Array2<Real>, coeffs_h: Array2<Real>) {
        assert_eq!(coeffs_e.ncols(), NUM_COEFFS, "electric table must have 5 columns");
        assert_eq!(coeffs_h.ncols(), NUM_COEFFS, "magnetic table must have 5 columns");
        assert_eq!(
            coeffs_e.nrows(),
            coeffs_h.nrows(),
            "tables must describe the same material set"
        );
        self.updatecoeffs_e = coeffs_e;
        self.updatecoeffs_h = coeffs_h;
    }

    /// Shape of the component arrays.
    pub fn field_dims(&self) -> (usize, usize, usize) {
        (self.nx + 1, self.ny + 1, self.nz + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_shapes() {
        let grid = FdtdGrid::new(10, 12, 14, 1.0, 1.0, 1.0, 0.5);
        assert_eq!(grid.ex.shape(), &[11, 13, 15]);
        assert_eq!(grid.hz.shape(), &[11, 13, 15]);
        assert_eq!(grid.id.shape(), &[6, 11, 13, 15]);
        assert_eq!(grid.field_dims(), (11, 13, 15));
    }

    #[test]
    fn grid_starts_zeroed() {
        let grid = FdtdGrid::new(4, 4, 4, 1.0, 1.0, 1.0, 0.5);
        assert!(grid.ez.iter().all(|&v| v == 0.0));
        assert!(grid.id.iter().all(|&v| v == 0));
    }

    #[test]
    #[should_panic(expected = "5 columns")]
    fn rejects_malformed_tables() {
        let mut grid = FdtdGrid::new(2, 2, 2, 1.0, 1.0, 1.0, 0.5);
        grid.set_materials(Array2::zeros((1, 4)), Array2::zeros((1, 5)));
    }
}
