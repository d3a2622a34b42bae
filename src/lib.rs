//! Core compute kernels for a finite-difference time-domain (FDTD)
//! electromagnetic solver.
//!
//! This library provides the numerically dense pieces of a Yee-grid FDTD
//! code: the recursive-convolution CFS-PML boundary update kernels (in a
//! higher-order and a multipole formulation, at one or two poles), the
//! interior Maxwell half-step updates they augment, and the spectral
//! fractal generator used to seed heterogeneous material regions.
//!
//! Orchestration concerns (input parsing, geometry layering, sources,
//! output recording, domain decomposition) are left to the caller; the
//! kernels here own nothing but borrow disjoint views of the field state.

pub mod consts;
pub mod engine;
pub mod fractal;
pub mod grid;
pub mod materials;
pub mod pml;
pub mod update;

// Re-export commonly used types
pub use engine::array::{Real, RealComplex};
pub use grid::FdtdGrid;
pub use pml::{CfsPole, Face, Formulation, Pml, SlabBounds};

pub mod prelude {
    //! Common imports for driving the kernel library
    pub use crate::engine::array::{Complex64, Real, RealComplex};
    pub use crate::fractal::{
        generate_fractal_2d, generate_fractal_3d, FractalSurface, FractalVolume,
    };
    pub use crate::grid::FdtdGrid;
    pub use crate::materials::{build_tables, cfl_dt, Material};
    pub use crate::pml::{
        run_pml_e, run_pml_h, CfsPole, Face, Formulation, Pml, RProfiles, SlabBounds,
    };
    pub use crate::update::{update_electric, update_magnetic};
}
