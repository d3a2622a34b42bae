//! Shared helpers for the kernel integration tests
#![allow(dead_code)]

use fdtd_core::materials::{build_tables, cfl_dt, Material};
use fdtd_core::prelude::*;
use ndarray::{Array2, ArrayView3};

/// Vacuum grid in normalised units (eps0 = mu0 = c = 1, unit spacing).
pub fn vacuum_grid(n: usize, dt_scale: Real) -> FdtdGrid {
    let dt = dt_scale * cfl_dt(1.0, 1.0, 1.0, 1.0);
    let mut grid = FdtdGrid::new(n, n, n, 1.0, 1.0, 1.0, dt);
    let (ce, ch) = build_tables(&[Material::free_space()], dt, 1.0, 1.0, 1.0, 1.0, 1.0);
    grid.set_materials(ce, ch);
    grid
}

/// Deterministic non-trivial fill for every field component.
pub fn seed_fields(grid: &mut FdtdGrid) {
    let fill = |arr: &mut ndarray::Array3<Real>, salt: usize| {
        for ((i, j, k), v) in arr.indexed_iter_mut() {
            *v = (((i * 31 + j * 17 + k * 7 + salt * 13) % 23) as Real - 11.0) * 0.125;
        }
    };
    fill(&mut grid.ex, 1);
    fill(&mut grid.ey, 2);
    fill(&mut grid.ez, 3);
    fill(&mut grid.hx, 4);
    fill(&mut grid.hy, 5);
    fill(&mut grid.hz, 6);
}

/// Profiles that are constant along the slab depth.
pub fn const_profiles(depth: usize, ra: &[Real], rb: &[Real], re: &[Real], rf: &[Real]) -> RProfiles {
    let order = ra.len();
    let row = |vals: &[Real]| {
        let mut a = Array2::zeros((order, depth));
        for p in 0..order {
            for i in 0..depth {
                a[[p, i]] = vals[p];
            }
        }
        a
    };
    RProfiles {
        ra: row(ra),
        rb: row(rb),
        re: row(re),
        rf: row(rf),
    }
}

/// Identity profiles: RA = 1, RB = RE = RF = 0 (order 1).
pub fn unit_profiles(depth: usize) -> RProfiles {
    const_profiles(depth, &[1.0], &[0.0], &[0.0], &[0.0])
}

/// Slab bounds for every face of an `n` cube with `t`-cell layers,
/// tiled so no two slabs claim the same cells.
pub fn slab_bounds(face: Face, n: usize, t: usize) -> SlabBounds {
    match face {
        Face::XMinus => SlabBounds::new(0, t, 0, n, 0, n),
        Face::XPlus => SlabBounds::new(n - t, n, 0, n, 0, n),
        Face::YMinus => SlabBounds::new(t, n - t, 0, t, 0, n),
        Face::YPlus => SlabBounds::new(t, n - t, n - t, n, 0, n),
        Face::ZMinus => SlabBounds::new(t, n - t, t, n - t, 0, t),
        Face::ZPlus => SlabBounds::new(t, n - t, t, n - t, n - t, n),
    }
}

pub const ALL_FACES: [Face; 6] = [
    Face::XMinus,
    Face::XPlus,
    Face::YMinus,
    Face::YPlus,
    Face::ZMinus,
    Face::ZPlus,
];

/// Six PML slabs around an `n` cube, built from CFS poles.
pub fn all_slabs(
    n: usize,
    t: usize,
    formulation: Formulation,
    poles: &[CfsPole],
    dt: Real,
) -> Vec<Pml> {
    ALL_FACES
        .iter()
        .map(|&face| {
            Pml::new(
                face,
                slab_bounds(face, n, t),
                formulation,
                poles,
                dt,
                1.0,
                1.0,
                1.0,
            )
        })
        .collect()
}

/// Largest absolute difference between two field arrays.
pub fn max_abs_diff(a: ArrayView3<Real>, b: ArrayView3<Real>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64 - *y as f64).abs())
        .fold(0.0, f64::max)
}

/// Root-mean-square of Ez over the six inner faces of the PML region.
pub fn inner_face_rms(grid: &FdtdGrid, n: usize, t: usize) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    let lo = t;
    let hi = n - t;
    for a in lo..hi {
        for b in lo..hi {
            for &v in &[
                grid.ez[[lo, a, b]],
                grid.ez[[hi, a, b]],
                grid.ez[[a, lo, b]],
                grid.ez[[a, hi, b]],
                grid.ez[[a, b, lo]],
                grid.ez[[a, b, hi]],
            ] {
                sum += (v as f64) * (v as f64);
                count += 1;
            }
        }
    }
    (sum / count as f64).sqrt()
}

/// Gaussian pulse waveform.
pub fn gaussian(t: f64, t0: f64, tau: f64) -> Real {
    (-((t - t0) / tau).powi(2)).exp() as Real
}
