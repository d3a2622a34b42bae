//! Interior Yee half-step update kernels.
//!
//! These sweep the whole grid, PML slabs included; the PML kernels then
//! augment the normal-derivative term of the cells they own. Tangential
//! electric components on the outer boundary nodes are left untouched,
//! which keeps the outer wall a perfect electric conductor.
//!
//! Each component update is partitioned over the first axis into
//! contiguous static chunks on a transient worker pool; iterations write
//! disjoint rows, so results are identical for any worker count.

use ndarray::parallel::prelude::*;
use ndarray::s;

use crate::engine::pool::{chunk_len, worker_pool};
use crate::grid::{FdtdGrid, EX, EY, EZ, HX, HY, HZ};

/// Advance the three electric components by one half-step.
pub fn update_electric(grid: &mut FdtdGrid, workers: usize) {
    let (nx, ny, nz) = (grid.nx, grid.ny, grid.nz);
    let ce = grid.updatecoeffs_e.view();
    let id = grid.id.view();
    let hx = grid.hx.view();
    let hy = grid.hy.view();
    let hz = grid.hz.view();
    let mut exw = grid.ex.slice_mut(s![0..nx, 1..ny, 1..nz]);
    let mut eyw = grid.ey.slice_mut(s![1..nx, 0..ny, 1..nz]);
    let mut ezw = grid.ez.slice_mut(s![1..nx, 1..ny, 0..nz]);
    let pool = worker_pool(workers);

    pool.install(|| {
        exw.outer_iter_mut()
            .into_par_iter()
            .enumerate()
            .with_min_len(chunk_len(nx, workers))
            .for_each(|(i, mut row)| {
                for j in 1..ny {
                    for k in 1..nz {
                        let m = id[[EX, i, j, k]] as usize;
                        row[[j - 1, k - 1]] = ce[[m, 0]] * row[[j - 1, k - 1]]
                            + ce[[m, 2]] * (hz[[i, j, k]] - hz[[i, j - 1, k]])
                            - ce[[m, 3]] * (hy[[i, j, k]] - hy[[i, j, k - 1]]);
                    }
                }
            });

        eyw.outer_iter_mut()
            .into_par_iter()
            .enumerate()
            .with_min_len(chunk_len(nx.saturating_sub(1), workers))
            .for_each(|(r, mut row)| {
                let i = r + 1;
                for j in 0..ny {
                    for k in 1..nz {
                        let m = id[[EY, i, j, k]] as usize;
                        row[[j, k - 1]] = ce[[m, 0]] * row[[j, k - 1]]
                            + ce[[m, 3]] * (hx[[i, j, k]] - hx[[i, j, k - 1]])
                            - ce[[m, 1]] * (hz[[i, j, k]] - hz[[i - 1, j, k]]);
                    }
                }
            });

        ezw.outer_iter_mut()
            .into_par_iter()
            .enumerate()
            .with_min_len(chunk_len(nx.saturating_sub(1), workers))
            .for_each(|(r, mut row)| {
                let i = r + 1;
                for j in 1..ny {
                    for k in 0..nz {
                        let m = id[[EZ, i, j, k]] as usize;
                        row[[j - 1, k]] = ce[[m, 0]] * row[[j - 1, k]]
                            + ce[[m, 1]] * (hy[[i, j, k]] - hy[[i - 1, j, k]])
                            - ce[[m, 2]] * (hx[[i, j, k]] - hx[[i, j - 1, k]]);
                    }
                }
            });
    });
}

/// Advance the three magnetic components by one half-step.
pub fn update_magnetic(grid: &mut FdtdGrid, workers: usize) {
    let (nx, ny, nz) = (grid.nx, grid.ny, grid.nz);
    let ch = grid.updatecoeffs_h.view();
    let id = grid.id.view();
    let ex = grid.ex.view();
    let ey = grid.ey.view();
    let ez = grid.ez.view();
    let mut hxw = grid.hx.slice_mut(s![1..nx, 0..ny, 0..nz]);
    let mut hyw = grid.hy.slice_mut(s![0..nx, 1..ny, 0..nz]);
    let mut hzw = grid.hz.slice_mut(s![0..nx, 0..ny, 1..nz]);
    let pool = worker_pool(workers);

    pool.install(|| {
        hxw.outer_iter_mut()
            .into_par_iter()
            .enumerate()
            .with_min_len(chunk_len(nx.saturating_sub(1), workers))
            .for_each(|(r, mut row)| {
                let i = r + 1;
                for j in 0..ny {
                    for k in 0..nz {
                        let m = id[[HX, i, j, k]] as usize;
                        row[[j, k]] = ch[[m, 0]] * row[[j, k]]
                            - ch[[m, 2]] * (ez[[i, j + 1, k]] - ez[[i, j, k]])
                            + ch[[m, 3]] * (ey[[i, j, k + 1]] - ey[[i, j, k]]);
                    }
                }
            });

        hyw.outer_iter_mut()
            .into_par_iter()
            .enumerate()
            .with_min_len(chunk_len(nx, workers))
            .for_each(|(i, mut row)| {
                for j in 1..ny {
                    for k in 0..nz {
                        let m = id[[HY, i, j, k]] as usize;
                        row[[j - 1, k]] = ch[[m, 0]] * row[[j - 1, k]]
                            - ch[[m, 3]] * (ex[[i, j, k + 1]] - ex[[i, j, k]])
                            + ch[[m, 1]] * (ez[[i + 1, j, k]] - ez[[i, j, k]]);
                    }
                }
            });

        hzw.outer_iter_mut()
            .into_par_iter()
            .enumerate()
            .with_min_len(chunk_len(nx, workers))
            .for_each(|(i, mut row)| {
                for j in 0..ny {
                    for k in 1..nz {
                        let m = id[[HZ, i, j, k]] as usize;
                        row[[j, k - 1]] = ch[[m, 0]] * row[[j, k - 1]]
                            - ch[[m, 1]] * (ey[[i + 1, j, k]] - ey[[i, j, k]])
                            + ch[[m, 2]] * (ex[[i, j + 1, k]] - ex[[i, j, k]]);
                    }
                }
            });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::array::Real;
    use crate::materials::{build_tables, cfl_dt, Material};

    fn vacuum_grid(n: usize) -> FdtdGrid {
        let dt = 0.5 * cfl_dt(1.0, 1.0, 1.0, 1.0);
        let mut grid = FdtdGrid::new(n, n, n, 1.0, 1.0, 1.0, dt);
        let (ce, ch) = build_tables(&[Material::free_space()], dt, 1.0, 1.0, 1.0, 1.0, 1.0);
        grid.set_materials(ce, ch);
        grid
    }

    #[test]
    fn zero_fields_stay_zero() {
        let mut grid = vacuum_grid(8);
        update_magnetic(&mut grid, 2);
        update_electric(&mut grid, 2);
        assert!(grid.ex.iter().all(|&v| v == 0.0));
        assert!(grid.hz.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn uniform_ez_produces_no_curl() {
        let mut grid = vacuum_grid(8);
        grid.ez.fill(1.0);
        update_magnetic(&mut grid, 1);
        assert!(grid.hx.iter().all(|&v| v == 0.0));
        assert!(grid.hy.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn ez_gradient_drives_hy() {
        let mut grid = vacuum_grid(8);
        for ((i, _j, _k), v) in grid.ez.indexed_iter_mut() {
            *v = i as Real;
        }
        update_magnetic(&mut grid, 1);
        let db = grid.updatecoeffs_h[[0, 1]];
        // dEz/dx = 1 everywhere, so Hy picks up +db in its update range
        assert_eq!(grid.hy[[3, 3, 3]], db);
        assert_eq!(grid.hy[[3, 0, 3]], 0.0);
    }

    #[test]
    fn worker_count_does_not_change_results() {
        let mut a = vacuum_grid(10);
        for ((i, j, k), v) in a.ez.indexed_iter_mut() {
            *v = ((i * 31 + j * 17 + k * 7) % 13) as Real * 0.25;
        }
        let mut b = a.clone();
        update_magnetic(&mut a, 1);
        update_electric(&mut a, 1);
        update_magnetic(&mut b, 4);
        update_electric(&mut b, 4);
        assert_eq!(a.hx, b.hx);
        assert_eq!(a.hy, b.hy);
        assert_eq!(a.hz, b.hz);
        assert_eq!(a.ex, b.ex);
        assert_eq!(a.ey, b.ey);
        assert_eq!(a.ez, b.ez);
    }
}
