//! Monomorphised PML update kernel templates.
//!
//! The kernel variants factor into three orthogonal pieces:
//!
//! * a per-face index map along the slab normal — minus faces run the
//!   normal axis outward from the interface, with electric nodes offset
//!   one cell from magnetic nodes by the Yee staggering;
//! * a curl difference along the normal — forward for magnetic kernels,
//!   backward for electric ones;
//! * a per-cell recursive-convolution step, selected at compile time via
//!   the [`Convolution`] trait so each variant monomorphises to a tight
//!   loop.
//!
//! One template per normal axis and field kind instantiates all of the
//! face/order/formulation combinations. The outermost loop is split into
//! contiguous static chunks over a transient worker pool; every chunk
//! writes disjoint rows of the field and Phi arrays.

use ndarray::parallel::prelude::*;
use ndarray::{s, Array2, ArrayView2, ArrayView3, ArrayView4, ArrayViewMut3, ArrayViewMut4, Axis};

use crate::engine::array::Real;
use crate::engine::pool::{chunk_len, worker_pool};
use crate::grid::{CURL, EX, EY, EZ, HX, HY, HZ};

use super::{Face, RProfiles, SlabBounds};

/// Pole coefficients loaded at one profile depth.
#[derive(Debug, Clone, Copy)]
pub struct RCell {
    pub ra: [Real; 2],
    pub rb: [Real; 2],
    pub re: [Real; 2],
    pub rf: [Real; 2],
}

impl RCell {
    #[inline]
    fn load(r: &RProfiles, order: usize, i: usize) -> Self {
        let pole = |a: &Array2<Real>, p: usize| -> Real {
            if p < order {
                a[[p, i]]
            } else {
                0.0
            }
        };
        RCell {
            ra: [pole(&r.ra, 0), pole(&r.ra, 1)],
            rb: [pole(&r.rb, 0), pole(&r.rb, 1)],
            re: [pole(&r.re, 0), pole(&r.re, 1)],
            rf: [pole(&r.rf, 0), pole(&r.rf, 1)],
        }
    }
}

/// Per-cell recursive-convolution step.
///
/// `apply` returns the correction term computed from the pre-update Phi
/// values and advances the Phi cell in place. `phi` is one slab row,
/// shaped `[order, nb, nc]` in slab-local index order.
pub trait Convolution: Send + Sync {
    const ORDER: usize;
    fn apply(rc: &RCell, dd: Real, phi: &mut ArrayViewMut3<Real>, j: usize, k: usize) -> Real;
}

/// Higher-order formulation, one pole.
pub struct HigherOrder1;

impl Convolution for HigherOrder1 {
    const ORDER: usize = 1;

    #[inline]
    fn apply(rc: &RCell, dd: Real, phi: &mut ArrayViewMut3<Real>, j: usize, k: usize) -> Real {
        let p0 = phi[[0, j, k]];
        let correction = (rc.ra[0] - 1.0) * dd + rc.rb[0] * p0;
        phi[[0, j, k]] = rc.re[0] * p0 - rc.rf[0] * dd;
        correction
    }
}

/// Higher-order formulation, two poles composed multiplicatively.
pub struct HigherOrder2;

impl Convolution for HigherOrder2 {
    const ORDER: usize = 2;

    #[inline]
    fn apply(rc: &RCell, dd: Real, phi: &mut ArrayViewMut3<Real>, j: usize, k: usize) -> Real {
        let p0 = phi[[0, j, k]];
        let p1 = phi[[1, j, k]];
        let correction =
            (rc.ra[0] * rc.ra[1] - 1.0) * dd + rc.ra[1] * rc.rb[0] * p0 + rc.rb[1] * p1;
        // the outer pole filters the inner stretched derivative, so it
        // must read the first pole's pre-update value
        phi[[1, j, k]] = rc.re[1] * p1 - rc.rf[1] * (rc.ra[0] * dd + rc.rb[0] * p0);
        phi[[0, j, k]] = rc.re[0] * p0 - rc.rf[0] * dd;
        correction
    }
}

/// Multipole formulation, one pole, advanced semi-implicitly.
pub struct Multipole1;

impl Convolution for Multipole1 {
    const ORDER: usize = 1;

    #[inline]
    fn apply(rc: &RCell, dd: Real, phi: &mut ArrayViewMut3<Real>, j: usize, k: usize) -> Real {
        let p0 = phi[[0, j, k]];
        let ira = 1.0 / rc.ra[0];
        let rc0 = ira * rc.rb[0] * rc.rf[0];
        let correction = (ira - 1.0) * dd - ira * p0;
        // relaxation uses the stale accumulator on the right-hand side
        phi[[0, j, k]] = rc.re[0] * p0 + rc0 * dd - rc0 * p0;
        correction
    }
}

/// Multipole formulation, two poles sharing the aggregated drive.
pub struct Multipole2;

impl Convolution for Multipole2 {
    const ORDER: usize = 2;

    #[inline]
    fn apply(rc: &RCell, dd: Real, phi: &mut ArrayViewMut3<Real>, j: usize, k: usize) -> Real {
        let p0 = phi[[0, j, k]];
        let p1 = phi[[1, j, k]];
        let ira = 1.0 / (rc.ra[0] + rc.ra[1]);
        let psi = rc.rb[0] * p0 + rc.rb[1] * p1;
        let correction = (ira - 1.0) * dd - ira * psi;
        phi[[1, j, k]] = rc.re[1] * p1 + ira * rc.rf[1] * (dd - psi);
        phi[[0, j, k]] = rc.re[0] * p0 + ira * rc.rf[0] * (dd - psi);
        correction
    }
}

/// Global index of a magnetic node at slab-local normal index `i`.
#[inline]
fn global_h(minus: bool, start: usize, end: usize, i: usize) -> usize {
    if minus {
        end - 1 - i
    } else {
        start + i
    }
}

/// Global index of an electric node at slab-local normal index `i`.
/// Minus faces sit one node deeper than their magnetic counterparts.
#[inline]
fn global_e(minus: bool, start: usize, end: usize, i: usize) -> usize {
    if minus {
        end - i
    } else {
        start + i
    }
}

/// View of the cells a kernel owns, in slab-local order along axis 0.
fn writable_x<'a>(
    a: ArrayViewMut3<'a, Real>,
    b: &SlabBounds,
    minus: bool,
    shift: usize,
) -> ArrayViewMut3<'a, Real> {
    if minus {
        a.slice_move(s![b.xs + shift..b.xf + shift;-1, b.ys..b.yf, b.zs..b.zf])
    } else {
        a.slice_move(s![b.xs..b.xf, b.ys..b.yf, b.zs..b.zf])
    }
}

fn writable_y<'a>(
    a: ArrayViewMut3<'a, Real>,
    b: &SlabBounds,
    minus: bool,
    shift: usize,
) -> ArrayViewMut3<'a, Real> {
    if minus {
        a.slice_move(s![b.xs..b.xf, b.ys + shift..b.yf + shift;-1, b.zs..b.zf])
    } else {
        a.slice_move(s![b.xs..b.xf, b.ys..b.yf, b.zs..b.zf])
    }
}

fn writable_z<'a>(
    a: ArrayViewMut3<'a, Real>,
    b: &SlabBounds,
    minus: bool,
    shift: usize,
) -> ArrayViewMut3<'a, Real> {
    if minus {
        a.slice_move(s![b.xs..b.xf, b.ys..b.yf, b.zs + shift..b.zf + shift;-1])
    } else {
        a.slice_move(s![b.xs..b.xf, b.ys..b.yf, b.zs..b.zf])
    }
}

/// Magnetic kernel for the x-normal faces: updates Hy and Hz from the
/// forward x-difference of Ez and Ey.
#[allow(clippy::too_many_arguments)]
pub fn magnetic_x<C: Convolution>(
    face: Face,
    b: &SlabBounds,
    workers: usize,
    coeffs_h: ArrayView2<Real>,
    id: ArrayView4<u32>,
    ey: ArrayView3<Real>,
    ez: ArrayView3<Real>,
    hy: ArrayViewMut3<Real>,
    hz: ArrayViewMut3<Real>,
    mut phi1: ArrayViewMut4<Real>,
    mut phi2: ArrayViewMut4<Real>,
    r: &RProfiles,
    d: Real,
) {
    let (nx, ny, nz) = b.dims();
    let rd = 1.0 / d;
    let minus = face.is_minus();
    let mut hy_w = writable_x(hy, b, minus, 0);
    let mut hz_w = writable_x(hz, b, minus, 0);
    let pool = worker_pool(workers);

    pool.install(|| {
        hy_w.outer_iter_mut()
            .into_par_iter()
            .zip(hz_w.outer_iter_mut())
            .zip(phi1.axis_iter_mut(Axis(1)))
            .zip(phi2.axis_iter_mut(Axis(1)))
            .enumerate()
            .with_min_len(chunk_len(nx, workers))
            .for_each(|(i, (((mut hy_r, mut hz_r), mut p1), mut p2))| {
                let ii = global_h(minus, b.xs, b.xf, i);
                let rc = RCell::load(r, C::ORDER, i);
                for j in 0..ny {
                    let jj = j + b.ys;
                    for k in 0..nz {
                        let kk = k + b.zs;
                        let dez = (ez[[ii + 1, jj, kk]] - ez[[ii, jj, kk]]) * rd;
                        let dey = (ey[[ii + 1, jj, kk]] - ey[[ii, jj, kk]]) * rd;
                        let c_hy = coeffs_h[[id[[HY, ii, jj, kk]] as usize, CURL]];
                        let c_hz = coeffs_h[[id[[HZ, ii, jj, kk]] as usize, CURL]];
                        hy_r[[j, k]] += c_hy * C::apply(&rc, dez, &mut p1, j, k);
                        hz_r[[j, k]] -= c_hz * C::apply(&rc, dey, &mut p2, j, k);
                    }
                }
            });
    });
}

/// Electric kernel for the x-normal faces: updates Ey and Ez from the
/// backward x-difference of Hz and Hy.
#[allow(clippy::too_many_arguments)]
pub fn electric_x<C: Convolution>(
    face: Face,
    b: &SlabBounds,
    workers: usize,
    coeffs_e: ArrayView2<Real>,
    id: ArrayView4<u32>,
    hy: ArrayView3<Real>,
    hz: ArrayView3<Real>,
    ey: ArrayViewMut3<Real>,
    ez: ArrayViewMut3<Real>,
    mut phi1: ArrayViewMut4<Real>,
    mut phi2: ArrayViewMut4<Real>,
    r: &RProfiles,
    d: Real,
) {
    let (nx, ny, nz) = b.dims();
    let rd = 1.0 / d;
    let minus = face.is_minus();
    let mut ey_w = writable_x(ey, b, minus, 1);
    let mut ez_w = writable_x(ez, b, minus, 1);
    let pool = worker_pool(workers);

    pool.install(|| {
        ey_w.outer_iter_mut()
            .into_par_iter()
            .zip(ez_w.outer_iter_mut())
            .zip(phi1.axis_iter_mut(Axis(1)))
            .zip(phi2.axis_iter_mut(Axis(1)))
            .enumerate()
            .with_min_len(chunk_len(nx, workers))
            .for_each(|(i, (((mut ey_r, mut ez_r), mut p1), mut p2))| {
                let ii = global_e(minus, b.xs, b.xf, i);
                let rc = RCell::load(r, C::ORDER, i);
                for j in 0..ny {
                    let jj = j + b.ys;
                    for k in 0..nz {
                        let kk = k + b.zs;
                        let dhz = (hz[[ii, jj, kk]] - hz[[ii - 1, jj, kk]]) * rd;
                        let dhy = (hy[[ii, jj, kk]] - hy[[ii - 1, jj, kk]]) * rd;
                        let c_ey = coeffs_e[[id[[EY, ii, jj, kk]] as usize, CURL]];
                        let c_ez = coeffs_e[[id[[EZ, ii, jj, kk]] as usize, CURL]];
                        ey_r[[j, k]] -= c_ey * C::apply(&rc, dhz, &mut p1, j, k);
                        ez_r[[j, k]] += c_ez * C::apply(&rc, dhy, &mut p2, j, k);
                    }
                }
            });
    });
}

/// Magnetic kernel for the y-normal faces: updates Hx and Hz from the
/// forward y-difference of Ez and Ex.
#[allow(clippy::too_many_arguments)]
pub fn magnetic_y<C: Convolution>(
    face: Face,
    b: &SlabBounds,
    workers: usize,
    coeffs_h: ArrayView2<Real>,
    id: ArrayView4<u32>,
    ex: ArrayView3<Real>,
    ez: ArrayView3<Real>,
    hx: ArrayViewMut3<Real>,
    hz: ArrayViewMut3<Real>,
    mut phi1: ArrayViewMut4<Real>,
    mut phi2: ArrayViewMut4<Real>,
    r: &RProfiles,
    d: Real,
) {
    let (nx, ny, nz) = b.dims();
    let rd = 1.0 / d;
    let minus = face.is_minus();
    let mut hx_w = writable_y(hx, b, minus, 0);
    let mut hz_w = writable_y(hz, b, minus, 0);
    let pool = worker_pool(workers);

    pool.install(|| {
        hx_w.outer_iter_mut()
            .into_par_iter()
            .zip(hz_w.outer_iter_mut())
            .zip(phi1.axis_iter_mut(Axis(1)))
            .zip(phi2.axis_iter_mut(Axis(1)))
            .enumerate()
            .with_min_len(chunk_len(nx, workers))
            .for_each(|(i, (((mut hx_r, mut hz_r), mut p1), mut p2))| {
                let ii = i + b.xs;
                for j in 0..ny {
                    let jj = global_h(minus, b.ys, b.yf, j);
                    let rc = RCell::load(r, C::ORDER, j);
                    for k in 0..nz {
                        let kk = k + b.zs;
                        let dez = (ez[[ii, jj + 1, kk]] - ez[[ii, jj, kk]]) * rd;
                        let dex = (ex[[ii, jj + 1, kk]] - ex[[ii, jj, kk]]) * rd;
                        let c_hx = coeffs_h[[id[[HX, ii, jj, kk]] as usize, CURL]];
                        let c_hz = coeffs_h[[id[[HZ, ii, jj, kk]] as usize, CURL]];
                        hx_r[[j, k]] -= c_hx * C::apply(&rc, dez, &mut p1, j, k);
                        hz_r[[j, k]] += c_hz * C::apply(&rc, dex, &mut p2, j, k);
                    }
                }
            });
    });
}

/// Electric kernel for the y-normal faces: updates Ex and Ez from the
/// backward y-difference of Hz and Hx.
#[allow(clippy::too_many_arguments)]
pub fn electric_y<C: Convolution>(
    face: Face,
    b: &SlabBounds,
    workers: usize,
    coeffs_e: ArrayView2<Real>,
    id: ArrayView4<u32>,
    hx: ArrayView3<Real>,
    hz: ArrayView3<Real>,
    ex: ArrayViewMut3<Real>,
    ez: ArrayViewMut3<Real>,
    mut phi1: ArrayViewMut4<Real>,
    mut phi2: ArrayViewMut4<Real>,
    r: &RProfiles,
    d: Real,
) {
    let (nx, ny, nz) = b.dims();
    let rd = 1.0 / d;
    let minus = face.is_minus();
    let mut ex_w = writable_y(ex, b, minus, 1);
    let mut ez_w = writable_y(ez, b, minus, 1);
    let pool = worker_pool(workers);

    pool.install(|| {
        ex_w.outer_iter_mut()
            .into_par_iter()
            .zip(ez_w.outer_iter_mut())
            .zip(phi1.axis_iter_mut(Axis(1)))
            .zip(phi2.axis_iter_mut(Axis(1)))
            .enumerate()
            .with_min_len(chunk_len(nx, workers))
            .for_each(|(i, (((mut ex_r, mut ez_r), mut p1), mut p2))| {
                let ii = i + b.xs;
                for j in 0..ny {
                    let jj = global_e(minus, b.ys, b.yf, j);
                    let rc = RCell::load(r, C::ORDER, j);
                    for k in 0..nz {
                        let kk = k + b.zs;
                        let dhz = (hz[[ii, jj, kk]] - hz[[ii, jj - 1, kk]]) * rd;
                        let dhx = (hx[[ii, jj, kk]] - hx[[ii, jj - 1, kk]]) * rd;
                        let c_ex = coeffs_e[[id[[EX, ii, jj, kk]] as usize, CURL]];
                        let c_ez = coeffs_e[[id[[EZ, ii, jj, kk]] as usize, CURL]];
                        ex_r[[j, k]] += c_ex * C::apply(&rc, dhz, &mut p1, j, k);
                        ez_r[[j, k]] -= c_ez * C::apply(&rc, dhx, &mut p2, j, k);
                    }
                }
            });
    });
}

/// Magnetic kernel for the z-normal faces: updates Hx and Hy from the
/// forward z-difference of Ey and Ex.
#[allow(clippy::too_many_arguments)]
pub fn magnetic_z<C: Convolution>(
    face: Face,
    b: &SlabBounds,
    workers: usize,
    coeffs_h: ArrayView2<Real>,
    id: ArrayView4<u32>,
    ex: ArrayView3<Real>,
    ey: ArrayView3<Real>,
    hx: ArrayViewMut3<Real>,
    hy: ArrayViewMut3<Real>,
    mut phi1: ArrayViewMut4<Real>,
    mut phi2: ArrayViewMut4<Real>,
    r: &RProfiles,
    d: Real,
) {
    let (nx, ny, nz) = b.dims();
    let rd = 1.0 / d;
    let minus = face.is_minus();
    let mut hx_w = writable_z(hx, b, minus, 0);
    let mut hy_w = writable_z(hy, b, minus, 0);
    let pool = worker_pool(workers);

    pool.install(|| {
        hx_w.outer_iter_mut()
            .into_par_iter()
            .zip(hy_w.outer_iter_mut())
            .zip(phi1.axis_iter_mut(Axis(1)))
            .zip(phi2.axis_iter_mut(Axis(1)))
            .enumerate()
            .with_min_len(chunk_len(nx, workers))
            .for_each(|(i, (((mut hx_r, mut hy_r), mut p1), mut p2))| {
                let ii = i + b.xs;
                for j in 0..ny {
                    let jj = j + b.ys;
                    for k in 0..nz {
                        let kk = global_h(minus, b.zs, b.zf, k);
                        let rc = RCell::load(r, C::ORDER, k);
                        let dey = (ey[[ii, jj, kk + 1]] - ey[[ii, jj, kk]]) * rd;
                        let dex = (ex[[ii, jj, kk + 1]] - ex[[ii, jj, kk]]) * rd;
                        let c_hx = coeffs_h[[id[[HX, ii, jj, kk]] as usize, CURL]];
                        let c_hy = coeffs_h[[id[[HY, ii, jj, kk]] as usize, CURL]];
                        hx_r[[j, k]] += c_hx * C::apply(&rc, dey, &mut p1, j, k);
                        hy_r[[j, k]] -= c_hy * C::apply(&rc, dex, &mut p2, j, k);
                    }
                }
            });
    });
}

/// Electric kernel for the z-normal faces: updates Ex and Ey from the
/// backward z-difference of Hy and Hx.
#[allow(clippy::too_many_arguments)]
pub fn electric_z<C: Convolution>(
    face: Face,
    b: &SlabBounds,
    workers: usize,
    coeffs_e: ArrayView2<Real>,
    id: ArrayView4<u32>,
    hx: ArrayView3<Real>,
    hy: ArrayView3<Real>,
    ex: ArrayViewMut3<Real>,
    ey: ArrayViewMut3<Real>,
    mut phi1: ArrayViewMut4<Real>,
    mut phi2: ArrayViewMut4<Real>,
    r: &RProfiles,
    d: Real,
) {
    let (nx, ny, nz) = b.dims();
    let rd = 1.0 / d;
    let minus = face.is_minus();
    let mut ex_w = writable_z(ex, b, minus, 1);
    let mut ey_w = writable_z(ey, b, minus, 1);
    let pool = worker_pool(workers);

    pool.install(|| {
        ex_w.outer_iter_mut()
            .into_par_iter()
            .zip(ey_w.outer_iter_mut())
            .zip(phi1.axis_iter_mut(Axis(1)))
            .zip(phi2.axis_iter_mut(Axis(1)))
            .enumerate()
            .with_min_len(chunk_len(nx, workers))
            .for_each(|(i, (((mut ex_r, mut ey_r), mut p1), mut p2))| {
                let ii = i + b.xs;
                for j in 0..ny {
                    let jj = j + b.ys;
                    for k in 0..nz {
                        let kk = global_e(minus, b.zs, b.zf, k);
                        let rc = RCell::load(r, C::ORDER, k);
                        let dhy = (hy[[ii, jj, kk]] - hy[[ii, jj, kk - 1]]) * rd;
                        let dhx = (hx[[ii, jj, kk]] - hx[[ii, jj, kk - 1]]) * rd;
                        let c_ex = coeffs_e[[id[[EX, ii, jj, kk]] as usize, CURL]];
                        let c_ey = coeffs_e[[id[[EY, ii, jj, kk]] as usize, CURL]];
                        ex_r[[j, k]] -= c_ex * C::apply(&rc, dhy, &mut p1, j, k);
                        ey_r[[j, k]] += c_ey * C::apply(&rc, dhx, &mut p2, j, k);
                    }
                }
            });
    });
}
