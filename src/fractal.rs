//! Fractal surface and volume synthesis.
//!
//! A complex random spectrum is shaped by an inverse power law `1/r^D`
//! about a configurable centre in reciprocal space; the inverse
//! transform of the shaped spectrum is a scale-invariant random field
//! used to seed rough surfaces and heterogeneous material volumes.
//!
//! The shaping kernels operate on a sub-region of a larger wrapped
//! spectrum (`offset` within `global`), so a domain-decomposed caller
//! can shape its local block consistently with its neighbours. Random
//! spectra are always double precision; shaped output tracks the build
//! precision.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use ndarray::parallel::prelude::*;

use crate::engine::array::{real, Complex64, Real, RealComplex};
use crate::engine::fft;
use crate::engine::pool::{chunk_len, worker_pool};

/// Shape a 2-D spectrum block by `1/r^D` about `v1`.
///
/// For each cell the wrapped FFT-centred coordinate is
/// `v2 = weighting * ((index + offset + size/2) mod size)`; the cell is
/// scaled by `1 / ||v2 - v1||^D`. The zero-distance bin substitutes the
/// sentinel divisor 0.9 so the DC component stays finite.
#[allow(clippy::too_many_arguments)]
pub fn generate_fractal_2d(
    n: (usize, usize),
    offset: (usize, usize),
    global: (usize, usize),
    workers: usize,
    dimension: f64,
    weighting: [f64; 2],
    v1: [f64; 2],
    a: ArrayView2<'_, Complex64>,
    out: &mut Array2<RealComplex>,
) {
    assert_eq!(a.dim(), n, "spectrum shape must match the block");
    assert_eq!(out.dim(), n, "output shape must match the block");
    let (gx, gy) = global;
    let pool = worker_pool(workers);

    pool.install(|| {
        out.outer_iter_mut()
            .into_par_iter()
            .enumerate()
            .with_min_len(chunk_len(n.0, workers))
            .for_each(|(i, mut row)| {
                let v2x = weighting[0] * (((i + offset.0 + gx / 2) % gx) as f64);
                for j in 0..n.1 {
                    let v2y = weighting[1] * (((j + offset.1 + gy / 2) % gy) as f64);
                    let rr = ((v2x - v1[0]).powi(2) + (v2y - v1[1]).powi(2)).sqrt();
                    let mut b = rr.powf(dimension);
                    if b == 0.0 {
                        b = 0.9;
                    }
                    let w = a[[i, j]] / b;
                    row[j] = RealComplex::new(real(w.re), real(w.im));
                }
            });
    });
}

/// Shape a 3-D spectrum block by `1/r^D` about `v1`; the volume
/// counterpart of [`generate_fractal_2d`].
#[allow(clippy::too_many_arguments)]
pub fn generate_fractal_3d(
    n: (usize, usize, usize),
    offset: (usize, usize, usize),
    global: (usize, usize, usize),
    workers: usize,
    dimension: f64,
    weighting: [f64; 3],
    v1: [f64; 3],
    a: ArrayView3<'_, Complex64>,
    out: &mut Array3<RealComplex>,
) {
    assert_eq!(a.dim(), n, "spectrum shape must match the block");
    assert_eq!(out.dim(), n, "output shape must match the block");
    let (gx, gy, gz) = global;
    let pool = worker_pool(workers);

    pool.install(|| {
        out.outer_iter_mut()
            .into_par_iter()
            .enumerate()
            .with_min_len(chunk_len(n.0, workers))
            .for_each(|(i, mut plane)| {
                let v2x = weighting[0] * (((i + offset.0 + gx / 2) % gx) as f64);
                for j in 0..n.1 {
                    let v2y = weighting[1] * (((j + offset.1 + gy / 2) % gy) as f64);
                    for k in 0..n.2 {
                        let v2z = weighting[2] * (((k + offset.2 + gz / 2) % gz) as f64);
                        let rr = ((v2x - v1[0]).powi(2)
                            + (v2y - v1[1]).powi(2)
                            + (v2z - v1[2]).powi(2))
                        .sqrt();
                        let mut b = rr.powf(dimension);
                        if b == 0.0 {
                            b = 0.9;
                        }
                        let w = a[[i, j, k]] / b;
                        plane[[j, k]] = RealComplex::new(real(w.re), real(w.im));
                    }
                }
            });
    });
}

/// Seeded generator for a 2-D fractal height field.
#[derive(Debug, Clone)]
pub struct FractalSurface {
    pub nx: usize,
    pub ny: usize,
    /// Fractal dimension D of the 1/r^D spectral weighting.
    pub dimension: f64,
    /// Per-axis scaling of the reciprocal-space coordinate.
    pub weighting: [f64; 2],
    pub seed: u64,
    /// Range the finished surface is rescaled into.
    pub limits: (Real, Real),
    /// The synthesised surface, filled by [`FractalSurface::generate`].
    pub surface: Array2<Real>,
}

impl FractalSurface {
    pub fn new(nx: usize, ny: usize, dimension: f64, seed: u64) -> Self {
        Self {
            nx,
            ny,
            dimension,
            weighting: [1.0, 1.0],
            seed,
            limits: (0.0, 1.0),
            surface: Array2::zeros((nx, ny)),
        }
    }

    /// Synthesise the surface: seeded Gaussian noise, forward transform,
    /// spectral shaping, inverse transform, rescale into `limits`.
    pub fn generate(&mut self, workers: usize) {
        let (nx, ny) = (self.nx, self.ny);
        let mut spectrum = random_spectrum_2d(nx, ny, self.seed);
        fft::fft_2d(&mut spectrum);

        let v1 = [
            self.weighting[0] * nx as f64 / 2.0,
            self.weighting[1] * ny as f64 / 2.0,
        ];
        let mut shaped = Array2::<RealComplex>::zeros((nx, ny));
        generate_fractal_2d(
            (nx, ny),
            (0, 0),
            (nx, ny),
            workers,
            self.dimension,
            self.weighting,
            v1,
            spectrum.view(),
            &mut shaped,
        );

        let mut field = shaped.mapv(|c| Complex64::new(c.re as f64, c.im as f64));
        fft::ifft_2d(&mut field);
        self.surface = field.mapv(|c| real(c.re));
        rescale(self.surface.view_mut().into_dyn(), self.limits.0, self.limits.1);
    }
}

/// Seeded generator for a 3-D fractal intensity volume, rescaled into
/// `[0, 1]`.
#[derive(Debug, Clone)]
pub struct FractalVolume {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub dimension: f64,
    pub weighting: [f64; 3],
    pub seed: u64,
    pub volume: Array3<Real>,
}

impl FractalVolume {
    pub fn new(nx: usize, ny: usize, nz: usize, dimension: f64, seed: u64) -> Self {
        Self {
            nx,
            ny,
            nz,
            dimension,
            weighting: [1.0, 1.0, 1.0],
            seed,
            volume: Array3::zeros((nx, ny, nz)),
        }
    }

    /// Synthesise the volume; the 3-D counterpart of
    /// [`FractalSurface::generate`].
    pub fn generate(&mut self, workers: usize) {
        let (nx, ny, nz) = (self.nx, self.ny, self.nz);
        let mut spectrum = random_spectrum_3d(nx, ny, nz, self.seed);
        fft::fft_3d(&mut spectrum);

        let v1 = [
            self.weighting[0] * nx as f64 / 2.0,
            self.weighting[1] * ny as f64 / 2.0,
            self.weighting[2] * nz as f64 / 2.0,
        ];
        let mut shaped = Array3::<RealComplex>::zeros((nx, ny, nz));
        generate_fractal_3d(
            (nx, ny, nz),
            (0, 0, 0),
            (nx, ny, nz),
            workers,
            self.dimension,
            self.weighting,
            v1,
            spectrum.view(),
            &mut shaped,
        );

        let mut field = shaped.mapv(|c| Complex64::new(c.re as f64, c.im as f64));
        fft::ifft_3d(&mut field);
        self.volume = field.mapv(|c| real(c.re));
        rescale(self.volume.view_mut().into_dyn(), 0.0, 1.0);
    }
}

fn random_spectrum_2d(nx: usize, ny: usize, seed: u64) -> Array2<Complex64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Array2::zeros((nx, ny));
    for v in out.iter_mut() {
        let sample: f64 = rng.sample(StandardNormal);
        *v = Complex64::new(sample, 0.0);
    }
    out
}

fn random_spectrum_3d(nx: usize, ny: usize, nz: usize, seed: u64) -> Array3<Complex64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Array3::zeros((nx, ny, nz));
    for v in out.iter_mut() {
        let sample: f64 = rng.sample(StandardNormal);
        *v = Complex64::new(sample, 0.0);
    }
    out
}

fn rescale(mut a: ndarray::ArrayViewMutD<Real>, lo: Real, hi: Real) {
    let mut min = Real::INFINITY;
    let mut max = Real::NEG_INFINITY;
    for &v in a.iter() {
        min = min.min(v);
        max = max.max(v);
    }
    let range = max - min;
    if range <= 0.0 {
        a.fill(lo);
        return;
    }
    a.mapv_inplace(|v| lo + (v - min) / range * (hi - lo));
}
