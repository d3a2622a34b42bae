//! Complex FFT passes for the fractal synthesiser.
//!
//! Multi-dimensional transforms are built from 1-D passes along each
//! axis; the inverse is normalised by 1/N so a forward/inverse pair is
//! the identity.

use ndarray::{Array2, Array3, Axis};
use num_traits::Zero;
use rustfft::FftPlanner;

use crate::engine::array::Complex64;

fn pass_axes_2d(data: &mut Array2<Complex64>, inverse: bool) {
    let mut planner = FftPlanner::new();
    for axis in 0..2 {
        let len = data.shape()[axis];
        if len < 2 {
            continue;
        }
        let fft = if inverse {
            planner.plan_fft_inverse(len)
        } else {
            planner.plan_fft_forward(len)
        };
        let mut buffer = vec![Complex64::zero(); len];
        for mut lane in data.lanes_mut(Axis(axis)) {
            for (b, v) in buffer.iter_mut().zip(lane.iter()) {
                *b = *v;
            }
            fft.process(&mut buffer);
            for (v, b) in lane.iter_mut().zip(buffer.iter()) {
                *v = *b;
            }
        }
    }
    if inverse {
        let norm = 1.0 / data.len() as f64;
        data.mapv_inplace(|c| c * norm);
    }
}

fn pass_axes_3d(data: &mut Array3<Complex64>, inverse: bool) {
    let mut planner = FftPlanner::new();
    for axis in 0..3 {
        let len = data.shape()[axis];
        if len < 2 {
            continue;
        }
        let fft = if inverse {
            planner.plan_fft_inverse(len)
        } else {
            planner.plan_fft_forward(len)
        };
        let mut buffer = vec![Complex64::zero(); len];
        for mut lane in data.lanes_mut(Axis(axis)) {
            for (b, v) in buffer.iter_mut().zip(lane.iter()) {
                *b = *v;
            }
            fft.process(&mut buffer);
            for (v, b) in lane.iter_mut().zip(buffer.iter()) {
                *v = *b;
            }
        }
    }
    if inverse {
        let norm = 1.0 / data.len() as f64;
        data.mapv_inplace(|c| c * norm);
    }
}

/// Forward 2-D FFT, in place.
pub fn fft_2d(data: &mut Array2<Complex64>) {
    pass_axes_2d(data, false);
}

/// Inverse 2-D FFT, in place, normalised by 1/N.
pub fn ifft_2d(data: &mut Array2<Complex64>) {
    pass_axes_2d(data, true);
}

/// Forward 3-D FFT, in place.
pub fn fft_3d(data: &mut Array3<Complex64>) {
    pass_axes_3d(data, false);
}

/// Inverse 3-D FFT, in place, normalised by 1/N.
pub fn ifft_3d(data: &mut Array3<Complex64>) {
    pass_axes_3d(data, true);
}
