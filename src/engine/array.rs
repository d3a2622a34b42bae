//! Scalar precision selection for the field state.
//!
//! A single build-time axis governs the precision of every field array,
//! coefficient table and auxiliary accumulator: the `single-precision`
//! cargo feature switches [`Real`] from `f64` to `f32`. Random spectra
//! fed to the fractal generator stay double precision regardless.

use num_complex::Complex;

/// Scalar type of all field and coefficient arrays.
#[cfg(not(feature = "single-precision"))]
pub type Real = f64;

/// Scalar type of all field and coefficient arrays.
#[cfg(feature = "single-precision")]
pub type Real = f32;

/// Complex number in the build precision.
pub type RealComplex = Complex<Real>;

/// Double-precision complex, the fixed element type of random spectra.
pub type Complex64 = Complex<f64>;

/// Cast a double-precision value into the build precision.
#[inline]
pub fn real(x: f64) -> Real {
    x as Real
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_round_trips_in_double_precision() {
        #[cfg(not(feature = "single-precision"))]
        assert_eq!(real(0.1), 0.1);
        let c = RealComplex::new(real(1.5), real(-2.0));
        assert_eq!(c.re + c.im, real(-0.5));
    }
}
