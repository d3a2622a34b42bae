//! Synthesis of the per-slab recursive-convolution coefficient profiles.
//!
//! Each pole of the CFS stretching function `s = κ + σ/(α + jωε₀)`
//! contributes graded 1-D profiles RA, RB, RE, RF along the slab normal.
//! Discretising the pole's low-pass filter exponentially over the time
//! step gives the recursion coefficients; the higher-order formulation
//! stores the reciprocal stretch in RA, the multipole formulation stores
//! the additive stretch contribution.
//!
//! Depth index 0 sits at the slab's interface with the interior, where
//! the grading vanishes; electric nodes sample integer depths, magnetic
//! nodes half-integer ones.

use ndarray::Array2;

use crate::engine::array::Real;

use super::{Formulation, RProfiles};

/// One complex-frequency-shifted pole of the stretching function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CfsPole {
    /// Frequency shift; graded from this value at the interface down to
    /// zero at the outer wall.
    pub alpha: Real,
    /// Maximum coordinate stretch, reached at the outer wall (κ grades
    /// up from 1).
    pub kappa_max: Real,
    /// Maximum conductivity; `None` selects the impedance-matched
    /// optimum `0.8 (m+1) / (η d)`.
    pub sigma_max: Option<Real>,
    /// Polynomial grading degree.
    pub m: Real,
}

impl CfsPole {
    /// Purely conductive pole with matched σ and cubic grading, the
    /// usual single-pole choice.
    pub fn standard() -> Self {
        Self {
            alpha: 0.0,
            kappa_max: 1.0,
            sigma_max: None,
            m: 3.0,
        }
    }
}

/// Build the electric and magnetic profile sets for a slab of `depth`
/// cells along its normal.
pub(super) fn build(
    formulation: Formulation,
    poles: &[CfsPole],
    depth: usize,
    dt: Real,
    d: Real,
    eps0: Real,
    eta: Real,
) -> (RProfiles, RProfiles) {
    let e = profiles(formulation, poles, depth, dt, d, eps0, eta, 0.0);
    let h = profiles(formulation, poles, depth, dt, d, eps0, eta, 0.5);
    (e, h)
}

#[allow(clippy::too_many_arguments)]
fn profiles(
    formulation: Formulation,
    poles: &[CfsPole],
    depth: usize,
    dt: Real,
    d: Real,
    eps0: Real,
    eta: Real,
    offset: Real,
) -> RProfiles {
    let order = poles.len();
    let mut ra = Array2::zeros((order, depth));
    let mut rb = Array2::zeros((order, depth));
    let mut re = Array2::zeros((order, depth));
    let mut rf = Array2::zeros((order, depth));

    for (p, pole) in poles.iter().enumerate() {
        let sigma_max = pole
            .sigma_max
            .unwrap_or_else(|| 0.8 * (pole.m + 1.0) / (eta * d));
        for i in 0..depth {
            // grading fraction: 0 at the interface, 1 at the outer wall
            let u = (i as Real + offset) / depth as Real;
            let sigma = sigma_max * u.powf(pole.m);
            let alpha = pole.alpha * (1.0 - u);
            match formulation {
                Formulation::HigherOrder => {
                    let kappa = 1.0 + (pole.kappa_max - 1.0) * u.powf(pole.m);
                    let nu = (alpha + sigma / kappa) / eps0;
                    ra[[p, i]] = 1.0 / kappa;
                    rb[[p, i]] = 1.0;
                    if nu > 0.0 {
                        re[[p, i]] = (-nu * dt).exp();
                        rf[[p, i]] =
                            sigma / (kappa * (alpha * kappa + sigma)) * (1.0 - re[[p, i]]);
                    } else {
                        re[[p, i]] = 1.0;
                        rf[[p, i]] = 0.0;
                    }
                }
                Formulation::Multipole => {
                    // each pole carries an equal share of the unit
                    // instantaneous stretch
                    let share = 1.0 / order as Real;
                    let kappa =
                        share + (pole.kappa_max - 1.0) * u.powf(pole.m) / order as Real;
                    ra[[p, i]] = kappa;
                    rb[[p, i]] = 1.0;
                    re[[p, i]] = (-alpha * dt / eps0).exp();
                    rf[[p, i]] = sigma * dt / eps0;
                }
            }
        }
    }

    RProfiles { ra, rb, re, rf }
}
