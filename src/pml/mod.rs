//! Convolutional perfectly matched layer boundary slabs.
//!
//! Six axis-aligned slabs, one per domain face, absorb outgoing waves by
//! stretching the spatial derivative normal to their face with a
//! complex-frequency-shifted (CFS) function realised as a recursive
//! convolution. Two formulations are provided — [`Formulation::HigherOrder`]
//! composes its poles multiplicatively, [`Formulation::Multipole`] adds
//! them and relaxes the accumulators semi-implicitly — each at one or two
//! poles.
//!
//! A slab owns its auxiliary Phi accumulators and its 1-D coefficient
//! profiles; it borrows the field state per half-step call. The interior
//! update kernels sweep the slab cells too; the PML kernels only add the
//! stretched-derivative correction on top.

pub mod kernels;
mod profile;

pub use profile::CfsPole;

use ndarray::{Array2, Array4, ArrayView2, ArrayView3, ArrayView4, ArrayViewMut3, ArrayViewMut4};

use crate::engine::array::Real;
use crate::grid::FdtdGrid;
use kernels::{HigherOrder1, HigherOrder2, Multipole1, Multipole2};

/// Domain face a PML slab is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    XMinus,
    XPlus,
    YMinus,
    YPlus,
    ZMinus,
    ZPlus,
}

impl Face {
    /// Axis of the absorption grading: 0, 1 or 2.
    pub fn normal_axis(self) -> usize {
        match self {
            Face::XMinus | Face::XPlus => 0,
            Face::YMinus | Face::YPlus => 1,
            Face::ZMinus | Face::ZPlus => 2,
        }
    }

    /// True for the low-coordinate face of the axis.
    pub fn is_minus(self) -> bool {
        matches!(self, Face::XMinus | Face::YMinus | Face::ZMinus)
    }
}

/// Recursive-integration formulation of the CFS stretching function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formulation {
    /// Poles compose multiplicatively; each pole low-passes the stretched
    /// derivative produced by the pole before it.
    #[default]
    HigherOrder,
    /// Poles add; the accumulators share an aggregated drive and relax
    /// against their own stale value.
    Multipole,
}

/// Cell bounds of a slab, half-open along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlabBounds {
    pub xs: usize,
    pub xf: usize,
    pub ys: usize,
    pub yf: usize,
    pub zs: usize,
    pub zf: usize,
}

impl SlabBounds {
    pub fn new(xs: usize, xf: usize, ys: usize, yf: usize, zs: usize, zf: usize) -> Self {
        assert!(xs <= xf && ys <= yf && zs <= zf, "slab bounds must be ordered");
        Self { xs, xf, ys, yf, zs, zf }
    }

    /// Slab extent in cells along each axis.
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.xf - self.xs, self.yf - self.ys, self.zf - self.zs)
    }

    /// Slab depth along the normal of `face`.
    pub fn depth(&self, face: Face) -> usize {
        let (nx, ny, nz) = self.dims();
        match face.normal_axis() {
            0 => nx,
            1 => ny,
            _ => nz,
        }
    }
}

/// Read-only 1-D coefficient profiles, one row per recursion pole.
///
/// Index 0 along the profile is the node nearest the slab's interface
/// with the interior; absorption grows with the index. Electric profiles
/// sample the grading at integer depths, magnetic ones half a cell
/// deeper, matching the Yee staggering.
#[derive(Debug, Clone)]
pub struct RProfiles {
    pub ra: Array2<Real>,
    pub rb: Array2<Real>,
    pub re: Array2<Real>,
    pub rf: Array2<Real>,
}

impl RProfiles {
    /// Number of recursion poles.
    pub fn order(&self) -> usize {
        self.ra.nrows()
    }

    /// Profile length along the slab normal.
    pub fn depth(&self) -> usize {
        self.ra.ncols()
    }

    fn check(&self) {
        let shape = self.ra.shape();
        assert!(
            matches!(shape[0], 1 | 2),
            "profiles must carry one or two poles"
        );
        assert_eq!(self.rb.shape(), shape);
        assert_eq!(self.re.shape(), shape);
        assert_eq!(self.rf.shape(), shape);
    }
}

/// One PML slab: coefficient profiles plus recursive-convolution state.
#[derive(Debug, Clone)]
pub struct Pml {
    pub face: Face,
    pub formulation: Formulation,
    pub bounds: SlabBounds,
    /// Spatial step along the slab normal.
    pub d: Real,
    /// Electric and magnetic coefficient profiles.
    pub er: RProfiles,
    pub hr: RProfiles,
    /// Auxiliary accumulators, `[order, nx, ny, nz]` in slab-local order.
    pub ephi1: Array4<Real>,
    pub ephi2: Array4<Real>,
    pub hphi1: Array4<Real>,
    pub hphi2: Array4<Real>,
}

impl Pml {
    /// Build a slab with profiles synthesised from CFS poles. The pole
    /// count sets the recursion order (one or two). `eps0` and `eta` are
    /// the permittivity and wave impedance of the background medium, so
    /// normalised-unit problems pass `1.0` for both.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        face: Face,
        bounds: SlabBounds,
        formulation: Formulation,
        poles: &[CfsPole],
        dt: Real,
        d: Real,
        eps0: Real,
        eta: Real,
    ) -> Self {
        assert!(
            matches!(poles.len(), 1 | 2),
            "PML order must be 1 or 2"
        );
        let depth = bounds.depth(face);
        let (er, hr) = profile::build(formulation, poles, depth, dt, d, eps0, eta);
        Self::with_profiles(face, bounds, formulation, er, hr, d)
    }

    /// Build a slab around precomputed profiles.
    pub fn with_profiles(
        face: Face,
        bounds: SlabBounds,
        formulation: Formulation,
        er: RProfiles,
        hr: RProfiles,
        d: Real,
    ) -> Self {
        er.check();
        hr.check();
        assert_eq!(er.order(), hr.order(), "profile orders must agree");
        assert_eq!(er.depth(), bounds.depth(face), "profile depth must match the slab");
        assert_eq!(hr.depth(), bounds.depth(face), "profile depth must match the slab");
        let (nx, ny, nz) = bounds.dims();
        let order = er.order();
        Self {
            face,
            formulation,
            bounds,
            d,
            er,
            hr,
            ephi1: Array4::zeros((order, nx, ny, nz)),
            ephi2: Array4::zeros((order, nx, ny, nz)),
            hphi1: Array4::zeros((order, nx, ny, nz)),
            hphi2: Array4::zeros((order, nx, ny, nz)),
        }
    }

    /// Recursion order of this slab.
    pub fn order(&self) -> usize {
        self.er.order()
    }

    /// Apply the electric half-step correction over this slab.
    pub fn update_electric(&mut self, grid: &mut FdtdGrid, workers: usize) {
        run_pml_e(
            self.face,
            self.formulation,
            &self.bounds,
            workers,
            grid.updatecoeffs_e.view(),
            grid.id.view(),
            grid.hx.view(),
            grid.hy.view(),
            grid.hz.view(),
            grid.ex.view_mut(),
            grid.ey.view_mut(),
            grid.ez.view_mut(),
            self.ephi1.view_mut(),
            self.ephi2.view_mut(),
            &self.er,
            self.d,
        );
    }

    /// Apply the magnetic half-step correction over this slab.
    pub fn update_magnetic(&mut self, grid: &mut FdtdGrid, workers: usize) {
        run_pml_h(
            self.face,
            self.formulation,
            &self.bounds,
            workers,
            grid.updatecoeffs_h.view(),
            grid.id.view(),
            grid.ex.view(),
            grid.ey.view(),
            grid.ez.view(),
            grid.hx.view_mut(),
            grid.hy.view_mut(),
            grid.hz.view_mut(),
            self.hphi1.view_mut(),
            self.hphi2.view_mut(),
            &self.hr,
            self.d,
        );
    }
}

/// Dispatch one electric PML half-step to the monomorphised kernel for
/// this face, formulation and order. The two components tangential to
/// the face are written; everything else is read-only.
#[allow(clippy::too_many_arguments)]
pub fn run_pml_e(
    face: Face,
    formulation: Formulation,
    bounds: &SlabBounds,
    workers: usize,
    coeffs_e: ArrayView2<Real>,
    id: ArrayView4<u32>,
    hx: ArrayView3<Real>,
    hy: ArrayView3<Real>,
    hz: ArrayView3<Real>,
    ex: ArrayViewMut3<Real>,
    ey: ArrayViewMut3<Real>,
    ez: ArrayViewMut3<Real>,
    phi1: ArrayViewMut4<Real>,
    phi2: ArrayViewMut4<Real>,
    r: &RProfiles,
    d: Real,
) {
    let order = r.order();
    check_phi(bounds, order, phi1.view(), phi2.view());
    use Formulation::{HigherOrder, Multipole};
    match (face.normal_axis(), formulation, order) {
        (0, HigherOrder, 1) => kernels::electric_x::<HigherOrder1>(
            face, bounds, workers, coeffs_e, id, hy, hz, ey, ez, phi1, phi2, r, d,
        ),
        (0, HigherOrder, 2) => kernels::electric_x::<HigherOrder2>(
            face, bounds, workers, coeffs_e, id, hy, hz, ey, ez, phi1, phi2, r, d,
        ),
        (0, Multipole, 1) => kernels::electric_x::<Multipole1>(
            face, bounds, workers, coeffs_e, id, hy, hz, ey, ez, phi1, phi2, r, d,
        ),
        (0, Multipole, 2) => kernels::electric_x::<Multipole2>(
            face, bounds, workers, coeffs_e, id, hy, hz, ey, ez, phi1, phi2, r, d,
        ),
        (1, HigherOrder, 1) => kernels::electric_y::<HigherOrder1>(
            face, bounds, workers, coeffs_e, id, hx, hz, ex, ez, phi1, phi2, r, d,
        ),
        (1, HigherOrder, 2) => kernels::electric_y::<HigherOrder2>(
            face, bounds, workers, coeffs_e, id, hx, hz, ex, ez, phi1, phi2, r, d,
        ),
        (1, Multipole, 1) => kernels::electric_y::<Multipole1>(
            face, bounds, workers, coeffs_e, id, hx, hz, ex, ez, phi1, phi2, r, d,
        ),
        (1, Multipole, 2) => kernels::electric_y::<Multipole2>(
            face, bounds, workers, coeffs_e, id, hx, hz, ex, ez, phi1, phi2, r, d,
        ),
        (2, HigherOrder, 1) => kernels::electric_z::<HigherOrder1>(
            face, bounds, workers, coeffs_e, id, hx, hy, ex, ey, phi1, phi2, r, d,
        ),
        (2, HigherOrder, 2) => kernels::electric_z::<HigherOrder2>(
            face, bounds, workers, coeffs_e, id, hx, hy, ex, ey, phi1, phi2, r, d,
        ),
        (2, Multipole, 1) => kernels::electric_z::<Multipole1>(
            face, bounds, workers, coeffs_e, id, hx, hy, ex, ey, phi1, phi2, r, d,
        ),
        (2, Multipole, 2) => kernels::electric_z::<Multipole2>(
            face, bounds, workers, coeffs_e, id, hx, hy, ex, ey, phi1, phi2, r, d,
        ),
        _ => unreachable!("PML order must be 1 or 2"),
    }
}

/// Dispatch one magnetic PML half-step; the magnetic counterpart of
/// [`run_pml_e`].
#[allow(clippy::too_many_arguments)]
pub fn run_pml_h(
    face: Face,
    formulation: Formulation,
    bounds: &SlabBounds,
    workers: usize,
    coeffs_h: ArrayView2<Real>,
    id: ArrayView4<u32>,
    ex: ArrayView3<Real>,
    ey: ArrayView3<Real>,
    ez: ArrayView3<Real>,
    hx: ArrayViewMut3<Real>,
    hy: ArrayViewMut3<Real>,
    hz: ArrayViewMut3<Real>,
    phi1: ArrayViewMut4<Real>,
    phi2: ArrayViewMut4<Real>,
    r: &RProfiles,
    d: Real,
) {
    let order = r.order();
    check_phi(bounds, order, phi1.view(), phi2.view());
    use Formulation::{HigherOrder, Multipole};
    match (face.normal_axis(), formulation, order) {
        (0, HigherOrder, 1) => kernels::magnetic_x::<HigherOrder1>(
            face, bounds, workers, coeffs_h, id, ey, ez, hy, hz, phi1, phi2, r, d,
        ),
        (0, HigherOrder, 2) => kernels::magnetic_x::<HigherOrder2>(
            face, bounds, workers, coeffs_h, id, ey, ez, hy, hz, phi1, phi2, r, d,
        ),
        (0, Multipole, 1) => kernels::magnetic_x::<Multipole1>(
            face, bounds, workers, coeffs_h, id, ey, ez, hy, hz, phi1, phi2, r, d,
        ),
        (0, Multipole, 2) => kernels::magnetic_x::<Multipole2>(
            face, bounds, workers, coeffs_h, id, ey, ez, hy, hz, phi1, phi2, r, d,
        ),
        (1, HigherOrder, 1) => kernels::magnetic_y::<HigherOrder1>(
            face, bounds, workers, coeffs_h, id, ex, ez, hx, hz, phi1, phi2, r, d,
        ),
        (1, HigherOrder, 2) => kernels::magnetic_y::<HigherOrder2>(
            face, bounds, workers, coeffs_h, id, ex, ez, hx, hz, phi1, phi2, r, d,
        ),
        (1, Multipole, 1) => kernels::magnetic_y::<Multipole1>(
            face, bounds, workers, coeffs_h, id, ex, ez, hx, hz, phi1, phi2, r, d,
        ),
        (1, Multipole, 2) => kernels::magnetic_y::<Multipole2>(
            face, bounds, workers, coeffs_h, id, ex, ez, hx, hz, phi1, phi2, r, d,
        ),
        (2, HigherOrder, 1) => kernels::magnetic_z::<HigherOrder1>(
            face, bounds, workers, coeffs_h, id, ex, ey, hx, hy, phi1, phi2, r, d,
        ),
        (2, HigherOrder, 2) => kernels::magnetic_z::<HigherOrder2>(
            face, bounds, workers, coeffs_h, id, ex, ey, hx, hy, phi1, phi2, r, d,
        ),
        (2, Multipole, 1) => kernels::magnetic_z::<Multipole1>(
            face, bounds, workers, coeffs_h, id, ex, ey, hx, hy, phi1, phi2, r, d,
        ),
        (2, Multipole, 2) => kernels::magnetic_z::<Multipole2>(
            face, bounds, workers, coeffs_h, id, ex, ey, hx, hy, phi1, phi2, r, d,
        ),
        _ => unreachable!("PML order must be 1 or 2"),
    }
}

fn check_phi(
    bounds: &SlabBounds,
    order: usize,
    phi1: ArrayView4<Real>,
    phi2: ArrayView4<Real>,
) {
    let (nx, ny, nz) = bounds.dims();
    let expected = [order, nx, ny, nz];
    assert_eq!(phi1.shape(), expected, "Phi1 shape must match the slab");
    assert_eq!(phi2.shape(), expected, "Phi2 shape must match the slab");
}
