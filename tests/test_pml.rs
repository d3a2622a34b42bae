//! Property tests for the PML slab update kernels

mod test_utils;

use approx::assert_abs_diff_eq;
use fdtd_core::prelude::*;
use ndarray::Axis;
use test_utils::*;

const W: usize = 2;

fn two_poles() -> [CfsPole; 2] {
    [
        CfsPole::standard(),
        CfsPole {
            alpha: 0.1,
            kappa_max: 1.0,
            sigma_max: Some(0.4),
            m: 3.0,
        },
    ]
}

#[test]
fn zero_state_stays_zero_for_every_variant() {
    for &face in ALL_FACES.iter() {
        for &formulation in &[Formulation::HigherOrder, Formulation::Multipole] {
            for order in 1..=2usize {
                let mut grid = vacuum_grid(8, 0.5);
                let poles = vec![CfsPole::standard(); order];
                let mut pml = Pml::new(
                    face,
                    slab_bounds(face, 8, 3),
                    formulation,
                    &poles,
                    grid.dt,
                    1.0,
                    1.0,
                    1.0,
                );
                pml.update_magnetic(&mut grid, W);
                pml.update_electric(&mut grid, W);
                let context = format!("{:?} {:?} order {}", face, formulation, order);
                assert!(grid.ex.iter().all(|&v| v == 0.0), "Ex dirty: {}", context);
                assert!(grid.ey.iter().all(|&v| v == 0.0), "Ey dirty: {}", context);
                assert!(grid.ez.iter().all(|&v| v == 0.0), "Ez dirty: {}", context);
                assert!(grid.hx.iter().all(|&v| v == 0.0), "Hx dirty: {}", context);
                assert!(grid.hy.iter().all(|&v| v == 0.0), "Hy dirty: {}", context);
                assert!(grid.hz.iter().all(|&v| v == 0.0), "Hz dirty: {}", context);
                assert!(pml.ephi1.iter().all(|&v| v == 0.0), "EPhi1 dirty: {}", context);
                assert!(pml.ephi2.iter().all(|&v| v == 0.0), "EPhi2 dirty: {}", context);
                assert!(pml.hphi1.iter().all(|&v| v == 0.0), "HPhi1 dirty: {}", context);
                assert!(pml.hphi2.iter().all(|&v| v == 0.0), "HPhi2 dirty: {}", context);
            }
        }
    }
}

#[test]
fn electric_kernel_touches_only_its_targets() {
    let n = 10;
    let t = 4;
    let mut grid = vacuum_grid(n, 0.5);
    seed_fields(&mut grid);
    let before = grid.clone();
    let mut pml = Pml::new(
        Face::XMinus,
        SlabBounds::new(0, t, 0, n, 0, n),
        Formulation::HigherOrder,
        &two_poles(),
        grid.dt,
        1.0,
        1.0,
        1.0,
    );
    // two half-steps: the first call only charges the accumulators when
    // the stretch is unity, the second feeds them back into the fields
    pml.update_electric(&mut grid, W);
    pml.update_electric(&mut grid, W);

    // the x-face electric kernel writes Ey and Ez only
    assert_eq!(grid.ex, before.ex);
    assert_eq!(grid.hx, before.hx);
    assert_eq!(grid.hy, before.hy);
    assert_eq!(grid.hz, before.hz);
    // and only on the nodes the slab owns
    let mut changed = 0usize;
    for ((i, j, k), &now) in grid.ey.indexed_iter() {
        let owned = (1..=t).contains(&i) && j < n && k < n;
        if now != before.ey[[i, j, k]] {
            assert!(owned, "Ey changed outside the slab at ({}, {}, {})", i, j, k);
            changed += 1;
        }
    }
    for ((i, j, k), &now) in grid.ez.indexed_iter() {
        let owned = (1..=t).contains(&i) && j < n && k < n;
        if now != before.ez[[i, j, k]] {
            assert!(owned, "Ez changed outside the slab at ({}, {}, {})", i, j, k);
            changed += 1;
        }
    }
    assert!(changed > 0, "the kernel should have updated the slab");
    // the magnetic accumulators were not part of this call
    assert!(pml.hphi1.iter().all(|&v| v == 0.0));
    assert!(pml.hphi2.iter().all(|&v| v == 0.0));
}

#[test]
fn results_do_not_depend_on_worker_count() {
    let n = 12;
    let t = 3;
    let poles = two_poles();
    let run = |workers: usize| -> FdtdGrid {
        let mut grid = vacuum_grid(n, 0.5);
        seed_fields(&mut grid);
        let mut slabs = all_slabs(n, t, Formulation::Multipole, &poles, grid.dt);
        for _ in 0..3 {
            update_magnetic(&mut grid, workers);
            for slab in slabs.iter_mut() {
                slab.update_magnetic(&mut grid, workers);
            }
            update_electric(&mut grid, workers);
            for slab in slabs.iter_mut() {
                slab.update_electric(&mut grid, workers);
            }
        }
        grid
    };
    let serial = run(1);
    let parallel = run(5);
    assert_eq!(serial.ex, parallel.ex);
    assert_eq!(serial.ey, parallel.ey);
    assert_eq!(serial.ez, parallel.ez);
    assert_eq!(serial.hx, parallel.hx);
    assert_eq!(serial.hy, parallel.hy);
    assert_eq!(serial.hz, parallel.hz);
}

#[test]
fn opposite_faces_produce_mirror_updates() {
    let n = 20;
    let t = 6;
    let poles = two_poles();
    let mut g1 = vacuum_grid(n, 0.5);
    for ((i, j, k), v) in g1.ez.indexed_iter_mut() {
        *v = ((i as f64 * 0.7).sin() + (j as f64 * 0.3).cos() * (k as f64 * 0.2).sin()) as Real;
    }
    let mut g2 = vacuum_grid(n, 0.5);
    for ((i, j, k), v) in g2.ez.indexed_iter_mut() {
        *v = g1.ez[[n - i, j, k]];
    }
    let mut xm = Pml::new(
        Face::XMinus,
        SlabBounds::new(0, t, 0, n, 0, n),
        Formulation::HigherOrder,
        &poles,
        g1.dt,
        1.0,
        1.0,
        1.0,
    );
    let mut xp = Pml::new(
        Face::XPlus,
        SlabBounds::new(n - t, n, 0, n, 0, n),
        Formulation::HigherOrder,
        &poles,
        g2.dt,
        1.0,
        1.0,
        1.0,
    );
    for _ in 0..2 {
        xm.update_magnetic(&mut g1, W);
        xp.update_magnetic(&mut g2, W);
    }
    assert!(g1.hy.iter().any(|&v| v != 0.0), "no update reached Hy");
    // the slab-local node at depth i sits at t-1-i on the minus face and
    // n-t+i on the plus face; reflection flips the sign of Hy
    for i in 0..t {
        for j in 0..n {
            for k in 0..n {
                let minus = g1.hy[[t - 1 - i, j, k]];
                let plus = g2.hy[[n - t + i, j, k]];
                assert_eq!(plus, -minus, "mirror broken at depth {} ({}, {})", i, j, k);
            }
        }
    }
    // only Ez was seeded, so the Hz pair of both kernels saw zero curl
    assert!(g1.hz.iter().all(|&v| v == 0.0));
    assert!(g2.hz.iter().all(|&v| v == 0.0));
}

#[test]
fn higher_order_degenerate_second_pole_matches_first_order() {
    let n = 12;
    let t = 4;
    let bounds = SlabBounds::new(0, t, 0, n, 0, n);
    let mut g2 = vacuum_grid(n, 0.5);
    seed_fields(&mut g2);
    let mut g1 = g2.clone();

    let r2 = const_profiles(t, &[0.8, 1.0], &[0.6, 0.0], &[0.5, 0.0], &[0.3, 0.0]);
    let mut p2 = Pml::with_profiles(
        Face::XMinus,
        bounds,
        Formulation::HigherOrder,
        r2.clone(),
        r2,
        1.0,
    );
    let r1 = const_profiles(t, &[0.8], &[0.6], &[0.5], &[0.3]);
    let mut p1 = Pml::with_profiles(
        Face::XMinus,
        bounds,
        Formulation::HigherOrder,
        r1.clone(),
        r1,
        1.0,
    );

    for _ in 0..3 {
        p2.update_magnetic(&mut g2, W);
        p1.update_magnetic(&mut g1, W);
        p2.update_electric(&mut g2, W);
        p1.update_electric(&mut g1, W);
    }
    assert!(max_abs_diff(g1.hy.view(), g2.hy.view()) < 1e-12);
    assert!(max_abs_diff(g1.hz.view(), g2.hz.view()) < 1e-12);
    assert!(max_abs_diff(g1.ey.view(), g2.ey.view()) < 1e-12);
    assert!(max_abs_diff(g1.ez.view(), g2.ez.view()) < 1e-12);
    // the degenerate pole accumulates nothing
    assert!(p2.hphi1.index_axis(Axis(0), 1).iter().all(|&v| v == 0.0));
    assert!(p2.ephi1.index_axis(Axis(0), 1).iter().all(|&v| v == 0.0));
}

#[test]
fn multipole_degenerate_second_pole_matches_first_order() {
    let n = 12;
    let t = 4;
    let bounds = SlabBounds::new(0, t, 0, n, 0, n);
    let mut g2 = vacuum_grid(n, 0.5);
    seed_fields(&mut g2);
    let mut g1 = g2.clone();

    // the multipole stretch is additive, so its identity pole is RA = 0
    let r2 = const_profiles(t, &[1.6, 0.0], &[1.0, 0.0], &[0.4, 0.0], &[0.25, 0.0]);
    let mut p2 = Pml::with_profiles(
        Face::XMinus,
        bounds,
        Formulation::Multipole,
        r2.clone(),
        r2,
        1.0,
    );
    let r1 = const_profiles(t, &[1.6], &[1.0], &[0.4], &[0.25]);
    let mut p1 = Pml::with_profiles(
        Face::XMinus,
        bounds,
        Formulation::Multipole,
        r1.clone(),
        r1,
        1.0,
    );

    for _ in 0..3 {
        p2.update_electric(&mut g2, W);
        p1.update_electric(&mut g1, W);
    }
    assert!(max_abs_diff(g1.ey.view(), g2.ey.view()) < 1e-12);
    assert!(max_abs_diff(g1.ez.view(), g2.ez.view()) < 1e-12);
    assert!(p2.ephi1.index_axis(Axis(0), 1).iter().all(|&v| v == 0.0));
}

#[test]
fn phi_decays_geometrically_without_excitation() {
    let n = 10;
    let t = 4;
    let bounds = SlabBounds::new(0, t, 0, n, 0, n);
    let r = const_profiles(t, &[1.0], &[1.0], &[0.7], &[0.2]);
    let mut pml = Pml::with_profiles(
        Face::XMinus,
        bounds,
        Formulation::HigherOrder,
        r.clone(),
        r,
        1.0,
    );
    let mut grid = vacuum_grid(n, 0.5);
    for ((i, _j, _k), v) in grid.ez.indexed_iter_mut() {
        *v = (i * i) as Real * 0.01;
    }
    pml.update_magnetic(&mut grid, 1);
    let seeded = pml.hphi1.clone();
    assert!(seeded.iter().any(|&v| v != 0.0));

    grid.ey.fill(0.0);
    grid.ez.fill(0.0);
    for _ in 0..6 {
        pml.update_magnetic(&mut grid, 1);
    }
    let decay = 0.7f64.powi(6);
    for (now, was) in pml.hphi1.iter().zip(seeded.iter()) {
        assert_abs_diff_eq!(*now as f64, *was as f64 * decay, epsilon = 1e-12);
    }
}

#[test]
fn identity_profiles_leave_fields_and_phi_untouched() {
    let n = 40;
    let t = 10;
    let mut grid = vacuum_grid(n, 0.5);
    for ((i, _j, _k), v) in grid.ez.indexed_iter_mut() {
        *v = i as Real;
    }
    let r = unit_profiles(t);
    let mut pml = Pml::with_profiles(
        Face::XMinus,
        SlabBounds::new(0, t, 0, n, 0, n),
        Formulation::HigherOrder,
        r.clone(),
        r,
        1.0,
    );
    pml.update_magnetic(&mut grid, 1);
    assert!(grid.hy.iter().all(|&v| v == 0.0));
    assert!(grid.hz.iter().all(|&v| v == 0.0));
    assert!(pml.hphi1.iter().all(|&v| v == 0.0));
    assert!(pml.hphi2.iter().all(|&v| v == 0.0));
}

#[test]
fn impulse_response_of_the_higher_order_accumulator() {
    let n = 8;
    let t = 3;
    let bounds = SlabBounds::new(0, t, 0, n, 0, n);
    let r = const_profiles(t, &[0.9], &[1.0], &[0.6], &[0.2]);
    let mut pml = Pml::with_profiles(
        Face::XMinus,
        bounds,
        Formulation::HigherOrder,
        r.clone(),
        r,
        1.0,
    );
    let mut grid = vacuum_grid(n, 0.5);
    // a linear Hz ramp gives a unit backward difference everywhere
    for ((i, _j, _k), v) in grid.hz.indexed_iter_mut() {
        *v = i as Real;
    }
    pml.update_electric(&mut grid, 1);
    for &v in pml.ephi1.iter() {
        assert_abs_diff_eq!(v as f64, -0.2, epsilon = 1e-14);
    }

    grid.hz.fill(0.0);
    grid.hy.fill(0.0);
    for _ in 0..5 {
        pml.update_electric(&mut grid, 1);
    }
    let expected = -0.2 * 0.6f64.powi(5);
    for &v in pml.ephi1.iter() {
        assert_abs_diff_eq!(v as f64, expected, epsilon = 1e-12);
    }
}

#[test]
fn impulse_response_of_the_multipole_accumulator() {
    let n = 8;
    let t = 3;
    let bounds = SlabBounds::new(0, t, 0, n, 0, n);
    let r = const_profiles(t, &[2.0], &[1.0], &[0.5], &[0.4]);
    let mut pml = Pml::with_profiles(
        Face::XMinus,
        bounds,
        Formulation::Multipole,
        r.clone(),
        r,
        1.0,
    );
    let mut grid = vacuum_grid(n, 0.5);
    for ((i, _j, _k), v) in grid.hz.indexed_iter_mut() {
        *v = i as Real;
    }
    pml.update_electric(&mut grid, 1);
    // the unit impulse deposits RC0 = RB0 * RF0 / RA0
    let rc0 = 0.2;
    for &v in pml.ephi1.iter() {
        assert_abs_diff_eq!(v as f64, rc0, epsilon = 1e-14);
    }

    grid.hz.fill(0.0);
    grid.hy.fill(0.0);
    for _ in 0..4 {
        pml.update_electric(&mut grid, 1);
    }
    // the stale-accumulator relaxation decays at RE0 - RC0 per step
    let expected = rc0 * (0.5 - 0.2f64).powi(4);
    for &v in pml.ephi1.iter() {
        assert_abs_diff_eq!(v as f64, expected, epsilon = 1e-12);
    }
}
