use std::f64::consts::TAU;

use plate_dispersion::modes::{pair_mismatch, to_cyclic_wavenumbers};
use plate_dispersion::{
    assemble_system, build_layer_matrices, raw_wavenumbers, solve, solve_wavenumbers,
    wavenumbers_at, Execution, Layer, Orthotropic, Sample, SolverOptions, PAIR_MISMATCH_TOL,
};

const LEG_DEG: usize = 8;

fn aluminium_plate() -> Sample {
    Sample::single(Layer::isotropic(70e9, 0.33, 2700.0, 1e-3))
}

fn cross_ply() -> Sample {
    let ply = Orthotropic {
        e1: 130e9,
        e2: 10e9,
        e3: 10e9,
        nu12: 0.3,
        nu13: 0.3,
        nu23: 0.4,
        g12: 5e9,
        g13: 5e9,
        g23: 3.6e9,
    };
    let c = ply.stiffness().expect("valid engineering constants");
    let zero = Layer::new(c, 1560.0, 0.5e-3);
    let ninety = zero.clone().with_orientation([std::f64::consts::FRAC_PI_2, 0.0, 0.0]);
    Sample::new(vec![zero, ninety])
}

fn same_bits(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits()
}

#[test]
fn velocity_is_frequency_over_wavenumber() {
    let curves = solve(&aluminium_plate(), 0.0, 15e3, 4, LEG_DEG, 4, &SolverOptions::default());
    for m in 0..curves.num_modes() {
        for i in 0..curves.num_frequencies() {
            let k = curves.wavenumbers[(m, i)];
            let v = curves.phase_velocities[(m, i)];
            if k.is_nan() || k == 0.0 {
                assert!(v.is_nan());
            } else {
                assert_eq!(v, curves.frequencies[i] / k);
            }
        }
    }
}

#[test]
fn raw_columns_are_sorted_with_nan_last() {
    let (_, raw) = raw_wavenumbers(&cross_ply(), 0.3, 20e3, 3, LEG_DEG, Execution::Sequential);
    for j in 0..raw.ncols() {
        let column: Vec<f64> = raw.column(j).iter().copied().collect();
        let finite = column.iter().take_while(|v| v.is_finite()).count();
        assert!(column[finite..].iter().all(|v| v.is_nan()), "NaN not last in column {}", j);
        for pair in column[..finite].windows(2) {
            assert!(pair[0] <= pair[1], "column {} not ascending: {:?}", j, pair);
        }
    }
}

#[test]
fn repeated_solves_are_bit_identical() {
    let opts = SolverOptions::default();
    let a = solve(&cross_ply(), 0.4, 20e3, 3, LEG_DEG, 4, &opts);
    let b = solve(&cross_ply(), 0.4, 20e3, 3, LEG_DEG, 4, &opts);
    assert!(a.wavenumbers.iter().zip(b.wavenumbers.iter()).all(|(x, y)| same_bits(*x, *y)));
    assert!(a
        .phase_velocities
        .iter()
        .zip(b.phase_velocities.iter())
        .all(|(x, y)| same_bits(*x, *y)));
}

#[test]
fn full_turn_of_propagation_angle_reproduces_curves() {
    const PERIOD_TOL: f64 = 1e-8;

    let opts = SolverOptions::default();
    let a = solve(&cross_ply(), 0.4, 20e3, 2, LEG_DEG, 3, &opts);
    let b = solve(&cross_ply(), 0.4 + TAU, 20e3, 2, LEG_DEG, 3, &opts);

    for (x, y) in a.wavenumbers.iter().zip(b.wavenumbers.iter()) {
        assert_eq!(x.is_nan(), y.is_nan());
        if x.is_finite() {
            assert!((x - y).abs() <= PERIOD_TOL * x.abs(), "{} vs {}", x, y);
        }
    }
}

#[test]
fn off_axis_cross_ply_solves_every_step() {
    const OFF_AXIS_ANGLES: [f64; 5] = [0.2, 0.4, 0.8, 1.2, 0.4 + TAU];
    const FREQ_STEP_HZ: f64 = 50e3;
    const STEPS: usize = 10;

    let plate = cross_ply();
    for psi in OFF_AXIS_ANGLES {
        let layers = build_layer_matrices(&plate.layers, psi);
        for i in 0..STEPS {
            let omega = TAU * FREQ_STEP_HZ * (i + 1) as f64;
            let sys = assemble_system(&layers, 10, omega);
            let sorted = solve_wavenumbers(&sys, omega)
                .unwrap_or_else(|err| panic!("psi {} step {}: {}", psi, i, err));
            assert!(!sorted[0].is_nan(), "psi {} step {}: no propagating root", psi, i);
        }

        let (_, raw) = raw_wavenumbers(&plate, psi, FREQ_STEP_HZ, STEPS, 10, Execution::Sequential);
        for j in 0..STEPS {
            assert!(raw[(0, j)].is_finite(), "psi {} column {} is all NaN", psi, j);
        }
    }
}

#[test]
fn failed_frequency_does_not_stop_the_sweep() {
    const FREQUENCIES: [f64; 4] = [20e3, 0.0, 40e3, 60e3];

    let raw = wavenumbers_at(&cross_ply(), 0.4, &FREQUENCIES, LEG_DEG, Execution::Sequential);
    assert!(raw.column(1).iter().all(|v| v.is_nan()));
    for j in [0, 2, 3] {
        assert!(raw[(0, j)].is_finite(), "column {} lost", j);
    }
}

#[test]
fn lowest_degree_runs_without_crashing() {
    let plate = aluminium_plate();
    let layers = build_layer_matrices(&plate.layers, 0.0);
    let sys = assemble_system(&layers, 2, TAU * 10e3);
    assert_eq!(sys.num_nodes(), 3 * 2);

    let curves = solve(&plate, 0.0, 10e3, 2, 2, 3, &SolverOptions::default());
    assert_eq!(curves.wavenumbers.shape(), (3, 2));
}

#[test]
fn duplicate_roots_agree_before_decimation() {
    let plate = aluminium_plate();
    let layers = build_layer_matrices(&plate.layers, 0.0);
    let omega = TAU * 10e3;
    let sys = assemble_system(&layers, 10, omega);
    let sorted = solve_wavenumbers(&sys, omega).expect("10 kHz is not a cutoff");

    // S0, SH0 and A0 pairs
    let cyclic = to_cyclic_wavenumbers(&sorted[..6]);
    assert!(cyclic.iter().all(|v| v.is_finite()));
    assert!(pair_mismatch(&cyclic) < PAIR_MISMATCH_TOL);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_sweep_matches_sequential() {
    let sequential = solve(&cross_ply(), 0.2, 20e3, 6, LEG_DEG, 4, &SolverOptions::sequential());
    let parallel = solve(&cross_ply(), 0.2, 20e3, 6, LEG_DEG, 4, &SolverOptions::parallel());

    assert_eq!(sequential.frequencies, parallel.frequencies);
    assert!(sequential
        .wavenumbers
        .iter()
        .zip(parallel.wavenumbers.iter())
        .all(|(x, y)| same_bits(*x, *y)));
}
