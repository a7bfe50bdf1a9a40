//! Physics Primitive Validation Suite
//!
//! Property-level checks of the shared primitives both solvers build on:
//! unit conversions, gas mix closure, the Schreiner/Haldane equivalence at
//! zero rate, loading monotonicity during descent, and ceiling behaviour
//! under gradient factors.
//!
//! # References
//! - Schreiner & Kelley (1971): gas loading under changing pressure
//! - Bühlmann (1995): ZH-L16 coefficients and M-value ceilings
//!
//! Run with: `cargo test --test physics_validation`

use dive_plan_core::buhlmann::{Compartment, ZH16B_TISSUES};
use dive_plan_core::physics::gas_loading::{haldane, schreiner};
use dive_plan_core::physics::pressure::{depth_to_pressure, pressure_to_depth};
use dive_plan_core::{feet_to_meters, meters_to_feet, Environment, GasMix};

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 1: UNIT CONVERSIONS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_feet_meters_round_trip_across_range() {
    let mut x = -10_000.0_f64;
    while x <= 10_000.0 {
        let round_trip = meters_to_feet(feet_to_meters(x));
        assert!(
            (round_trip - x).abs() < 1e-9,
            "round trip of {x} drifted to {round_trip}"
        );
        x += 97.3;
    }
}

#[test]
fn test_depth_pressure_inverse_both_salinities() {
    let env = Environment::default();
    for fresh in [true, false] {
        for depth in [0.0, 1.5, 6.0, 21.0, 50.0, 90.0, 120.0] {
            let back = pressure_to_depth(depth_to_pressure(depth, &env, fresh), &env, fresh);
            assert!((back - depth).abs() < 1e-9);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 2: GAS MIX CLOSURE AND DEPTH QUERIES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_gas_fractions_closure() {
    let mut fo2 = 0.05;
    while fo2 <= 1.0 {
        let mut fhe = 0.0;
        while fo2 + fhe <= 1.0 {
            let gas = GasMix::new(fo2, fhe).unwrap();
            let sum = gas.fo2() + gas.fhe() + gas.fn2();
            assert!(
                (sum - 1.0).abs() < 1e-12,
                "Gas({fo2}, {fhe}) fractions sum to {sum}"
            );
            fhe += 0.17;
        }
        fo2 += 0.13;
    }
}

#[test]
fn test_mod_deepens_as_fo2_drops() {
    let env = Environment::default();
    let ean50 = GasMix::new(0.5, 0.0).unwrap();
    let ean32 = GasMix::new(0.32, 0.0).unwrap();
    assert!(
        ean32.mod_depth(1.4, &env, false) > ean50.mod_depth(1.4, &env, false),
        "leaner mix must have the deeper MOD"
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 3: GAS LOADING EQUATIONS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_schreiner_equals_haldane_at_zero_rate() {
    let half_times = [1.88, 4.0, 12.5, 38.3, 109.0, 635.0];
    for half_time in half_times {
        for (p_begin, p_gas, time) in
            [(0.745, 3.16, 1.0), (0.0, 1.0, 10.0), (2.8, 0.745, 45.0)]
        {
            let s = schreiner(p_begin, p_gas, time, half_time, 0.0);
            let h = haldane(p_begin, p_gas, half_time, time);
            assert!(
                (s - h).abs() < 1e-12,
                "t½={half_time}: schreiner {s} vs haldane {h}"
            );
        }
    }
}

#[test]
fn test_descent_pressure_monotonicity() {
    // Constant positive-fraction descent: every compartment gains inert
    // gas across the step.
    let env = Environment::default();
    for coefficients in ZH16B_TISSUES {
        let mut compartment = Compartment::new(coefficients, 1.0, false);
        let before = compartment.p_total();
        compartment.add_depth_change(0.0, 42.0, 0.21, 0.0, 4.0, &env);
        assert!(
            compartment.p_total() >= before,
            "t½={} lost gas on descent",
            coefficients.n2_half_time
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 4: CEILING BEHAVIOUR UNDER GRADIENT FACTORS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_ceiling_monotone_in_gf_for_loaded_state() {
    let env = Environment::default();
    for coefficients in ZH16B_TISSUES {
        let mut compartment = Compartment::new(coefficients, 1.0, false);
        compartment.add_depth_change(0.0, 45.0, 0.21, 0.0, 4.0, &env);
        compartment.add_depth_change(45.0, 45.0, 0.21, 0.0, 35.0, &env);
        assert!(
            compartment.ceiling(1.0, &env) <= compartment.ceiling(0.2, &env),
            "t½={}: full M-value ceiling must not exceed the conservative one",
            coefficients.n2_half_time
        );
    }
}
