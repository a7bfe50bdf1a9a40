//! Bühlmann-GF End-to-End Schedule Validation
//!
//! Whole-plan scenarios: NDL behaviour on air, a trimix decompression dive
//! with a nitrox deco gas, best-gas selection at the classic switch
//! depths, and idempotence of repeated evaluations.
//!
//! All depths in meters, times in minutes, salt water at sea level.
//!
//! Run with: `cargo test --test buhlmann_schedules`

use dive_plan_core::buhlmann::{Plan, NDL_INFINITE, ZH16B_TISSUES};
use dive_plan_core::error::{DecoError, PlanError};

fn trimix_deco_plan() -> Plan {
    let mut plan = Plan::new(&ZH16B_TISSUES, 1.0, false);
    plan.add_bottom_gas("2135", 0.21, 0.35).unwrap();
    plan.add_deco_gas("50%", 0.5, 0.0).unwrap();
    plan.add_depth_change(0.0, 50.0, "2135", 5.0).unwrap();
    plan.add_flat(50.0, "2135", 25.0).unwrap();
    plan
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 1: NO-DECOMPRESSION LIMITS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_ndl_air_30m_plausible_range() {
    // Published no-stop limits for air at 30 m sit in the teens at full
    // M-value; permissive gradient factors extend that.
    let mut plan = Plan::new(&ZH16B_TISSUES, 1.0, false);
    plan.add_bottom_gas("air", 0.21, 0.0).unwrap();

    let strict = plan.ndl(30.0, "air", 1.0).unwrap();
    assert!(
        (10..=25).contains(&strict),
        "NDL at 30 m, gf 1.0 should be in the teens, got {strict}"
    );

    let permissive = plan.ndl(30.0, "air", 1.5).unwrap();
    assert!(
        permissive > strict,
        "higher gf must extend the NDL ({strict} -> {permissive})"
    );
    assert!(
        (20..=45).contains(&permissive),
        "NDL at 30 m, gf 1.5 expected around 25-40 minutes, got {permissive}"
    );
}

#[test]
fn test_ndl_depth_ordering_and_sentinel() {
    let mut plan = Plan::new(&ZH16B_TISSUES, 1.0, false);
    plan.add_bottom_gas("air", 0.21, 0.0).unwrap();

    let at_40 = plan.ndl(40.0, "air", 1.0).unwrap();
    let at_30 = plan.ndl(30.0, "air", 1.0).unwrap();
    let at_18 = plan.ndl(18.0, "air", 1.0).unwrap();
    assert!(at_40 < at_30 && at_30 < at_18);

    // Shallow enough that tissues equilibrate below any ceiling.
    let shallow = plan.ndl(3.0, "air", 1.0).unwrap();
    assert_eq!(shallow, NDL_INFINITE);
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 2: TRIMIX DECOMPRESSION SCHEDULE (50 m / 25 min ON 21/35)
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_trimix_schedule_shape() {
    let mut plan = trimix_deco_plan();
    let schedule = plan
        .calculate_decompression(false, 0.2, 0.8, 1.6, 30.0, None)
        .unwrap();

    // Ends at the surface.
    let last = schedule.segments.last().unwrap();
    assert_eq!(last.end_depth, 0.0, "schedule must surface the diver");

    // First stop on the 3-m grid.
    let first_stop = schedule.first_stop_depth().expect("deco dive needs stops");
    assert_eq!(
        first_stop % 3.0,
        0.0,
        "first stop {first_stop} is off the 3-m grid"
    );

    // Ascent is monotone after the bottom segment.
    let mut past_bottom = false;
    for pair in schedule.segments.windows(2) {
        if pair[0].end_depth == 50.0 {
            past_bottom = true;
        }
        if past_bottom {
            assert!(
                pair[1].end_depth <= pair[0].end_depth,
                "depth increased during ascent: {} -> {}",
                pair[0].end_depth,
                pair[1].end_depth
            );
        }
    }

    // Deco time is substantial but bounded for this exposure.
    let deco_time = schedule.runtime() - 30.0;
    assert!(
        (10.0..=120.0).contains(&deco_time),
        "implausible total deco time {deco_time} min"
    );

    // The 50% nitrox takes over once it is breathable.
    assert!(
        schedule
            .segments
            .iter()
            .any(|s| s.gas_name == "50%" && s.start_depth <= 22.0),
        "EAN50 never came into use"
    );

    // No adjacent identical flat segments survive collapsing.
    for pair in schedule.segments.windows(2) {
        assert!(
            !(pair[0].is_flat()
                && pair[1].is_flat()
                && pair[0].end_depth == pair[1].start_depth
                && pair[0].gas_name == pair[1].gas_name),
            "uncollapsed stop pair at {} m",
            pair[0].end_depth
        );
    }
}

#[test]
fn test_gf_high_one_shortens_schedule() {
    let mut conservative = trimix_deco_plan();
    let slow = conservative
        .calculate_decompression(false, 0.2, 0.8, 1.6, 30.0, None)
        .unwrap();

    let mut permissive = trimix_deco_plan();
    let fast = permissive
        .calculate_decompression(false, 1.0, 1.0, 1.6, 30.0, None)
        .unwrap();

    assert!(
        fast.runtime() < slow.runtime(),
        "gf 1.0/1.0 ({}) should out-pace gf 0.2/0.8 ({})",
        fast.runtime(),
        slow.runtime()
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 3: BEST DECO GAS SELECTION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_gas_switch_depths() {
    let mut plan = Plan::new(&ZH16B_TISSUES, 1.0, false);
    plan.add_bottom_gas("air", 0.21, 0.0).unwrap();
    plan.add_deco_gas("50%", 0.5, 0.0).unwrap();
    plan.add_deco_gas("O2", 1.0, 0.0).unwrap();

    // EAN50 MOD at ppO₂ 1.6 rounds to 22 m; oxygen to 6 m.
    assert_eq!(plan.best_deco_gas(21.0, 1.6, 30.0), Some("50%"));
    assert_eq!(plan.best_deco_gas(22.0, 1.6, 30.0), Some("50%"));
    assert_eq!(plan.best_deco_gas(6.0, 1.6, 30.0), Some("O2"));
    assert_eq!(plan.best_deco_gas(7.0, 1.6, 30.0), Some("50%"));
    assert_eq!(plan.best_deco_gas(23.0, 1.6, 30.0), None);
}

#[test]
fn test_no_deco_gas_usable_from_depth() {
    let mut plan = Plan::new(&ZH16B_TISSUES, 1.0, false);
    plan.add_bottom_gas("air", 0.21, 0.0).unwrap();
    plan.add_deco_gas("O2", 1.0, 0.0).unwrap();
    let result = plan.calculate_decompression(false, 0.3, 0.8, 1.6, 30.0, Some(40.0));
    assert!(matches!(
        result,
        Err(DecoError::Plan(PlanError::NoUsableDecoGas { .. }))
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 4: IDEMPOTENCE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_two_evaluations_are_byte_identical() {
    let mut plan = trimix_deco_plan();
    let first = plan
        .calculate_decompression(false, 0.2, 0.8, 1.6, 30.0, None)
        .unwrap();
    let second = plan
        .calculate_decompression(false, 0.2, 0.8, 1.6, 30.0, None)
        .unwrap();
    assert_eq!(first, second);

    let first_json = serde_json::to_string(&first).unwrap();
    let second_json = serde_json::to_string(&second).unwrap();
    assert_eq!(first_json, second_json);
}
