//! Depth/pressure conversions and breathing-gas pressure rates
//!
//! All conversions are hydrostatic: pressure at depth is the altitude
//! pressure plus the weight of the water column, `ρ·g·h`, with the liquid
//! density chosen for fresh or salt water. Functions are pure; ambient
//! constants come in through an [`Environment`] value.

use crate::core_types::environment::{
    DENSITY_FRESH_WATER, DENSITY_MERCURY, DENSITY_SALT_WATER, Environment, STANDARD_GRAVITY,
};

/// Pascals per bar
pub const PASCALS_PER_BAR: f64 = 100_000.0;

/// Pascals per standard atmosphere
pub const PASCALS_PER_ATM: f64 = 101_325.0;

/// Pascals per millimeter of mercury: the weight of a 1 mm mercury column.
pub const PASCALS_PER_MMHG: f64 = DENSITY_MERCURY * STANDARD_GRAVITY / 1000.0;

/// Water density (kg/m³) for the given salinity.
#[inline]
pub fn water_density(fresh_water: bool) -> f64 {
    if fresh_water {
        DENSITY_FRESH_WATER
    } else {
        DENSITY_SALT_WATER
    }
}

/// Convert bar to pascal.
#[inline]
pub fn bar_to_pascal(bars: f64) -> f64 {
    bars * PASCALS_PER_BAR
}

/// Convert pascal to bar.
#[inline]
pub fn pascal_to_bar(pascals: f64) -> f64 {
    pascals / PASCALS_PER_BAR
}

/// Convert millimeters of mercury to pascal.
#[inline]
pub fn mmhg_to_pascal(mmhg: f64) -> f64 {
    mmhg * PASCALS_PER_MMHG
}

/// Absolute pressure (bar) at a depth in meters.
pub fn depth_to_pressure(depth: f64, env: &Environment, fresh_water: bool) -> f64 {
    let weight = water_density(fresh_water) * env.gravity * depth;
    env.altitude_pressure + pascal_to_bar(weight)
}

/// Depth in meters at an absolute pressure in bar.
pub fn pressure_to_depth(bars: f64, env: &Environment, fresh_water: bool) -> f64 {
    bar_to_pascal(bars - env.altitude_pressure) / (water_density(fresh_water) * env.gravity)
}

/// Rate of ambient pressure change (bar/min) for a depth change over time.
///
/// Positive for descent, negative for ascent.
pub fn depth_change_in_bars_per_minute(
    begin_depth: f64,
    end_depth: f64,
    time: f64,
    env: &Environment,
    fresh_water: bool,
) -> f64 {
    let speed = (end_depth - begin_depth) / time;
    depth_to_pressure(speed, env, fresh_water) - env.altitude_pressure
}

/// Partial-pressure rate of change (bar/min) of one gas during a depth change.
///
/// The magnitude of the ambient rate scaled by the gas fraction.
pub fn gas_rate_in_bars_per_minute(
    begin_depth: f64,
    end_depth: f64,
    time: f64,
    f_gas: f64,
    env: &Environment,
    fresh_water: bool,
) -> f64 {
    depth_change_in_bars_per_minute(begin_depth, end_depth, time, env, fresh_water).abs() * f_gas
}

/// Inspired partial pressure (bar) of one gas at depth.
pub fn gas_pressure_breathing(
    depth: f64,
    f_gas: f64,
    env: &Environment,
    fresh_water: bool,
) -> f64 {
    depth_to_pressure(depth, env, fresh_water) * f_gas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_pressure_is_altitude_pressure() {
        let env = Environment::default();
        assert!((depth_to_pressure(0.0, &env, false) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ten_meters_salt_water() {
        let env = Environment::default();
        let bars = depth_to_pressure(10.0, &env, false);
        // 1030 * 9.80665 * 10 / 100000 = 1.0101 bar of water column
        assert!((bars - 2.0101).abs() < 1e-3, "got {bars}");
    }

    #[test]
    fn test_fresh_water_is_lighter() {
        let env = Environment::default();
        assert!(
            depth_to_pressure(30.0, &env, true) < depth_to_pressure(30.0, &env, false),
            "fresh water column must weigh less than salt"
        );
    }

    #[test]
    fn test_depth_pressure_round_trip() {
        let env = Environment::default();
        for depth in [0.0, 3.0, 6.0, 21.0, 50.0, 120.0] {
            for fresh in [true, false] {
                let bars = depth_to_pressure(depth, &env, fresh);
                let back = pressure_to_depth(bars, &env, fresh);
                assert!(
                    (back - depth).abs() < 1e-9,
                    "round trip of {depth} m gave {back} m"
                );
            }
        }
    }

    #[test]
    fn test_gas_rate_magnitude() {
        let env = Environment::default();
        let descent = gas_rate_in_bars_per_minute(0.0, 50.0, 5.0, 0.79, &env, false);
        let ascent = gas_rate_in_bars_per_minute(50.0, 0.0, 5.0, 0.79, &env, false);
        assert!(descent > 0.0);
        assert!((descent - ascent).abs() < 1e-12, "rate uses magnitude");
    }

    #[test]
    fn test_gas_pressure_breathing_scales_with_fraction() {
        let env = Environment::default();
        let full = gas_pressure_breathing(30.0, 1.0, &env, false);
        let air_n2 = gas_pressure_breathing(30.0, 0.79, &env, false);
        assert!((air_n2 - full * 0.79).abs() < 1e-12);
    }
}
