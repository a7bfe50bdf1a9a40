//! Inert-gas uptake and release equations
//!
//! Implements the two closed-form gas-loading solutions used by both
//! decompression models, plus water vapour pressure for inspired-gas
//! corrections.
//!
//! # References
//! - Schreiner, H.R. and Kelley, P.L. (1971). "A pragmatic view of
//!   decompression." Underwater Physiology IV.
//! - Boycott, A.E., Damant, G.C.C., Haldane, J.S. (1908). "The prevention
//!   of compressed-air illness." Journal of Hygiene, 8(3).
//! - Antoine, C. (1888). Vapour pressure relation; constants from the NIST
//!   water tabulation.

use std::f64::consts::LN_2;

use crate::physics::pressure::{mmhg_to_pascal, pascal_to_bar};

/// Deep-lung temperature (°C) used for the respiratory water vapour term.
pub const LUNG_TEMPERATURE: f64 = 35.2;

/// Gas loading under a linearly changing ambient pressure.
///
/// ```text
/// k = ln 2 / t½
/// p(t) = p_insp + rate·(t − 1/k) − (p_insp − p_begin − rate/k)·e^(−k·t)
/// ```
///
/// # Arguments
/// * `p_begin` - compartment inert gas pressure at the start of the segment
/// * `p_inspired` - inspired inert gas partial pressure
/// * `time` - segment time (minutes)
/// * `half_time` - compartment half-time (minutes)
/// * `rate` - rate of change of inspired partial pressure (pressure/min)
pub fn schreiner(p_begin: f64, p_inspired: f64, time: f64, half_time: f64, rate: f64) -> f64 {
    let k = LN_2 / half_time;
    p_inspired + rate * (time - 1.0 / k) - (p_inspired - p_begin - rate / k) * (-k * time).exp()
}

/// Gas loading at constant ambient pressure.
///
/// ```text
/// p(t) = p_begin + (p_insp − p_begin)·(1 − e^(−(ln 2 / t½)·t))
/// ```
pub fn haldane(p_begin: f64, p_inspired: f64, half_time: f64, time: f64) -> f64 {
    p_begin + (p_inspired - p_begin) * (1.0 - (-(LN_2 / half_time) * time).exp())
}

/// Saturated water vapour pressure (mmHg) at a temperature in °C.
///
/// Antoine equation, valid from 1 °C to 374 °C; `None` outside that range.
pub fn water_vapour_pressure_mmhg(degrees_celsius: f64) -> Option<f64> {
    let (a, b, c) = if (1.0..=100.0).contains(&degrees_celsius) {
        (8.07131, 1730.63, 233.426)
    } else if degrees_celsius > 100.0 && degrees_celsius <= 374.0 {
        (8.14019, 1810.94, 244.485)
    } else {
        return None;
    };
    let log_p = a - b / (c + degrees_celsius);
    Some(10.0_f64.powf(log_p))
}

/// Saturated water vapour pressure (bar) at a temperature in °C.
pub fn water_vapour_pressure_bar(degrees_celsius: f64) -> Option<f64> {
    water_vapour_pressure_mmhg(degrees_celsius).map(|mmhg| pascal_to_bar(mmhg_to_pascal(mmhg)))
}

/// Water vapour pressure (bar) in the lungs, ≈0.0567 bar at 35.2 °C.
pub fn lung_water_vapour() -> f64 {
    water_vapour_pressure_bar(LUNG_TEMPERATURE)
        .expect("lung temperature is inside the Antoine validity range")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schreiner_zero_rate_matches_haldane() {
        let cases = [
            (0.745, 3.16, 1.0, 5.0),
            (0.745, 3.16, 30.0, 38.3),
            (2.5, 0.79, 10.0, 12.5),
            (0.0, 1.2, 4.0, 1.88),
        ];
        for (p_begin, p_gas, time, half_time) in cases {
            let s = schreiner(p_begin, p_gas, time, half_time, 0.0);
            let h = haldane(p_begin, p_gas, half_time, time);
            assert!(
                (s - h).abs() < 1e-12,
                "schreiner({p_begin}, {p_gas}, {time}, {half_time}, 0) = {s} but haldane = {h}"
            );
        }
    }

    #[test]
    fn test_haldane_half_time_meaning() {
        // After exactly one half-time, half the gradient is absorbed.
        let p = haldane(1.0, 3.0, 10.0, 10.0);
        assert!((p - 2.0).abs() < 1e-12, "one half-time should close half the gap, got {p}");
    }

    #[test]
    fn test_haldane_zero_time_is_identity() {
        let p = haldane(1.3, 4.0, 27.0, 0.0);
        assert_eq!(p, 1.3);
    }

    #[test]
    fn test_schreiner_descent_loads_gas() {
        // Constant-rate descent: loading must exceed the starting pressure.
        let p = schreiner(0.79, 0.79, 5.0, 5.0, 0.6);
        assert!(p > 0.79, "descent at positive rate must on-gas, got {p}");
    }

    #[test]
    fn test_haldane_approaches_inspired() {
        let p = haldane(0.745, 3.16, 5.0, 500.0);
        assert!((p - 3.16).abs() < 1e-9, "long exposure saturates, got {p}");
    }

    #[test]
    fn test_water_vapour_known_points() {
        // 100 °C: boiling point, 760 mmHg.
        let boiling = water_vapour_pressure_mmhg(100.0).unwrap();
        assert!((boiling - 760.0).abs() < 2.0, "boiling point gave {boiling} mmHg");

        // Lung vapour term ≈ 0.0567 bar.
        let lungs = lung_water_vapour();
        assert!((lungs - 0.0567).abs() < 5e-4, "lung vapour gave {lungs} bar");
    }

    #[test]
    fn test_water_vapour_out_of_range() {
        assert!(water_vapour_pressure_mmhg(-5.0).is_none());
        assert!(water_vapour_pressure_mmhg(400.0).is_none());
    }
}
