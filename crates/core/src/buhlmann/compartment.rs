//! Tissue compartment state and M-value ceiling
//!
//! Each compartment tracks nitrogen and helium partial pressures, loaded
//! through the Schreiner equation, and reports the shallowest tolerable
//! depth for a gradient factor using gas-loading-weighted a/b coefficients.
//!
//! # References
//! - Baker, E.C. (1998). "Understanding M-values." Immersed, 3(3).
//! - Baker, E.C. "Clearing up the confusion about deep stops."

use crate::buhlmann::tables::CompartmentCoefficients;
use crate::core_types::environment::Environment;
use crate::physics::gas_loading::{lung_water_vapour, schreiner};
use crate::physics::pressure::{
    gas_pressure_breathing, gas_rate_in_bars_per_minute, pressure_to_depth,
};

/// Nitrogen fraction of dry atmospheric air.
const AIR_FN2: f64 = 0.79;

/// One ZH-L16 tissue compartment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compartment {
    coefficients: CompartmentCoefficients,
    p_n2: f64,
    p_he: f64,
    p_total: f64,
    fresh_water: bool,
}

impl Compartment {
    /// Compartment at surface equilibrium, breathing air.
    ///
    /// Nitrogen starts at `(abs_pressure − lung water vapour)·0.79`; helium
    /// at zero.
    pub fn new(
        coefficients: CompartmentCoefficients,
        abs_pressure: f64,
        fresh_water: bool,
    ) -> Self {
        let p_n2 = (abs_pressure - lung_water_vapour()) * AIR_FN2;
        Compartment {
            coefficients,
            p_n2,
            p_he: 0.0,
            p_total: p_n2,
            fresh_water,
        }
    }

    /// Nitrogen partial pressure (bar)
    pub fn p_n2(&self) -> f64 {
        self.p_n2
    }

    /// Helium partial pressure (bar)
    pub fn p_he(&self) -> f64 {
        self.p_he
    }

    /// Total inert gas pressure (bar)
    pub fn p_total(&self) -> f64 {
        self.p_total
    }

    /// Load the compartment through a depth change (or flat exposure when
    /// `start_depth == end_depth`).
    ///
    /// Each nuclide is integrated separately with its own half-time,
    /// inspired partial pressure at the ending depth, and linear rate.
    /// Returns the change in total inert gas pressure.
    pub fn add_depth_change(
        &mut self,
        start_depth: f64,
        end_depth: f64,
        fo2: f64,
        fhe: f64,
        time: f64,
        env: &Environment,
    ) -> f64 {
        let fn2 = 1.0 - fo2 - fhe;

        let n2_rate =
            gas_rate_in_bars_per_minute(start_depth, end_depth, time, fn2, env, self.fresh_water);
        let n2_inspired = gas_pressure_breathing(end_depth, fn2, env, self.fresh_water);
        self.p_n2 = schreiner(
            self.p_n2,
            n2_inspired,
            time,
            self.coefficients.n2_half_time,
            n2_rate,
        );

        let he_rate =
            gas_rate_in_bars_per_minute(start_depth, end_depth, time, fhe, env, self.fresh_water);
        let he_inspired = gas_pressure_breathing(end_depth, fhe, env, self.fresh_water);
        self.p_he = schreiner(
            self.p_he,
            he_inspired,
            time,
            self.coefficients.he_half_time,
            he_rate,
        );

        let previous_total = self.p_total;
        self.p_total = self.p_n2 + self.p_he;
        self.p_total - previous_total
    }

    /// Ceiling depth (m) tolerated at a gradient factor, rounded up to the
    /// next whole meter.
    ///
    /// Coefficients are weighted by the gas loadings; the tolerated ambient
    /// pressure follows the GF-scaled M-value line:
    ///
    /// ```text
    /// p_ceiling = (p_total − a·gf) / (gf/b + 1 − gf)
    /// ```
    pub fn ceiling(&self, gf: f64, env: &Environment) -> f64 {
        let a = (self.coefficients.n2_a * self.p_n2 + self.coefficients.he_a * self.p_he)
            / self.p_total;
        let b = (self.coefficients.n2_b * self.p_n2 + self.coefficients.he_b * self.p_he)
            / self.p_total;
        let bars = (self.p_total - a * gf) / (gf / b + 1.0 - gf);
        pressure_to_depth(bars, env, self.fresh_water).ceil()
    }
}
