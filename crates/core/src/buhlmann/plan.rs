//! Bühlmann-GF dive plan and decompression loop
//!
//! A plan owns the gas declarations, the recorded dive segments and the 17
//! tissue compartments. `calculate_decompression` ascends from the end of
//! the dive to the surface: the ceiling at `gf_low` sets the first stop,
//! one-minute flat exposures accumulate at each 3-m stop with the gradient
//! factor interpolated linearly toward `gf_high` at the surface, and depth
//! changes walk upward a meter at a time so a better deco gas can be taken
//! as soon as it becomes breathable.

use tracing::debug;

use crate::buhlmann::compartment::Compartment;
use crate::buhlmann::tables::CompartmentCoefficients;
use crate::core_types::environment::{self, Environment};
use crate::core_types::gas::GasMix;
use crate::core_types::segment::{collapse_segments, DecoSchedule, Segment};
use crate::error::{ConfigurationError, DecoError, NumericError, PlanError};

/// Deco ascent rate (m/min) between stops.
const DECO_ASCENT_RATE: f64 = 10.0;

/// Stop depths are multiples of this (m).
const STOP_INTERVAL: f64 = 3.0;

/// Cap on minutes accumulated at a single stop.
const MAX_STOP_MINUTES: u32 = 10_000;

/// NDL sentinel for exposures that never reach a ceiling.
pub const NDL_INFINITE: u32 = u32::MAX;

/// A Bühlmann ZH-L16 dive plan with gradient factors.
#[derive(Debug, Clone)]
pub struct Plan {
    tissues: Vec<Compartment>,
    bottom_gases: Vec<(String, GasMix)>,
    deco_gases: Vec<(String, GasMix)>,
    segments: Vec<Segment>,
    fresh_water: bool,
    environment: Environment,
}

impl Plan {
    /// Create a plan over a coefficient table with tissues at surface
    /// equilibrium for `abs_pressure` (bar).
    ///
    /// The process-wide [`environment`](crate::core_types::environment) is
    /// captured here; later changes to the global do not affect this plan.
    pub fn new(
        table: &[CompartmentCoefficients; 17],
        abs_pressure: f64,
        fresh_water: bool,
    ) -> Self {
        let tissues = table
            .iter()
            .map(|&coefficients| Compartment::new(coefficients, abs_pressure, fresh_water))
            .collect();
        Plan {
            tissues,
            bottom_gases: Vec::new(),
            deco_gases: Vec::new(),
            segments: Vec::new(),
            fresh_water,
            environment: environment::current(),
        }
    }

    /// Declare a bottom gas under a label.
    pub fn add_bottom_gas(
        &mut self,
        label: impl Into<String>,
        fo2: f64,
        fhe: f64,
    ) -> Result<(), ConfigurationError> {
        let gas = GasMix::new(fo2, fhe)?;
        upsert(&mut self.bottom_gases, label.into(), gas);
        Ok(())
    }

    /// Declare a deco gas under a label.
    pub fn add_deco_gas(
        &mut self,
        label: impl Into<String>,
        fo2: f64,
        fhe: f64,
    ) -> Result<(), ConfigurationError> {
        let gas = GasMix::new(fo2, fhe)?;
        upsert(&mut self.deco_gases, label.into(), gas);
        Ok(())
    }

    fn gas(&self, label: &str) -> Option<GasMix> {
        self.bottom_gases
            .iter()
            .chain(self.deco_gases.iter())
            .find(|(name, _)| name == label)
            .map(|(_, gas)| *gas)
    }

    /// Tissue compartments in table order.
    pub fn tissues(&self) -> &[Compartment] {
        &self.tissues
    }

    /// Segments recorded so far.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Record a flat segment and load the tissues.
    ///
    /// Returns the summed change in tissue inert gas pressure.
    pub fn add_flat(
        &mut self,
        depth: f64,
        gas_label: &str,
        time: f64,
    ) -> Result<f64, PlanError> {
        self.add_depth_change(depth, depth, gas_label, time)
    }

    /// Record a depth-change segment and load the tissues.
    ///
    /// Returns the summed change in tissue inert gas pressure.
    pub fn add_depth_change(
        &mut self,
        start_depth: f64,
        end_depth: f64,
        gas_label: &str,
        time: f64,
    ) -> Result<f64, PlanError> {
        let gas = self
            .gas(gas_label)
            .ok_or_else(|| PlanError::UnknownGas(gas_label.to_string()))?;
        self.segments
            .push(Segment::new(start_depth, end_depth, gas_label, time));

        let env = self.environment;
        let mut load_change = 0.0;
        for tissue in &mut self.tissues {
            load_change +=
                tissue.add_depth_change(start_depth, end_depth, gas.fo2(), gas.fhe(), time, &env);
        }
        Ok(load_change)
    }

    /// Current ceiling (m) at a gradient factor: the deepest compartment
    /// ceiling, rounded up to the next multiple of 3 m.
    pub fn ceiling(&self, gf: f64) -> f64 {
        let env = self.environment;
        let deepest = self
            .tissues
            .iter()
            .map(|t| t.ceiling(gf, &env))
            .fold(0.0_f64, f64::max);
        (deepest / STOP_INTERVAL).ceil() * STOP_INTERVAL
    }

    /// No-decompression limit (minutes) at a depth on a gas.
    ///
    /// Simulates one-minute flat exposures until the ceiling goes positive.
    /// Returns [`NDL_INFINITE`] when the tissues stop taking up gas before
    /// any ceiling appears. Tissue and segment state are restored on return.
    pub fn ndl(&mut self, depth: f64, gas_label: &str, gf: f64) -> Result<u32, PlanError> {
        if self.gas(gas_label).is_none() {
            return Err(PlanError::UnknownGas(gas_label.to_string()));
        }
        let tissues_snapshot = self.tissues.clone();
        let recorded_segments = self.segments.len();

        let mut ceiling = self.ceiling(gf);
        let mut minutes: u32 = 0;
        let mut load_change = 1.0;
        while ceiling <= 0.0 && load_change > 0.0 {
            load_change = self.add_flat(depth, gas_label, 1.0)?;
            ceiling = self.ceiling(gf);
            minutes += 1;
        }

        self.tissues = tissues_snapshot;
        self.segments.truncate(recorded_segments);

        if load_change <= 0.0 {
            Ok(NDL_INFINITE)
        } else {
            Ok(minutes.saturating_sub(1))
        }
    }

    /// Best deco gas at a depth: the highest-fO₂ declared deco gas whose
    /// rounded MOD is at or below us and whose rounded END stays within
    /// `max_end`.
    ///
    /// Ties between mixes with equal fO₂ resolve to declaration order; that
    /// ordering is unspecified to callers.
    pub fn best_deco_gas(&self, depth: f64, max_ppo2: f64, max_end: f64) -> Option<&str> {
        let env = self.environment;
        let mut best: Option<(&str, f64)> = None;
        for (name, gas) in &self.deco_gases {
            let mod_depth = gas.mod_depth(max_ppo2, &env, self.fresh_water).round();
            let end = gas.end(depth, &env, self.fresh_water).round();
            if depth <= mod_depth && end <= max_end {
                match best {
                    Some((_, best_fo2)) if best_fo2 >= gas.fo2() => {}
                    _ => best = Some((name.as_str(), gas.fo2())),
                }
            }
        }
        best.map(|(name, _)| name)
    }

    /// Ascend from `from_depth` to `to_depth` at 10 m/min, stopping at any
    /// depth where a better deco gas becomes usable.
    ///
    /// Returns the gas in use on arrival.
    fn add_deco_depth_change(
        &mut self,
        from_depth: f64,
        to_depth: f64,
        max_ppo2: f64,
        max_end: f64,
        gas_label: Option<String>,
    ) -> Result<String, DecoError> {
        let mut current = match gas_label {
            Some(label) => label,
            None => self
                .best_deco_gas(from_depth, max_ppo2, max_end)
                .map(str::to_string)
                .ok_or(PlanError::NoUsableDecoGas { depth: from_depth })?,
        };

        let mut from_depth = from_depth;
        while to_depth < from_depth {
            if let Some(best) = self.best_deco_gas(from_depth, max_ppo2, max_end) {
                if best != current {
                    debug!(depth = from_depth, gas = best, "deco gas switch");
                    current = best.to_string();
                }
            }

            // Walk the water column a meter at a time: a better gas on the
            // way up caps this leg at its switch depth.
            let mut leg_target = to_depth;
            let mut next_depth = from_depth - 1.0;
            while next_depth >= to_depth {
                if let Some(gas_at) = self.best_deco_gas(next_depth, max_ppo2, max_end) {
                    if gas_at != current {
                        leg_target = next_depth;
                        break;
                    }
                }
                next_depth -= 1.0;
            }

            let time = (from_depth - leg_target) / DECO_ASCENT_RATE;
            self.add_depth_change(from_depth, leg_target, &current, time)?;
            from_depth = leg_target;
        }

        if let Some(best) = self.best_deco_gas(from_depth, max_ppo2, max_end) {
            if best != current {
                current = best.to_string();
            }
        }
        Ok(current)
    }

    /// Compute the decompression schedule from the end of the recorded dive
    /// (or from `from_depth` when given).
    ///
    /// Unless `maintain_tissues` is set, tissue and segment state are
    /// restored before returning, so repeated evaluations of the same plan
    /// yield identical schedules.
    pub fn calculate_decompression(
        &mut self,
        maintain_tissues: bool,
        gf_low: f64,
        gf_high: f64,
        max_ppo2: f64,
        max_end: f64,
        from_depth: Option<f64>,
    ) -> Result<DecoSchedule, DecoError> {
        let (from_depth, starting_gas) = match from_depth {
            None => {
                let last = self
                    .segments
                    .last()
                    .ok_or(PlanError::NothingToDecompressFrom)?;
                (last.end_depth, Some(last.gas_name.clone()))
            }
            Some(depth) => {
                let label = self
                    .best_deco_gas(depth, max_ppo2, max_end)
                    .map(str::to_string)
                    .ok_or(PlanError::NoUsableDecoGas { depth })?;
                (depth, Some(label))
            }
        };

        let tissues_snapshot = self.tissues.clone();
        let recorded_segments = self.segments.len();

        let outcome =
            self.run_decompression(from_depth, starting_gas, gf_low, gf_high, max_ppo2, max_end);

        let schedule = outcome.map(|()| DecoSchedule {
            segments: collapse_segments(self.segments.clone()),
            warnings: Vec::new(),
        });

        if !maintain_tissues {
            self.tissues = tissues_snapshot;
            self.segments.truncate(recorded_segments);
        }
        schedule
    }

    fn run_decompression(
        &mut self,
        from_depth: f64,
        starting_gas: Option<String>,
        gf_low: f64,
        gf_high: f64,
        max_ppo2: f64,
        max_end: f64,
    ) -> Result<(), DecoError> {
        let distance_to_surface = from_depth;
        let gf_change_per_meter = (gf_high - gf_low) / distance_to_surface;

        let mut ceiling = self.ceiling(gf_low);
        let mut current_gas =
            self.add_deco_depth_change(from_depth, ceiling, max_ppo2, max_end, starting_gas)?;

        while ceiling > 0.0 {
            let stop_depth = ceiling;
            let next_stop = ceiling - STOP_INTERVAL;
            let gf = gf_low + gf_change_per_meter * (distance_to_surface - ceiling);

            let mut minutes: u32 = 0;
            while ceiling > next_stop {
                if minutes > MAX_STOP_MINUTES {
                    return Err(NumericError::DecoStopLimitExceeded { depth: stop_depth }.into());
                }
                self.add_flat(stop_depth, &current_gas, 1.0)?;
                minutes += 1;
                ceiling = self.ceiling(gf);
            }

            current_gas =
                self.add_deco_depth_change(stop_depth, ceiling, max_ppo2, max_end, Some(current_gas))?;
        }
        Ok(())
    }
}

fn upsert(gases: &mut Vec<(String, GasMix)>, label: String, gas: GasMix) {
    if let Some(entry) = gases.iter_mut().find(|(name, _)| *name == label) {
        entry.1 = gas;
    } else {
        gases.push((label, gas));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buhlmann::tables::ZH16B_TISSUES;

    fn air_plan() -> Plan {
        let mut plan = Plan::new(&ZH16B_TISSUES, 1.0, false);
        plan.add_bottom_gas("air", 0.21, 0.0).unwrap();
        plan
    }

    #[test]
    fn test_unknown_gas_is_an_error() {
        let mut plan = air_plan();
        let result = plan.add_flat(30.0, "trimix", 10.0);
        assert!(matches!(result, Err(PlanError::UnknownGas(_))));
    }

    #[test]
    fn test_no_segments_and_no_depth_is_an_error() {
        let mut plan = air_plan();
        let result = plan.calculate_decompression(false, 0.2, 0.8, 1.6, 30.0, None);
        assert!(matches!(
            result,
            Err(DecoError::Plan(PlanError::NothingToDecompressFrom))
        ));
    }

    #[test]
    fn test_ceiling_is_multiple_of_three() {
        let mut plan = air_plan();
        plan.add_depth_change(0.0, 45.0, "air", 4.0).unwrap();
        plan.add_flat(45.0, "air", 30.0).unwrap();
        let ceiling = plan.ceiling(0.3);
        assert!(ceiling > 0.0, "45 m for 30 min must have a ceiling");
        assert_eq!(ceiling % 3.0, 0.0, "ceiling {ceiling} not on a 3-m stop");
    }

    #[test]
    fn test_ndl_decreases_with_depth() {
        let mut plan = air_plan();
        let at_30 = plan.ndl(30.0, "air", 1.0).unwrap();
        let at_40 = plan.ndl(40.0, "air", 1.0).unwrap();
        assert!(
            at_40 < at_30,
            "NDL at 40 m ({at_40}) must be shorter than at 30 m ({at_30})"
        );
    }

    #[test]
    fn test_ndl_shallow_is_effectively_infinite() {
        let mut plan = air_plan();
        let ndl = plan.ndl(3.0, "air", 1.0).unwrap();
        assert_eq!(ndl, NDL_INFINITE, "3 m on air should never reach a ceiling");
    }

    #[test]
    fn test_ndl_restores_state() {
        let mut plan = air_plan();
        let before = plan.tissues()[0].p_n2();
        plan.ndl(30.0, "air", 1.0).unwrap();
        assert_eq!(plan.tissues()[0].p_n2(), before);
        assert!(plan.segments().is_empty());
    }

    #[test]
    fn test_best_gas_prefers_higher_fo2() {
        let mut plan = air_plan();
        plan.add_deco_gas("EAN50", 0.5, 0.0).unwrap();
        plan.add_deco_gas("O2", 1.0, 0.0).unwrap();
        assert_eq!(plan.best_deco_gas(21.0, 1.6, 30.0), Some("EAN50"));
        assert_eq!(plan.best_deco_gas(6.0, 1.6, 30.0), Some("O2"));
        assert_eq!(plan.best_deco_gas(40.0, 1.6, 30.0), None);
    }

    #[test]
    fn test_deco_schedule_reaches_surface() {
        let mut plan = Plan::new(&ZH16B_TISSUES, 1.0, false);
        plan.add_bottom_gas("2135", 0.21, 0.35).unwrap();
        plan.add_deco_gas("EAN50", 0.5, 0.0).unwrap();
        plan.add_depth_change(0.0, 50.0, "2135", 5.0).unwrap();
        plan.add_flat(50.0, "2135", 25.0).unwrap();

        let schedule = plan
            .calculate_decompression(false, 0.2, 0.8, 1.6, 30.0, None)
            .unwrap();

        let last = schedule.segments.last().unwrap();
        assert_eq!(last.end_depth, 0.0, "schedule must end at the surface");

        let first_stop = schedule
            .first_stop_depth()
            .expect("50 m for 25 min requires stops");
        assert_eq!(first_stop % 3.0, 0.0, "first stop {first_stop} not on 3-m interval");
        assert!(schedule.warnings.is_empty());
    }

    #[test]
    fn test_calculate_decompression_is_idempotent() {
        let mut plan = Plan::new(&ZH16B_TISSUES, 1.0, false);
        plan.add_bottom_gas("2135", 0.21, 0.35).unwrap();
        plan.add_deco_gas("EAN50", 0.5, 0.0).unwrap();
        plan.add_depth_change(0.0, 50.0, "2135", 5.0).unwrap();
        plan.add_flat(50.0, "2135", 25.0).unwrap();

        let first = plan
            .calculate_decompression(false, 0.2, 0.8, 1.6, 30.0, None)
            .unwrap();
        let second = plan
            .calculate_decompression(false, 0.2, 0.8, 1.6, 30.0, None)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_maintain_tissues_keeps_loading() {
        let mut plan = air_plan();
        plan.add_deco_gas("EAN50", 0.5, 0.0).unwrap();
        plan.add_depth_change(0.0, 40.0, "air", 4.0).unwrap();
        plan.add_flat(40.0, "air", 25.0).unwrap();
        let loaded = plan.tissues()[4].p_n2();

        plan.calculate_decompression(true, 0.3, 0.8, 1.6, 30.0, None)
            .unwrap();
        assert!(
            plan.tissues()[4].p_n2() < loaded,
            "maintained tissues should reflect the completed ascent"
        );
    }
}
