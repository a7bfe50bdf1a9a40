//! VPM-B dive plan façade
//!
//! Mirrors the Bühlmann plan surface: declare gases, append segments, then
//! ask for a schedule. The recorded profile is translated into the coded
//! VPM input — flat segments become constant-depth entries, depth changes
//! become rate entries, and the declared deco gases become ascent parameter
//! changes at their MOD rounded down to a stop depth — and the full
//! dive/deco/critical-volume pipeline runs on a fresh model each call, so
//! repeated evaluations are identical by construction.

use tracing::debug;

use crate::core_types::environment::{self, Environment};
use crate::core_types::gas::GasMix;
use crate::core_types::segment::{collapse_segments, DecoSchedule, Segment};
use crate::core_types::units::{feet_to_meters, meters_to_feet, DepthUnits};
use crate::error::{ConfigurationError, DecoError, PlanError};
use crate::physics::pressure::PASCALS_PER_BAR;
use crate::vpm::ascent::AscentStage;
use crate::vpm::model::VpmModel;
use crate::vpm::settings::{Settings, ATM_PA};

/// A VPM-B dive plan built from labelled gases and segments.
#[derive(Debug, Clone)]
pub struct Plan {
    settings: Settings,
    fresh_water: bool,
    abs_pressure: f64,
    bottom_gases: Vec<(String, GasMix)>,
    deco_gases: Vec<(String, GasMix)>,
    segments: Vec<Segment>,
    environment: Environment,
}

impl Plan {
    /// Plan with default VPM-B settings at a surface pressure in bar.
    pub fn new(fresh_water: bool, abs_pressure: f64) -> Self {
        Plan {
            settings: Settings::default(),
            fresh_water,
            abs_pressure,
            bottom_gases: Vec::new(),
            deco_gases: Vec::new(),
            segments: Vec::new(),
            environment: environment::current(),
        }
    }

    /// Plan with explicit settings.
    pub fn with_settings(
        settings: Settings,
        fresh_water: bool,
        abs_pressure: f64,
    ) -> Result<Self, ConfigurationError> {
        settings.validate()?;
        Ok(Plan {
            settings,
            ..Plan::new(fresh_water, abs_pressure)
        })
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

    fn gas_index(&self, label: &str) -> Option<usize> {
        self.bottom_gases
            .iter()
            .chain(self.deco_gases.iter())
            .position(|(name, _)| name == label)
    }

    /// Segments recorded so far.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Record a flat segment.
    pub fn add_flat(
        &mut self,
        depth: f64,
        gas_label: &str,
        time: f64,
    ) -> Result<(), PlanError> {
        self.add_depth_change(depth, depth, gas_label, time)
    }

    /// Record a depth-change segment.
    pub fn add_depth_change(
        &mut self,
        start_depth: f64,
        end_depth: f64,
        gas_label: &str,
        time: f64,
    ) -> Result<(), PlanError> {
        if self.gas_index(gas_label).is_none() {
            return Err(PlanError::UnknownGas(gas_label.to_string()));
        }
        self.segments
            .push(Segment::new(start_depth, end_depth, gas_label, time));
        Ok(())
    }

    /// No-decompression limits are not defined for the bubble model.
    pub fn ndl(&self, _depth: f64, _gas_label: &str) -> Result<u32, PlanError> {
        Err(PlanError::Unsupported(
            "the VPM-B model does not compute no-decompression limits",
        ))
    }

    /// Depth in model units (msw/fsw) from meters.
    fn to_units(&self, meters: f64) -> f64 {
        match self.settings.units {
            DepthUnits::Msw => meters,
            DepthUnits::Fsw => meters_to_feet(meters),
        }
    }

    /// Depth in meters from model units.
    fn from_units(&self, depth_units: f64) -> f64 {
        match self.settings.units {
            DepthUnits::Msw => depth_units,
            DepthUnits::Fsw => feet_to_meters(depth_units),
        }
    }

    /// Ascent rate and stop spacing in model units (10 m/min, 3 m stops).
    fn ascent_parameters(&self) -> (f64, f64) {
        match self.settings.units {
            DepthUnits::Msw => (-10.0, 3.0),
            DepthUnits::Fsw => (-33.0, 10.0),
        }
    }

    /// Compute the decompression schedule from the recorded profile (or
    /// from `from_depth` when given).
    ///
    /// The model is rebuilt from the profile on every call, so tissue state
    /// is never carried between evaluations; `maintain_tissues` is accepted
    /// for symmetry with the Bühlmann plan and does not change the result.
    pub fn calculate_decompression(
        &mut self,
        maintain_tissues: bool,
        max_ppo2: f64,
        max_end: f64,
        from_depth: Option<f64>,
    ) -> Result<DecoSchedule, DecoError> {
        let _ = maintain_tissues;

        let labels: Vec<String> = self
            .bottom_gases
            .iter()
            .chain(self.deco_gases.iter())
            .map(|(name, _)| name.clone())
            .collect();
        let mixes: Vec<GasMix> = self
            .bottom_gases
            .iter()
            .chain(self.deco_gases.iter())
            .map(|(_, gas)| *gas)
            .collect();

        let (from_depth, current_label) = match from_depth {
            None => {
                let last = self
                    .segments
                    .last()
                    .ok_or(PlanError::NothingToDecompressFrom)?;
                (last.end_depth, last.gas_name.clone())
            }
            Some(depth) => {
                let label = self
                    .best_deco_gas(depth, max_ppo2, max_end)
                    .ok_or(PlanError::NoUsableDecoGas { depth })?;
                (depth, label)
            }
        };
        let current_mix = self
            .gas_index(&current_label)
            .ok_or_else(|| PlanError::UnknownGas(current_label.clone()))?;

        let barometric = self.abs_pressure * PASCALS_PER_BAR / ATM_PA
            * self.settings.units_factor();
        let mut model =
            VpmModel::new(self.settings)?.with_barometric_pressure(barometric);
        model.set_mixes(mixes);

        // Replay the recorded dive.
        let mut dive_segments: Vec<Segment> = Vec::new();
        for segment in &self.segments {
            let mix = self
                .gas_index(&segment.gas_name)
                .ok_or_else(|| PlanError::UnknownGas(segment.gas_name.clone()))?;
            let start = self.to_units(segment.start_depth);
            let end = self.to_units(segment.end_depth);
            if segment.is_flat() {
                let run_time_end = model.run_time + segment.time;
                model.gas_loadings_constant_depth(start, run_time_end, mix)?;
            } else {
                let rate = (end - start) / segment.time;
                model.gas_loadings_ascent_descent(start, end, rate, mix);
                if end > start {
                    model.calc_crushing_pressure(start, end, rate, mix)?;
                }
            }
            dive_segments.push(segment.clone());
        }

        if from_depth <= 0.0 {
            return Ok(DecoSchedule {
                segments: collapse_segments(dive_segments),
                warnings: std::mem::take(&mut model.warnings),
            });
        }

        let stages = self.build_ascent_stages(from_depth, current_mix, max_ppo2, max_end);
        let deco_segments = model.decompress(&stages, &labels)?;

        let mut segments = dive_segments;
        segments.extend(deco_segments.into_iter().map(|s| Segment {
            start_depth: self.from_units(s.start_depth),
            end_depth: self.from_units(s.end_depth),
            ..s
        }));
        Ok(DecoSchedule {
            segments: collapse_segments(segments),
            warnings: std::mem::take(&mut model.warnings),
        })
    }

    /// Best deco gas at a depth in meters, by the same rule as the
    /// Bühlmann plan: highest fO₂ with MOD at or below and END in bounds.
    pub fn best_deco_gas(&self, depth: f64, max_ppo2: f64, max_end: f64) -> Option<String> {
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
        best.map(|(name, _)| name.to_string())
    }

    /// Translate the declared deco gases into ascent parameter changes:
    /// each eligible gas switches in at its MOD rounded down to a stop
    /// depth, deepest switch first.
    fn build_ascent_stages(
        &self,
        from_depth: f64,
        current_mix: usize,
        max_ppo2: f64,
        max_end: f64,
    ) -> Vec<AscentStage> {
        let (rate, step_size) = self.ascent_parameters();
        let env = self.environment;
        let mut stages = vec![AscentStage {
            mix: current_mix,
            depth: self.to_units(from_depth),
            rate,
            step_size,
        }];

        let mut switches: Vec<(f64, f64, usize)> = Vec::new();
        for (offset, (name, gas)) in self.deco_gases.iter().enumerate() {
            let mix = self.bottom_gases.len() + offset;
            if mix == current_mix {
                continue;
            }
            let mod_meters = gas.mod_depth(max_ppo2, &env, self.fresh_water);
            let mod_units = self.to_units(mod_meters);
            let switch_units = (mod_units / step_size).floor() * step_size;
            let switch_meters = self.from_units(switch_units);
            if switch_units <= 0.0 || switch_meters >= from_depth {
                continue;
            }
            if gas.end(switch_meters, &env, self.fresh_water).round() > max_end {
                continue;
            }
            debug!(gas = name.as_str(), depth = switch_meters, "deco switch planned");
            switches.push((switch_units, gas.fo2(), mix));
        }
        // Deepest first; at an equal depth the richer mix is applied last
        // and wins.
        switches.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.total_cmp(&b.1)));
        stages.extend(switches.into_iter().map(|(depth, _, mix)| AscentStage {
            mix,
            depth,
            rate,
            step_size,
        }));
        stages
    }
}

fn upsert(gases: &mut Vec<(String, GasMix)>, label: String, gas: GasMix) {
    if let Some(entry) = gases.iter_mut().find(|(name, _)| *name == label) {
        entry.1 = gas;
    } else {
        gases.push((label, gas));
    }
}
