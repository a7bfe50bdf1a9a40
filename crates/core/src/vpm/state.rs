//! Dive-state configuration records and the multi-dive driver
//!
//! [`DiveState`] accepts a declarative configuration — a list of dives,
//! each with its gas mixes and coded profile entries, plus altitude data
//! and model settings — validates it up front, and evaluates every dive in
//! sequence, carrying tissue and nucleus state across repetitive dives.
//!
//! Profile codes follow the classic input convention: 1 is a constant-rate
//! depth change, 2 is a constant-depth segment ending at a given run time,
//! and 99 starts the decompression ascent.

use serde::{Deserialize, Serialize};

use crate::core_types::gas::GasMix;
use crate::core_types::segment::{collapse_segments, DecoSchedule, Segment};
use crate::error::{DecoError, PlanError};
use crate::vpm::ascent::AscentStage;
use crate::vpm::model::VpmModel;
use crate::vpm::settings::{AltitudeSettings, Settings};

/// One gas mix of a dive, as fractions that must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasMixSummary {
    /// Oxygen fraction
    pub fraction_o2: f64,
    /// Nitrogen fraction
    pub fraction_n2: f64,
    /// Helium fraction
    pub fraction_he: f64,
}

/// One ascent parameter change: switch gas, rate and stop spacing at a
/// depth on the way up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AscentChange {
    /// Depth at which the change applies
    pub starting_depth: f64,
    /// 1-based index into the dive's gas mixes
    pub gasmix: usize,
    /// Ascent rate (depth units/min, negative upward)
    pub rate: f64,
    /// Stop spacing from this depth upward
    pub step_size: f64,
}

/// One coded profile entry.
///
/// Fields are optional at the serde layer; entries missing the fields
/// their code requires are rejected as an invalid profile code.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileEntry {
    /// 1 (depth change), 2 (constant depth) or 99 (decompress)
    pub profile_code: i32,
    /// Code 1: depth at the start of the change
    pub starting_depth: Option<f64>,
    /// Code 1: depth at the end of the change
    pub ending_depth: Option<f64>,
    /// Code 1: rate of change (depth units/min)
    pub rate: Option<f64>,
    /// Codes 1 and 2: 1-based gas mix in use
    pub gasmix: Option<usize>,
    /// Code 2: the constant depth
    pub depth: Option<f64>,
    /// Code 2: run time (minutes) when the segment ends
    pub run_time_at_end_of_segment: Option<f64>,
    /// Code 99: declared number of ascent changes (checked when present)
    pub number_of_ascent_parameter_changes: Option<usize>,
    /// Code 99: the ascent parameter changes, deepest first
    pub ascent_summary: Vec<AscentChange>,
}

/// One dive of a multi-dive input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiveInput {
    /// Free-form description
    pub desc: String,
    /// Declared mix count (checked against `gasmix_summary` when present)
    pub num_gas_mixes: Option<usize>,
    /// Gas mixes, referenced 1-based by the profile entries
    pub gasmix_summary: Vec<GasMixSummary>,
    /// Profile entries, ending with a code-99 entry
    pub profile_codes: Vec<ProfileEntry>,
    /// 1 when another dive follows after a surface interval, else 0
    pub repetitive_code: i32,
    /// Surface interval (minutes) before the next dive; required with
    /// `repetitive_code` 1
    pub surface_interval_time_minutes: Option<f64>,
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The dives to evaluate, in order
    pub input: Vec<DiveInput>,
    /// Altitude data, used when the altitude dive algorithm is enabled
    pub altitude: Option<AltitudeSettings>,
    /// Model settings
    pub settings: Settings,
}

/// Result of one evaluated dive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiveOutput {
    /// Description copied from the input
    pub desc: String,
    /// Dive and decompression segments with diagnostics
    pub schedule: DecoSchedule,
}

/// A validated multi-dive VPM-B calculation.
#[derive(Debug, Clone)]
pub struct DiveState {
    config: Config,
}

impl DiveState {
    /// Validate a configuration. Gas fractions, profile codes, gas mix
    /// references and repetitive flags are all checked here so that `run`
    /// only fails on numeric grounds.
    pub fn new(config: Config) -> Result<Self, DecoError> {
        config.settings.validate()?;

        for dive in &config.input {
            if let Some(declared) = dive.num_gas_mixes {
                if declared != dive.gasmix_summary.len() {
                    return Err(PlanError::UnknownGas(format!(
                        "gasmix {} of {}",
                        declared,
                        dive.gasmix_summary.len()
                    ))
                    .into());
                }
            }
            for summary in &dive.gasmix_summary {
                GasMix::from_fractions(
                    summary.fraction_o2,
                    summary.fraction_n2,
                    summary.fraction_he,
                )?;
            }

            let mix_count = dive.gasmix_summary.len();
            let check_mix = |index: Option<usize>| -> Result<(), DecoError> {
                match index {
                    Some(n) if (1..=mix_count).contains(&n) => Ok(()),
                    Some(n) => Err(PlanError::UnknownGas(format!("gasmix {n}")).into()),
                    None => Err(PlanError::InvalidProfileCode(0).into()),
                }
            };

            for entry in &dive.profile_codes {
                match entry.profile_code {
                    1 => {
                        if entry.starting_depth.is_none()
                            || entry.ending_depth.is_none()
                            || entry.rate.is_none()
                        {
                            return Err(PlanError::InvalidProfileCode(1).into());
                        }
                        check_mix(entry.gasmix)?;
                    }
                    2 => {
                        if entry.depth.is_none() || entry.run_time_at_end_of_segment.is_none() {
                            return Err(PlanError::InvalidProfileCode(2).into());
                        }
                        check_mix(entry.gasmix)?;
                    }
                    99 => {
                        if entry.ascent_summary.is_empty() {
                            return Err(PlanError::InvalidProfileCode(99).into());
                        }
                        if let Some(declared) = entry.number_of_ascent_parameter_changes {
                            if declared != entry.ascent_summary.len() {
                                return Err(PlanError::InvalidProfileCode(99).into());
                            }
                        }
                        for change in &entry.ascent_summary {
                            check_mix(Some(change.gasmix))?;
                        }
                    }
                    other => return Err(PlanError::InvalidProfileCode(other).into()),
                }
            }

            match dive.repetitive_code {
                0 => {}
                1 => {
                    if dive.surface_interval_time_minutes.unwrap_or(0.0) <= 0.0 {
                        return Err(PlanError::InvalidRepetitiveCode(1).into());
                    }
                }
                other => return Err(PlanError::InvalidRepetitiveCode(other).into()),
            }
        }
        Ok(DiveState { config })
    }

    /// The validated configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Evaluate every dive, carrying state across repetitive intervals.
    pub fn run(&self) -> Result<Vec<DiveOutput>, DecoError> {
        let mut model = self.fresh_model()?;
        let mut outputs = Vec::with_capacity(self.config.input.len());

        for dive in &self.config.input {
            let mixes: Vec<GasMix> = dive
                .gasmix_summary
                .iter()
                .map(|s| GasMix::from_fractions(s.fraction_o2, s.fraction_n2, s.fraction_he))
                .collect::<Result<_, _>>()?;
            let labels: Vec<String> = mixes.iter().map(GasMix::to_string).collect();
            model.set_mixes(mixes);
            model.run_time = 0.0;
            model.segment_number = 0;

            let segments = run_dive(&mut model, dive, &labels)?;
            outputs.push(DiveOutput {
                desc: dive.desc.clone(),
                schedule: DecoSchedule {
                    segments: collapse_segments(segments),
                    warnings: std::mem::take(&mut model.warnings),
                },
            });

            match dive.repetitive_code {
                1 => {
                    // run() only sees validated configs, so the interval is
                    // present and positive.
                    let interval = dive.surface_interval_time_minutes.unwrap_or(0.0);
                    model.gas_loadings_surface_interval(interval);
                    model.repetitive_nucleus_adjustment(interval);
                    for compartment in &mut model.compartments {
                        compartment.max_crushing_pressure_he = 0.0;
                        compartment.max_crushing_pressure_n2 = 0.0;
                        compartment.max_actual_gradient = 0.0;
                        compartment.surface_phase_volume_time = 0.0;
                        compartment.phase_volume_time = 0.0;
                        compartment.last_phase_volume_time = 0.0;
                    }
                }
                _ => {
                    model = self.fresh_model()?;
                }
            }
        }
        Ok(outputs)
    }

    fn fresh_model(&self) -> Result<VpmModel, DecoError> {
        let mut model = VpmModel::new(self.config.settings)?;
        if self.config.settings.altitude_dive_algorithm {
            let altitude = self.config.altitude.unwrap_or_default();
            model.apply_altitude(&altitude)?;
        }
        Ok(model)
    }
}

/// Process one dive's profile entries against the model.
fn run_dive(
    model: &mut VpmModel,
    dive: &DiveInput,
    labels: &[String],
) -> Result<Vec<Segment>, DecoError> {
    let mut segments = Vec::new();
    for entry in &dive.profile_codes {
        match entry.profile_code {
            1 => {
                let starting_depth = entry.starting_depth.unwrap_or(0.0);
                let ending_depth = entry.ending_depth.unwrap_or(0.0);
                let rate = entry.rate.unwrap_or(0.0);
                let mix = entry.gasmix.unwrap_or(1) - 1;
                let time =
                    model.gas_loadings_ascent_descent(starting_depth, ending_depth, rate, mix);
                if ending_depth > starting_depth {
                    model.calc_crushing_pressure(starting_depth, ending_depth, rate, mix)?;
                }
                segments.push(Segment::new(
                    starting_depth,
                    ending_depth,
                    labels[mix].clone(),
                    time,
                ));
            }
            2 => {
                let depth = entry.depth.unwrap_or(0.0);
                let run_time = entry.run_time_at_end_of_segment.unwrap_or(0.0);
                let mix = entry.gasmix.unwrap_or(1) - 1;
                let time = model.gas_loadings_constant_depth(depth, run_time, mix)?;
                if time > 0.0 {
                    segments.push(Segment::new(depth, depth, labels[mix].clone(), time));
                }
            }
            99 => {
                let stages: Vec<AscentStage> = entry
                    .ascent_summary
                    .iter()
                    .map(|change| AscentStage {
                        mix: change.gasmix - 1,
                        depth: change.starting_depth,
                        rate: change.rate,
                        step_size: change.step_size,
                    })
                    .collect();
                segments.extend(model.decompress(&stages, labels)?);
                break;
            }
            other => return Err(PlanError::InvalidProfileCode(other).into()),
        }
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigurationError, DecoError};

    fn air_mix() -> GasMixSummary {
        GasMixSummary {
            fraction_o2: 0.21,
            fraction_n2: 0.79,
            fraction_he: 0.0,
        }
    }

    fn square_dive(depth: f64, bottom_run_time: f64) -> DiveInput {
        DiveInput {
            desc: format!("{depth} msw square profile"),
            num_gas_mixes: Some(1),
            gasmix_summary: vec![air_mix()],
            profile_codes: vec![
                ProfileEntry {
                    profile_code: 1,
                    starting_depth: Some(0.0),
                    ending_depth: Some(depth),
                    rate: Some(20.0),
                    gasmix: Some(1),
                    ..ProfileEntry::default()
                },
                ProfileEntry {
                    profile_code: 2,
                    depth: Some(depth),
                    run_time_at_end_of_segment: Some(bottom_run_time),
                    gasmix: Some(1),
                    ..ProfileEntry::default()
                },
                ProfileEntry {
                    profile_code: 99,
                    ascent_summary: vec![AscentChange {
                        starting_depth: depth,
                        gasmix: 1,
                        rate: -10.0,
                        step_size: 3.0,
                    }],
                    ..ProfileEntry::default()
                },
            ],
            repetitive_code: 0,
            surface_interval_time_minutes: None,
        }
    }

    fn config(dives: Vec<DiveInput>) -> Config {
        Config {
            input: dives,
            altitude: None,
            settings: Settings::default(),
        }
    }

    #[test]
    fn test_gas_sum_validation() {
        let mut dive = square_dive(30.0, 25.0);
        dive.gasmix_summary[0].fraction_o2 = 0.22; // sums to 1.01
        let result = DiveState::new(config(vec![dive]));
        assert!(matches!(
            result,
            Err(DecoError::Configuration(ConfigurationError::GasFractionsSum(_)))
        ));
    }

    #[test]
    fn test_invalid_profile_code() {
        let mut dive = square_dive(30.0, 25.0);
        dive.profile_codes[1].profile_code = 7;
        let result = DiveState::new(config(vec![dive]));
        assert!(matches!(
            result,
            Err(DecoError::Plan(PlanError::InvalidProfileCode(7)))
        ));
    }

    #[test]
    fn test_invalid_repetitive_code() {
        let mut dive = square_dive(30.0, 25.0);
        dive.repetitive_code = 2;
        let result = DiveState::new(config(vec![dive]));
        assert!(matches!(
            result,
            Err(DecoError::Plan(PlanError::InvalidRepetitiveCode(2)))
        ));
    }

    #[test]
    fn test_out_of_range_gasmix_reference() {
        let mut dive = square_dive(30.0, 25.0);
        dive.profile_codes[0].gasmix = Some(3);
        let result = DiveState::new(config(vec![dive]));
        assert!(matches!(result, Err(DecoError::Plan(PlanError::UnknownGas(_)))));
    }

    #[test]
    fn test_square_dive_produces_schedule() {
        let state = DiveState::new(config(vec![square_dive(45.0, 30.0)])).unwrap();
        let outputs = state.run().unwrap();
        assert_eq!(outputs.len(), 1);

        let schedule = &outputs[0].schedule;
        assert!(schedule.runtime() > 30.0);
        let last = schedule.segments.last().unwrap();
        assert_eq!(last.end_depth, 0.0);
        assert!(
            schedule.first_stop_depth().is_some(),
            "45 msw for 30 min on air requires stops"
        );
    }

    #[test]
    fn test_repetitive_dive_is_more_constrained() {
        let mut first = square_dive(40.0, 25.0);
        first.repetitive_code = 1;
        first.surface_interval_time_minutes = Some(60.0);
        let second = square_dive(40.0, 25.0);

        let state = DiveState::new(config(vec![first, second])).unwrap();
        let outputs = state.run().unwrap();
        assert_eq!(outputs.len(), 2);

        let single = DiveState::new(config(vec![square_dive(40.0, 25.0)]))
            .unwrap()
            .run()
            .unwrap();
        assert!(
            outputs[1].schedule.runtime() >= single[0].schedule.runtime(),
            "a repetitive dive cannot need less deco than the same dive fresh"
        );
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let cfg = config(vec![square_dive(30.0, 20.0)]);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
