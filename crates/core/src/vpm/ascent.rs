//! Ascent ceilings, projected ascent, deco stops and the schedule loops
//!
//! The decompression pipeline per dive: regenerate nuclei, compute initial
//! allowable gradients, find the start of the deco zone, then iterate the
//! ascent. Each pass ascends stop by stop — Boyle-compensating the
//! gradients and holding each stop until the deco ceiling clears the next
//! one — and the critical-volume loop repeats the whole ascent with relaxed
//! gradients until the phase-volume time stabilizes within one minute.

use tracing::{debug, warn};

use crate::core_types::segment::Segment;
use crate::error::{DecoError, NumericError};
use crate::physics::gas_loading::{haldane, schreiner};
use crate::physics::roots::bisect;
use crate::vpm::model::VpmModel;
use crate::vpm::settings::COMPARTMENTS;

/// Convergence tolerance (minutes) for the deco-zone search.
const DECO_ZONE_TIME_TOLERANCE: f64 = 1.0e-3;

/// Critical-volume convergence threshold (minutes).
const PHASE_VOLUME_TOLERANCE: f64 = 1.0;

/// One leg of the configured ascent: from `depth` upward, breathe `mix`,
/// ascend at `rate` (negative) and stop every `step_size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AscentStage {
    /// Gas mix index into the model's mix table
    pub mix: usize,
    /// Depth at which this stage takes effect
    pub depth: f64,
    /// Ascent rate in depth units per minute, negative upward
    pub rate: f64,
    /// Stop spacing in depth units
    pub step_size: f64,
}

impl VpmModel {
    /// Shallowest depth at which any compartment's total gas tension
    /// exceeds ambient pressure during an ascent at `rate`.
    ///
    /// When a compartment is already supersaturated at the starting depth
    /// the bracket has no sign change; the search degrades to the starting
    /// depth and records a warning.
    pub(crate) fn calc_start_of_deco_zone(
        &mut self,
        starting_depth: f64,
        rate: f64,
        mix: usize,
    ) -> Result<f64, NumericError> {
        let other_gases = self.settings.constant_pressure_other_gases();
        let starting_ambient = self.ambient(starting_depth);
        let (inspired_he, inspired_n2) = self.inspired(starting_ambient, mix);
        let gas = self.mixes[mix];
        let he_rate = rate * gas.fhe();
        let n2_rate = rate * gas.fn2();
        let time_to_zero_ambient = -starting_ambient / rate;

        let mut deco_zone_depth: f64 = 0.0;
        for i in 0..COMPARTMENTS {
            let compartment = self.compartments[i];
            let supersaturation = |time: f64| {
                let tension = schreiner(
                    compartment.p_he,
                    inspired_he,
                    time,
                    compartment.he_half_time,
                    he_rate,
                ) + schreiner(
                    compartment.p_n2,
                    inspired_n2,
                    time,
                    compartment.n2_half_time,
                    n2_rate,
                ) + other_gases;
                tension - (starting_ambient + rate * time)
            };

            match bisect(
                supersaturation,
                0.0,
                time_to_zero_ambient,
                DECO_ZONE_TIME_TOLERANCE,
            ) {
                Ok(crossing_time) => {
                    let depth = (starting_ambient + rate * crossing_time) - self.barometric_pressure;
                    deco_zone_depth = deco_zone_depth.max(depth);
                }
                Err(NumericError::BracketRootsShareSign) => {
                    // Already supersaturated at the starting depth: the
                    // leading compartment's deco zone is behind the diver.
                    warn!(
                        compartment = i,
                        starting_depth, "deco zone starts at or below the starting depth"
                    );
                    self.warnings.push(format!(
                        "compartment {} is already in the deco zone at {starting_depth}; \
                         clamping start of deco zone to the starting depth",
                        i + 1
                    ));
                    deco_zone_depth = deco_zone_depth.max(starting_depth);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(deco_zone_depth)
    }

    /// Deepest tolerated depth across compartments using the current
    /// allowable gradients.
    pub(crate) fn calc_ascent_ceiling(&self) -> f64 {
        self.ceiling_with(|c| (c.allowable_gradient_he, c.allowable_gradient_n2))
    }

    /// Deepest tolerated depth using the Boyle-compensated deco gradients.
    pub(crate) fn calc_deco_ceiling(&self) -> f64 {
        self.ceiling_with(|c| (c.deco_gradient_he, c.deco_gradient_n2))
    }

    fn ceiling_with<F>(&self, gradients: F) -> f64
    where
        F: Fn(&crate::vpm::compartment::Compartment) -> (f64, f64),
    {
        let other_gases = self.settings.constant_pressure_other_gases();
        let mut ceiling = f64::NEG_INFINITY;
        for compartment in &self.compartments {
            let (gradient_he, gradient_n2) = gradients(compartment);
            let gas_loading = compartment.gas_loading();
            let tolerated = if gas_loading > 0.0 {
                let weighted_gradient = (gradient_he * compartment.p_he
                    + gradient_n2 * compartment.p_n2)
                    / gas_loading;
                gas_loading + other_gases - weighted_gradient
            } else {
                other_gases - gradient_he.min(gradient_n2)
            };
            let tolerated = tolerated.max(0.0);
            ceiling = ceiling.max(tolerated - self.barometric_pressure);
        }
        ceiling
    }

    /// Verify the proposed stop is reachable: simulate the ascent and push
    /// the stop deeper by `step_size` until no compartment exceeds its
    /// weighted allowable gradient on arrival.
    pub(crate) fn projected_ascent(
        &self,
        starting_depth: f64,
        rate: f64,
        deco_stop_depth: &mut f64,
        step_size: f64,
        mix: usize,
    ) {
        let other_gases = self.settings.constant_pressure_other_gases();
        let starting_ambient = self.ambient(starting_depth);
        let (inspired_he, inspired_n2) = self.inspired(starting_ambient, mix);
        let gas = self.mixes[mix];
        let he_rate = rate * gas.fhe();
        let n2_rate = rate * gas.fn2();

        let mut ending_ambient = self.ambient(*deco_stop_depth);
        'deeper: loop {
            let segment_time = (ending_ambient - starting_ambient) / rate;
            for compartment in &self.compartments {
                let projected_he = schreiner(
                    compartment.p_he,
                    inspired_he,
                    segment_time,
                    compartment.he_half_time,
                    he_rate,
                );
                let projected_n2 = schreiner(
                    compartment.p_n2,
                    inspired_n2,
                    segment_time,
                    compartment.n2_half_time,
                    n2_rate,
                );
                let loading = projected_he + projected_n2;
                let weighted_gradient = if loading > 0.0 {
                    (compartment.allowable_gradient_he * projected_he
                        + compartment.allowable_gradient_n2 * projected_n2)
                        / loading
                } else {
                    compartment
                        .allowable_gradient_he
                        .min(compartment.allowable_gradient_n2)
                };
                if loading + other_gases - weighted_gradient > ending_ambient {
                    *deco_stop_depth += step_size;
                    ending_ambient += step_size;
                    continue 'deeper;
                }
            }
            return;
        }
    }

    /// Hold a deco stop until the deco ceiling clears the next stop.
    ///
    /// The stop opens by rounding the run time up to the next multiple of
    /// the minimum stop time, then extends in minimum-stop increments.
    /// Returns the total stop time committed.
    pub(crate) fn decompression_stop(
        &mut self,
        stop_depth: f64,
        step_size: f64,
        mix: usize,
    ) -> Result<f64, NumericError> {
        let minimum_stop = self.settings.minimum_deco_stop_time;
        let other_gases = self.settings.constant_pressure_other_gases();

        let last_run_time = self.run_time;
        let round_up = (last_run_time / minimum_stop + 0.5).round() * minimum_stop;
        let mut segment_time = round_up - last_run_time;
        self.run_time = round_up;
        self.segment_number += 1;
        let mut total_stop_time = segment_time;

        let ambient = self.ambient(stop_depth);
        let next_stop = stop_depth - step_size;
        let next_stop_ambient = self.ambient(next_stop);
        let (inspired_he, inspired_n2) = self.inspired(ambient, mix);
        let inspired_total = inspired_he + inspired_n2;

        // The stop can never clear if even full equilibration with the
        // breathing gas leaves the tension above what the next stop allows.
        for compartment in &self.compartments {
            if inspired_total > 0.0 {
                let weighted_gradient = (compartment.deco_gradient_he * inspired_he
                    + compartment.deco_gradient_n2 * inspired_n2)
                    / inspired_total;
                if inspired_total + other_gases - weighted_gradient > next_stop_ambient {
                    return Err(NumericError::OffgassingGradientTooSmall { stop_depth });
                }
            }
        }

        loop {
            for compartment in &mut self.compartments {
                compartment.initial_p_he = compartment.p_he;
                compartment.initial_p_n2 = compartment.p_n2;
                compartment.p_he = haldane(
                    compartment.p_he,
                    inspired_he,
                    compartment.he_half_time,
                    segment_time,
                );
                compartment.p_n2 = haldane(
                    compartment.p_n2,
                    inspired_n2,
                    compartment.n2_half_time,
                    segment_time,
                );
            }
            if self.calc_deco_ceiling() <= next_stop {
                break;
            }
            segment_time = minimum_stop;
            total_stop_time += minimum_stop;
            self.run_time += minimum_stop;
        }
        Ok(total_stop_time)
    }

    /// Track the largest supersaturation gradient any compartment actually
    /// reaches at a stop; input to the repetitive-dive adjustment.
    pub(crate) fn calc_max_actual_gradient(&mut self, stop_depth: f64) {
        let other_gases = self.settings.constant_pressure_other_gases();
        let ambient = self.ambient(stop_depth);
        for compartment in &mut self.compartments {
            let gradient = compartment.gas_loading() + other_gases - ambient;
            if gradient > compartment.max_actual_gradient {
                compartment.max_actual_gradient = gradient;
            }
        }
    }

    /// Run the full ascent with the critical-volume loop and return the
    /// committed ascent/stop segments.
    pub(crate) fn decompress(
        &mut self,
        stages: &[AscentStage],
        mix_names: &[String],
    ) -> Result<Vec<Segment>, DecoError> {
        self.nuclear_regeneration(self.run_time);
        self.calc_initial_allowable_gradients();

        for compartment in &mut self.compartments {
            compartment.he_start_of_ascent = compartment.p_he;
            compartment.n2_start_of_ascent = compartment.p_n2;
        }
        let run_time_start_of_ascent = self.run_time;
        let segment_number_start_of_ascent = self.segment_number;

        let starting_depth = stages[0].depth;
        let depth_start_of_deco_zone =
            self.calc_start_of_deco_zone(starting_depth, stages[0].rate, stages[0].mix)?;

        let mut schedule_converged = false;
        let mut iteration: u32 = 0;
        loop {
            iteration += 1;
            let mut mix = stages[0].mix;
            let mut rate = stages[0].rate;
            let mut step_size = stages[0].step_size;
            let mut current_depth = starting_depth;
            let mut next_stage = 1;

            let ascent_ceiling = self.calc_ascent_ceiling();
            let mut deco_stop_depth = if ascent_ceiling <= 0.0 {
                0.0
            } else {
                (ascent_ceiling / step_size).ceil() * step_size
            };
            self.projected_ascent(current_depth, rate, &mut deco_stop_depth, step_size, mix);
            if deco_stop_depth > depth_start_of_deco_zone {
                return Err(NumericError::StepSizeTooLarge {
                    stop_depth: deco_stop_depth,
                    deco_zone: depth_start_of_deco_zone,
                }
                .into());
            }
            let first_stop_depth = deco_stop_depth;

            let mut segments: Vec<Segment> = Vec::new();
            let mut run_time_start_of_deco_zone = self.run_time;
            let mut crossed_deco_zone = false;

            loop {
                let leg_start_run_time = self.run_time;
                let segment_time =
                    self.gas_loadings_ascent_descent(current_depth, deco_stop_depth, rate, mix);
                if !crossed_deco_zone
                    && current_depth >= depth_start_of_deco_zone
                    && deco_stop_depth < depth_start_of_deco_zone
                {
                    crossed_deco_zone = true;
                    run_time_start_of_deco_zone = leg_start_run_time
                        + (current_depth - depth_start_of_deco_zone) / rate.abs();
                    for compartment in &mut self.compartments {
                        compartment.he_start_of_deco_zone = compartment.p_he;
                        compartment.n2_start_of_deco_zone = compartment.p_n2;
                    }
                }
                if segment_time > 0.0 {
                    segments.push(Segment::new(
                        current_depth,
                        deco_stop_depth,
                        mix_names[mix].clone(),
                        segment_time,
                    ));
                }
                if deco_stop_depth <= 0.0 {
                    break;
                }

                while next_stage < stages.len() && stages[next_stage].depth >= deco_stop_depth {
                    let stage = stages[next_stage];
                    debug!(depth = deco_stop_depth, mix = stage.mix, "deco gas switch");
                    mix = stage.mix;
                    rate = stage.rate;
                    step_size = stage.step_size;
                    next_stage += 1;
                }

                self.boyles_law_compensation(first_stop_depth, deco_stop_depth, step_size)?;
                let stop_time = self.decompression_stop(deco_stop_depth, step_size, mix)?;
                self.calc_max_actual_gradient(deco_stop_depth);
                if stop_time > 0.0 {
                    segments.push(Segment::new(
                        deco_stop_depth,
                        deco_stop_depth,
                        mix_names[mix].clone(),
                        stop_time,
                    ));
                }
                current_depth = deco_stop_depth;
                deco_stop_depth = (deco_stop_depth - step_size).max(0.0);
            }

            if !self.settings.critical_volume_algorithm || schedule_converged {
                debug!(iterations = iteration, "VPM schedule committed");
                return Ok(segments);
            }

            let deco_phase_volume_time = self.run_time - run_time_start_of_deco_zone;
            self.calc_surface_phase_volume_time();
            let mut converged = true;
            for compartment in &mut self.compartments {
                compartment.phase_volume_time =
                    deco_phase_volume_time + compartment.surface_phase_volume_time;
                if (compartment.phase_volume_time - compartment.last_phase_volume_time).abs()
                    > PHASE_VOLUME_TOLERANCE
                {
                    converged = false;
                }
                compartment.last_phase_volume_time = compartment.phase_volume_time;
            }
            if converged {
                schedule_converged = true;
            } else {
                self.critical_volume();
            }
            debug!(
                iteration,
                deco_phase_volume_time, converged, "critical volume pass"
            );

            for compartment in &mut self.compartments {
                compartment.p_he = compartment.he_start_of_ascent;
                compartment.p_n2 = compartment.n2_start_of_ascent;
            }
            self.run_time = run_time_start_of_ascent;
            self.segment_number = segment_number_start_of_ascent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::gas::GasMix;
    use crate::vpm::settings::Settings;

    fn loaded_model(depth: f64, bottom_minutes: f64) -> VpmModel {
        let mut model = VpmModel::new(Settings::default()).unwrap();
        model.set_mixes(vec![GasMix::air()]);
        model.gas_loadings_ascent_descent(0.0, depth, 20.0, 0);
        model.calc_crushing_pressure(0.0, depth, 20.0, 0).unwrap();
        model
            .gas_loadings_constant_depth(depth, bottom_minutes, 0)
            .unwrap();
        model
    }

    fn air_stage(depth: f64) -> AscentStage {
        AscentStage {
            mix: 0,
            depth,
            rate: -10.0,
            step_size: 3.0,
        }
    }

    #[test]
    fn test_deco_zone_below_starting_depth() {
        let mut model = loaded_model(40.0, 25.0);
        let deco_zone = model.calc_start_of_deco_zone(40.0, -10.0, 0).unwrap();
        assert!(
            deco_zone > 0.0 && deco_zone < 40.0,
            "deco zone at {deco_zone} should lie between surface and bottom"
        );
        assert!(model.warnings.is_empty());
    }

    #[test]
    fn test_ascent_ceiling_deepens_with_exposure() {
        let mut short = loaded_model(40.0, 10.0);
        short.nuclear_regeneration(10.0);
        short.calc_initial_allowable_gradients();

        let mut long = loaded_model(40.0, 40.0);
        long.nuclear_regeneration(40.0);
        long.calc_initial_allowable_gradients();

        assert!(
            long.calc_ascent_ceiling() > short.calc_ascent_ceiling(),
            "longer bottom time must produce a deeper ceiling"
        );
    }

    #[test]
    fn test_projected_ascent_pushes_infeasible_stop_deeper() {
        let mut model = loaded_model(50.0, 30.0);
        model.nuclear_regeneration(30.0);
        model.calc_initial_allowable_gradients();

        // Propose a stop right at the surface; projection must push it down.
        let mut stop = 0.0;
        model.projected_ascent(50.0, -10.0, &mut stop, 3.0, 0);
        assert!(
            stop > 0.0,
            "a 50 m / 30 min air dive cannot surface directly"
        );
        assert_eq!(stop % 3.0, 0.0);
    }

    #[test]
    fn test_decompress_produces_monotone_ascent() {
        let mut model = loaded_model(50.0, 30.0);
        let segments = model
            .decompress(&[air_stage(50.0)], &[String::from("air")])
            .unwrap();

        assert!(!segments.is_empty());
        assert_eq!(segments.last().unwrap().end_depth, 0.0);
        for pair in segments.windows(2) {
            assert!(
                pair[1].start_depth <= pair[0].end_depth + 1e-9,
                "ascent went back down: {:?}",
                pair
            );
        }
        for segment in &segments {
            assert!(segment.time >= 0.0);
        }
    }

    #[test]
    fn test_decompress_no_deco_dive_goes_straight_up() {
        let mut model = loaded_model(10.0, 5.0);
        let segments = model
            .decompress(&[air_stage(10.0)], &[String::from("air")])
            .unwrap();
        // A short shallow dive needs no stops: one ascent leg to the surface.
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].end_depth, 0.0);
    }

    #[test]
    fn test_deeper_exposure_means_longer_schedule() {
        let mut short = loaded_model(45.0, 15.0);
        let short_time: f64 = short
            .decompress(&[air_stage(45.0)], &[String::from("air")])
            .unwrap()
            .iter()
            .map(|s| s.time)
            .sum();

        let mut long = loaded_model(45.0, 35.0);
        let long_time: f64 = long
            .decompress(&[air_stage(45.0)], &[String::from("air")])
            .unwrap()
            .iter()
            .map(|s| s.time)
            .sum();

        assert!(
            long_time > short_time,
            "35 min bottom ({long_time} min deco) must out-deco 15 min ({short_time} min)"
        );
    }
}
