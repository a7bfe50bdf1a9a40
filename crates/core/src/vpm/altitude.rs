//! Altitude dive algorithm
//!
//! Establishes the pre-dive state for dives above sea level. An
//! acclimatized diver starts equilibrated at the altitude barometric
//! pressure. A non-acclimatized diver is simulated through the ascent to
//! altitude: tissues follow the falling ambient pressure, and any
//! compartment whose supersaturation exceeds the bubble-formation gradient
//! seeds larger nuclei that regenerate over the hours spent at altitude
//! before the dive.

use crate::error::ConfigurationError;
use crate::physics::atmosphere::barometric_pressure;
use crate::physics::gas_loading::{haldane, schreiner};
use crate::vpm::compartment::surface_compartments;
use crate::vpm::model::VpmModel;
use crate::vpm::settings::{AltitudeSettings, AIR_FN2};

impl VpmModel {
    /// Initialize tissues and barometric pressure for a dive at altitude.
    pub(crate) fn apply_altitude(
        &mut self,
        altitude: &AltitudeSettings,
    ) -> Result<(), ConfigurationError> {
        let settings = self.settings;
        if altitude.altitude_of_dive > settings.max_altitude() {
            return Err(ConfigurationError::AltitudeAboveEverest(
                altitude.altitude_of_dive,
            ));
        }

        if altitude.diver_acclimatized {
            self.barometric_pressure =
                barometric_pressure(altitude.altitude_of_dive, settings.units);
            self.compartments = surface_compartments(&settings, self.barometric_pressure);
            return Ok(());
        }

        if altitude.starting_acclimatized_altitude >= altitude.altitude_of_dive {
            return Err(ConfigurationError::AcclimatizedAltitudeAboveDiveAltitude {
                starting: altitude.starting_acclimatized_altitude,
                dive: altitude.altitude_of_dive,
            });
        }
        if altitude.ascent_to_altitude_hours <= 0.0 {
            return Err(ConfigurationError::NoAscentTimeToAltitude);
        }

        let ascent_time = altitude.ascent_to_altitude_hours * 60.0;
        let time_at_altitude = altitude.hours_at_altitude_before_dive * 60.0;

        let starting_barometric =
            barometric_pressure(altitude.starting_acclimatized_altitude, settings.units);
        let ending_barometric = barometric_pressure(altitude.altitude_of_dive, settings.units);
        self.compartments = surface_compartments(&settings, starting_barometric);
        self.barometric_pressure = ending_barometric;

        // Travel to altitude: ambient pressure falls linearly over the
        // ascent while tissues track it through the Schreiner equation.
        let rate = (ending_barometric - starting_barometric) / ascent_time;
        let n2_rate = rate * AIR_FN2;
        let inspired_n2_start =
            (starting_barometric - settings.water_vapour_pressure()) * AIR_FN2;
        let other_gases = settings.constant_pressure_other_gases();
        let gamma = settings.surface_tension_gamma;
        let gamma_c = settings.skin_compression_gamma_c;
        let regeneration = (-time_at_altitude / settings.regeneration_time_constant).exp();

        for compartment in &mut self.compartments {
            compartment.p_n2 = schreiner(
                compartment.p_n2,
                inspired_n2_start,
                ascent_time,
                compartment.n2_half_time,
                n2_rate,
            );

            // Supersaturation on arrival; compare against the gradient at
            // which the current nuclei would form bubbles.
            let gradient = (compartment.p_n2 + other_gases) - ending_barometric;
            let gradient_pa = settings.depth_units_to_pascal(gradient);

            let pairs = [
                compartment.adjusted_critical_radius_he,
                compartment.adjusted_critical_radius_n2,
            ];
            let mut adjusted = [0.0_f64; 2];
            for (slot, radius) in pairs.into_iter().enumerate() {
                let bubble_formation_pa = 2.0 * gamma * (gamma_c - gamma) / (radius * gamma_c);
                adjusted[slot] = if gradient_pa > bubble_formation_pa {
                    let seeded = 2.0 * gamma * (gamma_c - gamma) / (gradient_pa * gamma_c);
                    radius + (seeded - radius) * regeneration
                } else {
                    radius
                };
            }
            compartment.adjusted_critical_radius_he = adjusted[0];
            compartment.adjusted_critical_radius_n2 = adjusted[1];
            compartment.initial_critical_radius_he = adjusted[0];
            compartment.initial_critical_radius_n2 = adjusted[1];
        }

        // Waiting time at altitude: tissues equilibrate toward the new
        // surface pressure.
        let inspired_n2 = (ending_barometric - settings.water_vapour_pressure()) * AIR_FN2;
        for compartment in &mut self.compartments {
            compartment.p_n2 = haldane(
                compartment.p_n2,
                inspired_n2,
                compartment.n2_half_time,
                time_at_altitude,
            );
            compartment.initial_p_n2 = compartment.p_n2;
        }
        Ok(())
    }
}
