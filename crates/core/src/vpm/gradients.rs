//! Allowable supersaturation gradients and their evolution
//!
//! The chain runs: crushing history → regenerated nucleus radii → initial
//! allowable gradients → Boyle's-law compensation per stop → critical-volume
//! relaxation between schedule iterations. The closed-form bubble mechanics
//! work in pascals and meters; conversions to depth-pressure units happen at
//! the boundaries.
//!
//! # References
//! - Yount, D.E. and Hoffman, D.C. (1986). "On the use of a bubble
//!   formation model to calculate diving tables."
//! - Baker, E.C. VPM-B: Boyle's law compensation for deco stops.

use crate::error::NumericError;
use crate::physics::roots::radius_root_finder;
use crate::vpm::model::VpmModel;
use crate::vpm::settings::{AIR_FN2, ATM_PA, COMPARTMENTS};

impl VpmModel {
    /// Regenerate nucleus radii over the dive time and derive the adjusted
    /// crushing pressures.
    ///
    /// The radius crushed by the maximum gradient relaxes back toward its
    /// pre-dive value with the regeneration time constant; the adjusted
    /// crushing pressure is the gradient that would have produced the
    /// regenerated radius directly.
    pub(crate) fn nuclear_regeneration(&mut self, dive_time: f64) {
        let settings = self.settings;
        let skin_term = 2.0 * (settings.skin_compression_gamma_c - settings.surface_tension_gamma);
        let regeneration = (-dive_time / settings.regeneration_time_constant).exp();

        for compartment in &mut self.compartments {
            let pairs = [
                (
                    compartment.max_crushing_pressure_he,
                    compartment.adjusted_critical_radius_he,
                ),
                (
                    compartment.max_crushing_pressure_n2,
                    compartment.adjusted_critical_radius_n2,
                ),
            ];
            let mut regenerated = [0.0_f64; 2];
            let mut adjusted_crushing = [0.0_f64; 2];
            for (slot, (max_crushing, adjusted_radius)) in pairs.into_iter().enumerate() {
                let crushing_pa = settings.depth_units_to_pascal(max_crushing);
                let crushed_radius = 1.0 / (crushing_pa / skin_term + 1.0 / adjusted_radius);
                let radius =
                    adjusted_radius + (crushed_radius - adjusted_radius) * regeneration;
                regenerated[slot] = radius;
                let adjusted_pa = skin_term * (1.0 / radius - 1.0 / adjusted_radius);
                adjusted_crushing[slot] = settings.pascal_to_depth_units(adjusted_pa);
            }
            compartment.regenerated_radius_he = regenerated[0];
            compartment.regenerated_radius_n2 = regenerated[1];
            compartment.adjusted_crushing_pressure_he = adjusted_crushing[0];
            compartment.adjusted_crushing_pressure_n2 = adjusted_crushing[1];
        }
    }

    /// Initial allowable gradients from the regenerated radii:
    ///
    /// ```text
    /// g = 2·γ·(γc − γ) / (r·γc)
    /// ```
    pub(crate) fn calc_initial_allowable_gradients(&mut self) {
        let settings = self.settings;
        let gamma = settings.surface_tension_gamma;
        let gamma_c = settings.skin_compression_gamma_c;

        for compartment in &mut self.compartments {
            let he_pa =
                2.0 * gamma * (gamma_c - gamma) / (compartment.regenerated_radius_he * gamma_c);
            let n2_pa =
                2.0 * gamma * (gamma_c - gamma) / (compartment.regenerated_radius_n2 * gamma_c);
            compartment.initial_allowable_gradient_he = settings.pascal_to_depth_units(he_pa);
            compartment.initial_allowable_gradient_n2 = settings.pascal_to_depth_units(n2_pa);
            compartment.allowable_gradient_he = compartment.initial_allowable_gradient_he;
            compartment.allowable_gradient_n2 = compartment.initial_allowable_gradient_n2;
        }
    }

    /// Reduce the allowable gradients for a stop shallower than the first:
    /// the nucleus radius set by the first-stop gradient expands on ascent
    /// per Boyle's law, and the deco gradient shrinks with it.
    pub(crate) fn boyles_law_compensation(
        &mut self,
        first_stop_depth: f64,
        deco_stop_depth: f64,
        step_size: f64,
    ) -> Result<(), NumericError> {
        let settings = self.settings;
        let gamma2 = 2.0 * settings.surface_tension_gamma;
        let next_stop = deco_stop_depth - step_size;
        let first_stop_pa = settings.depth_units_to_pascal(self.ambient(first_stop_depth));
        let next_stop_pa = settings.depth_units_to_pascal(self.ambient(next_stop));

        for i in 0..COMPARTMENTS {
            let compartment = self.compartments[i];
            let gradients = [
                compartment.allowable_gradient_he,
                compartment.allowable_gradient_n2,
            ];
            let mut deco_gradients = [0.0_f64; 2];
            for (slot, gradient) in gradients.into_iter().enumerate() {
                let gradient_pa = settings.depth_units_to_pascal(gradient);
                let radius_first_stop = gamma2 / gradient_pa;
                let a = next_stop_pa;
                let b = -gamma2;
                let c = (first_stop_pa + gamma2 / radius_first_stop)
                    * radius_first_stop.powi(3);
                let boyle_radius =
                    radius_first_stop * (first_stop_pa / next_stop_pa).powf(1.0 / 3.0);
                let ending_radius =
                    radius_root_finder(a, b, c, radius_first_stop, boyle_radius)?;
                deco_gradients[slot] = settings.pascal_to_depth_units(gamma2 / ending_radius);
            }
            let compartment = &mut self.compartments[i];
            compartment.deco_gradient_he = deco_gradients[0];
            compartment.deco_gradient_n2 = deco_gradients[1];
        }
        Ok(())
    }

    /// Relax the allowable gradients using the critical-volume criterion.
    ///
    /// Solves the quadratic relating the new gradient to the initial
    /// gradient, the adjusted crushing pressure, and the phase-volume time
    /// accumulated this iteration, with lambda fixed in fsw·min.
    pub(crate) fn critical_volume(&mut self) {
        let settings = self.settings;
        let gamma = settings.surface_tension_gamma;
        let gamma_c = settings.skin_compression_gamma_c;
        let lambda_pa = settings.crit_volume_parameter_lambda / 33.0 * ATM_PA;

        for compartment in &mut self.compartments {
            let phase_volume_time = compartment.phase_volume_time;
            let entries = [
                (
                    compartment.initial_allowable_gradient_he,
                    compartment.adjusted_crushing_pressure_he,
                ),
                (
                    compartment.initial_allowable_gradient_n2,
                    compartment.adjusted_crushing_pressure_n2,
                ),
            ];
            let mut relaxed = [0.0_f64; 2];
            for (slot, (initial_gradient, adjusted_crushing)) in entries.into_iter().enumerate() {
                let initial_pa = settings.depth_units_to_pascal(initial_gradient);
                let crushing_pa = settings.depth_units_to_pascal(adjusted_crushing);
                let b = initial_pa + lambda_pa * gamma / (gamma_c * phase_volume_time);
                let c = gamma * gamma * lambda_pa * crushing_pa
                    / (gamma_c * gamma_c * phase_volume_time);
                let discriminant = (b * b - 4.0 * c).max(0.0);
                let new_gradient_pa = ((b + discriminant.sqrt()) / 2.0).max(initial_pa);
                relaxed[slot] = settings.pascal_to_depth_units(new_gradient_pa);
            }
            compartment.allowable_gradient_he = relaxed[0];
            compartment.allowable_gradient_n2 = relaxed[1];
        }
    }

    /// Closed-form supersaturation-time integral after surfacing, expressed
    /// as an equivalent time at the surfacing gradient.
    ///
    /// Three branches: nitrogen stays above its surface equilibrium forever
    /// (integrate to infinity), the total gradient decays to zero at a
    /// finite time (integrate to the crossing), or there is no surfacing
    /// gradient at all.
    pub(crate) fn calc_surface_phase_volume_time(&mut self) {
        let surface_inspired_n2 = (self.barometric_pressure
            - self.settings.water_vapour_pressure())
            * AIR_FN2;

        for compartment in &mut self.compartments {
            let p_he = compartment.p_he;
            let p_n2 = compartment.p_n2;
            let k_he = compartment.k_he();
            let k_n2 = compartment.k_n2();

            compartment.surface_phase_volume_time = if p_n2 > surface_inspired_n2 {
                (p_he / k_he + (p_n2 - surface_inspired_n2) / k_n2)
                    / (p_he + p_n2 - surface_inspired_n2)
            } else if p_he + p_n2 > surface_inspired_n2 {
                let decay_time = 1.0 / (k_n2 - k_he)
                    * ((surface_inspired_n2 - p_n2) / p_he).ln();
                let integral = p_he / k_he * (1.0 - (-k_he * decay_time).exp())
                    + (p_n2 - surface_inspired_n2) / k_n2
                        * (1.0 - (-k_n2 * decay_time).exp());
                integral / (p_he + p_n2 - surface_inspired_n2)
            } else {
                0.0
            };
        }
    }

    /// Adjust critical radii across a repetitive-dive surface interval.
    ///
    /// Compartments whose actual gradient exceeded the initial allowable
    /// gradient seeded new, larger nuclei; those regenerate back toward the
    /// configured radii over the surface interval.
    pub(crate) fn repetitive_nucleus_adjustment(&mut self, surface_interval: f64) {
        let settings = self.settings;
        let gamma = settings.surface_tension_gamma;
        let gamma_c = settings.skin_compression_gamma_c;
        let regeneration = (-surface_interval / settings.regeneration_time_constant).exp();

        for compartment in &mut self.compartments {
            let max_actual_pa = settings.depth_units_to_pascal(compartment.max_actual_gradient);

            let entries = [
                (
                    compartment.initial_allowable_gradient_he,
                    compartment.initial_critical_radius_he,
                ),
                (
                    compartment.initial_allowable_gradient_n2,
                    compartment.initial_critical_radius_n2,
                ),
            ];
            let mut adjusted = [0.0_f64; 2];
            for (slot, (initial_gradient, initial_radius)) in entries.into_iter().enumerate() {
                adjusted[slot] = if compartment.max_actual_gradient > initial_gradient {
                    let seeded_radius =
                        2.0 * gamma * (gamma_c - gamma) / (max_actual_pa * gamma_c);
                    initial_radius + (seeded_radius - initial_radius) * regeneration
                } else {
                    initial_radius
                };
            }
            compartment.adjusted_critical_radius_he = adjusted[0];
            compartment.adjusted_critical_radius_n2 = adjusted[1];
        }
    }
}
