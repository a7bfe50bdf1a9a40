//! Crushing pressure of bubble nuclei during descent
//!
//! While the crushing gradient stays below the onset of impermeability the
//! nucleus skin passes gas freely and the crushing pressure is simply
//! ambient minus tissue tension. Beyond onset the nucleus seals: its
//! contents follow Boyle's law, the skin equilibrium becomes a cubic in the
//! ending radius, and the crushing pressure picks up the trapped-gas term.
//!
//! # References
//! - Yount, D.E. (1979). "Skins of varying permeability: a stabilization
//!   mechanism for gas cavitation nuclei." J. Acoust. Soc. Am., 65(6).

use crate::error::NumericError;
use crate::physics::gas_loading::schreiner;
use crate::physics::roots::{bisect, radius_root_finder};
use crate::vpm::model::VpmModel;
use crate::vpm::settings::COMPARTMENTS;

/// Convergence tolerance (minutes) for the onset-of-impermeability search.
const ONSET_TIME_TOLERANCE: f64 = 1.0e-3;

impl VpmModel {
    /// Update each compartment's maximum crushing pressure across a descent
    /// segment.
    ///
    /// Call after the segment's gas loadings: `initial_p_*` must hold the
    /// start-of-segment tensions and `p_*` the end-of-segment tensions.
    pub(crate) fn calc_crushing_pressure(
        &mut self,
        starting_depth: f64,
        ending_depth: f64,
        rate: f64,
        mix: usize,
    ) -> Result<(), NumericError> {
        let settings = self.settings;
        let gradient_onset = settings.gradient_onset_of_imperm_atm * settings.units_factor();
        let gradient_onset_pa = settings.gradient_onset_of_imperm_atm * crate::vpm::settings::ATM_PA;
        let skin_term = 2.0 * (settings.skin_compression_gamma_c - settings.surface_tension_gamma);
        let other_gases = settings.constant_pressure_other_gases();

        let starting_ambient = self.ambient(starting_depth);
        let ending_ambient = self.ambient(ending_depth);

        for i in 0..COMPARTMENTS {
            let compartment = self.compartments[i];
            let starting_tension =
                compartment.initial_p_he + compartment.initial_p_n2 + other_gases;
            let ending_tension = compartment.p_he + compartment.p_n2 + other_gases;
            let starting_gradient = starting_ambient - starting_tension;
            let ending_gradient = ending_ambient - ending_tension;

            let (crushing_he, crushing_n2) = if ending_gradient < gradient_onset {
                // Permeable: gas equilibrates through the skin.
                (ending_gradient, ending_gradient)
            } else {
                if starting_gradient < gradient_onset {
                    self.onset_of_impermeability(starting_ambient, ending_ambient, rate, i, mix)?;
                }
                let compartment = self.compartments[i];
                let ending_ambient_pa = settings.depth_units_to_pascal(ending_ambient);
                let amb_onset_pa =
                    settings.depth_units_to_pascal(compartment.amb_pressure_onset_of_imperm);
                let tension_onset_pa =
                    settings.depth_units_to_pascal(compartment.gas_tension_onset_of_imperm);

                let mut crushing = [0.0_f64; 2];
                for (slot, initial_radius) in [
                    compartment.adjusted_critical_radius_he,
                    compartment.adjusted_critical_radius_n2,
                ]
                .into_iter()
                .enumerate()
                {
                    let radius_onset =
                        1.0 / (gradient_onset_pa / skin_term + 1.0 / initial_radius);
                    let a = ending_ambient_pa + skin_term / initial_radius;
                    let b = skin_term;
                    let c = tension_onset_pa * radius_onset.powi(3);
                    let ending_radius =
                        radius_root_finder(a, b, c, b / a, radius_onset)?;

                    let crushing_pa = gradient_onset_pa
                        + (ending_ambient_pa - amb_onset_pa)
                        + tension_onset_pa
                            * (1.0 - radius_onset.powi(3) / ending_radius.powi(3));
                    crushing[slot] = settings.pascal_to_depth_units(crushing_pa);
                }
                (crushing[0], crushing[1])
            };

            let compartment = &mut self.compartments[i];
            compartment.max_crushing_pressure_he =
                compartment.max_crushing_pressure_he.max(crushing_he);
            compartment.max_crushing_pressure_n2 =
                compartment.max_crushing_pressure_n2.max(crushing_n2);
        }
        Ok(())
    }

    /// Locate the moment within a descent segment at which a compartment's
    /// crushing gradient reaches the onset of impermeability, capturing the
    /// ambient pressure and gas tension at that point.
    fn onset_of_impermeability(
        &mut self,
        starting_ambient: f64,
        ending_ambient: f64,
        rate: f64,
        i: usize,
        mix: usize,
    ) -> Result<(), NumericError> {
        let settings = self.settings;
        let gradient_onset = settings.gradient_onset_of_imperm_atm * settings.units_factor();
        let other_gases = settings.constant_pressure_other_gases();

        let (inspired_he, inspired_n2) = self.inspired(starting_ambient, mix);
        let gas = &self.mixes[mix];
        let he_rate = rate * gas.fhe();
        let n2_rate = rate * gas.fn2();

        let compartment = self.compartments[i];
        let segment_time = (ending_ambient - starting_ambient) / rate;

        let tension_at = |time: f64| {
            schreiner(
                compartment.initial_p_he,
                inspired_he,
                time,
                compartment.he_half_time,
                he_rate,
            ) + schreiner(
                compartment.initial_p_n2,
                inspired_n2,
                time,
                compartment.n2_half_time,
                n2_rate,
            ) + other_gases
        };
        let gradient_excess =
            |time: f64| (starting_ambient + rate * time) - tension_at(time) - gradient_onset;

        let onset_time = bisect(gradient_excess, 0.0, segment_time, ONSET_TIME_TOLERANCE)?;

        let compartment = &mut self.compartments[i];
        compartment.amb_pressure_onset_of_imperm = starting_ambient + rate * onset_time;
        let amb = compartment.amb_pressure_onset_of_imperm;
        compartment.gas_tension_onset_of_imperm = amb - gradient_onset;
        Ok(())
    }
}
