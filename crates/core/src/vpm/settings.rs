//! VPM-B model settings and physical constants
//!
//! Defaults follow the nominal VPM-B parameterization: 0.8/0.7 micron
//! critical radii, surface tension 0.0179 N/m, skin compression 0.257 N/m,
//! critical volume lambda 6500 fsw·min and an 8.2 atm gradient for the
//! onset of impermeability.
//!
//! # References
//! - Yount, D.E. and Hoffman, D.C. (1986). "On the use of a bubble
//!   formation model to calculate diving tables." Aviation, Space, and
//!   Environmental Medicine, 57.
//! - Baker, E.C. Varying Permeability Model decompression program.

use serde::{Deserialize, Serialize};

use crate::core_types::units::DepthUnits;
use crate::error::ConfigurationError;

/// Pascals per standard atmosphere, used by the closed-form bubble
/// mechanics.
pub const ATM_PA: f64 = crate::physics::pressure::PASCALS_PER_ATM;

/// Nitrogen fraction of dry atmospheric air.
pub const AIR_FN2: f64 = 0.79;

/// Number of tissue compartments.
pub const COMPARTMENTS: usize = 16;

/// Helium half-times (minutes) for compartments 1-16.
pub const HE_HALF_TIMES: [f64; COMPARTMENTS] = [
    1.88, 3.02, 4.72, 6.99, 10.21, 14.48, 20.53, 29.11, 41.20, 55.19, 70.69, 90.34, 115.29,
    147.42, 188.24, 240.03,
];

/// Nitrogen half-times (minutes) for compartments 1-16.
pub const N2_HALF_TIMES: [f64; COMPARTMENTS] = [
    5.0, 8.0, 12.5, 18.5, 27.0, 38.3, 54.3, 77.0, 109.0, 146.0, 187.0, 239.0, 305.0, 390.0,
    498.0, 635.0,
];

/// Highest surface altitude accepted, per unit system (Mount Everest).
const MAX_ALTITUDE_FSW: f64 = 30_000.0;
const MAX_ALTITUDE_MSW: f64 = 9_144.0;

/// Tunable VPM-B parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Depth-pressure unit system
    pub units: DepthUnits,
    /// Initial critical radius for nitrogen nuclei (microns)
    pub critical_radius_n2_microns: f64,
    /// Initial critical radius for helium nuclei (microns)
    pub critical_radius_he_microns: f64,
    /// Run the critical-volume relaxation loop
    pub critical_volume_algorithm: bool,
    /// Apply the altitude dive algorithm when altitude data is present
    pub altitude_dive_algorithm: bool,
    /// Surface tension of the bubble interface, gamma (N/m)
    pub surface_tension_gamma: f64,
    /// Skin compression constant, gamma-c (N/m)
    pub skin_compression_gamma_c: f64,
    /// Critical volume parameter lambda (fsw·min)
    pub crit_volume_parameter_lambda: f64,
    /// Crushing gradient at which nuclei become gas-impermeable (atm)
    pub gradient_onset_of_imperm_atm: f64,
    /// Nuclear regeneration time constant (minutes)
    pub regeneration_time_constant: f64,
    /// Constant partial pressure of non-inert gases (mmHg)
    pub pressure_other_gases_mmhg: f64,
    /// Stop times round up to a multiple of this (minutes)
    pub minimum_deco_stop_time: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            units: DepthUnits::Msw,
            critical_radius_n2_microns: 0.8,
            critical_radius_he_microns: 0.7,
            critical_volume_algorithm: true,
            altitude_dive_algorithm: false,
            surface_tension_gamma: 0.0179,
            skin_compression_gamma_c: 0.257,
            crit_volume_parameter_lambda: 6500.0,
            gradient_onset_of_imperm_atm: 8.2,
            regeneration_time_constant: 20_160.0,
            pressure_other_gases_mmhg: 102.0,
            minimum_deco_stop_time: 1.0,
        }
    }
}

impl Settings {
    /// Check every tunable against its validity range.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for radius in [
            self.critical_radius_n2_microns,
            self.critical_radius_he_microns,
        ] {
            if !(0.2..=1.35).contains(&radius) {
                return Err(ConfigurationError::CriticalRadiusOutOfRange(radius));
            }
        }
        if self.regeneration_time_constant <= 0.0 {
            return Err(ConfigurationError::NonPositiveRegenerationTimeConstant(
                self.regeneration_time_constant,
            ));
        }
        Ok(())
    }

    /// Depth units per standard atmosphere.
    pub fn units_factor(&self) -> f64 {
        self.units.units_factor()
    }

    /// Respiratory water vapour pressure in depth-pressure units
    /// (respiratory quotient 0.8 per Schreiner).
    pub fn water_vapour_pressure(&self) -> f64 {
        match self.units {
            DepthUnits::Fsw => 1.607,
            DepthUnits::Msw => 0.493,
        }
    }

    /// Constant partial pressure of the non-inert "other gases" in
    /// depth-pressure units.
    pub fn constant_pressure_other_gases(&self) -> f64 {
        self.pressure_other_gases_mmhg / 760.0 * self.units_factor()
    }

    /// Highest acceptable altitude in this unit system.
    pub fn max_altitude(&self) -> f64 {
        match self.units {
            DepthUnits::Fsw => MAX_ALTITUDE_FSW,
            DepthUnits::Msw => MAX_ALTITUDE_MSW,
        }
    }

    /// Convert a value in depth-pressure units to pascals.
    #[inline]
    pub fn depth_units_to_pascal(&self, value: f64) -> f64 {
        value / self.units_factor() * ATM_PA
    }

    /// Convert a value in pascals to depth-pressure units.
    #[inline]
    pub fn pascal_to_depth_units(&self, value: f64) -> f64 {
        value / ATM_PA * self.units_factor()
    }
}

/// Altitude and acclimatization description for the altitude dive
/// algorithm. Altitudes are in feet (fsw) or meters (msw).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AltitudeSettings {
    /// Altitude of the dive site
    pub altitude_of_dive: f64,
    /// Whether the diver is already acclimatized at the dive altitude
    pub diver_acclimatized: bool,
    /// Altitude the diver is acclimatized to before travelling
    pub starting_acclimatized_altitude: f64,
    /// Hours spent ascending to the dive altitude
    pub ascent_to_altitude_hours: f64,
    /// Hours spent at the dive altitude before diving
    pub hours_at_altitude_before_dive: f64,
}

impl Default for AltitudeSettings {
    fn default() -> Self {
        AltitudeSettings {
            altitude_of_dive: 0.0,
            diver_acclimatized: true,
            starting_acclimatized_altitude: 0.0,
            ascent_to_altitude_hours: 0.0,
            hours_at_altitude_before_dive: 0.0,
        }
    }
}
