//! Per-compartment state for the VPM-B model
//!
//! Besides the gas loadings, each compartment carries the bubble-nucleus
//! bookkeeping the model iterates over: three generations of critical
//! radii, the crushing-pressure history of the descent, the allowable
//! supersaturation gradients, and the phase-volume accounting used by the
//! critical-volume loop.
//!
//! Pressures and gradients are in depth-pressure units (fsw or msw);
//! radii are in meters.

use serde::{Deserialize, Serialize};

use crate::vpm::settings::{Settings, AIR_FN2, HE_HALF_TIMES, N2_HALF_TIMES};

/// One VPM tissue compartment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Compartment {
    /// Helium half-time (minutes)
    pub he_half_time: f64,
    /// Nitrogen half-time (minutes)
    pub n2_half_time: f64,

    // ── gas loadings ────────────────────────────────────────────────────
    /// Helium partial pressure
    pub p_he: f64,
    /// Nitrogen partial pressure
    pub p_n2: f64,
    /// Helium pressure at the start of the current segment
    pub initial_p_he: f64,
    /// Nitrogen pressure at the start of the current segment
    pub initial_p_n2: f64,
    /// Helium pressure snapshot at the start of the ascent
    pub he_start_of_ascent: f64,
    /// Nitrogen pressure snapshot at the start of the ascent
    pub n2_start_of_ascent: f64,
    /// Helium pressure snapshot on entering the deco zone
    pub he_start_of_deco_zone: f64,
    /// Nitrogen pressure snapshot on entering the deco zone
    pub n2_start_of_deco_zone: f64,

    // ── critical radii (meters) ─────────────────────────────────────────
    /// Helium nucleus radius at the start of exposure
    pub initial_critical_radius_he: f64,
    /// Nitrogen nucleus radius at the start of exposure
    pub initial_critical_radius_n2: f64,
    /// Helium radius adjusted for prior exposure history
    pub adjusted_critical_radius_he: f64,
    /// Nitrogen radius adjusted for prior exposure history
    pub adjusted_critical_radius_n2: f64,
    /// Helium radius after nuclear regeneration over the dive
    pub regenerated_radius_he: f64,
    /// Nitrogen radius after nuclear regeneration over the dive
    pub regenerated_radius_n2: f64,

    // ── crushing pressure history ───────────────────────────────────────
    /// Deepest helium crushing pressure seen during descent
    pub max_crushing_pressure_he: f64,
    /// Deepest nitrogen crushing pressure seen during descent
    pub max_crushing_pressure_n2: f64,
    /// Helium crushing pressure adjusted for regeneration
    pub adjusted_crushing_pressure_he: f64,
    /// Nitrogen crushing pressure adjusted for regeneration
    pub adjusted_crushing_pressure_n2: f64,

    // ── allowable gradients ─────────────────────────────────────────────
    /// Helium gradient before critical-volume relaxation
    pub initial_allowable_gradient_he: f64,
    /// Nitrogen gradient before critical-volume relaxation
    pub initial_allowable_gradient_n2: f64,
    /// Current helium allowable gradient
    pub allowable_gradient_he: f64,
    /// Current nitrogen allowable gradient
    pub allowable_gradient_n2: f64,
    /// Helium gradient with Boyle's-law stop compensation
    pub deco_gradient_he: f64,
    /// Nitrogen gradient with Boyle's-law stop compensation
    pub deco_gradient_n2: f64,

    // ── onset of impermeability scratch ─────────────────────────────────
    /// Ambient pressure when the nucleus went impermeable
    pub amb_pressure_onset_of_imperm: f64,
    /// Gas tension when the nucleus went impermeable
    pub gas_tension_onset_of_imperm: f64,

    // ── phase volume accounting ─────────────────────────────────────────
    /// Surface portion of the phase-volume time integral
    pub surface_phase_volume_time: f64,
    /// Total phase-volume time this iteration
    pub phase_volume_time: f64,
    /// Total phase-volume time last iteration
    pub last_phase_volume_time: f64,
    /// Largest supersaturation gradient actually reached
    pub max_actual_gradient: f64,
}

impl Compartment {
    /// Gas-loading time constant ln2/t½ for helium (1/min).
    #[inline]
    pub fn k_he(&self) -> f64 {
        std::f64::consts::LN_2 / self.he_half_time
    }

    /// Gas-loading time constant ln2/t½ for nitrogen (1/min).
    #[inline]
    pub fn k_n2(&self) -> f64 {
        std::f64::consts::LN_2 / self.n2_half_time
    }

    /// Total inert gas tension.
    #[inline]
    pub fn gas_loading(&self) -> f64 {
        self.p_he + self.p_n2
    }
}

/// The 16-compartment bank at equilibrium with air at `barometric_pressure`,
/// nuclei at their configured initial radii.
pub fn surface_compartments(
    settings: &Settings,
    barometric_pressure: f64,
) -> [Compartment; super::settings::COMPARTMENTS] {
    let p_n2 = (barometric_pressure - settings.water_vapour_pressure()) * AIR_FN2;
    let radius_he = settings.critical_radius_he_microns * 1e-6;
    let radius_n2 = settings.critical_radius_n2_microns * 1e-6;

    std::array::from_fn(|i| Compartment {
        he_half_time: HE_HALF_TIMES[i],
        n2_half_time: N2_HALF_TIMES[i],
        p_he: 0.0,
        p_n2,
        initial_p_he: 0.0,
        initial_p_n2: p_n2,
        initial_critical_radius_he: radius_he,
        initial_critical_radius_n2: radius_n2,
        adjusted_critical_radius_he: radius_he,
        adjusted_critical_radius_n2: radius_n2,
        ..Compartment::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_equilibrium() {
        let settings = Settings::default();
        let bank = surface_compartments(&settings, 10.1325);
        for compartment in &bank {
            // (10.1325 − 0.493) · 0.79 ≈ 7.615 msw of nitrogen.
            assert!((compartment.p_n2 - 7.615).abs() < 0.01);
            assert_eq!(compartment.p_he, 0.0);
            assert!(compartment.max_crushing_pressure_he >= 0.0);
        }
    }

    #[test]
    fn test_radii_initialized_in_meters() {
        let settings = Settings::default();
        let bank = surface_compartments(&settings, 10.1325);
        assert!((bank[0].adjusted_critical_radius_n2 - 0.8e-6).abs() < 1e-12);
        assert!((bank[0].adjusted_critical_radius_he - 0.7e-6).abs() < 1e-12);
    }

    #[test]
    fn test_time_constants() {
        let settings = Settings::default();
        let bank = surface_compartments(&settings, 10.1325);
        assert!((bank[0].k_n2() - std::f64::consts::LN_2 / 5.0).abs() < 1e-12);
        assert!(bank[0].k_he() > bank[0].k_n2(), "helium exchanges faster");
    }
}
