//! VPM-B model state and gas-loading passes
//!
//! [`VpmModel`] owns everything a calculation mutates: the compartment
//! bank, the running clock, the gas mix list and the accumulated
//! diagnostics. All pressures are in depth-pressure units (fsw or msw);
//! ambient pressure at depth is simply `depth + barometric`.

use crate::core_types::gas::GasMix;
use crate::error::{ConfigurationError, PlanError};
use crate::physics::gas_loading::{haldane, schreiner};
use crate::vpm::compartment::{surface_compartments, Compartment};
use crate::vpm::settings::{Settings, AIR_FN2, COMPARTMENTS};

/// Mutable state of one VPM-B evaluation.
#[derive(Debug, Clone)]
pub struct VpmModel {
    pub(crate) settings: Settings,
    /// Barometric pressure at the surface (depth-pressure units)
    pub(crate) barometric_pressure: f64,
    pub(crate) compartments: [Compartment; COMPARTMENTS],
    /// Minutes since the start of the dive
    pub(crate) run_time: f64,
    pub(crate) segment_number: u32,
    pub(crate) mixes: Vec<GasMix>,
    pub(crate) warnings: Vec<String>,
}

impl VpmModel {
    /// Model at sea level, tissues equilibrated with air.
    pub fn new(settings: Settings) -> Result<Self, ConfigurationError> {
        settings.validate()?;
        let barometric_pressure = settings.units_factor();
        Ok(VpmModel {
            compartments: surface_compartments(&settings, barometric_pressure),
            settings,
            barometric_pressure,
            run_time: 0.0,
            segment_number: 0,
            mixes: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Re-equilibrate at a different surface pressure (depth-pressure
    /// units), e.g. for a non-standard surface pressure supplied by a plan.
    pub fn with_barometric_pressure(mut self, barometric_pressure: f64) -> Self {
        self.barometric_pressure = barometric_pressure;
        self.compartments = surface_compartments(&self.settings, barometric_pressure);
        self
    }

    /// Settings in effect.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Compartment bank, for diagnostics.
    pub fn compartments(&self) -> &[Compartment] {
        &self.compartments
    }

    /// Replace the gas mix table.
    pub fn set_mixes(&mut self, mixes: Vec<GasMix>) {
        self.mixes = mixes;
    }

    /// Ambient pressure at a depth.
    #[inline]
    pub(crate) fn ambient(&self, depth: f64) -> f64 {
        depth + self.barometric_pressure
    }

    /// Inspired (helium, nitrogen) partial pressures of a mix at an ambient
    /// pressure, water vapour subtracted.
    pub(crate) fn inspired(&self, ambient_pressure: f64, mix: usize) -> (f64, f64) {
        let gas = &self.mixes[mix];
        let dry = ambient_pressure - self.settings.water_vapour_pressure();
        (dry * gas.fhe(), dry * gas.fn2())
    }

    /// Load all compartments through a constant-rate depth change.
    ///
    /// `rate` is in depth units per minute, negative when ascending.
    /// Returns the segment time in minutes.
    pub(crate) fn gas_loadings_ascent_descent(
        &mut self,
        starting_depth: f64,
        ending_depth: f64,
        rate: f64,
        mix: usize,
    ) -> f64 {
        let segment_time = (ending_depth - starting_depth) / rate;
        self.run_time += segment_time;
        self.segment_number += 1;

        let starting_ambient = self.ambient(starting_depth);
        let (inspired_he, inspired_n2) = self.inspired(starting_ambient, mix);
        let he_rate = rate * self.mixes[mix].fhe();
        let n2_rate = rate * self.mixes[mix].fn2();

        for compartment in &mut self.compartments {
            compartment.initial_p_he = compartment.p_he;
            compartment.initial_p_n2 = compartment.p_n2;
            compartment.p_he = schreiner(
                compartment.p_he,
                inspired_he,
                segment_time,
                compartment.he_half_time,
                he_rate,
            );
            compartment.p_n2 = schreiner(
                compartment.p_n2,
                inspired_n2,
                segment_time,
                compartment.n2_half_time,
                n2_rate,
            );
        }
        segment_time
    }

    /// Load all compartments at constant depth until `run_time_end`.
    ///
    /// Returns the segment time in minutes.
    pub(crate) fn gas_loadings_constant_depth(
        &mut self,
        depth: f64,
        run_time_end: f64,
        mix: usize,
    ) -> Result<f64, PlanError> {
        let segment_time = run_time_end - self.run_time;
        if segment_time < 0.0 {
            return Err(PlanError::NonMonotonicRunTime {
                current: self.run_time,
                requested: run_time_end,
            });
        }
        self.run_time = run_time_end;
        self.segment_number += 1;

        let (inspired_he, inspired_n2) = self.inspired(self.ambient(depth), mix);
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
        Ok(segment_time)
    }

    /// Off-gas at the surface on air for a repetitive-dive interval.
    pub(crate) fn gas_loadings_surface_interval(&mut self, interval_minutes: f64) {
        let inspired_n2 =
            (self.barometric_pressure - self.settings.water_vapour_pressure()) * AIR_FN2;
        for compartment in &mut self.compartments {
            compartment.p_he = haldane(
                compartment.p_he,
                0.0,
                compartment.he_half_time,
                interval_minutes,
            );
            compartment.p_n2 = haldane(
                compartment.p_n2,
                inspired_n2,
                compartment.n2_half_time,
                interval_minutes,
            );
        }
    }
}
