//! Ambient environment constants for pressure conversions
//!
//! Surface pressure, gravity and altitude pressure default to Earth sea
//! level. A process-wide default is kept for convenience; solvers capture an
//! [`Environment`] value when a plan is constructed and never read the
//! global during a calculation, so mutating the default mid-calculation
//! cannot corrupt a running plan.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Density of fresh water (kg/m³)
pub const DENSITY_FRESH_WATER: f64 = 1000.0;

/// Density of salt water (kg/m³)
pub const DENSITY_SALT_WATER: f64 = 1030.0;

/// Density of mercury (kg/m³), used for mmHg conversions
pub const DENSITY_MERCURY: f64 = 13595.1;

/// Standard acceleration of gravity (m/s²)
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Ambient constants used by every depth/pressure conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Absolute pressure at the water surface (bar)
    pub surface_pressure: f64,
    /// Acceleration of gravity (m/s²)
    pub gravity: f64,
    /// Atmospheric pressure at the dive site altitude (bar)
    pub altitude_pressure: f64,
}

impl Default for Environment {
    /// Earth sea level: 1 bar surface pressure, standard gravity
    fn default() -> Self {
        Environment {
            surface_pressure: 1.0,
            gravity: STANDARD_GRAVITY,
            altitude_pressure: 1.0,
        }
    }
}

static CURRENT: RwLock<Environment> = RwLock::new(Environment {
    surface_pressure: 1.0,
    gravity: STANDARD_GRAVITY,
    altitude_pressure: 1.0,
});

/// Snapshot of the process-wide default environment.
pub fn current() -> Environment {
    *CURRENT.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Replace the process-wide default environment.
///
/// Must be called before any plan that should observe the new values is
/// constructed; existing plans keep the environment they captured.
pub fn set_current(env: Environment) {
    *CURRENT.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = env;
}
