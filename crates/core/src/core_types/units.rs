//! Semantic unit types for depth and pressure handling
//!
//! Newtype wrappers prevent accidental mixing of incompatible quantities
//! (feet with meters, or depth with absolute pressure). Each type wraps
//! `f64` — the decompression solvers' convergence tolerances demand double
//! precision throughout.
//!
//! The solvers themselves operate on raw `f64` values with documented units;
//! the newtypes guard the public API surface and configuration records.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

use crate::error::ConfigurationError;

/// Feet per meter, the exact conversion factor used throughout.
pub const FEET_PER_METER: f64 = 3.28084;

/// Convert a length in feet to meters.
#[inline]
pub fn feet_to_meters(feet: f64) -> f64 {
    feet / FEET_PER_METER
}

/// Convert a length in meters to feet.
#[inline]
pub fn meters_to_feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}

/// Depth or length in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Meters(pub f64);

impl Eq for Meters {}

impl PartialOrd for Meters {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Meters {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Meters {
    /// Create a new depth in meters
    #[inline]
    pub fn new(value: f64) -> Self {
        Meters(value)
    }

    /// Get the raw f64 value
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to feet
    #[inline]
    pub fn to_feet(self) -> Feet {
        Feet(meters_to_feet(self.0))
    }
}

impl From<Feet> for Meters {
    fn from(feet: Feet) -> Meters {
        feet.to_meters()
    }
}

impl Add for Meters {
    type Output = Meters;
    fn add(self, rhs: Meters) -> Meters {
        Meters(self.0 + rhs.0)
    }
}

impl Sub for Meters {
    type Output = Meters;
    fn sub(self, rhs: Meters) -> Meters {
        Meters(self.0 - rhs.0)
    }
}

impl Mul<f64> for Meters {
    type Output = Meters;
    fn mul(self, rhs: f64) -> Meters {
        Meters(self.0 * rhs)
    }
}

impl Div<f64> for Meters {
    type Output = Meters;
    fn div(self, rhs: f64) -> Meters {
        Meters(self.0 / rhs)
    }
}

impl fmt::Display for Meters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} m", self.0)
    }
}

/// Depth or length in feet
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Feet(pub f64);

impl Eq for Feet {}

impl PartialOrd for Feet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Feet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Feet {
    /// Create a new depth in feet
    #[inline]
    pub fn new(value: f64) -> Self {
        Feet(value)
    }

    /// Get the raw f64 value
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to meters
    #[inline]
    pub fn to_meters(self) -> Meters {
        Meters(feet_to_meters(self.0))
    }
}

impl From<Meters> for Feet {
    fn from(meters: Meters) -> Feet {
        meters.to_feet()
    }
}

impl fmt::Display for Feet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} ft", self.0)
    }
}

/// Absolute or gauge pressure in bar
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Bar(pub f64);

impl Eq for Bar {}

impl PartialOrd for Bar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bar {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Bar {
    /// One standard atmosphere
    pub const ATMOSPHERE: Bar = Bar(1.01325);

    /// Create a new pressure in bar
    #[inline]
    pub fn new(value: f64) -> Self {
        Bar(value)
    }

    /// Get the raw f64 value
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Add for Bar {
    type Output = Bar;
    fn add(self, rhs: Bar) -> Bar {
        Bar(self.0 + rhs.0)
    }
}

impl Sub for Bar {
    type Output = Bar;
    fn sub(self, rhs: Bar) -> Bar {
        Bar(self.0 - rhs.0)
    }
}

impl Mul<f64> for Bar {
    type Output = Bar;
    fn mul(self, rhs: f64) -> Bar {
        Bar(self.0 * rhs)
    }
}

impl fmt::Display for Bar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} bar", self.0)
    }
}

/// Depth-pressure unit system used by the VPM solver.
///
/// One standard atmosphere equals 33 feet of sea water or 10.1325 meters of
/// sea water; the factor converts between atmospheres and depth units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthUnits {
    /// Feet of sea water
    Fsw,
    /// Meters of sea water
    Msw,
}

impl DepthUnits {
    /// Depth units per standard atmosphere
    #[inline]
    pub fn units_factor(self) -> f64 {
        match self {
            DepthUnits::Fsw => 33.0,
            DepthUnits::Msw => 10.1325,
        }
    }
}

impl FromStr for DepthUnits {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fsw" => Ok(DepthUnits::Fsw),
            "msw" => Ok(DepthUnits::Msw),
            other => Err(ConfigurationError::UnknownUnits(other.to_string())),
        }
    }
}

impl fmt::Display for DepthUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepthUnits::Fsw => write!(f, "fsw"),
            DepthUnits::Msw => write!(f, "msw"),
        }
    }
}
