//! Barometric pressure from altitude
//!
//! U.S. Standard Atmosphere (1976) troposphere model with geopotential
//! altitude correction, expressed directly in diving depth-pressure units.
//!
//! # References
//! - U.S. Standard Atmosphere, 1976. NOAA/NASA/USAF, Washington D.C.

use crate::core_types::units::DepthUnits;

/// Mean radius of the Earth (km)
const RADIUS_OF_EARTH_KM: f64 = 6369.0;

/// Standard gravity (m/s²)
const GRAVITY: f64 = 9.80665;

/// Molecular weight of dry air (g/mol)
const MOLECULAR_WEIGHT_OF_AIR: f64 = 28.9644;

/// Universal gas constant (J/(mol·K))
const GAS_CONSTANT: f64 = 8.31432;

/// Sea-level standard temperature (K)
const TEMP_AT_SEA_LEVEL: f64 = 288.15;

/// Tropospheric temperature lapse rate (K/km)
const TEMP_GRADIENT: f64 = -6.5;

/// Feet per kilometer
const FEET_PER_KILOMETER: f64 = 3280.84;

/// Barometric pressure at altitude, in depth-pressure units.
///
/// `altitude` is in feet for fsw units and meters for msw units; the result
/// is in fsw or msw respectively (33.0 / 10.1325 at sea level).
pub fn barometric_pressure(altitude: f64, units: DepthUnits) -> f64 {
    let altitude_km = match units {
        DepthUnits::Fsw => altitude / FEET_PER_KILOMETER,
        DepthUnits::Msw => altitude / 1000.0,
    };
    let pressure_at_sea_level = units.units_factor();

    let gmr_factor = GRAVITY * MOLECULAR_WEIGHT_OF_AIR / GAS_CONSTANT;
    let geopotential_altitude =
        (altitude_km * RADIUS_OF_EARTH_KM) / (altitude_km + RADIUS_OF_EARTH_KM);
    let temp_at_altitude = TEMP_AT_SEA_LEVEL + TEMP_GRADIENT * geopotential_altitude;

    pressure_at_sea_level
        * ((TEMP_AT_SEA_LEVEL / temp_at_altitude).ln() * gmr_factor / TEMP_GRADIENT).exp()
}
