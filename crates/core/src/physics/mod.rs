//! Physics primitives shared by both decompression models
//!
//! Pure functions only: depth/pressure conversions, the Schreiner and
//! Haldane gas-loading equations, water vapour pressure, the standard
//! atmosphere, and the root finders used by the bubble mechanics.

pub mod atmosphere;
pub mod gas_loading;
pub mod pressure;
pub mod roots;

pub use atmosphere::barometric_pressure;
pub use gas_loading::{
    haldane, lung_water_vapour, schreiner, water_vapour_pressure_bar, water_vapour_pressure_mmhg,
};
pub use pressure::{
    depth_change_in_bars_per_minute, depth_to_pressure, gas_pressure_breathing,
    gas_rate_in_bars_per_minute, pressure_to_depth,
};
pub use roots::{bisect, radius_root_finder, MAX_ROOT_ITERATIONS};
