//! Core types shared by both decompression models

pub mod environment;
pub mod gas;
pub mod segment;
pub mod units;

// Re-export
pub use environment::Environment;
pub use gas::GasMix;
pub use segment::{collapse_segments, DecoSchedule, Segment};
pub use units::{feet_to_meters, meters_to_feet, Bar, DepthUnits, Feet, Meters};
