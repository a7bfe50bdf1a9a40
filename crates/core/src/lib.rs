//! Dive Decompression Planning Core Library
//!
//! Computes safe ascent schedules from a described underwater profile
//! using two physiological models:
//! - Bühlmann ZH-L16 (A/B/C tables) with gradient factors
//! - The Varying Permeability Model, VPM-B, with Boyle's-law stop
//!   compensation and the critical-volume algorithm
//!
//! Both models share the physics primitives (Schreiner/Haldane gas
//! loading, depth/pressure conversions, water vapour pressure) and the
//! same plan façade: declare gases, append segments, then call
//! `calculate_decompression` for a merged segment schedule.
//!
//! The engine is a pure library: single-threaded, synchronous, no I/O.
//! Separate plans may be evaluated on separate threads; a plan must stay
//! confined to one thread during a calculation.

// Core types and utilities
pub mod core_types;

// Shared physics primitives
pub mod physics;

// Decompression solvers
pub mod buhlmann;
pub mod vpm;

// Error taxonomy
pub mod error;

// Re-export core types
pub use core_types::environment::{self, Environment};
pub use core_types::{
    collapse_segments, feet_to_meters, meters_to_feet, Bar, DecoSchedule, DepthUnits, Feet,
    GasMix, Meters, Segment,
};

// Re-export the error taxonomy
pub use error::{ConfigurationError, DecoError, NumericError, PlanError};
