//! Varying Permeability Model (VPM-B) decompression solver
//!
//! Tracks bubble-nucleus radii and their crushing history alongside the
//! tissue gas loadings. Ascent schedules are limited by the allowable
//! supersaturation gradient each nucleus population tolerates, compensated
//! per stop for Boyle's-law expansion, and relaxed iteratively by the
//! critical-volume algorithm until the phase-volume time converges.
//!
//! Two entry points: [`Plan`] mirrors the Bühlmann segment-builder façade,
//! and [`DiveState`] accepts the full coded configuration record with
//! repetitive dives and altitude handling.

mod altitude;
mod ascent;
mod compartment;
mod crushing;
mod gradients;
mod model;
mod plan;
mod settings;
mod state;

pub use ascent::AscentStage;
pub use compartment::Compartment;
pub use model::VpmModel;
pub use plan::Plan;
pub use settings::{AltitudeSettings, Settings, HE_HALF_TIMES, N2_HALF_TIMES};
pub use state::{
    AscentChange, Config, DiveInput, DiveOutput, DiveState, GasMixSummary, ProfileEntry,
};
