//! Bühlmann ZH-L16 decompression solver with gradient factors
//!
//! Classic dissolved-gas model: 17 tissue compartments loaded through the
//! Schreiner equation, M-value ceilings scaled by gradient factors
//! interpolated between `gf_low` at the first stop and `gf_high` at the
//! surface.

mod compartment;
mod plan;
mod tables;

pub use compartment::Compartment;
pub use plan::{Plan, NDL_INFINITE};
pub use tables::{CompartmentCoefficients, ZH16A_TISSUES, ZH16B_TISSUES, ZH16C_TISSUES};
