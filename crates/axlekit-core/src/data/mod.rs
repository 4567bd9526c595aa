//! Planning input data
//!
//! - Axle type catalog
//! - Remaining demand counters
//! - Machine parameters

pub mod axle;
pub mod demand;
pub mod machine;

pub use axle::{AxleType, Catalog};
pub use demand::Demand;
pub use machine::MachineParameters;
