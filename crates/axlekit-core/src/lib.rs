//! # AxleKit Core
//!
//! Core types and validation for AxleKit.
//! Provides the axle catalog, demand counters, machine parameters and the
//! error taxonomy shared by the optimizer and its collaborators.

pub mod data;
pub mod error;
pub mod types;

pub use data::{AxleType, Catalog, Demand, MachineParameters};
pub use error::{EngineError, Error, InputError, Result};
pub use types::{Length, Quantity, Sequence, TypeIndex};
