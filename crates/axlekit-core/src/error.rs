//! Error handling for AxleKit
//!
//! Provides error types for the layers of a planning run:
//! - Input errors (catalog or machine parameters that cannot be planned)
//! - Engine errors (internal contract violations inside the optimizer)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Input error type
///
/// Raised before any search starts when the catalog or the machine
/// parameters describe a problem that cannot be planned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The catalog contains no axle types
    #[error("Catalog is empty")]
    EmptyCatalog,

    /// An axle type has an empty name
    #[error("Axle type #{index} has an empty name")]
    EmptyName {
        /// Catalog index of the unnamed type.
        index: usize,
    },

    /// Two axle types share a name
    #[error("Duplicate axle type name: {name}")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },

    /// An axle type has a unit length of zero
    #[error("Axle type {name} has zero length")]
    ZeroUnitLength {
        /// The offending type.
        name: String,
    },

    /// The stock bar has no length
    #[error("Bar length must be > 0")]
    ZeroBarLength,

    /// A single piece plus its cut does not fit on an empty bar
    #[error("Axle type {name} needs {adjusted_length}mm including the cut, bar is {bar_length}mm")]
    PieceExceedsBar {
        /// The offending type.
        name: String,
        /// Unit length plus cut width.
        adjusted_length: u64,
        /// Configured bar length.
        bar_length: u32,
    },

    /// A demand vector does not line up with the catalog
    #[error("Demand has {actual} entries, catalog has {expected} types")]
    DemandLengthMismatch {
        /// Number of catalog entries.
        expected: usize,
        /// Number of demand entries.
        actual: usize,
    },
}

/// Engine error type
///
/// Internal contract failures. These are never user-recoverable and abort
/// the planning run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The bulk allocator picked a pattern it cannot stamp even once
    #[error("Allocator invariant violated: pattern {pattern} cannot be cut from remaining demand {remaining}")]
    AllocatorInvariantViolation {
        /// The selected pattern counts.
        pattern: String,
        /// Remaining demand at selection time.
        remaining: String,
    },

    /// A sequence refers to a type the catalog does not have
    #[error("Type index {index} out of range for a catalog of {len} types")]
    TypeIndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Catalog size.
        len: usize,
    },
}

/// Main error type for AxleKit
///
/// A unified error type that can represent any error of the engine.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Input error
    #[error(transparent)]
    Input(#[from] InputError),

    /// Engine error
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl Error {
    /// Check if this is an input error
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Input(_))
    }

    /// Check if this is an internal engine error
    pub fn is_engine_error(&self) -> bool {
        matches!(self, Error::Engine(_))
    }

    /// Check if this is the allocator contract failure
    pub fn is_allocator_violation(&self) -> bool {
        matches!(
            self,
            Error::Engine(EngineError::AllocatorInvariantViolation { .. })
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
