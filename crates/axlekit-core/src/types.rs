//! Scalar aliases shared by every crate
//!
//! Lengths are whole millimeters, quantities are piece counts.

/// A length in millimeters
pub type Length = u32;

/// A number of pieces
pub type Quantity = u32;

/// Position of an axle type in the catalog
pub type TypeIndex = usize;

/// Pieces in production order, one catalog index per piece
pub type Sequence = Vec<TypeIndex>;
