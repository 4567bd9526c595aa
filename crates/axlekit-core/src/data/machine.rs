//! Machine parameters
//!
//! Stock and saw settings shared by the pattern enumerator, the cost model
//! and the segmentation formatter.

use crate::error::InputError;
use crate::types::{Length, Quantity};
use serde::{Deserialize, Serialize};

/// Stock bar and cutting settings for one planning run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineParameters {
    /// Length of one raw stock bar (mm)
    pub bar_length: Length,
    /// Material consumed by one cut (mm)
    pub cut_width: Length,
    /// Stock diameter (mm), only used for machine code
    pub diameter: Length,
    /// Leftovers shorter than this are scrap, longer ones are reusable offcuts (mm)
    pub waste_discard_threshold: Length,
    /// Bulk allocation stops once remaining demand is at or below this many pieces
    pub heuristic_threshold: Quantity,
}

impl Default for MachineParameters {
    fn default() -> Self {
        Self {
            bar_length: 2800,
            cut_width: 5,
            diameter: 20,
            waste_discard_threshold: 1000,
            heuristic_threshold: 0,
        }
    }
}

impl MachineParameters {
    /// Create parameters for a bar and saw, other settings at their defaults
    pub fn new(bar_length: Length, cut_width: Length) -> Self {
        Self {
            bar_length,
            cut_width,
            ..Self::default()
        }
    }

    /// Set the stock diameter
    pub fn with_diameter(mut self, diameter: Length) -> Self {
        self.diameter = diameter;
        self
    }

    /// Set the waste discard threshold
    pub fn with_waste_discard_threshold(mut self, threshold: Length) -> Self {
        self.waste_discard_threshold = threshold;
        self
    }

    /// Set the bulk allocation stop threshold
    pub fn with_heuristic_threshold(mut self, threshold: Quantity) -> Self {
        self.heuristic_threshold = threshold;
        self
    }

    /// Material one piece consumes on the bar, cut included
    pub fn adjusted_length(&self, unit_length: Length) -> u64 {
        u64::from(unit_length) + u64::from(self.cut_width)
    }

    /// Waste charged for a leftover under the discard rule
    ///
    /// Leftovers below the threshold are scrap and count in full; anything
    /// at or above it is kept as a reusable offcut and costs nothing.
    pub fn scrap(&self, remainder: u64) -> u64 {
        if remainder < u64::from(self.waste_discard_threshold) {
            remainder
        } else {
            0
        }
    }

    /// Check the parameters on their own
    pub fn validate(&self) -> Result<(), InputError> {
        if self.bar_length == 0 {
            return Err(InputError::ZeroBarLength);
        }
        Ok(())
    }
}
