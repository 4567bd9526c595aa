//! Axle type catalog
//!
//! The catalog is the fixed input of a planning run. Its order defines the
//! type indices every other module works with.

use crate::data::demand::Demand;
use crate::data::machine::MachineParameters;
use crate::error::InputError;
use crate::types::{Length, Quantity, TypeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One kind of axle to produce
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxleType {
    /// Display label, unique within a catalog
    pub name: String,
    /// Finished length of one piece (mm)
    pub unit_length: Length,
    /// Number of pieces ordered
    pub demand: Quantity,
}

impl AxleType {
    /// Create a new axle type
    pub fn new(name: impl Into<String>, unit_length: Length, demand: Quantity) -> Self {
        Self {
            name: name.into(),
            unit_length,
            demand,
        }
    }
}

impl std::fmt::Display for AxleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}x{}mm", self.name, self.demand, self.unit_length)
    }
}

/// Ordered, read-only list of axle types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    types: Vec<AxleType>,
}

impl Catalog {
    /// Create a catalog from axle types in index order
    pub fn new(types: Vec<AxleType>) -> Self {
        Self { types }
    }

    /// Number of axle types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when the catalog has no types
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Axle type at `index`
    pub fn get(&self, index: TypeIndex) -> Option<&AxleType> {
        self.types.get(index)
    }

    /// Iterate types in index order
    pub fn iter(&self) -> std::slice::Iter<'_, AxleType> {
        self.types.iter()
    }

    /// All types as a slice
    pub fn types(&self) -> &[AxleType] {
        &self.types
    }

    /// Find a type by name (case-sensitive)
    pub fn index_of(&self, name: &str) -> Option<TypeIndex> {
        self.types.iter().position(|t| t.name == name)
    }

    /// Initial demand counters, aligned with the catalog
    pub fn demand(&self) -> Demand {
        Demand::new(self.types.iter().map(|t| t.demand).collect())
    }

    /// Total number of ordered pieces
    pub fn total_demand(&self) -> u64 {
        self.types.iter().map(|t| u64::from(t.demand)).sum()
    }

    /// Total finished product length of a multiset of pieces
    pub fn product_length(&self, pieces: &[TypeIndex]) -> u64 {
        pieces
            .iter()
            .filter_map(|&i| self.types.get(i))
            .map(|t| u64::from(t.unit_length))
            .sum()
    }

    /// Check names and lengths, independent of the machine
    pub fn validate(&self) -> Result<(), InputError> {
        if self.types.is_empty() {
            return Err(InputError::EmptyCatalog);
        }

        let mut seen = HashSet::new();
        for (index, axle) in self.types.iter().enumerate() {
            if axle.name.trim().is_empty() {
                return Err(InputError::EmptyName { index });
            }
            if !seen.insert(axle.name.as_str()) {
                return Err(InputError::DuplicateName {
                    name: axle.name.clone(),
                });
            }
            if axle.unit_length == 0 {
                return Err(InputError::ZeroUnitLength {
                    name: axle.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Check the catalog against a machine: every piece must fit an empty bar
    pub fn validate_against(&self, params: &MachineParameters) -> Result<(), InputError> {
        params.validate()?;
        self.validate()?;

        for axle in &self.types {
            let adjusted_length = params.adjusted_length(axle.unit_length);
            if adjusted_length > u64::from(params.bar_length) {
                return Err(InputError::PieceExceedsBar {
                    name: axle.name.clone(),
                    adjusted_length,
                    bar_length: params.bar_length,
                });
            }
        }

        Ok(())
    }
}

impl From<Vec<AxleType>> for Catalog {
    fn from(types: Vec<AxleType>) -> Self {
        Self::new(types)
    }
}

impl FromIterator<AxleType> for Catalog {
    fn from_iter<I: IntoIterator<Item = AxleType>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a AxleType;
    type IntoIter = std::slice::Iter<'a, AxleType>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}
