//! Remaining demand counters
//!
//! `Demand` is an owned value. The allocator consumes it and hands back an
//! updated copy instead of mutating shared counters.

use crate::error::InputError;
use crate::types::{Quantity, TypeIndex};
use serde::{Deserialize, Serialize};

/// Pieces still to produce, one counter per catalog index
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Demand(Vec<Quantity>);

impl Demand {
    /// Wrap per-type counters
    pub fn new(counts: Vec<Quantity>) -> Self {
        Self(counts)
    }

    /// All-zero demand for `len` types
    pub fn zeros(len: usize) -> Self {
        Self(vec![0; len])
    }

    /// Number of types tracked
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no types are tracked
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remaining count for one type, zero when out of range
    pub fn get(&self, index: TypeIndex) -> Quantity {
        self.0.get(index).copied().unwrap_or(0)
    }

    /// Counters as a slice
    pub fn as_slice(&self) -> &[Quantity] {
        &self.0
    }

    /// Sum over all types
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&c| u64::from(c)).sum()
    }

    /// True when nothing is left to produce
    pub fn is_exhausted(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    /// Check that the counters line up with a catalog of `types` entries
    pub fn ensure_len(&self, types: usize) -> Result<(), InputError> {
        if self.0.len() != types {
            return Err(InputError::DemandLengthMismatch {
                expected: types,
                actual: self.0.len(),
            });
        }
        Ok(())
    }

    /// Consume `times` copies of `counts`, returning the updated demand
    ///
    /// Returns `None` when any type would go negative or the lengths differ.
    pub fn consume(self, counts: &[Quantity], times: Quantity) -> Option<Demand> {
        if counts.len() != self.0.len() {
            return None;
        }

        let mut left = self.0;
        for (slot, &count) in left.iter_mut().zip(counts) {
            let used = count.checked_mul(times)?;
            *slot = slot.checked_sub(used)?;
        }
        Some(Demand(left))
    }

    /// Expand into one entry per piece, types in ascending index order
    pub fn to_multiset(&self) -> Vec<TypeIndex> {
        self.0
            .iter()
            .enumerate()
            .flat_map(|(index, &count)| std::iter::repeat(index).take(count as usize))
            .collect()
    }

    /// Count pieces per type in a sequence of `types` catalog entries
    pub fn from_pieces(pieces: &[TypeIndex], types: usize) -> Self {
        let mut counts = vec![0; types];
        for &piece in pieces {
            if let Some(slot) = counts.get_mut(piece) {
                *slot += 1;
            }
        }
        Self(counts)
    }
}

impl std::fmt::Display for Demand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_returns_updated_value() {
        let demand = Demand::new(vec![10, 4]);
        let left = demand.consume(&[2, 1], 3).unwrap();
        assert_eq!(left.as_slice(), &[4, 1]);
        assert_eq!(left.total(), 5);
    }

    #[test]
    fn test_consume_refuses_overdraw() {
        let demand = Demand::new(vec![1, 4]);
        assert!(demand.clone().consume(&[2, 0], 1).is_none());
        assert!(demand.consume(&[1], 1).is_none());
    }

    #[test]
    fn test_multiset_round_trip() {
        let demand = Demand::new(vec![2, 0, 1]);
        let pieces = demand.to_multiset();
        assert_eq!(pieces, vec![0, 0, 2]);
        assert_eq!(Demand::from_pieces(&pieces, 3), demand);
    }

    #[test]
    fn test_exhausted_and_len_check() {
        assert!(Demand::zeros(3).is_exhausted());
        assert!(!Demand::new(vec![0, 1]).is_exhausted());
        assert!(Demand::zeros(2).ensure_len(3).is_err());
    }
}
