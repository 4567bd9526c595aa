//! Segmentation of a sequence into bars
//!
//! Uses the same placement rule as the cost model: a piece that does not
//! fit the open bar starts a new one. The last bar is always emitted and a
//! piece is always placed in the bar it actually starts.

use crate::allocator::PlanEntry;
use crate::cost::CostModel;
use axlekit_core::{Catalog, EngineError, MachineParameters, Sequence, TypeIndex};
use serde::{Deserialize, Serialize};

/// Pieces cut from one bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub pieces: Sequence,
    /// Length left on the bar after the last cut
    pub remainder: u64,
    /// Scrap charged for the remainder under the discard rule
    pub waste: u64,
}

impl Segment {
    fn new(pieces: Sequence, remainder: u64, params: &MachineParameters) -> Self {
        Self {
            pieces,
            remainder,
            waste: params.scrap(remainder),
        }
    }

    /// One bar of a bulk plan entry
    pub fn from_entry(entry: &PlanEntry, params: &MachineParameters) -> Self {
        Self::new(entry.sequence.clone(), entry.waste_per_bar, params)
    }

    /// Reusable leftover kept from this bar, zero when it is scrap
    pub fn offcut(&self) -> u64 {
        self.remainder - self.waste
    }
}

/// A sequence split into bars
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    segments: Vec<Segment>,
}

impl Segmentation {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Number of bars
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_waste(&self) -> u64 {
        self.segments.iter().map(|s| s.waste).sum()
    }

    pub fn total_remainder(&self) -> u64 {
        self.segments.iter().map(|s| s.remainder).sum()
    }

    /// Concatenate the bars back into one sequence
    pub fn flatten(&self) -> Sequence {
        self.segments
            .iter()
            .flat_map(|s| s.pieces.iter().copied())
            .collect()
    }
}

impl<'a> IntoIterator for &'a Segmentation {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl CostModel {
    /// Split a sequence into bars
    ///
    /// # Panics
    ///
    /// Panics if a piece refers to a type outside the catalog; use
    /// [`segment`] for unchecked input.
    pub fn segment(&self, sequence: &[TypeIndex]) -> Segmentation {
        let params = self.params();
        let mut segments = Vec::new();
        let mut pieces = Vec::new();
        let mut remainder = self.bar_length();

        for &index in sequence {
            let adj = self.adjusted_length(index);
            if remainder < adj && !pieces.is_empty() {
                segments.push(Segment::new(std::mem::take(&mut pieces), remainder, params));
                remainder = self.bar_length();
            }
            pieces.push(index);
            remainder = remainder.saturating_sub(adj);
        }

        if !pieces.is_empty() {
            segments.push(Segment::new(pieces, remainder, params));
        }

        Segmentation { segments }
    }
}

/// Split a sequence into bars after checking its type indices
pub fn segment(
    sequence: &[TypeIndex],
    params: &MachineParameters,
    catalog: &Catalog,
) -> Result<Segmentation, EngineError> {
    let model = CostModel::new(params, catalog);
    model.check_sequence(sequence)?;
    Ok(model.segment(sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axlekit_core::AxleType;

    fn catalog() -> Catalog {
        Catalog::new(vec![AxleType::new("A", 45, 4), AxleType::new("B", 20, 2)])
    }

    #[test]
    fn test_last_bar_is_kept() {
        let params = MachineParameters::new(100, 5).with_waste_discard_threshold(60);
        let result = segment(&[0, 0, 1], &params, &catalog()).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.segments()[0].pieces, vec![0, 0]);
        assert_eq!(result.segments()[0].remainder, 0);
        assert_eq!(result.segments()[1].pieces, vec![1]);
        assert_eq!(result.segments()[1].remainder, 75);
        assert_eq!(result.segments()[1].waste, 0);
        assert_eq!(result.segments()[1].offcut(), 75);
    }

    #[test]
    fn test_overflowing_piece_starts_next_bar() {
        let params = MachineParameters::new(100, 5).with_waste_discard_threshold(60);
        let result = segment(&[0, 1, 0, 1], &params, &catalog()).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.segments()[0].pieces, vec![0, 1]);
        assert_eq!(result.segments()[0].remainder, 25);
        assert_eq!(result.segments()[0].waste, 25);
        assert_eq!(result.segments()[1].pieces, vec![0, 1]);
        assert_eq!(result.total_waste(), 50);
        assert_eq!(result.total_remainder(), 50);
    }

    #[test]
    fn test_flatten_round_trip() {
        let params = MachineParameters::new(100, 5);
        let sequence = vec![1, 0, 0, 1, 0, 0];
        let result = segment(&sequence, &params, &catalog()).unwrap();
        assert_eq!(result.flatten(), sequence);
    }

    #[test]
    fn test_empty_sequence_has_no_bars() {
        let params = MachineParameters::new(100, 5);
        let result = segment(&[], &params, &catalog()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.total_waste(), 0);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let params = MachineParameters::new(100, 5);
        assert!(segment(&[0, 5], &params, &catalog()).is_err());
    }
}
