//! Pattern enumeration
//!
//! A pattern says how many pieces of each axle type go onto one bar. The
//! enumerator expands a breadth-first frontier of partial patterns until
//! every candidate is full, i.e. no eligible piece fits any more. Only those
//! maximal patterns are returned.
//!
//! Candidates are expanded in FIFO order and children are created in
//! ascending type index, so the output order is deterministic. A count
//! vector reached through several paths is expanded once.

use axlekit_core::{Catalog, Demand, MachineParameters, Quantity, Sequence, TypeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Piece counts per type for a single bar
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    counts: Vec<Quantity>,
    waste: u64,
}

impl Pattern {
    /// Build a pattern from counts, `None` if it overflows the bar
    pub fn from_counts(
        counts: Vec<Quantity>,
        params: &MachineParameters,
        catalog: &Catalog,
    ) -> Option<Self> {
        let used = counts
            .iter()
            .zip(catalog.iter())
            .map(|(&count, axle)| u64::from(count) * params.adjusted_length(axle.unit_length))
            .sum::<u64>();
        let waste = u64::from(params.bar_length).checked_sub(used)?;
        Some(Self { counts, waste })
    }

    /// Counts per type, aligned with the catalog
    pub fn counts(&self) -> &[Quantity] {
        &self.counts
    }

    /// Count for one type
    pub fn count(&self, index: TypeIndex) -> Quantity {
        self.counts.get(index).copied().unwrap_or(0)
    }

    /// Bar length left over after all pieces and cuts (mm)
    pub fn waste(&self) -> u64 {
        self.waste
    }

    /// Number of pieces on the bar
    pub fn pieces(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// True when no piece is placed
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// One bar's pieces, grouped by type in ascending index order
    pub fn sequence(&self) -> Sequence {
        Demand::new(self.counts.clone()).to_multiset()
    }

    /// How many bars can use this pattern without exceeding `remaining`
    ///
    /// Types absent from the pattern impose no bound, so an empty pattern
    /// has no bound at all and yields `None`.
    pub fn repeat_bound(&self, remaining: &Demand) -> Option<Quantity> {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(index, &count)| remaining.get(index) / count)
            .min()
    }

    /// True if one more piece of `index` would still fit on the bar
    pub fn fits_another(
        &self,
        index: TypeIndex,
        params: &MachineParameters,
        catalog: &Catalog,
    ) -> bool {
        catalog
            .get(index)
            .is_some_and(|axle| params.adjusted_length(axle.unit_length) <= self.waste)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} (waste {}mm)", self.counts, self.waste)
    }
}

/// Partial pattern on the frontier
#[derive(Debug, Clone)]
struct Candidate {
    counts: Vec<Quantity>,
    remaining_length: u64,
}

impl Candidate {
    fn empty(types: usize, bar_length: u64) -> Self {
        Self {
            counts: vec![0; types],
            remaining_length: bar_length,
        }
    }

    /// Types that fit in the remaining length and still have demand left
    fn eligible(&self, remaining: &Demand, adjusted: &[u64]) -> Vec<TypeIndex> {
        adjusted
            .iter()
            .enumerate()
            .filter(|&(index, &adj)| {
                self.remaining_length >= adj && remaining.get(index) > self.counts[index]
            })
            .map(|(index, _)| index)
            .collect()
    }

    fn child(&self, index: TypeIndex, adj: u64) -> Self {
        let mut counts = self.counts.clone();
        counts[index] += 1;
        Self {
            counts,
            remaining_length: self.remaining_length - adj,
        }
    }

    fn into_pattern(self) -> Pattern {
        Pattern {
            counts: self.counts,
            waste: self.remaining_length,
        }
    }
}

/// Enumerate every maximal pattern for the remaining demand
///
/// Never returns an empty list: if nothing fits the bar, the empty pattern
/// with `waste == bar_length` is the only result.
pub fn enumerate_patterns(
    remaining: &Demand,
    params: &MachineParameters,
    catalog: &Catalog,
) -> Vec<Pattern> {
    let adjusted: Vec<u64> = catalog
        .iter()
        .map(|axle| params.adjusted_length(axle.unit_length))
        .collect();

    let root = Candidate::empty(adjusted.len(), u64::from(params.bar_length));
    let mut discovered: HashSet<Vec<Quantity>> = HashSet::from([root.counts.clone()]);
    let mut frontier = VecDeque::from([root]);
    let mut patterns = Vec::new();
    let mut expanded = 0usize;

    while let Some(candidate) = frontier.pop_front() {
        let eligible = candidate.eligible(remaining, &adjusted);
        if eligible.is_empty() {
            patterns.push(candidate.into_pattern());
            continue;
        }

        expanded += 1;
        for index in eligible {
            let child = candidate.child(index, adjusted[index]);
            if discovered.insert(child.counts.clone()) {
                frontier.push_back(child);
            }
        }
    }

    debug!(
        "Enumerated {} maximal patterns ({} partial patterns expanded)",
        patterns.len(),
        expanded
    );

    patterns
}

/// First pattern with the least waste
pub fn best_pattern(patterns: &[Pattern]) -> Option<&Pattern> {
    patterns.iter().min_by_key(|p| p.waste())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axlekit_core::AxleType;

    #[test]
    fn test_single_type_fills_bar() {
        let catalog = Catalog::new(vec![AxleType::new("A", 100, 3)]);
        let params = MachineParameters::new(350, 5);

        let patterns = enumerate_patterns(&catalog.demand(), &params, &catalog);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].counts(), &[3]);
        assert_eq!(patterns[0].waste(), 35);
    }

    #[test]
    fn test_incompatible_types_give_separate_patterns() {
        let catalog = Catalog::new(vec![AxleType::new("A", 200, 1), AxleType::new("B", 100, 1)]);
        let params = MachineParameters::new(280, 5);

        let patterns = enumerate_patterns(&catalog.demand(), &params, &catalog);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].counts(), &[1, 0]);
        assert_eq!(patterns[0].waste(), 75);
        assert_eq!(patterns[1].counts(), &[0, 1]);
        assert_eq!(patterns[1].waste(), 175);

        let best = best_pattern(&patterns).unwrap();
        assert_eq!(best.counts(), &[1, 0]);
    }

    #[test]
    fn test_demand_caps_counts() {
        let catalog = Catalog::new(vec![AxleType::new("A", 100, 2), AxleType::new("B", 50, 0)]);
        let params = MachineParameters::new(1000, 0);

        let patterns = enumerate_patterns(&catalog.demand(), &params, &catalog);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].counts(), &[2, 0]);
        assert_eq!(patterns[0].waste(), 800);
    }

    #[test]
    fn test_nothing_fits_returns_empty_pattern() {
        let catalog = Catalog::new(vec![AxleType::new("A", 500, 4)]);
        let params = MachineParameters::new(300, 5);

        let patterns = enumerate_patterns(&catalog.demand(), &params, &catalog);
        assert_eq!(patterns.len(), 1);
        assert!(patterns[0].is_empty());
        assert_eq!(patterns[0].waste(), 300);
        assert_eq!(patterns[0].repeat_bound(&catalog.demand()), None);
    }

    #[test]
    fn test_patterns_are_unique_and_maximal() {
        let catalog = Catalog::new(vec![
            AxleType::new("A", 90, 5),
            AxleType::new("B", 60, 5),
            AxleType::new("C", 40, 5),
        ]);
        let params = MachineParameters::new(400, 5);
        let demand = catalog.demand();

        let patterns = enumerate_patterns(&demand, &params, &catalog);
        let unique: HashSet<_> = patterns.iter().map(|p| p.counts().to_vec()).collect();
        assert_eq!(unique.len(), patterns.len());

        for pattern in &patterns {
            for index in 0..catalog.len() {
                let has_demand = demand.get(index) > pattern.count(index);
                assert!(!(has_demand && pattern.fits_another(index, &params, &catalog)));
            }
        }
    }

    #[test]
    fn test_repeat_bound() {
        let catalog = Catalog::new(vec![AxleType::new("A", 100, 7), AxleType::new("B", 100, 9)]);
        let params = MachineParameters::new(1000, 0);
        let pattern = Pattern::from_counts(vec![2, 4], &params, &catalog).unwrap();

        assert_eq!(pattern.waste(), 400);
        assert_eq!(pattern.repeat_bound(&Demand::new(vec![7, 9])), Some(2));
        assert_eq!(pattern.repeat_bound(&Demand::new(vec![1, 9])), Some(0));
        assert_eq!(pattern.sequence(), vec![0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn test_from_counts_rejects_overflow() {
        let catalog = Catalog::new(vec![AxleType::new("A", 100, 7)]);
        let params = MachineParameters::new(300, 5);
        assert!(Pattern::from_counts(vec![3], &params, &catalog).is_none());
    }
}
