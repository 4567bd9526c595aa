//! Bulk allocator
//!
//! Greedily commits the least-waste pattern, repeated as often as the
//! remaining demand allows, until the remaining demand drops to the
//! heuristic threshold.

use crate::pattern::{best_pattern, enumerate_patterns, Pattern};
use axlekit_core::{Catalog, Demand, EngineError, MachineParameters, Quantity, Result, Sequence};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One committed pattern and how many bars use it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub pattern: Pattern,
    pub repeat_count: Quantity,
    /// Pieces of each type produced by all repeats together
    pub total_used_per_type: Vec<Quantity>,
    /// Production order of one bar
    pub sequence: Sequence,
    pub waste_per_bar: u64,
    pub total_waste: u64,
}

impl PlanEntry {
    fn new(pattern: Pattern, repeat_count: Quantity) -> Self {
        let total_used_per_type = pattern
            .counts()
            .iter()
            .map(|&count| count * repeat_count)
            .collect();
        let sequence = pattern.sequence();
        let waste_per_bar = pattern.waste();

        Self {
            pattern,
            repeat_count,
            total_used_per_type,
            sequence,
            waste_per_bar,
            total_waste: waste_per_bar * u64::from(repeat_count),
        }
    }

    /// Number of bars cut with this pattern
    pub fn bars(&self) -> u64 {
        u64::from(self.repeat_count)
    }
}

/// Result of bulk allocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub entries: Vec<PlanEntry>,
    /// Residual demand handed to the sequence optimizer
    pub remaining: Demand,
}

impl Allocation {
    pub fn total_bars(&self) -> u64 {
        self.entries.iter().map(PlanEntry::bars).sum()
    }

    pub fn total_waste(&self) -> u64 {
        self.entries.iter().map(|e| e.total_waste).sum()
    }

    /// Pieces produced per type across all entries
    pub fn used_per_type(&self) -> Vec<Quantity> {
        let mut used = vec![0; self.remaining.len()];
        for entry in &self.entries {
            for (slot, &count) in used.iter_mut().zip(&entry.total_used_per_type) {
                *slot += count;
            }
        }
        used
    }

    /// True when bulk allocation left nothing for the optimizer
    pub fn is_complete(&self) -> bool {
        self.remaining.is_exhausted()
    }
}

/// Greedy pattern committer bound to one catalog and machine
#[derive(Debug, Clone, Copy)]
pub struct BulkAllocator<'a> {
    catalog: &'a Catalog,
    params: &'a MachineParameters,
}

impl<'a> BulkAllocator<'a> {
    pub fn new(catalog: &'a Catalog, params: &'a MachineParameters) -> Self {
        Self { catalog, params }
    }

    /// Commit the best pattern for `remaining` once
    ///
    /// Returns the entry and the demand left afterwards. Fails with an
    /// allocator invariant violation if the best pattern cannot be repeated
    /// at least once, which a validated catalog with positive demand never
    /// produces.
    pub fn step(&self, remaining: Demand) -> Result<(PlanEntry, Demand)> {
        remaining.ensure_len(self.catalog.len())?;
        let patterns = enumerate_patterns(&remaining, self.params, self.catalog);
        let best = best_pattern(&patterns)
            .cloned()
            .ok_or_else(|| violation(None, &remaining))?;

        let repeat = match best.repeat_bound(&remaining) {
            Some(repeat) if repeat > 0 => repeat,
            _ => return Err(violation(Some(&best), &remaining).into()),
        };

        let left = remaining
            .clone()
            .consume(best.counts(), repeat)
            .ok_or_else(|| violation(Some(&best), &remaining))?;

        debug!(
            "Selected pattern {} out of {} candidates, {} repeats",
            best,
            patterns.len(),
            repeat
        );

        Ok((PlanEntry::new(best, repeat), left))
    }

    /// Commit patterns until remaining demand is at or below the heuristic threshold
    pub fn allocate(&self, demand: Demand) -> Result<Allocation> {
        demand.ensure_len(self.catalog.len())?;
        let threshold = u64::from(self.params.heuristic_threshold);
        let mut remaining = demand;
        let mut entries = Vec::new();

        while remaining.total() > threshold {
            let (entry, left) = self.step(remaining)?;
            info!(
                "{} x {} => waste {} mm",
                entry.repeat_count,
                self.label(&entry.sequence),
                entry.total_waste
            );
            entries.push(entry);
            remaining = left;
        }

        debug!(
            "Bulk allocation committed {} patterns, {} pieces left",
            entries.len(),
            remaining.total()
        );

        Ok(Allocation { entries, remaining })
    }

    fn label(&self, sequence: &[usize]) -> String {
        sequence
            .iter()
            .filter_map(|&i| self.catalog.get(i))
            .map(|t| t.name.as_str())
            .collect()
    }
}

fn violation(pattern: Option<&Pattern>, remaining: &Demand) -> EngineError {
    EngineError::AllocatorInvariantViolation {
        pattern: pattern.map_or_else(|| "none".to_string(), |p| p.to_string()),
        remaining: remaining.to_string(),
    }
}

/// Validate the inputs, then run bulk allocation over the full catalog demand
pub fn allocate(catalog: &Catalog, params: &MachineParameters) -> Result<Allocation> {
    catalog.validate_against(params)?;
    BulkAllocator::new(catalog, params).allocate(catalog.demand())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axlekit_core::AxleType;

    #[test]
    fn test_single_pattern_allocation() {
        let catalog = Catalog::new(vec![AxleType::new("A", 100, 3)]);
        let params = MachineParameters::new(350, 5);

        let allocation = allocate(&catalog, &params).unwrap();
        assert_eq!(allocation.entries.len(), 1);

        let entry = &allocation.entries[0];
        assert_eq!(entry.pattern.counts(), &[3]);
        assert_eq!(entry.repeat_count, 1);
        assert_eq!(entry.total_used_per_type, vec![3]);
        assert_eq!(entry.sequence, vec![0, 0, 0]);
        assert_eq!(entry.waste_per_bar, 35);
        assert_eq!(entry.total_waste, 35);
        assert!(allocation.is_complete());
    }

    #[test]
    fn test_least_waste_pattern_first() {
        let catalog = Catalog::new(vec![AxleType::new("A", 200, 1), AxleType::new("B", 100, 1)]);
        let params = MachineParameters::new(280, 5);

        let allocation = allocate(&catalog, &params).unwrap();
        assert_eq!(allocation.entries.len(), 2);
        assert_eq!(allocation.entries[0].pattern.counts(), &[1, 0]);
        assert_eq!(allocation.entries[0].waste_per_bar, 75);
        assert_eq!(allocation.entries[1].pattern.counts(), &[0, 1]);
        assert_eq!(allocation.entries[1].waste_per_bar, 175);
        assert_eq!(allocation.total_bars(), 2);
        assert_eq!(allocation.total_waste(), 250);
    }

    #[test]
    fn test_repeat_uses_full_bound() {
        let catalog = Catalog::new(vec![AxleType::new("A", 95, 30)]);
        let params = MachineParameters::new(1000, 5);

        let allocation = allocate(&catalog, &params).unwrap();
        assert_eq!(allocation.entries.len(), 1);
        assert_eq!(allocation.entries[0].pattern.counts(), &[10]);
        assert_eq!(allocation.entries[0].repeat_count, 3);
        assert_eq!(allocation.entries[0].waste_per_bar, 0);
    }

    #[test]
    fn test_heuristic_threshold_leaves_residual() {
        let catalog = Catalog::new(vec![AxleType::new("A", 95, 25)]);
        let params = MachineParameters::new(1000, 5).with_heuristic_threshold(10);

        let allocation = allocate(&catalog, &params).unwrap();
        assert_eq!(allocation.entries.len(), 1);
        assert_eq!(allocation.entries[0].repeat_count, 2);
        assert_eq!(allocation.remaining.as_slice(), &[5]);
        assert_eq!(allocation.used_per_type(), vec![20]);
    }

    #[test]
    fn test_threshold_above_demand_skips_allocation() {
        let catalog = Catalog::new(vec![AxleType::new("A", 95, 4)]);
        let params = MachineParameters::new(1000, 5).with_heuristic_threshold(10);

        let allocation = allocate(&catalog, &params).unwrap();
        assert!(allocation.entries.is_empty());
        assert_eq!(allocation.remaining, catalog.demand());
    }

    #[test]
    fn test_step_on_exhausted_demand_is_violation() {
        let catalog = Catalog::new(vec![AxleType::new("A", 100, 0)]);
        let params = MachineParameters::new(350, 5);

        let err = BulkAllocator::new(&catalog, &params)
            .step(Demand::zeros(1))
            .unwrap_err();
        assert!(err.is_allocator_violation());
    }

    #[test]
    fn test_invalid_input_rejected() {
        let catalog = Catalog::new(vec![AxleType::new("A", 400, 1)]);
        let params = MachineParameters::new(350, 5);

        let err = allocate(&catalog, &params).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_demand_length_mismatch_is_input_error() {
        let catalog = Catalog::new(vec![AxleType::new("A", 100, 3)]);
        let params = MachineParameters::new(350, 5);
        let allocator = BulkAllocator::new(&catalog, &params);

        let err = allocator.allocate(Demand::new(vec![0, 3])).unwrap_err();
        assert!(err.is_input_error());
        assert!(!err.is_allocator_violation());

        let err = allocator.step(Demand::new(vec![1, 1])).unwrap_err();
        assert!(err.is_input_error());
    }
}
