//! Type-by-type baseline
//!
//! The plan an operator would cut without mixing types: each type on its
//! own bars, as many pieces per bar as fit, with one partial bar for the
//! rest. Used to report how much material the mixed plan saves.

use crate::allocator::Allocation;
use crate::segment::Segmentation;
use axlekit_core::{Catalog, MachineParameters, Quantity, TypeIndex};
use serde::{Deserialize, Serialize};

/// Bars of one type cut with the same count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineEntry {
    pub type_index: TypeIndex,
    pub pieces_per_bar: Quantity,
    pub bars: u64,
    pub waste_per_bar: u64,
    pub total_waste: u64,
}

impl BaselineEntry {
    fn new(type_index: TypeIndex, pieces_per_bar: Quantity, bars: u64, bar: u64, adj: u64) -> Self {
        let waste_per_bar = bar - u64::from(pieces_per_bar) * adj;
        Self {
            type_index,
            pieces_per_bar,
            bars,
            waste_per_bar,
            total_waste: waste_per_bar * bars,
        }
    }
}

/// Baseline entries for every type with demand
///
/// Types whose pieces do not fit a bar are skipped; validated catalogs
/// never have them.
pub fn baseline_plan(catalog: &Catalog, params: &MachineParameters) -> Vec<BaselineEntry> {
    let bar = u64::from(params.bar_length);
    let mut entries = Vec::new();

    for (index, axle) in catalog.iter().enumerate() {
        let adj = params.adjusted_length(axle.unit_length);
        let fit = Quantity::try_from(bar / adj).unwrap_or(Quantity::MAX);
        let per_bar = fit.min(axle.demand);
        if per_bar == 0 {
            continue;
        }

        let full_bars = axle.demand / per_bar;
        entries.push(BaselineEntry::new(index, per_bar, u64::from(full_bars), bar, adj));

        let rest = axle.demand % per_bar;
        if rest > 0 {
            entries.push(BaselineEntry::new(index, rest, 1, bar, adj));
        }
    }

    entries
}

/// Material left over by the baseline versus the optimized plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineComparison {
    pub baseline_waste: u64,
    pub baseline_bars: u64,
    pub plan_waste: u64,
    pub plan_bars: u64,
    /// Positive when the plan leaves less material over
    pub waste_reduced: i64,
}

impl BaselineComparison {
    /// Compare raw leftovers of both plans
    ///
    /// The plan side covers the bulk entries and, if present, the bars of
    /// the residual segmentation.
    pub fn new(
        baseline: &[BaselineEntry],
        allocation: &Allocation,
        residual: Option<&Segmentation>,
    ) -> Self {
        let baseline_waste: u64 = baseline.iter().map(|e| e.total_waste).sum();
        let baseline_bars: u64 = baseline.iter().map(|e| e.bars).sum();

        let plan_waste =
            allocation.total_waste() + residual.map_or(0, Segmentation::total_remainder);
        let plan_bars = allocation.total_bars() + residual.map_or(0, |s| s.len() as u64);

        Self {
            baseline_waste,
            baseline_bars,
            plan_waste,
            plan_bars,
            waste_reduced: baseline_waste as i64 - plan_waste as i64,
        }
    }

    /// Waste reduction as a share of the baseline's stock, in percent
    pub fn reduction_percent(&self, bar_length: u64) -> f64 {
        let stock = self.baseline_bars * bar_length;
        if stock == 0 {
            return 0.0;
        }
        self.waste_reduced as f64 * 100.0 / stock as f64
    }

    /// Bars saved by the plan
    pub fn bars_saved(&self) -> i64 {
        self.baseline_bars as i64 - self.plan_bars as i64
    }
}
