//! Planning run orchestration
//!
//! Validates the inputs, runs bulk allocation, optimizes and segments the
//! residual, and computes the baseline comparison.

use crate::allocator::{Allocation, BulkAllocator};
use crate::baseline::{baseline_plan, BaselineComparison, BaselineEntry};
use crate::search::{LocalSearch, SearchConfig, SearchResult};
use crate::segment::{Segment, Segmentation};
use axlekit_core::{Catalog, Demand, MachineParameters, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

/// The residual demand and the order chosen for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidualPlan {
    pub demand: Demand,
    pub search: SearchResult,
    pub segmentation: Segmentation,
}

/// Everything a planning run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningReport {
    pub run_id: Uuid,
    /// Seed the search ran with, reuse it to reproduce the run
    pub seed: u64,
    pub catalog: Catalog,
    pub params: MachineParameters,
    pub allocation: Allocation,
    pub residual: Option<ResidualPlan>,
    pub baseline: Vec<BaselineEntry>,
    pub comparison: BaselineComparison,
    pub elapsed_ms: u64,
}

impl PlanningReport {
    /// Every bar of the plan in cutting order: bulk entries, then residual
    pub fn bars(&self) -> Vec<Segment> {
        let bulk = self.allocation.entries.iter().flat_map(|entry| {
            std::iter::repeat_n(Segment::from_entry(entry, &self.params), entry.repeat_count as usize)
        });
        let residual = self
            .residual
            .iter()
            .flat_map(|r| r.segmentation.segments().iter().cloned());
        bulk.chain(residual).collect()
    }

    pub fn total_bars(&self) -> u64 {
        self.comparison.plan_bars
    }

    /// Scrap over all bars under the discard rule
    pub fn total_scrap(&self) -> u64 {
        self.bars().iter().map(|s| s.waste).sum()
    }
}

/// Configured planning run
#[derive(Debug, Clone)]
pub struct Planner {
    catalog: Catalog,
    params: MachineParameters,
    search: SearchConfig,
}

impl Planner {
    pub fn new(catalog: Catalog, params: MachineParameters) -> Self {
        Self {
            catalog,
            params,
            search: SearchConfig::default(),
        }
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn params(&self) -> &MachineParameters {
        &self.params
    }

    pub fn run(&self) -> Result<PlanningReport> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        self.catalog.validate_against(&self.params)?;

        let seed = self.search.resolve_seed();
        info!(
            "Planning run {} for {} types, {} pieces (seed {})",
            run_id,
            self.catalog.len(),
            self.catalog.total_demand(),
            seed
        );

        let allocation =
            BulkAllocator::new(&self.catalog, &self.params).allocate(self.catalog.demand())?;

        let residual = if allocation.is_complete() {
            None
        } else {
            let search = LocalSearch::new(
                &self.params,
                &self.catalog,
                self.search.clone().with_seed(seed),
            );
            let result = search.optimize(&allocation.remaining)?;
            let segmentation = search.model().segment(&result.sequence);
            Some(ResidualPlan {
                demand: allocation.remaining.clone(),
                search: result,
                segmentation,
            })
        };

        let baseline = baseline_plan(&self.catalog, &self.params);
        let comparison =
            BaselineComparison::new(&baseline, &allocation, residual.as_ref().map(|r| &r.segmentation));

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            "Planning run {} finished in {} ms: {} bars, {} mm less waste than type-by-type",
            run_id, elapsed_ms, comparison.plan_bars, comparison.waste_reduced
        );

        Ok(PlanningReport {
            run_id,
            seed,
            catalog: self.catalog.clone(),
            params: self.params,
            allocation,
            residual,
            baseline,
            comparison,
            elapsed_ms,
        })
    }
}
