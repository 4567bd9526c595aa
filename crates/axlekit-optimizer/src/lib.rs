//! # AxleKit Optimizer
//!
//! Turns a catalog of axle types into a cutting plan:
//!
//! 1. [`pattern`] enumerates the maximal ways to fill one bar
//! 2. [`allocator`] greedily commits least-waste patterns in bulk
//! 3. [`search`] orders the leftover pieces with restarted swap search,
//!    scored by [`cost`]
//! 4. [`segment`] splits that order into bars
//!
//! [`Planner`] runs the whole pipeline and also builds the
//! type-by-type [`baseline`] for comparison.

pub mod allocator;
pub mod baseline;
pub mod cost;
pub mod pattern;
pub mod planner;
pub mod search;
pub mod segment;

pub use allocator::{allocate, Allocation, BulkAllocator, PlanEntry};
pub use baseline::{baseline_plan, BaselineComparison, BaselineEntry};
pub use cost::{overlap_score, run_count, total_cost, BarState, CostModel};
pub use pattern::{best_pattern, enumerate_patterns, Pattern};
pub use planner::{Planner, PlanningReport, ResidualPlan};
pub use search::{restart_seed, Climb, LocalSearch, RestartOutcome, SearchConfig, SearchResult};
pub use segment::{segment, Segment, Segmentation};
