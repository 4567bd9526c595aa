//! Local search over residual sequences
//!
//! Each restart shuffles the residual multiset with its own seeded RNG and
//! then runs best-improvement hill climbing over pairwise swaps:
//!
//! - a sweep scans every pair `a < b` holding different types
//! - a swap that lowers the best cost seen in the sweep is recorded and
//!   lowers that best cost
//! - a swap that matches the best cost is recorded only if it lowers the
//!   overlap score of the current sequence
//! - the recorded swap is applied after the sweep; a sweep with nothing
//!   recorded ends the climb
//!
//! Swap costs can be evaluated in parallel. Selection always happens
//! afterwards in scan order, so the outcome does not depend on threads.

use crate::cost::{overlap_score, run_count, CostModel};
use axlekit_core::{Catalog, Demand, MachineParameters, Result, Sequence};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Configuration for the sequence search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Independent random restarts, at least one is always run
    pub restarts: usize,
    /// Run seed, `None` draws one from the thread RNG
    pub seed: Option<u64>,
    /// Upper bound on sweeps per restart (None = until no swap improves)
    pub max_sweeps: Option<usize>,
    /// Evaluate restarts and swap candidates on the rayon pool
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            restarts: 10,
            seed: None,
            max_sweeps: None,
            parallel: true,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_sweeps(mut self, sweeps: usize) -> Self {
        self.max_sweeps = Some(sweeps);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The configured seed, or a fresh random one
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

/// Seed of restart `restart` derived from the run seed (splitmix64)
pub fn restart_seed(run_seed: u64, restart: usize) -> u64 {
    let mut z = run_seed.wrapping_add((restart as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Hill climbing result from one start sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Climb {
    pub sequence: Sequence,
    pub initial_cost: u64,
    pub cost: u64,
    pub overlap: u64,
    pub sweeps: usize,
    pub swaps: usize,
    /// False when the sweep bound stopped the climb early
    pub converged: bool,
}

/// Outcome of one restart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartOutcome {
    pub restart: usize,
    pub seed: u64,
    pub initial_cost: u64,
    pub cost: u64,
    pub overlap: u64,
    pub run_count: usize,
    pub sweeps: usize,
    pub swaps: usize,
    pub converged: bool,
    pub elapsed_ms: u64,
    pub sequence: Sequence,
}

/// Best sequence over all restarts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub sequence: Sequence,
    pub cost: u64,
    pub overlap: u64,
    pub run_seed: u64,
    /// Restart that produced the sequence, `None` if no search was needed
    pub best_restart: Option<usize>,
    pub restarts: Vec<RestartOutcome>,
}

impl SearchResult {
    fn trivial(sequence: Sequence, cost: u64, run_seed: u64) -> Self {
        Self {
            overlap: overlap_score(&sequence),
            sequence,
            cost,
            run_seed,
            best_restart: None,
            restarts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SwapMove {
    a: usize,
    b: usize,
    cost: u64,
}

/// Restarted best-improvement swap search
#[derive(Debug, Clone)]
pub struct LocalSearch {
    model: CostModel,
    config: SearchConfig,
}

impl LocalSearch {
    pub fn new(params: &MachineParameters, catalog: &Catalog, config: SearchConfig) -> Self {
        Self::with_model(CostModel::new(params, catalog), config)
    }

    pub fn with_model(model: CostModel, config: SearchConfig) -> Self {
        Self { model, config }
    }

    pub fn model(&self) -> &CostModel {
        &self.model
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search a good production order for the residual demand
    ///
    /// Empty residuals cost nothing; a single piece has only one order.
    /// Neither runs a restart. A residual that does not line up with the
    /// catalog is rejected before any restart.
    pub fn optimize(&self, residual: &Demand) -> Result<SearchResult> {
        residual.ensure_len(self.model.types())?;
        let run_seed = self.config.resolve_seed();
        let multiset = residual.to_multiset();

        if multiset.len() <= 1 {
            let cost = self.model.total_cost(&multiset);
            debug!("Residual of {} pieces needs no search", multiset.len());
            return Ok(SearchResult::trivial(multiset, cost, run_seed));
        }

        let restarts = self.config.restarts.max(1);
        info!(
            "Optimizing residual of {} pieces with {} restarts (seed {})",
            multiset.len(),
            restarts,
            run_seed
        );

        let outcomes: Vec<RestartOutcome> = if self.config.parallel {
            (0..restarts)
                .into_par_iter()
                .map(|restart| self.run_restart(&multiset, run_seed, restart))
                .collect()
        } else {
            (0..restarts)
                .map(|restart| self.run_restart(&multiset, run_seed, restart))
                .collect()
        };

        // min_by_key keeps the first minimum: lowest restart index wins ties
        let best = outcomes
            .iter()
            .min_by_key(|o| o.cost)
            .map(|o| (o.restart, o.cost, o.overlap, o.sequence.clone()));

        let result = match best {
            Some((restart, cost, overlap, sequence)) => {
                info!("Best residual cost {} from restart {}", cost, restart);
                SearchResult {
                    sequence,
                    cost,
                    overlap,
                    run_seed,
                    best_restart: Some(restart),
                    restarts: outcomes,
                }
            }
            None => {
                let cost = self.model.total_cost(&multiset);
                SearchResult::trivial(multiset, cost, run_seed)
            }
        };
        Ok(result)
    }

    fn run_restart(&self, multiset: &[usize], run_seed: u64, restart: usize) -> RestartOutcome {
        let started = Instant::now();
        let seed = restart_seed(run_seed, restart);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut start = multiset.to_vec();
        start.shuffle(&mut rng);

        let climb = self.hill_climb(start);
        let outcome = RestartOutcome {
            restart,
            seed,
            initial_cost: climb.initial_cost,
            cost: climb.cost,
            overlap: climb.overlap,
            run_count: run_count(&climb.sequence),
            sweeps: climb.sweeps,
            swaps: climb.swaps,
            converged: climb.converged,
            elapsed_ms: started.elapsed().as_millis() as u64,
            sequence: climb.sequence,
        };

        debug!(
            "Restart {}: cost {} -> {} after {} sweeps ({} swaps, overlap {}, {} runs)",
            restart,
            outcome.initial_cost,
            outcome.cost,
            outcome.sweeps,
            outcome.swaps,
            outcome.overlap,
            outcome.run_count
        );

        outcome
    }

    /// Climb from a given start sequence until no swap is accepted
    pub fn hill_climb(&self, start: Sequence) -> Climb {
        let mut sequence = start;
        let initial_cost = self.model.total_cost(&sequence);
        let mut cost = initial_cost;
        let mut overlap = overlap_score(&sequence);
        let mut sweeps = 0;
        let mut swaps = 0;
        let mut converged = false;

        while self.config.max_sweeps.is_none_or(|limit| sweeps < limit) {
            sweeps += 1;
            match self.best_swap(&sequence, cost, overlap) {
                Some(mv) => {
                    sequence.swap(mv.a, mv.b);
                    cost = mv.cost;
                    overlap = overlap_score(&sequence);
                    swaps += 1;
                }
                None => {
                    converged = true;
                    break;
                }
            }
        }

        Climb {
            sequence,
            initial_cost,
            cost,
            overlap,
            sweeps,
            swaps,
            converged,
        }
    }

    /// One sweep: the swap to apply, if any
    fn best_swap(&self, sequence: &[usize], current_cost: u64, current_overlap: u64) -> Option<SwapMove> {
        let n = sequence.len();
        if n < 2 {
            return None;
        }

        let prefix = self.model.prefix_states(sequence);

        // Only swaps at or below the current cost can ever be selected
        let row = |a: usize| -> Vec<(usize, u64)> {
            (a + 1..n)
                .filter(|&b| sequence[a] != sequence[b])
                .filter_map(|b| {
                    let cost = self.model.swap_cost(sequence, &prefix, a, b);
                    (cost <= current_cost).then_some((b, cost))
                })
                .collect()
        };

        let rows: Vec<Vec<(usize, u64)>> = if self.config.parallel {
            (0..n - 1).into_par_iter().map(row).collect()
        } else {
            (0..n - 1).map(row).collect()
        };

        let mut best_cost = current_cost;
        let mut best = None;
        let mut scratch = sequence.to_vec();

        for (a, candidates) in rows.iter().enumerate() {
            for &(b, cost) in candidates {
                if cost < best_cost {
                    best_cost = cost;
                    best = Some(SwapMove { a, b, cost });
                } else if cost == best_cost {
                    scratch.swap(a, b);
                    let overlap = overlap_score(&scratch);
                    scratch.swap(a, b);
                    if overlap < current_overlap {
                        best = Some(SwapMove { a, b, cost });
                    }
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axlekit_core::AxleType;

    fn setup(threshold: u32) -> (Catalog, MachineParameters) {
        let catalog = Catalog::new(vec![AxleType::new("A", 45, 2), AxleType::new("B", 20, 1)]);
        let params = MachineParameters::new(100, 5).with_waste_discard_threshold(threshold);
        (catalog, params)
    }

    #[test]
    fn test_climb_finds_cheaper_order() {
        let (catalog, params) = setup(60);
        let search = LocalSearch::new(&params, &catalog, SearchConfig::new().with_parallel(false));

        let climb = search.hill_climb(vec![0, 1, 0]);
        assert_eq!(climb.initial_cost, 150);
        assert_eq!(climb.cost, 100);
        assert_eq!(climb.sequence, vec![0, 0, 1]);
        assert_eq!(climb.swaps, 1);
        assert_eq!(climb.sweeps, 2);
        assert!(climb.converged);
    }

    #[test]
    fn test_equal_cost_swap_needs_lower_overlap() {
        let (catalog, params) = setup(30);
        let search = LocalSearch::new(&params, &catalog, SearchConfig::new().with_parallel(false));

        // Every order costs 100, so only overlap can drive a swap
        let climb = search.hill_climb(vec![0, 1, 0]);
        assert_eq!(climb.cost, 100);
        assert!(climb.overlap < overlap_score(&[0, 1, 0]));

        let settled = search.hill_climb(vec![0, 0, 1]);
        assert_eq!(settled.swaps, 0);
        assert_eq!(settled.sweeps, 1);
    }

    #[test]
    fn test_later_equal_swap_replaces_cheaper_one() {
        let (catalog, params) = setup(30);

        // [ABAB] costs 125. Swap (0, 3) is the first to reach 100, swap (1, 2)
        // matches 100 later in the sweep and has lower overlap than [ABAB].
        for parallel in [false, true] {
            let config = SearchConfig::new().with_parallel(parallel).with_max_sweeps(1);
            let search = LocalSearch::new(&params, &catalog, config);

            let climb = search.hill_climb(vec![0, 1, 0, 1]);
            assert_eq!(climb.initial_cost, 125);
            assert_eq!(climb.cost, 100);
            assert_eq!(climb.swaps, 1);
            assert_eq!(climb.sequence, vec![0, 0, 1, 1]);
            assert_eq!(climb.overlap, 2);
        }

        let search = LocalSearch::new(&params, &catalog, SearchConfig::new().with_parallel(false));
        let climb = search.hill_climb(vec![0, 1, 0, 1]);
        assert_eq!(climb.sequence, vec![0, 0, 1, 1]);
        assert!(climb.converged);
    }

    #[test]
    fn test_residual_must_match_catalog() {
        let (_, params) = setup(60);
        let catalog = Catalog::new(vec![AxleType::new("A", 45, 2)]);
        let search = LocalSearch::new(&params, &catalog, SearchConfig::new().with_seed(3));

        let err = search.optimize(&Demand::new(vec![1, 2])).unwrap_err();
        assert!(err.is_input_error());

        let err = search.optimize(&Demand::zeros(2)).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_sweep_bound_stops_early() {
        let (catalog, params) = setup(60);
        let config = SearchConfig::new().with_parallel(false).with_max_sweeps(1);
        let search = LocalSearch::new(&params, &catalog, config);

        let climb = search.hill_climb(vec![0, 1, 0]);
        assert_eq!(climb.sweeps, 1);
        assert_eq!(climb.cost, 100);
        assert!(!climb.converged);
    }

    #[test]
    fn test_degenerate_residuals() {
        let (catalog, params) = setup(60);
        let search = LocalSearch::new(&params, &catalog, SearchConfig::new().with_seed(1));

        let empty = search.optimize(&Demand::zeros(2)).unwrap();
        assert!(empty.sequence.is_empty());
        assert_eq!(empty.cost, 0);
        assert_eq!(empty.best_restart, None);

        let single = search.optimize(&Demand::new(vec![0, 1])).unwrap();
        assert_eq!(single.sequence, vec![1]);
        assert_eq!(single.cost, 0);
        assert!(single.restarts.is_empty());
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let catalog = Catalog::new(vec![
            AxleType::new("A", 300, 7),
            AxleType::new("B", 450, 5),
            AxleType::new("C", 120, 9),
        ]);
        let params = MachineParameters::new(1000, 5).with_waste_discard_threshold(200);
        let config = SearchConfig::new().with_seed(42).with_restarts(4);

        let parallel = LocalSearch::new(&params, &catalog, config.clone())
            .optimize(&catalog.demand())
            .unwrap();
        let serial = LocalSearch::new(&params, &catalog, config.with_parallel(false))
            .optimize(&catalog.demand())
            .unwrap();

        assert_eq!(parallel.sequence, serial.sequence);
        assert_eq!(parallel.cost, serial.cost);
        assert_eq!(parallel.best_restart, serial.best_restart);
        assert_eq!(parallel.run_seed, 42);
        assert_eq!(parallel.restarts.len(), 4);
        assert_eq!(
            Demand::from_pieces(&parallel.sequence, 3),
            catalog.demand()
        );
        for outcome in &parallel.restarts {
            assert!(outcome.cost <= outcome.initial_cost);
            assert!(parallel.cost <= outcome.cost);
        }
    }

    #[test]
    fn test_restart_seeds_differ() {
        assert_ne!(restart_seed(7, 0), restart_seed(7, 1));
        assert_eq!(restart_seed(7, 3), restart_seed(7, 3));
    }
}
