//! Sequence cost model
//!
//! Pieces are cut in order onto bars. A piece that does not fit the current
//! remainder closes the bar and opens a fresh one. The cost of a sequence is
//! the full length of every closed bar plus the scrap charge of the final
//! remainder.
//!
//! The secondary score is the overlap score: for every type present, the
//! squared distance between its first and last position. Lower values mean
//! pieces of the same type sit closer together.

use axlekit_core::{Catalog, EngineError, MachineParameters, TypeIndex};
use std::collections::HashMap;

/// Running state of the bar simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarState {
    /// Length of bars already closed
    pub charged: u64,
    /// Length left on the open bar
    pub remainder: u64,
}

/// Precomputed lengths for evaluating many sequences of one catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostModel {
    adjusted: Vec<u64>,
    bar_length: u64,
    params: MachineParameters,
}

impl CostModel {
    pub fn new(params: &MachineParameters, catalog: &Catalog) -> Self {
        Self {
            adjusted: catalog
                .iter()
                .map(|axle| params.adjusted_length(axle.unit_length))
                .collect(),
            bar_length: u64::from(params.bar_length),
            params: *params,
        }
    }

    pub fn params(&self) -> &MachineParameters {
        &self.params
    }

    pub fn bar_length(&self) -> u64 {
        self.bar_length
    }

    /// Number of types the model knows
    pub fn types(&self) -> usize {
        self.adjusted.len()
    }

    /// Length one piece of `index` takes, cut included
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the catalog.
    pub fn adjusted_length(&self, index: TypeIndex) -> u64 {
        self.adjusted[index]
    }

    /// Fail if any piece refers to a type outside the catalog
    pub fn check_sequence(&self, sequence: &[TypeIndex]) -> Result<(), EngineError> {
        match sequence.iter().find(|&&i| i >= self.adjusted.len()) {
            Some(&index) => Err(EngineError::TypeIndexOutOfRange {
                index,
                len: self.adjusted.len(),
            }),
            None => Ok(()),
        }
    }

    /// State before the first piece
    pub fn start(&self) -> BarState {
        BarState {
            charged: 0,
            remainder: self.bar_length,
        }
    }

    /// Place one piece
    pub fn place(&self, state: BarState, index: TypeIndex) -> BarState {
        let adj = self.adjusted[index];
        if state.remainder >= adj {
            BarState {
                charged: state.charged,
                remainder: state.remainder - adj,
            }
        } else {
            BarState {
                charged: state.charged + self.bar_length,
                remainder: self.bar_length.saturating_sub(adj),
            }
        }
    }

    /// Close the simulation
    pub fn finish(&self, state: BarState) -> u64 {
        state.charged + self.params.scrap(state.remainder)
    }

    /// Cost of a whole sequence, zero when empty
    pub fn total_cost(&self, sequence: &[TypeIndex]) -> u64 {
        if sequence.is_empty() {
            return 0;
        }
        let end = sequence
            .iter()
            .fold(self.start(), |state, &index| self.place(state, index));
        self.finish(end)
    }

    /// State before each position, plus the state after the last piece
    pub fn prefix_states(&self, sequence: &[TypeIndex]) -> Vec<BarState> {
        let mut states = Vec::with_capacity(sequence.len() + 1);
        let mut state = self.start();
        states.push(state);
        for &index in sequence {
            state = self.place(state, index);
            states.push(state);
        }
        states
    }

    /// Cost of `sequence` with positions `a < b` swapped
    ///
    /// Resumes the simulation from `prefix[a]` instead of replaying the
    /// untouched prefix. `prefix` must come from [`Self::prefix_states`]
    /// for the same sequence.
    pub fn swap_cost(
        &self,
        sequence: &[TypeIndex],
        prefix: &[BarState],
        a: usize,
        b: usize,
    ) -> u64 {
        let mut state = prefix[a];
        for (position, &index) in sequence.iter().enumerate().skip(a) {
            let piece = if position == a {
                sequence[b]
            } else if position == b {
                sequence[a]
            } else {
                index
            };
            state = self.place(state, piece);
        }
        self.finish(state)
    }
}

/// Cost of a sequence for a catalog and machine
pub fn total_cost(sequence: &[TypeIndex], params: &MachineParameters, catalog: &Catalog) -> u64 {
    CostModel::new(params, catalog).total_cost(sequence)
}

/// Sum over present types of (last position - first position) squared
pub fn overlap_score(sequence: &[TypeIndex]) -> u64 {
    let mut spans: HashMap<TypeIndex, (usize, usize)> = HashMap::new();
    for (position, &index) in sequence.iter().enumerate() {
        spans
            .entry(index)
            .and_modify(|span| span.1 = position)
            .or_insert((position, position));
    }

    spans
        .values()
        .map(|&(first, last)| {
            let distance = (last - first) as u64;
            distance * distance
        })
        .sum()
}

/// Number of maximal runs of equal adjacent types
pub fn run_count(sequence: &[TypeIndex]) -> usize {
    match sequence.first() {
        None => 0,
        Some(_) => 1 + sequence.windows(2).filter(|w| w[0] != w[1]).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axlekit_core::AxleType;

    const A: usize = 0;
    const B: usize = 1;

    fn model(threshold: u32) -> CostModel {
        let catalog = Catalog::new(vec![AxleType::new("A", 45, 2), AxleType::new("B", 20, 1)]);
        let params = MachineParameters::new(100, 5).with_waste_discard_threshold(threshold);
        CostModel::new(&params, &catalog)
    }

    #[test]
    fn test_offcut_costs_nothing() {
        let m = model(30);
        assert_eq!(m.total_cost(&[A, A, B]), 100);
        assert_eq!(m.total_cost(&[A, B, A]), 100);
        assert_eq!(m.total_cost(&[B, A, A]), 100);
    }

    #[test]
    fn test_scrap_is_charged() {
        let m = model(60);
        assert_eq!(m.total_cost(&[A, A, B]), 100);
        assert_eq!(m.total_cost(&[A, B, A]), 150);
        assert_eq!(m.total_cost(&[B, A, A]), 150);
    }

    #[test]
    fn test_empty_sequence_is_free() {
        assert_eq!(model(60).total_cost(&[]), 0);
    }

    #[test]
    fn test_exact_fit_leaves_nothing() {
        let m = model(60);
        assert_eq!(m.total_cost(&[A, A]), 0);
    }

    #[test]
    fn test_swap_cost_matches_full_evaluation() {
        let m = model(60);
        let sequence = vec![B, A, B, A, A, B, A];
        let prefix = m.prefix_states(&sequence);

        for a in 0..sequence.len() {
            for b in a + 1..sequence.len() {
                let mut swapped = sequence.clone();
                swapped.swap(a, b);
                assert_eq!(
                    m.swap_cost(&sequence, &prefix, a, b),
                    m.total_cost(&swapped),
                    "swap {a} <-> {b}"
                );
            }
        }
    }

    #[test]
    fn test_check_sequence() {
        let m = model(60);
        assert!(m.check_sequence(&[A, B]).is_ok());
        assert_eq!(
            m.check_sequence(&[A, 7]),
            Err(EngineError::TypeIndexOutOfRange { index: 7, len: 2 })
        );
    }

    #[test]
    fn test_overlap_score() {
        assert_eq!(overlap_score(&[]), 0);
        assert_eq!(overlap_score(&[A, B, A]), 4);
        assert_eq!(overlap_score(&[A, A, B]), 1);
        assert_eq!(overlap_score(&[A, B, B, A]), 9 + 1);
    }

    #[test]
    fn test_run_count() {
        let seq: Vec<usize> = "AAAAAABBBABBB"
            .chars()
            .map(|c| if c == 'A' { A } else { B })
            .collect();
        assert_eq!(run_count(&seq), 4);
        assert_eq!(run_count(&[]), 0);
        assert_eq!(run_count(&[B]), 1);
    }
}
