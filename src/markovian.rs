//! Markovian-state normalization for Markov automata.
//!
//! A state of a Markov automaton may mix probabilistic choices with at most
//! one Markovian (rate) choice. After exploration the normalizer
//!
//! 1. checks that no state has more than one Markovian choice (or merges them,
//!    see [`MarkovianPolicy::Merge`]),
//! 2. moves the Markovian choice to the front of its row group,
//! 3. emits a bit vector over states, set iff the state has a Markovian choice.
//!
//! Per-row data (state-action rewards, choice labels) is reordered with the
//! same row permutation.

use std::collections::BTreeMap;

use log::debug;

use crate::bitvector::BitVector;
use crate::error::ModelingInconsistency;
use crate::labeling::ChoiceLabeling;
use crate::matrix::{SparseMatrix, SparseMatrixBuilder};
use crate::rewards::RewardModel;
use crate::types::StateId;

/// What to do with a state carrying several Markovian choices.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum MarkovianPolicy {
    /// Fail with [`ModelingInconsistency::MultipleMarkovianChoices`].
    #[default]
    Fail,
    /// Fold them into one choice: rates per successor, state-action rewards
    /// and choice labels are summed (resp. united).
    Merge,
}

/// Result of a normalization.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub matrix: SparseMatrix,
    pub markovian_states: BitVector,
    /// Source rows of every new row, in new row order.
    pub row_sources: Vec<Vec<usize>>,
}

/// New row layout: per new row, the old rows it is built from.
struct RowPlan {
    row_sources: Vec<Vec<usize>>,
    /// Start of every new row group in `row_sources`, plus the total.
    group_starts: Vec<usize>,
    markovian_states: BitVector,
}

/// Computes the new row order of every row group.
fn plan_rows(
    matrix: &SparseMatrix,
    markovian_choices: &BitVector,
    policy: MarkovianPolicy,
) -> Result<RowPlan, ModelingInconsistency> {
    let mut row_sources = Vec::with_capacity(matrix.row_count());
    let mut group_starts = Vec::with_capacity(matrix.row_group_count() + 1);
    let mut markovian_states = BitVector::new(matrix.row_group_count());

    for group in 0..matrix.row_group_count() {
        group_starts.push(row_sources.len());
        let rows = matrix.row_group(group);
        let (markovian, other): (Vec<usize>, Vec<usize>) = rows.partition(|&r| markovian_choices.get(r));

        if markovian.len() > 1 && policy == MarkovianPolicy::Fail {
            return Err(ModelingInconsistency::MultipleMarkovianChoices {
                state: StateId::new(group),
                count: markovian.len(),
            });
        }

        if !markovian.is_empty() {
            if markovian.len() > 1 {
                debug!("merging {} Markovian choices of state {}", markovian.len(), group);
            }
            markovian_states.set(group, true);
            row_sources.push(markovian);
        }
        row_sources.extend(other.into_iter().map(|r| vec![r]));
    }
    group_starts.push(row_sources.len());

    Ok(RowPlan {
        row_sources,
        group_starts,
        markovian_states,
    })
}

/// Normalizes the Markovian choices of a Markov automaton.
///
/// `markovian_choices` has one bit per row of `matrix`. Reward models and the
/// optional choice labeling are reordered in place to match the new rows.
pub fn normalize(
    matrix: &SparseMatrix,
    markovian_choices: &BitVector,
    reward_models: &mut BTreeMap<String, RewardModel>,
    choice_labeling: Option<&mut ChoiceLabeling>,
    policy: MarkovianPolicy,
) -> Result<Normalized, ModelingInconsistency> {
    assert_eq!(markovian_choices.len(), matrix.row_count(), "Markovian choices misaligned");

    let RowPlan {
        row_sources,
        group_starts,
        markovian_states,
    } = plan_rows(matrix, markovian_choices, policy)?;
    debug!(
        "normalize: {} Markovian states, {} -> {} rows",
        markovian_states.count_ones(),
        matrix.row_count(),
        row_sources.len()
    );

    let mut builder = SparseMatrixBuilder::new();
    for bounds in group_starts.windows(2) {
        builder.new_row_group();
        for sources in &row_sources[bounds[0]..bounds[1]] {
            builder.add_row(sources.iter().flat_map(|&r| matrix.row(r)));
        }
    }
    let normalized = builder.build(Some(matrix.column_count()));

    for model in reward_models.values_mut() {
        model.reorder_rows(&row_sources);
    }
    if let Some(labeling) = choice_labeling {
        labeling.reorder_rows(&row_sources);
    }

    Ok(Normalized {
        matrix: normalized,
        markovian_states,
        row_sources,
    })
}
