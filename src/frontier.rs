//! Exploration orders.
//!
//! A [`Frontier`] holds the ids of discovered but not yet expanded states.
//! The builder only relies on "discover before expand": every id is pushed
//! exactly once, right after registration, and popped exactly once.
//!
//! | Frontier | Order | Remap needed |
//! |----------|-------|--------------|
//! | [`FifoFrontier`] | breadth-first | no |
//! | [`LifoFrontier`] | depth-first | yes |
//! | [`PriorityFrontier`] | lowest penalty first | yes |

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use crate::state::CompressedState;
use crate::types::StateId;

/// Capability interface for the set of states awaiting expansion.
pub trait Frontier {
    /// Adds a freshly registered state.
    ///
    /// The encoding is lent for heuristics; the frontier must not keep it.
    fn push(&mut self, id: StateId, state: &CompressedState);

    /// Removes the next state to expand.
    fn pop(&mut self) -> Option<StateId>;

    /// Returns the number of pending states.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if states may be expanded in a different order than they
    /// were discovered, so the final numbering differs from the discovery one.
    fn requires_remap(&self) -> bool {
        true
    }
}

/// Built-in exploration orders.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum ExplorationOrder {
    #[default]
    BreadthFirst,
    DepthFirst,
}

impl ExplorationOrder {
    /// Creates an empty frontier implementing this order.
    pub fn frontier(self) -> Box<dyn Frontier> {
        match self {
            ExplorationOrder::BreadthFirst => Box::new(FifoFrontier::default()),
            ExplorationOrder::DepthFirst => Box::new(LifoFrontier::default()),
        }
    }
}

impl std::str::FromStr for ExplorationOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" | "breadth-first" => Ok(ExplorationOrder::BreadthFirst),
            "dfs" | "depth-first" => Ok(ExplorationOrder::DepthFirst),
            other => Err(format!("unknown exploration order '{}'", other)),
        }
    }
}

/// Breadth-first frontier. Expansion order equals discovery order.
#[derive(Debug, Default)]
pub struct FifoFrontier {
    queue: VecDeque<StateId>,
}

impl Frontier for FifoFrontier {
    fn push(&mut self, id: StateId, _state: &CompressedState) {
        self.queue.push_back(id);
    }

    fn pop(&mut self) -> Option<StateId> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn requires_remap(&self) -> bool {
        false
    }
}

/// Depth-first frontier.
#[derive(Debug, Default)]
pub struct LifoFrontier {
    stack: Vec<StateId>,
}

impl Frontier for LifoFrontier {
    fn push(&mut self, id: StateId, _state: &CompressedState) {
        self.stack.push(id);
    }

    fn pop(&mut self) -> Option<StateId> {
        self.stack.pop()
    }

    fn len(&self) -> usize {
        self.stack.len()
    }
}

/// Heuristic frontier expanding the state with the lowest penalty first.
///
/// Penalties are computed once, when a state is pushed. Ties are broken by
/// the smaller id, which keeps the order deterministic.
pub struct PriorityFrontier<F> {
    heap: BinaryHeap<Reverse<(u64, StateId)>>,
    penalty: F,
}

impl<F> PriorityFrontier<F>
where
    F: FnMut(&CompressedState) -> u64,
{
    pub fn new(penalty: F) -> Self {
        Self {
            heap: BinaryHeap::new(),
            penalty,
        }
    }
}

impl<F> Frontier for PriorityFrontier<F>
where
    F: FnMut(&CompressedState) -> u64,
{
    fn push(&mut self, id: StateId, state: &CompressedState) {
        let penalty = (self.penalty)(state);
        self.heap.push(Reverse((penalty, id)));
    }

    fn pop(&mut self) -> Option<StateId> {
        self.heap.pop().map(|Reverse((_, id))| id)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(frontier: &mut dyn Frontier) -> Vec<usize> {
        std::iter::from_fn(|| frontier.pop()).map(|id| id.index()).collect()
    }

    fn fill(frontier: &mut dyn Frontier, values: &[u64]) {
        for (i, &v) in values.iter().enumerate() {
            frontier.push(StateId::new(i), &CompressedState::from_u64(v));
        }
    }

    #[test]
    fn test_fifo() {
        let mut f = FifoFrontier::default();
        fill(&mut f, &[0, 0, 0]);
        assert_eq!(f.len(), 3);
        assert!(!f.requires_remap());
        assert_eq!(drain(&mut f), vec![0, 1, 2]);
        assert!(f.is_empty());
    }

    #[test]
    fn test_lifo() {
        let mut f = LifoFrontier::default();
        fill(&mut f, &[0, 0, 0]);
        assert!(f.requires_remap());
        assert_eq!(drain(&mut f), vec![2, 1, 0]);
    }

    #[test]
    fn test_priority_ties_by_id() {
        let mut f = PriorityFrontier::new(|s: &CompressedState| s.as_words()[0]);
        fill(&mut f, &[5, 1, 5, 0]);
        assert_eq!(drain(&mut f), vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_order_parsing() {
        assert_eq!("bfs".parse::<ExplorationOrder>(), Ok(ExplorationOrder::BreadthFirst));
        assert_eq!("Depth-First".parse::<ExplorationOrder>(), Ok(ExplorationOrder::DepthFirst));
        assert!("random".parse::<ExplorationOrder>().is_err());
    }

    #[test]
    fn test_order_frontier() {
        assert!(!ExplorationOrder::BreadthFirst.frontier().requires_remap());
        assert!(ExplorationOrder::DepthFirst.frontier().requires_remap());
    }
}
