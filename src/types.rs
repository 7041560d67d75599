//! Type-safe wrappers for state identifiers and model classes.
//!
//! [`StateId`] keeps dense state indices apart from row indices and matrix
//! offsets, which are plain `usize` values throughout the crate.
use std::fmt;

/// A dense, zero-based state identifier.
///
/// Identifiers are handed out once, at first discovery, in discovery order.
/// After a build they denote the *final* numbering, i.e. the index of the
/// state's row group in the transition matrix.
///
/// # Invariants
///
/// - Identifiers are contiguous: a registry with `n` states uses exactly `0..n`.
/// - An identifier is never reused for a different state.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StateId(u32);

impl StateId {
    /// Largest number of states a single build can address.
    pub const MAX_STATES: usize = u32::MAX as usize;

    /// Creates a new identifier from a raw index.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit into the identifier space.
    pub fn new(index: usize) -> Self {
        assert!(index < Self::MAX_STATES, "State index {} is out of range", index);
        StateId(index as u32)
    }

    /// Returns the identifier as a `usize` index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw identifier.
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl From<StateId> for usize {
    fn from(id: StateId) -> Self {
        id.index()
    }
}

/// The class of model produced by a generator.
///
/// The model class decides how matrix values are read (probabilities or
/// rates) and how many choices a state may carry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ModelType {
    /// Discrete-time Markov chain: one probabilistic choice per state.
    Dtmc,
    /// Continuous-time Markov chain: one rate choice per state.
    Ctmc,
    /// Markov decision process: one or more probabilistic choices per state.
    Mdp,
    /// Markov automaton: probabilistic choices plus at most one Markovian (rate) choice.
    Ma,
}

impl ModelType {
    /// Returns true if every state carries exactly one choice.
    pub fn is_deterministic(self) -> bool {
        matches!(self, ModelType::Dtmc | ModelType::Ctmc)
    }

    /// Returns true if the model mixes Markovian and probabilistic choices.
    pub fn is_hybrid(self) -> bool {
        self == ModelType::Ma
    }

    /// Returns true if a choice's values are rates rather than probabilities.
    pub fn is_rate_choice(self, markovian: bool) -> bool {
        match self {
            ModelType::Ctmc => true,
            ModelType::Ma => markovian,
            ModelType::Dtmc | ModelType::Mdp => false,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelType::Dtmc => "DTMC",
            ModelType::Ctmc => "CTMC",
            ModelType::Mdp => "MDP",
            ModelType::Ma => "MA",
        };
        write!(f, "{}", name)
    }
}
