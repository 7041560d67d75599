//! Error taxonomy of a model build.
//!
//! Every error is fatal to the build that raised it: [`ExplicitModelBuilder::build`][crate::builder::ExplicitModelBuilder::build]
//! never returns a partial model. Variants carry the offending state,
//! reward model or counters so a failure can be diagnosed without a rerun.

use thiserror::Error;

use crate::types::StateId;

/// Coarse classification of a [`BuildError`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Configuration,
    Generator,
    ModelingInconsistency,
    ResourceExhaustion,
    NoInitialStates,
    Aborted,
}

/// Invalid builder options, detected before exploration starts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("unknown reward model '{name}'")]
    UnknownRewardModel { name: String },
    #[error("reward model '{name}' is declared more than once")]
    DuplicateRewardModel { name: String },
    #[error("label '{name}' is declared more than once")]
    DuplicateLabel { name: String },
    #[error("tolerance must be a positive finite number, got {tolerance}")]
    InvalidTolerance { tolerance: f64 },
}

/// Failure raised by a next-state generator, or a deadlock rejected by policy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("deadlock: state has no outgoing transitions")]
    Deadlock,
    #[error("value {value} of variable '{variable}' does not fit its encoding")]
    EncodingOverflow { variable: String, value: i64 },
    #[error("label id {label} is not declared by the generator")]
    UnknownLabel { label: usize },
    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },
    #[error("unsupported construct: {0}")]
    Unsupported(String),
}

/// The explored model violates a semantic rule of its model class.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelingInconsistency {
    #[error("state {state} has {count} Markovian choices, at most one is allowed")]
    MultipleMarkovianChoices { state: StateId, count: usize },
    #[error("choice {choice} of state {state} has probabilities summing to {sum}")]
    ProbabilitiesNotWellFormed { state: StateId, choice: usize, sum: f64 },
    #[error("choice {choice} of state {state} carries invalid value {value}")]
    InvalidValue { state: StateId, choice: usize, value: f64 },
    #[error("state {state} has {count} choices in a deterministic model")]
    MultipleChoicesInDeterministicModel { state: StateId, count: usize },
}

/// A configured resource cap was exceeded during exploration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceExhaustion {
    #[error("number of states exceeds the limit of {limit}")]
    TooManyStates { limit: usize },
    #[error("number of matrix entries exceeds the limit of {limit}")]
    TooManyEntries { limit: usize },
}

/// Error returned by a model build.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("the generator reported no initial states")]
    NoInitialStates,
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("generator error{}: {source}", .state.map(|s| format!(" in state {}", s)).unwrap_or_default())]
    Generator {
        state: Option<StateId>,
        #[source]
        source: GeneratorError,
    },
    #[error("modeling inconsistency: {0}")]
    Inconsistency(#[from] ModelingInconsistency),
    #[error("resource exhausted after {explored} expanded states: {cause}")]
    ResourceExhausted {
        explored: usize,
        #[source]
        cause: ResourceExhaustion,
    },
    #[error("exploration aborted after {explored} expanded states")]
    Aborted { explored: usize },
}

impl BuildError {
    /// Wraps a generator error raised while handling `state`.
    pub fn generator(state: Option<StateId>, source: GeneratorError) -> Self {
        BuildError::Generator { state, source }
    }

    /// Returns the taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::NoInitialStates => ErrorKind::NoInitialStates,
            BuildError::Configuration(_) => ErrorKind::Configuration,
            BuildError::Generator { .. } => ErrorKind::Generator,
            BuildError::Inconsistency(_) => ErrorKind::ModelingInconsistency,
            BuildError::ResourceExhausted { .. } => ErrorKind::ResourceExhaustion,
            BuildError::Aborted { .. } => ErrorKind::Aborted,
        }
    }
}
