//! The next-state generator interface.
//!
//! A generator is the builder's only view of the model: it yields the initial
//! states, expands a state into its choices, and decodes encodings back into
//! variable valuations. Front-ends for concrete modeling languages implement
//! [`NextStateGenerator`]; the builder never inspects a state beyond hashing
//! and comparing its encoding.

use crate::error::GeneratorError;
use crate::state::{CompressedState, Valuation};
use crate::types::ModelType;

/// Declaration of a reward model offered by a generator.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RewardModelInfo {
    /// Name of the reward model; the empty string denotes the default model.
    pub name: String,
    pub has_state_rewards: bool,
    pub has_state_action_rewards: bool,
}

impl RewardModelInfo {
    pub fn new(name: impl Into<String>, has_state_rewards: bool, has_state_action_rewards: bool) -> Self {
        Self {
            name: name.into(),
            has_state_rewards,
            has_state_action_rewards,
        }
    }
}

/// One outgoing alternative of a state.
///
/// Successors are kept in insertion order; adding the same successor twice
/// accumulates its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Choice {
    successors: Vec<(CompressedState, f64)>,
    /// Opaque choice label ids, carried through to the choice labeling.
    pub labels: Vec<usize>,
    /// True if the choice is governed by rates (only meaningful for Markov automata).
    pub markovian: bool,
    /// One value per reward model declared by the generator; missing values count as zero.
    pub rewards: Vec<f64>,
}

impl Choice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty Markovian choice.
    pub fn markovian() -> Self {
        Self {
            markovian: true,
            ..Self::default()
        }
    }

    /// Adds probability or rate mass towards a successor.
    pub fn add(&mut self, successor: CompressedState, value: f64) {
        match self.successors.iter_mut().find(|(s, _)| *s == successor) {
            Some((_, v)) => *v += value,
            None => self.successors.push((successor, value)),
        }
    }

    pub fn with_successor(mut self, successor: CompressedState, value: f64) -> Self {
        self.add(successor, value);
        self
    }

    pub fn with_label(mut self, label: usize) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_rewards(mut self, rewards: impl Into<Vec<f64>>) -> Self {
        self.rewards = rewards.into();
        self
    }

    pub fn successors(&self) -> &[(CompressedState, f64)] {
        &self.successors
    }

    pub fn into_successors(self) -> Vec<(CompressedState, f64)> {
        self.successors
    }

    /// Returns true if the choice has no successor (a deadlock).
    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    /// Returns the total probability or rate mass of the choice.
    pub fn total_mass(&self) -> f64 {
        self.successors.iter().map(|(_, v)| v).sum()
    }

    /// Returns the reward for the given reward model index.
    pub fn reward(&self, model: usize) -> f64 {
        self.rewards.get(model).copied().unwrap_or(0.0)
    }
}

/// Everything a generator reports about one expanded state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateBehavior {
    pub choices: Vec<Choice>,
    /// One value per reward model declared by the generator; missing values count as zero.
    pub state_rewards: Vec<f64>,
    /// Ids of the atomic propositions holding in the state.
    pub labels: Vec<usize>,
}

impl StateBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn with_label(mut self, label: usize) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_state_rewards(mut self, rewards: impl Into<Vec<f64>>) -> Self {
        self.state_rewards = rewards.into();
        self
    }

    /// Returns the state reward for the given reward model index.
    pub fn state_reward(&self, model: usize) -> f64 {
        self.state_rewards.get(model).copied().unwrap_or(0.0)
    }
}

/// State-expansion capability consumed by the builder.
///
/// `expand` must be a pure function of the state: the builder may call it
/// from several threads at once (see
/// [`build_parallel`][crate::builder::ExplicitModelBuilder::build_parallel])
/// and relies on identical answers for identical encodings.
pub trait NextStateGenerator {
    /// Returns the class of the generated model.
    fn model_type(&self) -> ModelType;

    /// Returns the initial states. An empty result fails the build.
    fn initial_states(&self) -> Result<Vec<CompressedState>, GeneratorError>;

    /// Computes the choices, rewards and labels of a state.
    fn expand(&self, state: &CompressedState) -> Result<StateBehavior, GeneratorError>;

    /// Decodes a state into its full variable valuation.
    fn decode(&self, state: &CompressedState) -> Result<Valuation, GeneratorError>;

    /// Names of the atomic propositions, indexed by label id.
    fn label_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Reward models, indexed as in [`Choice::rewards`] and [`StateBehavior::state_rewards`].
    fn reward_models(&self) -> Vec<RewardModelInfo> {
        Vec::new()
    }
}

impl<G> NextStateGenerator for &G
where
    G: NextStateGenerator + ?Sized,
{
    fn model_type(&self) -> ModelType {
        (**self).model_type()
    }
    fn initial_states(&self) -> Result<Vec<CompressedState>, GeneratorError> {
        (**self).initial_states()
    }
    fn expand(&self, state: &CompressedState) -> Result<StateBehavior, GeneratorError> {
        (**self).expand(state)
    }
    fn decode(&self, state: &CompressedState) -> Result<Valuation, GeneratorError> {
        (**self).decode(state)
    }
    fn label_names(&self) -> Vec<String> {
        (**self).label_names()
    }
    fn reward_models(&self) -> Vec<RewardModelInfo> {
        (**self).reward_models()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_accumulates_duplicates() {
        let a = CompressedState::from_u64(1);
        let b = CompressedState::from_u64(2);
        let choice = Choice::new()
            .with_successor(a.clone(), 0.25)
            .with_successor(b.clone(), 0.5)
            .with_successor(a.clone(), 0.25);
        assert_eq!(choice.successors(), &[(a, 0.5), (b, 0.5)]);
        assert_eq!(choice.total_mass(), 1.0);
        assert!(!choice.markovian);
    }

    #[test]
    fn test_missing_rewards_are_zero() {
        let choice = Choice::markovian().with_rewards([2.0]);
        assert!(choice.markovian);
        assert!(choice.is_empty());
        assert_eq!(choice.reward(0), 2.0);
        assert_eq!(choice.reward(1), 0.0);

        let behavior = StateBehavior::new().with_state_rewards(vec![1.5]);
        assert_eq!(behavior.state_reward(0), 1.5);
        assert_eq!(behavior.state_reward(3), 0.0);
    }
}
