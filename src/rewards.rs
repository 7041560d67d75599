//! Reward models and their builders.
//!
//! A [`RewardModelBuilder`] runs alongside the matrix builder: it receives one
//! state reward per expanded state and one state-action reward per choice, in
//! the same order in which row groups and rows are appended. Vectors therefore
//! line up with the final numbering by construction.

use crate::generator::RewardModelInfo;

/// Per-state and per-choice reward values of one named reward model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardModel {
    /// One value per state, indexed by final state id.
    pub state_rewards: Option<Vec<f64>>,
    /// One value per matrix row.
    pub state_action_rewards: Option<Vec<f64>>,
}

impl RewardModel {
    pub fn has_state_rewards(&self) -> bool {
        self.state_rewards.is_some()
    }

    pub fn has_state_action_rewards(&self) -> bool {
        self.state_action_rewards.is_some()
    }

    /// Returns true if the model carries no values at all.
    pub fn is_empty(&self) -> bool {
        self.state_rewards.is_none() && self.state_action_rewards.is_none()
    }

    /// Returns the reward of a state, or zero if the model has no state rewards.
    pub fn state_reward(&self, state: usize) -> f64 {
        self.state_rewards.as_ref().map_or(0.0, |r| r[state])
    }

    /// Returns the reward of a matrix row, or zero if the model has no state-action rewards.
    pub fn state_action_reward(&self, row: usize) -> f64 {
        self.state_action_rewards.as_ref().map_or(0.0, |r| r[row])
    }

    /// Reorders the state-action rewards. Row `i` of the result is `sources[i]`,
    /// where every source row is summed into the new one.
    pub(crate) fn reorder_rows(&mut self, sources: &[Vec<usize>]) {
        if let Some(rewards) = self.state_action_rewards.as_mut() {
            *rewards = sources
                .iter()
                .map(|rows| rows.iter().map(|&r| rewards[r]).sum())
                .collect();
        }
    }
}

/// Accumulates the values of one reward model during exploration.
#[derive(Debug, Clone)]
pub struct RewardModelBuilder {
    name: String,
    /// Index of the model in the generator's declaration list.
    index: usize,
    state_rewards: Option<Vec<f64>>,
    state_action_rewards: Option<Vec<f64>>,
}

impl RewardModelBuilder {
    /// Creates a builder for the model declared at `index` by the generator.
    pub fn new(index: usize, info: &RewardModelInfo) -> Self {
        Self {
            name: info.name.clone(),
            index,
            state_rewards: info.has_state_rewards.then(Vec::new),
            state_action_rewards: info.has_state_action_rewards.then(Vec::new),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the model in the generator's reward vectors.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn has_state_rewards(&self) -> bool {
        self.state_rewards.is_some()
    }

    pub fn has_state_action_rewards(&self) -> bool {
        self.state_action_rewards.is_some()
    }

    /// Records the reward of the next state. Ignored if the model has no state rewards.
    pub fn add_state_reward(&mut self, value: f64) {
        if let Some(rewards) = self.state_rewards.as_mut() {
            rewards.push(value);
        }
    }

    /// Records the reward of the next choice. Ignored if the model has no state-action rewards.
    pub fn add_state_action_reward(&mut self, value: f64) {
        if let Some(rewards) = self.state_action_rewards.as_mut() {
            rewards.push(value);
        }
    }

    /// Freezes the builder, checking the vectors against the model dimensions.
    ///
    /// # Panics
    ///
    /// Panics if a vector does not have one value per state or per row.
    pub fn build(self, state_count: usize, row_count: usize) -> (String, RewardModel) {
        if let Some(rewards) = &self.state_rewards {
            assert_eq!(rewards.len(), state_count, "State rewards of '{}' misaligned", self.name);
        }
        if let Some(rewards) = &self.state_action_rewards {
            assert_eq!(rewards.len(), row_count, "State-action rewards of '{}' misaligned", self.name);
        }
        (
            self.name,
            RewardModel {
                state_rewards: self.state_rewards,
                state_action_rewards: self.state_action_rewards,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_in_order() {
        let info = RewardModelInfo::new("cost", true, true);
        let mut builder = RewardModelBuilder::new(2, &info);
        assert_eq!(builder.index(), 2);
        builder.add_state_reward(1.0);
        builder.add_state_action_reward(0.5);
        builder.add_state_action_reward(0.25);
        builder.add_state_reward(2.0);
        builder.add_state_action_reward(0.0);

        let (name, model) = builder.build(2, 3);
        assert_eq!(name, "cost");
        assert_eq!(model.state_rewards, Some(vec![1.0, 2.0]));
        assert_eq!(model.state_action_rewards, Some(vec![0.5, 0.25, 0.0]));
        assert_eq!(model.state_reward(1), 2.0);
        assert_eq!(model.state_action_reward(1), 0.25);
    }

    #[test]
    fn test_absent_vectors_ignore_values() {
        let info = RewardModelInfo::new("", true, false);
        let mut builder = RewardModelBuilder::new(0, &info);
        builder.add_state_reward(3.0);
        builder.add_state_action_reward(9.0);
        let (_, model) = builder.build(1, 1);
        assert!(model.has_state_rewards());
        assert!(!model.has_state_action_rewards());
        assert_eq!(model.state_action_reward(0), 0.0);
    }

    #[test]
    #[should_panic(expected = "misaligned")]
    fn test_misaligned_state_rewards() {
        let info = RewardModelInfo::new("r", true, false);
        let builder = RewardModelBuilder::new(0, &info);
        builder.build(1, 1);
    }

    #[test]
    fn test_reorder_rows_sums_sources() {
        let mut model = RewardModel {
            state_rewards: None,
            state_action_rewards: Some(vec![1.0, 2.0, 4.0]),
        };
        model.reorder_rows(&[vec![2], vec![0, 1]]);
        assert_eq!(model.state_action_rewards, Some(vec![4.0, 3.0]));
    }
}
