#![allow(dead_code)]

use std::collections::BTreeMap;

use explicit_rs::builder::ModelComponents;
use explicit_rs::error::GeneratorError;
use explicit_rs::generator::{Choice, NextStateGenerator, RewardModelInfo, StateBehavior};
use explicit_rs::state::{CompressedState, Valuation, Value, VariableInformation};
use explicit_rs::types::{ModelType, StateId};

/// Encodes a graph node.
pub fn node(n: u64) -> CompressedState {
    CompressedState::from_u64(n)
}

/// Builds a choice from `(target node, value)` pairs.
pub fn to(successors: &[(u64, f64)]) -> Choice {
    successors
        .iter()
        .fold(Choice::new(), |choice, &(target, value)| choice.with_successor(node(target), value))
}

/// Like [`to`], for a Markovian choice.
pub fn rate(successors: &[(u64, f64)]) -> Choice {
    let mut choice = to(successors);
    choice.markovian = true;
    choice
}

/// Explicitly listed model: nodes are numbers, unlisted nodes have no choices.
#[derive(Debug, Clone)]
pub struct Graph {
    pub model_type: ModelType,
    pub initial: Vec<u64>,
    pub nodes: BTreeMap<u64, StateBehavior>,
    pub labels: Vec<String>,
    pub reward_models: Vec<RewardModelInfo>,
    /// Nodes whose expansion fails.
    pub broken: Vec<u64>,
}

impl Graph {
    pub fn new(model_type: ModelType, initial: impl IntoIterator<Item = u64>) -> Self {
        Self {
            model_type,
            initial: initial.into_iter().collect(),
            nodes: BTreeMap::new(),
            labels: Vec::new(),
            reward_models: Vec::new(),
            broken: Vec::new(),
        }
    }

    pub fn choice(mut self, from: u64, choice: Choice) -> Self {
        self.nodes.entry(from).or_default().choices.push(choice);
        self
    }

    pub fn label(mut self, at: u64, name: &str) -> Self {
        let id = match self.labels.iter().position(|l| l == name) {
            Some(id) => id,
            None => {
                self.labels.push(name.to_string());
                self.labels.len() - 1
            }
        };
        self.nodes.entry(at).or_default().labels.push(id);
        self
    }

    pub fn state_rewards(mut self, at: u64, rewards: &[f64]) -> Self {
        self.nodes.entry(at).or_default().state_rewards = rewards.to_vec();
        self
    }

    pub fn reward_model(mut self, info: RewardModelInfo) -> Self {
        self.reward_models.push(info);
        self
    }

    pub fn broken(mut self, at: u64) -> Self {
        self.broken.push(at);
        self
    }

    /// Nodes `0..len` in a ring, each step with probability one.
    pub fn ring(len: u64) -> Self {
        (0..len).fold(Graph::new(ModelType::Dtmc, [0]), |g, n| {
            g.choice(n, to(&[((n + 1) % len, 1.0)]))
        })
    }
}

impl NextStateGenerator for Graph {
    fn model_type(&self) -> ModelType {
        self.model_type
    }

    fn initial_states(&self) -> Result<Vec<CompressedState>, GeneratorError> {
        Ok(self.initial.iter().map(|&n| node(n)).collect())
    }

    fn expand(&self, state: &CompressedState) -> Result<StateBehavior, GeneratorError> {
        let n = state.as_words()[0];
        if self.broken.contains(&n) {
            return Err(GeneratorError::Unsupported(format!("node {}", n)));
        }
        Ok(self.nodes.get(&n).cloned().unwrap_or_default())
    }

    fn decode(&self, state: &CompressedState) -> Result<Valuation, GeneratorError> {
        let mut valuation = Valuation::new();
        valuation.push("n", Value::Int(state.as_words()[0] as i64));
        Ok(valuation)
    }

    fn label_names(&self) -> Vec<String> {
        self.labels.clone()
    }

    fn reward_models(&self) -> Vec<RewardModelInfo> {
        self.reward_models.clone()
    }
}

/// Random walk on a `size x size` torus: right or down with probability one half.
///
/// The corner `(size-1, size-1)` is labelled `corner`; every step costs one.
pub struct Grid {
    pub size: i64,
    pub vars: VariableInformation,
}

impl Grid {
    pub fn new(size: i64) -> Self {
        let mut vars = VariableInformation::new();
        vars.add_int("x", 0, size - 1).add_int("y", 0, size - 1);
        Self { size, vars }
    }

    pub fn encode(&self, x: i64, y: i64) -> CompressedState {
        self.vars
            .encode([("x", Value::Int(x)), ("y", Value::Int(y))])
            .unwrap()
    }

    fn coords(&self, state: &CompressedState) -> Result<(i64, i64), GeneratorError> {
        match (self.vars.get(state, "x")?, self.vars.get(state, "y")?) {
            (Value::Int(x), Value::Int(y)) => Ok((x, y)),
            _ => Err(GeneratorError::Unsupported("non-integer coordinate".into())),
        }
    }
}

impl NextStateGenerator for Grid {
    fn model_type(&self) -> ModelType {
        ModelType::Dtmc
    }

    fn initial_states(&self) -> Result<Vec<CompressedState>, GeneratorError> {
        Ok(vec![self.encode(0, 0)])
    }

    fn expand(&self, state: &CompressedState) -> Result<StateBehavior, GeneratorError> {
        let (x, y) = self.coords(state)?;
        let right = self.vars.encode([("x", Value::Int((x + 1) % self.size)), ("y", Value::Int(y))])?;
        let down = self.vars.encode([("x", Value::Int(x)), ("y", Value::Int((y + 1) % self.size))])?;
        let choice = Choice::new()
            .with_successor(right, 0.5)
            .with_successor(down, 0.5)
            .with_rewards([1.0]);
        let mut behavior = StateBehavior::new().with_choice(choice).with_state_rewards([(x + y) as f64]);
        if x == self.size - 1 && y == self.size - 1 {
            behavior = behavior.with_label(0);
        }
        Ok(behavior)
    }

    fn decode(&self, state: &CompressedState) -> Result<Valuation, GeneratorError> {
        Ok(self.vars.decode(state))
    }

    fn label_names(&self) -> Vec<String> {
        vec!["corner".to_string()]
    }

    fn reward_models(&self) -> Vec<RewardModelInfo> {
        vec![RewardModelInfo::new("steps", true, true)]
    }
}

/// Returns the graph node a final state id stands for, via its valuation.
pub fn node_of(model: &ModelComponents, state: usize) -> u64 {
    let valuations = model.state_valuations.as_ref().expect("valuations were not built");
    match valuations.get(StateId::new(state)).and_then(|v| v.get("n")) {
        Some(Value::Int(n)) => n as u64,
        other => panic!("state {} has no node value: {:?}", state, other),
    }
}

/// Checks that a model built from `graph` agrees with it under the final numbering.
pub fn assert_consistent(graph: &Graph, model: &ModelComponents) {
    let matrix = &model.transition_matrix;
    assert_eq!(matrix.column_count(), model.state_count());

    for state in 0..model.state_count() {
        let n = node_of(model, state);
        let behavior = graph.nodes.get(&n).cloned().unwrap_or_default();

        for (row, choice) in matrix.row_group(state).zip(&behavior.choices) {
            let mut expected: Vec<(u64, f64)> = choice
                .successors()
                .iter()
                .map(|(s, v)| (s.as_words()[0], *v))
                .collect();
            expected.sort_by_key(|&(target, _)| target);
            let mut actual: Vec<(u64, f64)> = matrix.row(row).map(|(c, v)| (node_of(model, c), v)).collect();
            actual.sort_by_key(|&(target, _)| target);
            assert_eq!(actual, expected, "row {} of state {} (node {})", row, state, n);
        }

        for (label, name) in graph.labels.iter().enumerate() {
            assert_eq!(
                model.state_labeling.has_label(name, state),
                behavior.labels.contains(&label),
                "label '{}' on state {} (node {})",
                name,
                state,
                n
            );
        }

        for (index, info) in graph.reward_models.iter().enumerate() {
            let rewards = &model.reward_models[&info.name];
            if rewards.has_state_rewards() {
                assert_eq!(rewards.state_reward(state), behavior.state_reward(index));
            }
        }
    }
}
