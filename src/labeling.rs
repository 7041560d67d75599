//! State labels, choice labels and state valuations.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::bitvector::BitVector;
use crate::state::Valuation;
use crate::types::StateId;

/// Maps atomic-proposition names to the set of states they hold in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateLabeling {
    state_count: usize,
    labels: BTreeMap<String, BitVector>,
}

impl StateLabeling {
    pub fn new(state_count: usize) -> Self {
        Self {
            state_count,
            labels: BTreeMap::new(),
        }
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    /// Declares a label holding in no state. Existing labels are kept.
    pub fn add_label(&mut self, name: impl Into<String>) {
        let count = self.state_count;
        self.labels.entry(name.into()).or_insert_with(|| BitVector::new(count));
    }

    /// Marks a label as holding in a state, declaring the label if needed.
    pub fn add_label_to_state(&mut self, name: &str, state: usize) {
        if !self.labels.contains_key(name) {
            self.add_label(name);
        }
        if let Some(states) = self.labels.get_mut(name) {
            states.set(state, true);
        }
    }

    /// Sets the states of a label, replacing any previous definition.
    ///
    /// # Panics
    ///
    /// Panics if `states` does not have one bit per state.
    pub fn insert(&mut self, name: impl Into<String>, states: BitVector) {
        assert_eq!(states.len(), self.state_count, "Label states misaligned");
        self.labels.insert(name.into(), states);
    }

    pub fn contains_label(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    /// Returns true if `name` holds in `state`; unknown labels hold nowhere.
    pub fn has_label(&self, name: &str, state: usize) -> bool {
        self.labels.get(name).is_some_and(|states| states.get(state))
    }

    /// Returns the states a label holds in.
    pub fn states(&self, name: &str) -> Option<&BitVector> {
        self.labels.get(name)
    }

    /// Returns the names of the labels holding in a state.
    pub fn labels_of_state(&self, state: usize) -> BTreeSet<&str> {
        self.labels
            .iter()
            .filter(|(_, states)| states.get(state))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Iterates over all label names.
    pub fn label_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.labels.keys().map(String::as_str)
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}

impl fmt::Display for StateLabeling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Labels: {}", self.labels.len())?;
        for (name, states) in &self.labels {
            writeln!(f, "   * {} -> {} item(s)", name, states.count_ones())?;
        }
        Ok(())
    }
}

/// Set of choice label ids attached to every matrix row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceLabeling {
    rows: Vec<BTreeSet<usize>>,
}

impl ChoiceLabeling {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the labels of the next row.
    pub fn push(&mut self, labels: impl IntoIterator<Item = usize>) {
        self.rows.push(labels.into_iter().collect());
    }

    pub fn labels_of_choice(&self, row: usize) -> &BTreeSet<usize> {
        &self.rows[row]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reorders rows. Row `i` of the result unites the labels of all rows in `sources[i]`.
    pub(crate) fn reorder_rows(&mut self, sources: &[Vec<usize>]) {
        self.rows = sources
            .iter()
            .map(|rows| rows.iter().flat_map(|&r| self.rows[r].iter().copied()).collect())
            .collect();
    }
}

/// Variable valuations of all states, keyed by final state id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateValuations {
    valuations: Vec<Valuation>,
}

impl StateValuations {
    pub(crate) fn new(valuations: Vec<Valuation>) -> Self {
        Self { valuations }
    }

    /// Returns the valuation of a state.
    pub fn get(&self, state: StateId) -> Option<&Valuation> {
        self.valuations.get(state.index())
    }

    pub fn len(&self) -> usize {
        self.valuations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valuations.is_empty()
    }

    /// Iterates over all valuations, by ascending state id.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &Valuation)> + '_ {
        self.valuations.iter().enumerate().map(|(i, v)| (StateId::new(i), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Value;

    #[test]
    fn test_state_labeling() {
        let mut labeling = StateLabeling::new(4);
        labeling.add_label("done");
        labeling.add_label_to_state("goal", 2);
        labeling.add_label_to_state("goal", 3);
        labeling.add_label_to_state("done", 3);

        assert_eq!(labeling.label_count(), 2);
        assert!(labeling.has_label("goal", 2));
        assert!(!labeling.has_label("goal", 0));
        assert!(!labeling.has_label("missing", 0));
        assert_eq!(labeling.states("goal").map(|s| s.count_ones()), Some(2));
        assert_eq!(labeling.labels_of_state(3), BTreeSet::from(["done", "goal"]));
        assert!(labeling.labels_of_state(0).is_empty());
        assert_eq!(labeling.label_names().collect::<Vec<_>>(), vec!["done", "goal"]);
    }

    #[test]
    fn test_labeling_display() {
        let mut labeling = StateLabeling::new(2);
        labeling.add_label_to_state("a", 1);
        assert_eq!(labeling.to_string(), "Labels: 1\n   * a -> 1 item(s)\n");
    }

    #[test]
    fn test_insert_replaces() {
        let mut labeling = StateLabeling::new(3);
        labeling.add_label_to_state("a", 0);
        labeling.insert("a", BitVector::from_indices(3, [2]));
        assert!(!labeling.has_label("a", 0));
        assert!(labeling.has_label("a", 2));
    }

    #[test]
    fn test_choice_labeling_reorder() {
        let mut labeling = ChoiceLabeling::new();
        labeling.push([1]);
        labeling.push([2, 3]);
        labeling.push([]);
        labeling.reorder_rows(&[vec![2], vec![0, 1]]);
        assert_eq!(labeling.len(), 2);
        assert!(labeling.labels_of_choice(0).is_empty());
        assert_eq!(labeling.labels_of_choice(1), &BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_state_valuations_lookup() {
        let mut v = Valuation::new();
        v.push("x", Value::Int(1));
        let valuations = StateValuations::new(vec![Valuation::new(), v.clone()]);
        assert_eq!(valuations.len(), 2);
        assert_eq!(valuations.get(StateId::new(1)), Some(&v));
        assert_eq!(valuations.get(StateId::new(2)), None);
    }
}
