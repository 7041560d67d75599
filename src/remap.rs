//! Discovery-order to final-order state remapping.
//!
//! States get their id when they are discovered, but their row group is
//! appended when they are expanded. Under any order other than breadth-first
//! the two sequences differ, so at finalize every reference keyed by discovery
//! id is rewritten once through a [`Remapping`]:
//!
//! ```text
//! discovery id:  0  1  2  3
//! expanded as:   0  3  1  2      (row group index = final id)
//! mapping:      [0, 2, 3, 1]
//! ```

use crate::types::StateId;

const UNASSIGNED: usize = usize::MAX;

/// Total bijection from discovery ids to final ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Remapping {
    mapping: Vec<usize>,
    assigned: usize,
}

impl Remapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the state discovered as `discovered` owns row group `group`.
    ///
    /// # Panics
    ///
    /// Panics if the state was already assigned a group.
    pub fn record(&mut self, discovered: StateId, group: usize) {
        let index = discovered.index();
        if index >= self.mapping.len() {
            self.mapping.resize(index + 1, UNASSIGNED);
        }
        assert_eq!(self.mapping[index], UNASSIGNED, "State {} expanded twice", discovered);
        self.mapping[index] = group;
        self.assigned += 1;
    }

    /// Returns the number of recorded states.
    pub fn len(&self) -> usize {
        self.assigned
    }

    pub fn is_empty(&self) -> bool {
        self.assigned == 0
    }

    /// Returns true if every discovery id up to the largest one has a final id.
    pub fn is_total(&self) -> bool {
        self.assigned == self.mapping.len()
    }

    /// Returns true if the mapping is the identity.
    pub fn is_identity(&self) -> bool {
        self.mapping.iter().enumerate().all(|(i, &g)| i == g)
    }

    /// Returns the final id of a discovered state.
    ///
    /// # Panics
    ///
    /// Panics if the state was never recorded.
    pub fn apply(&self, discovered: StateId) -> StateId {
        let group = self.mapping[discovered.index()];
        assert_ne!(group, UNASSIGNED, "State {} was never expanded", discovered);
        StateId::new(group)
    }

    /// Returns the mapping as a slice, indexed by discovery id.
    ///
    /// # Panics
    ///
    /// Panics if the mapping is not total.
    pub fn as_slice(&self) -> &[usize] {
        assert!(self.is_total(), "Remapping is not total");
        &self.mapping
    }

    /// Moves every element of a discovery-indexed vector to its final position.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ or the mapping is not total.
    pub fn permute<T>(&self, values: Vec<T>) -> Vec<T> {
        let mapping = self.as_slice();
        assert_eq!(values.len(), mapping.len(), "Permutation length mismatch");
        let mut placed: Vec<(usize, T)> = mapping.iter().copied().zip(values).collect();
        placed.sort_unstable_by_key(|&(target, _)| target);
        debug_assert!(placed.iter().enumerate().all(|(i, &(t, _))| i == t));
        placed.into_iter().map(|(_, value)| value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> Remapping {
        let mut remap = Remapping::new();
        // Depth-first: 0 expanded first, then its last successor 3, then 1, then 2.
        remap.record(StateId::new(0), 0);
        remap.record(StateId::new(3), 1);
        remap.record(StateId::new(1), 2);
        remap.record(StateId::new(2), 3);
        remap
    }

    #[test]
    fn test_apply() {
        let remap = example();
        assert!(remap.is_total());
        assert!(!remap.is_identity());
        assert_eq!(remap.len(), 4);
        assert_eq!(remap.apply(StateId::new(3)), StateId::new(1));
        assert_eq!(remap.as_slice(), &[0, 2, 3, 1]);
    }

    #[test]
    fn test_permute() {
        let remap = example();
        let permuted = remap.permute(vec!["a", "b", "c", "d"]);
        assert_eq!(permuted, vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_partial_mapping() {
        let mut remap = Remapping::new();
        remap.record(StateId::new(1), 0);
        assert!(!remap.is_total());
        remap.record(StateId::new(0), 1);
        assert!(remap.is_total());
    }

    #[test]
    #[should_panic(expected = "expanded twice")]
    fn test_double_record() {
        let mut remap = Remapping::new();
        remap.record(StateId::new(0), 0);
        remap.record(StateId::new(0), 1);
    }

    #[test]
    fn test_identity() {
        let mut remap = Remapping::new();
        for i in 0..3 {
            remap.record(StateId::new(i), i);
        }
        assert!(remap.is_identity());
    }
}
