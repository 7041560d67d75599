//! Deduplicating state registry.
//!
//! The registry is an append-only arena of state encodings plus an
//! index-based hash table over it:
//!
//! ```text
//! buckets: [ 2 | - | 0 | - ]        (hash & bitmask) -> first id in chain
//! states:  [ s0  | s1  | s2  ]       arena, id = position = discovery order
//! hashes:  [ h0  | h1  | h2  ]       cached, used for rehashing
//! next:    [ -   | -   | 0   ]       chain links (ids)
//! ```
//!
//! Every state is hashed exactly once, on lookup. Collisions are resolved by
//! comparing the full encodings, so two states share an id if and only if
//! they are equal. Chains only store ids, never back-pointers.

use std::fmt::Debug;

use crate::state::CompressedState;
use crate::types::StateId;
use crate::utils::MyHash;

const NIL: u32 = u32::MAX;

/// Hash index from canonical encodings to dense [`StateId`]s.
pub struct StateStorage<S = CompressedState> {
    states: Vec<S>,
    hashes: Vec<u64>,
    next: Vec<u32>,
    buckets: Vec<u32>,
    bitmask: u64,
}

impl<S> StateStorage<S> {
    /// Creates an empty registry with `2^bits` buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bucket bits should be in the range 0..=31");
        let size = 1usize << bits;
        Self {
            states: Vec::new(),
            hashes: Vec::new(),
            next: Vec::new(),
            buckets: vec![NIL; size],
            bitmask: (size - 1) as u64,
        }
    }

    /// Returns the number of registered states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if no state has been registered.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the number of hash buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the encoding registered under `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was never handed out by this registry.
    pub fn state(&self, id: StateId) -> &S {
        &self.states[id.index()]
    }

    /// Iterates over all states in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &S)> + '_ {
        self.states.iter().enumerate().map(|(i, s)| (StateId::new(i), s))
    }

    /// Drops all registered states, keeping the bucket array.
    pub fn clear(&mut self) {
        self.states.clear();
        self.hashes.clear();
        self.next.clear();
        self.buckets.iter_mut().for_each(|b| *b = NIL);
    }

    fn bucket_index(&self, hash: u64) -> usize {
        (hash & self.bitmask) as usize
    }

    /// Doubles the bucket array and relinks every chain from the cached hashes.
    fn grow(&mut self) {
        let size = self.buckets.len() * 2;
        self.buckets = vec![NIL; size];
        self.bitmask = (size - 1) as u64;
        // Relink in reverse so that chains keep ascending id order.
        for id in (0..self.states.len()).rev() {
            let bucket = self.bucket_index(self.hashes[id]);
            self.next[id] = self.buckets[bucket];
            self.buckets[bucket] = id as u32;
        }
    }
}

impl<S> StateStorage<S>
where
    S: MyHash + Eq,
{
    fn find_with_hash(&self, state: &S, hash: u64) -> Option<StateId> {
        let mut index = self.buckets[self.bucket_index(hash)];
        while index != NIL {
            let i = index as usize;
            if self.hashes[i] == hash && &self.states[i] == state {
                return Some(StateId::new(i));
            }
            index = self.next[i];
        }
        None
    }

    /// Looks up a state without registering it.
    pub fn get(&self, state: &S) -> Option<StateId> {
        self.find_with_hash(state, state.hash())
    }

    /// Returns the id of `state`, registering it first if it is unseen.
    ///
    /// The flag is `true` if the state was newly registered. New states get
    /// the next free id, so ids follow discovery order.
    ///
    /// # Panics
    ///
    /// Panics if the id space of [`StateId`] is exhausted.
    pub fn lookup_or_insert(&mut self, state: S) -> (StateId, bool) {
        let hash = state.hash();
        if let Some(id) = self.find_with_hash(&state, hash) {
            return (id, false);
        }

        if self.states.len() + 1 > self.buckets.len() / 4 * 3 {
            self.grow();
        }

        let id = StateId::new(self.states.len());
        let bucket = self.bucket_index(hash);

        // Append to the tail of the chain so chains keep ascending id order.
        let mut index = self.buckets[bucket];
        if index == NIL {
            self.buckets[bucket] = id.raw();
        } else {
            while self.next[index as usize] != NIL {
                index = self.next[index as usize];
            }
            self.next[index as usize] = id.raw();
        }

        self.states.push(state);
        self.hashes.push(hash);
        self.next.push(NIL);
        (id, true)
    }
}

impl<S> Default for StateStorage<S> {
    fn default() -> Self {
        Self::new(10)
    }
}

impl<S> Debug for StateStorage<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStorage")
            .field("states", &self.states.len())
            .field("buckets", &self.buckets.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    struct Item(i32);

    impl MyHash for Item {
        // Deliberately collides `x` with `-x`.
        fn hash(&self) -> u64 {
            self.0.unsigned_abs() as u64
        }
    }

    #[test]
    fn test_ids_follow_discovery_order() {
        let mut storage = StateStorage::new(2);
        assert_eq!(storage.lookup_or_insert(Item(7)), (StateId::new(0), true));
        assert_eq!(storage.lookup_or_insert(Item(3)), (StateId::new(1), true));
        assert_eq!(storage.lookup_or_insert(Item(7)), (StateId::new(0), false));
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn test_collisions_never_merge() {
        let mut storage = StateStorage::new(2);
        let (a, _) = storage.lookup_or_insert(Item(5));
        let (b, new) = storage.lookup_or_insert(Item(-5));
        assert!(new);
        assert_ne!(a, b);
        assert_eq!(*storage.state(a), Item(5));
        assert_eq!(*storage.state(b), Item(-5));
        assert_eq!(storage.get(&Item(-5)), Some(b));
        assert_eq!(storage.get(&Item(6)), None);
    }

    #[test]
    fn test_growth_keeps_all_states() {
        let mut storage = StateStorage::new(1);
        for i in 0..1000 {
            let (id, new) = storage.lookup_or_insert(CompressedState::from_u64(i));
            assert!(new);
            assert_eq!(id.index(), i as usize);
        }
        assert!(storage.bucket_count() >= 1024);
        for i in 0..1000 {
            assert_eq!(
                storage.get(&CompressedState::from_u64(i)),
                Some(StateId::new(i as usize))
            );
        }
    }

    #[test]
    fn test_iter_and_clear() {
        let mut storage = StateStorage::default();
        storage.lookup_or_insert(Item(1));
        storage.lookup_or_insert(Item(2));
        let ids: Vec<_> = storage.iter().map(|(id, s)| (id.index(), *s)).collect();
        assert_eq!(ids, vec![(0, Item(1)), (1, Item(2))]);

        storage.clear();
        assert!(storage.is_empty());
        assert_eq!(storage.get(&Item(1)), None);
        assert_eq!(storage.lookup_or_insert(Item(2)), (StateId::new(0), true));
    }
}
