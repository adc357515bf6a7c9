//! Insertion-ordered membership set.
//!
//! Session rosters and student assignment lists must remember the order in
//! which members joined (the report lists them that way) while swaps remove
//! members from the middle. Each member gets a monotonically increasing
//! sequence number; the order map is keyed by that number, so insert and
//! remove are O(log n) and iteration stays in join order.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Ordered set of members with O(log n) insert and remove.
#[derive(Debug, Clone)]
pub struct Membership<K> {
    next_seq: u64,
    order: BTreeMap<u64, K>,
    position: HashMap<K, u64>,
}

impl<K> Default for Membership<K> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            order: BTreeMap::new(),
            position: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> Membership<K> {
    /// Creates an empty membership.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a member. Returns `false` if it was already present.
    pub fn insert(&mut self, key: K) -> bool {
        if self.position.contains_key(&key) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key.clone());
        self.position.insert(key, seq);
        true
    }

    /// Removes a member. Returns `false` if it was absent.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.position.remove(key) {
            Some(seq) => {
                self.order.remove(&seq);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.position.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Members in join order.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.order.values()
    }

    /// Member at a join-order position.
    pub fn get(&self, index: usize) -> Option<&K> {
        self.order.values().nth(index)
    }

    /// Members in join order, cloned.
    pub fn to_vec(&self) -> Vec<K> {
        self.order.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order() {
        let mut m = Membership::new();
        assert!(m.insert("b"));
        assert!(m.insert("a"));
        assert!(m.insert("c"));
        assert_eq!(m.to_vec(), vec!["b", "a", "c"]);
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut m = Membership::new();
        assert!(m.insert(7));
        assert!(!m.insert(7));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_remove_then_reinsert_goes_last() {
        let mut m = Membership::new();
        m.insert(1);
        m.insert(2);
        m.insert(3);
        assert!(m.remove(&1));
        assert!(!m.remove(&1));
        m.insert(1);
        assert_eq!(m.to_vec(), vec![2, 3, 1]);
        assert_eq!(m.get(0), Some(&2));
        assert_eq!(m.get(3), None);
    }

    #[test]
    fn test_contains() {
        let mut m = Membership::new();
        m.insert("x".to_string());
        assert!(m.contains(&"x".to_string()));
        assert!(!m.contains(&"y".to_string()));
        assert!(!m.is_empty());
    }
}
