//! Insertion-ordered collections with a fixed capacity.
//!
//! When full, the oldest entry is evicted to make room for a new one.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// A set that forgets its oldest members past `capacity`.
#[derive(Debug)]
pub struct BoundedSet<T> {
    members: HashSet<T>,
    order: VecDeque<T>,
    capacity: usize,
}

impl<T: Eq + Hash + Clone> BoundedSet<T> {
    /// Creates a set holding at most `capacity` members (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            members: HashSet::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Inserts a value. Returns `false` if it was already present.
    pub fn insert(&mut self, value: T) -> bool {
        self.insert_evicting(value).0
    }

    /// Inserts a value, also returning the member evicted to make room.
    pub fn insert_evicting(&mut self, value: T) -> (bool, Option<T>) {
        if self.members.contains(&value) {
            return (false, None);
        }
        let mut evicted = None;
        if self.order.len() >= self.capacity {
            evicted = self.order.pop_front();
            if let Some(oldest) = &evicted {
                self.members.remove(oldest);
            }
        }
        self.members.insert(value.clone());
        self.order.push_back(value);
        (true, evicted)
    }

    /// Whether the value is present.
    pub fn contains(&self, value: &T) -> bool {
        self.members.contains(value)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// A map that forgets its oldest keys past `capacity`.
///
/// Overwriting an existing key keeps its original position in the eviction order.
#[derive(Debug)]
pub struct BoundedMap<K, V> {
    entries: HashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V> BoundedMap<K, V> {
    /// Creates a map holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Inserts or overwrites an entry, returning the previous value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.entries.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(key.clone(), value);
        self.order.push_back(key);
        None
    }

    /// Looks up an entry.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_rejects_duplicates() {
        let mut set = BoundedSet::new(4);
        assert!(set.insert(1));
        assert!(!set.insert(1));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_set_evicts_oldest() {
        let mut set = BoundedSet::new(2);
        set.insert("a");
        set.insert("b");
        set.insert("c");
        assert!(!set.contains(&"a"));
        assert!(set.contains(&"b"));
        assert!(set.contains(&"c"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_set_reports_evicted_member() {
        let mut set = BoundedSet::new(2);
        assert_eq!(set.insert_evicting(1), (true, None));
        assert_eq!(set.insert_evicting(2), (true, None));
        assert_eq!(set.insert_evicting(2), (false, None));
        assert_eq!(set.insert_evicting(3), (true, Some(1)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_map_overwrite_keeps_position() {
        let mut map = BoundedMap::new(2);
        map.insert("a", 1);
        map.insert("b", 2);
        assert_eq!(map.insert("a", 10), Some(1));
        assert_eq!(map.len(), 2);

        map.insert("c", 3);
        assert!(map.get(&"a").is_none());
        assert_eq!(map.get(&"b"), Some(&2));
        assert_eq!(map.get(&"c"), Some(&3));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut set = BoundedSet::new(0);
        assert!(set.insert(1));
        assert!(set.contains(&1));
    }
}
