use std::sync::Arc;

use dashmap::DashMap;

use crate::{HpoGroup, HpoTermId};

/// Default number of terms whose ancestors are kept in the cache
pub const DEFAULT_CAPACITY: usize = 500;

/// Bounded, concurrent cache of the inclusive ancestors of a term
///
/// When the cache is full, arbitrary entries are evicted until there is
/// room for a new one. The values are pure functions of the term, so
/// eviction only affects the performance.
///
/// Eviction and insertion are not atomic. Concurrent inserts can exceed the
/// capacity by about the number of inserting threads, and the next
/// uncontended insert brings the cache back within the capacity.
#[derive(Debug)]
pub(crate) struct AncestorCache {
    entries: DashMap<HpoTermId, Arc<HpoGroup>>,
    capacity: usize,
}

impl AncestorCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns a clone of the cached entry
    ///
    /// Cloning the `Arc` releases the shard lock right away.
    pub fn get(&self, term: &HpoTermId) -> Option<Arc<HpoGroup>> {
        self.entries.get(term).map(|entry| Arc::clone(entry.value()))
    }

    pub fn insert(&self, term: HpoTermId, ancestors: Arc<HpoGroup>) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity && !self.entries.contains_key(&term) {
            // the iterator guard must be dropped before removing
            let Some(victim) = self.entries.iter().next().map(|entry| *entry.key()) else {
                break;
            };
            self.entries.remove(&victim);
        }
        self.entries.insert(term, ancestors);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for AncestorCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
