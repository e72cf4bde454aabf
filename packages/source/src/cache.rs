//! Bounded cache of generated mock datasets.
//!
//! Entries are evicted first-in first-out once `capacity` is reached. The
//! cache lives as long as the source that owns it.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use compete_intel_competitor_models::Competitor;

/// Key of one generated dataset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetKey {
    /// Resolved city name.
    pub city: String,
    /// Resolved category name.
    pub category: String,
    /// Number of generated records.
    pub count: usize,
}

/// FIFO-bounded map from [`DatasetKey`] to generated competitors.
#[derive(Debug)]
pub struct MockDataCache {
    capacity: usize,
    entries: BTreeMap<DatasetKey, Arc<Vec<Competitor>>>,
    insertion_order: VecDeque<DatasetKey>,
}

impl MockDataCache {
    /// Creates an empty cache holding at most `capacity` datasets.
    ///
    /// A capacity of zero disables caching.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: BTreeMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    /// Maximum number of cached datasets.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached datasets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached dataset for `key`.
    #[must_use]
    pub fn get(&self, key: &DatasetKey) -> Option<Arc<Vec<Competitor>>> {
        self.entries.get(key).cloned()
    }

    /// Returns the dataset for `key`, generating and caching it on a miss.
    pub fn get_or_insert_with(
        &mut self,
        key: DatasetKey,
        generate: impl FnOnce() -> Vec<Competitor>,
    ) -> Arc<Vec<Competitor>> {
        if let Some(hit) = self.get(&key) {
            return hit;
        }

        let dataset = Arc::new(generate());
        if self.capacity == 0 {
            return dataset;
        }

        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.insertion_order.pop_front() else {
                break;
            };
            log::debug!(
                "get_or_insert_with: evicting {}/{}/{}",
                oldest.city,
                oldest.category,
                oldest.count
            );
            self.entries.remove(&oldest);
        }

        self.insertion_order.push_back(key.clone());
        self.entries.insert(key, Arc::clone(&dataset));
        dataset
    }
}
