//! In-memory cache implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{Cache, CacheBucket};

type Entries = HashMap<String, Vec<u8>>;

/// Process-local [`Cache`] backed by hash maps.
///
/// Every bucket handle for the same name shares one map, so a value written
/// through one handle is visible through the others. Nothing is persisted.
#[derive(Default)]
pub struct MemoryCache {
    buckets: Mutex<HashMap<String, Arc<Mutex<Entries>>>>,
}

impl MemoryCache {
    /// Create an empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let entries = Arc::clone(buckets.entry(name.to_owned()).or_default());
        Box::new(MemoryCacheBucket { entries })
    }
}

struct MemoryCacheBucket {
    entries: Arc<Mutex<Entries>>,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &[u8]) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_vec());
    }
}
