//! Cache backends for codefence.
//!
//! Highlighted code is expensive to produce (one HTTP round trip per block),
//! so renderers memoise service responses behind two small traits:
//!
//! - [`Cache`]: Factory for named cache buckets
//! - [`CacheBucket`]: Plain key-value store (`get` / `set`)
//!
//! Keys are content hashes computed by the caller, so entries never need
//! invalidation. Nothing in this crate expires or evicts entries.
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: No-op implementations (always miss)
//! - [`MemoryCache`]: Process-local map, shared across bucket handles
//! - [`FileCache`]: One file per entry on disk
//!
//! # Example
//!
//! ```
//! use codefence_cache::{Cache, CacheBucketExt, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! let bucket = cache.bucket("highlight");
//! bucket.set_string("abc123", "<pre>x</pre>");
//! assert_eq!(bucket.get_string("abc123").as_deref(), Some("<pre>x</pre>"));
//! ```

mod ext;
mod file;
mod memory;

pub use ext::CacheBucketExt;
pub use file::FileCache;
pub use memory::MemoryCache;

/// A named partition within a [`Cache`].
///
/// Implementations must tolerate concurrent `get`/`set` from several
/// threads; failures to persist are swallowed because the cache is optional.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value, or `None` on miss.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value, overwriting any existing entry for `key`.
    fn set(&self, key: &str, value: &[u8]);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// Buckets with different names never see each other's entries. Two handles
/// for the same name share storage.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`] that never stores or retrieves data.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8]) {}
}

/// No-op [`Cache`] used when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}
