//! String helpers on top of [`CacheBucket`].

use crate::CacheBucket;

/// UTF-8 convenience methods for [`CacheBucket`].
///
/// Highlighter responses are HTML text, so callers almost always want
/// strings rather than raw bytes. Implemented for every bucket via a
/// blanket impl, which keeps [`CacheBucket`] object-safe.
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a cached UTF-8 string.
    ///
    /// Returns `None` on cache miss or when the stored bytes are not UTF-8.
    fn get_string(&self, key: &str) -> Option<String> {
        let bytes = self.get(key)?;
        String::from_utf8(bytes).ok()
    }

    /// Store a string value in the cache.
    fn set_string(&self, key: &str, value: &str) {
        self.set(key, value.as_bytes());
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cache, MemoryCache};

    #[test]
    fn test_string_roundtrip_through_boxed_bucket() {
        let cache = MemoryCache::new();
        let bucket: Box<dyn CacheBucket> = cache.bucket("highlight");

        bucket.set_string("key", "<div class=\"highlight\"></div>");

        assert_eq!(
            bucket.get_string("key").as_deref(),
            Some("<div class=\"highlight\"></div>")
        );
    }

    #[test]
    fn test_invalid_utf8_reads_as_miss() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("highlight");

        bucket.set("key", &[0xFF, 0xFE, 0x00]);

        assert_eq!(bucket.get_string("key"), None);
        assert!(bucket.get("key").is_some());
    }
}
