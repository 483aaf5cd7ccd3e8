//! File-based cache implementation.
//!
//! [`FileCache`] stores every entry as a single file, `{root}/{bucket}/{key}.html`.
//! The file content is the cached value, byte for byte, so a cache directory
//! can be inspected (or pruned) by hand.
//!
//! Writes go to a temporary sibling file that is renamed into place, so a
//! reader never observes a half-written entry.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Cache, CacheBucket};

/// Extension appended to every entry file.
const ENTRY_EXTENSION: &str = "html";

/// File-based [`Cache`] rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- highlight/                # bucket "highlight"
///     +-- 3f2a...e1.html        # cache entry
/// ```
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a file-based cache at `root`.
    ///
    /// The directory is created lazily on the first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this cache.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(name),
        })
    }
}

/// A single bucket backed by a directory on disk.
struct FileCacheBucket {
    dir: PathBuf,
}

impl FileCacheBucket {
    /// Path of the entry file for `key`, or `None` for keys that would
    /// escape the bucket directory.
    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            tracing::warn!(key, "Rejected cache key");
            return None;
        }
        Some(self.dir.join(format!("{key}.{ENTRY_EXTENSION}")))
    }
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key)?;
        fs::read(path).ok()
    }

    fn set(&self, key: &str, value: &[u8]) {
        let Some(path) = self.entry_path(key) else {
            return;
        };

        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "Failed to create cache directory");
            return;
        }

        let tmp = path.with_extension(format!("{ENTRY_EXTENSION}.tmp{}", std::process::id()));
        if let Err(e) = fs::write(&tmp, value) {
            tracing::warn!(path = %tmp.display(), error = %e, "Failed to write cache entry");
            return;
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to move cache entry into place");
            let _ = fs::remove_file(&tmp);
        }
    }
}
