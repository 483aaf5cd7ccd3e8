//! Highlight cache key computation.

use sha2::{Digest, Sha256};

/// Inputs that determine a highlighter response.
#[derive(Debug, Clone, Copy)]
pub struct HighlightKey<'a> {
    /// Normalised language name sent to the service.
    pub language: &'a str,
    /// Code body exactly as sent to the service.
    pub code: &'a str,
}

impl HighlightKey<'_> {
    /// Hex SHA-256 of `"{language}:{code}"`.
    ///
    /// The language is part of the hash so the same snippet highlighted as
    /// two languages gets two entries.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.language.as_bytes());
        hasher.update(b":");
        hasher.update(self.code.as_bytes());
        hex::encode(hasher.finalize())
    }
}
