use std::fmt;

use sha2::{Digest, Sha256};

/// Content hash of a document as stored on disk (lowercase hex SHA-256).
/// Used as an optimistic-concurrency precondition and as the HTTP ETag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap a token received from a caller. Case is normalized.
    pub fn from_client(raw: &str) -> Self { Self(raw.trim().to_ascii_lowercase()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}
