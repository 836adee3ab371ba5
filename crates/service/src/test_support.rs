#![cfg(test)]
use std::path::PathBuf;

use uuid::Uuid;

/// Fresh, not yet created directory under the system temp dir.
pub fn temp_dir(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}_{}", prefix, Uuid::new_v4()))
}
