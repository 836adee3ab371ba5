//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

use std::path::Path;

/// Ensure the document directory exists; warn on a missing static dir.
pub async fn ensure_env(store_dir: &Path, static_dir: Option<&Path>) -> anyhow::Result<()> {
    common::env::ensure_env(store_dir, static_dir).await
}
