//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Create the document directory if missing; warn when an optional static
/// assets directory is configured but absent.
pub async fn ensure_env(store_dir: &Path, static_dir: Option<&Path>) -> anyhow::Result<()> {
    if let Some(dir) = static_dir {
        if tokio::fs::metadata(dir).await.is_err() {
            warn!(static_dir = %dir.display(), "static assets directory not found; assets may 404");
        }
    }
    tokio::fs::create_dir_all(store_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", store_dir.display()))?;
    info!(store_dir = %store_dir.display(), "document directory ready");
    Ok(())
}
