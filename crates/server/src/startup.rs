use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use configs::AppConfig;
use service::{file::FsDocumentStore, runtime, storage::DocumentName, ConfigService};

use crate::auth::{ServerAuthConfig, ServerState};
use crate::errors::StartupError;
use crate::{observability, routes};

pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the document store, seed the admin list if configured, and wire
/// the service into server state.
pub async fn build_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    let admin_document = DocumentName::parse(&cfg.store.admin_document)
        .map_err(|e| StartupError::InvalidConfig(format!("store.admin_document: {e}")))?;
    let store = FsDocumentStore::open(&cfg.store.root_dir)
        .await
        .map_err(|e| StartupError::Storage(e.to_string()))?;
    let config_service = Arc::new(ConfigService::new(store, admin_document));

    if config_service
        .seed_admins(&cfg.store.seed_admins)
        .await
        .map_err(|e| StartupError::Storage(e.to_string()))?
    {
        info!(admins = ?cfg.store.seed_admins, "initial admin list written");
    }

    Ok(ServerState { config_service, auth: ServerAuthConfig::from(&cfg.auth) })
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    runtime::ensure_env(&cfg.store.root_dir, cfg.server.static_dir.as_deref()).await?;

    let state = build_state(&cfg).await?;
    if state.auth.jwt_secret.is_none() && !state.auth.trust_username_header {
        tracing::warn!("no caller identity source enabled; every config request will be rejected");
    }

    if let Some(addr) = &cfg.server.metrics_addr {
        common::admin_http::spawn_admin_server(addr, observability::encode_metrics);
    }

    let app: Router = routes::build_router(state, build_cors(), cfg.server.static_dir.clone());

    let addr = cfg.bind_addr();
    info!(%addr, store_dir = %cfg.store.root_dir.display(), "starting config server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
