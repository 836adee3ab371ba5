use std::path::PathBuf;

use axum::{routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::auth::ServerState;
use crate::openapi::ApiDoc;

pub mod config;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: health, config API, API docs and,
/// when configured, the static front-end as fallback.
pub fn build_router(state: ServerState, cors: CorsLayer, static_dir: Option<PathBuf>) -> Router {
    let config_routes = Router::new()
        .route(config::CONFIGS_PATH, get(config::get_config).post(config::post_config))
        .route(config::LEGACY_CONFIG_PATH, get(config::get_config).post(config::post_config));

    let mut app = Router::new()
        .route("/health", get(health))
        .merge(config_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state);

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(cors).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
            .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
    )
}
