use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use common::types::{from_etag, to_etag, ConfigListResponse, SaveResponse};
use service::storage::VersionToken;

use crate::auth::{Caller, ServerState};
use crate::errors::ApiError;
use crate::observability;

pub const CONFIGS_PATH: &str = "/api/admin/configs";
pub const LEGACY_CONFIG_PATH: &str = "/api/admin/config";

const MISSING_FILE: &str = "Missing file parameter. Use ?file=filename.json";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConfigQuery {
    /// `true` to list document names.
    pub list: Option<String>,
    /// Document name; `.json` is appended when missing.
    pub file: Option<String>,
    /// `true` to fetch the retained backup instead of the current version.
    pub backup: Option<String>,
}

impl ConfigQuery {
    fn flag(v: &Option<String>) -> bool { v.as_deref() == Some("true") }
}

fn with_etag(mut resp: Response, version: &VersionToken) -> Response {
    if let Ok(v) = HeaderValue::from_str(&to_etag(version.as_str())) {
        resp.headers_mut().insert(header::ETAG, v);
    }
    resp
}

fn finish(op: &str, result: Result<Response, ApiError>) -> Response {
    let resp = result.unwrap_or_else(IntoResponse::into_response);
    observability::record(op, resp.status());
    resp
}

#[utoipa::path(
    get,
    path = "/api/admin/configs",
    tag = "config",
    params(ConfigQuery),
    responses(
        (status = 200, description = "Document body, or the name list with ?list=true", body = crate::openapi::ConfigListResponseDoc),
        (status = 400, description = "Missing or invalid file parameter", body = crate::openapi::ErrorBodyDoc),
        (status = 401, description = "Caller is not an admin", body = crate::openapi::ErrorBodyDoc),
        (status = 404, description = "Document not found", body = crate::openapi::ErrorBodyDoc),
        (status = 500, description = "Storage failure or corrupt document", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn get_config(State(state): State<ServerState>, caller: Caller, Query(query): Query<ConfigQuery>) -> Response {
    if ConfigQuery::flag(&query.list) {
        return finish("list", list(&state, &caller).await);
    }
    if ConfigQuery::flag(&query.backup) {
        return finish("get_backup", get_backup(&state, &caller, query.file).await);
    }
    finish("get", get(&state, &caller, query.file).await)
}

async fn list(state: &ServerState, caller: &Caller) -> Result<Response, ApiError> {
    let config_files = state.config_service.handle_list(caller.claim()).await?;
    Ok(Json(ConfigListResponse { config_files }).into_response())
}

async fn get(state: &ServerState, caller: &Caller, file: Option<String>) -> Result<Response, ApiError> {
    let Some(file) = file else {
        state.config_service.authorize(caller.claim()).await?;
        return Err(ApiError::bad_request(MISSING_FILE));
    };
    let doc = state.config_service.handle_get(caller.claim(), &file).await?;
    Ok(with_etag(Json(doc.value).into_response(), &doc.version))
}

async fn get_backup(state: &ServerState, caller: &Caller, file: Option<String>) -> Result<Response, ApiError> {
    let Some(file) = file else {
        state.config_service.authorize(caller.claim()).await?;
        return Err(ApiError::bad_request(MISSING_FILE));
    };
    let value = state.config_service.handle_get_backup(caller.claim(), &file).await?;
    Ok(Json(value).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/configs",
    tag = "config",
    params(ConfigQuery, ("If-Match" = Option<String>, Header, description = "Version token from a previous read")),
    responses(
        (status = 200, description = "Saved", body = crate::openapi::SaveResponseDoc),
        (status = 400, description = "Invalid JSON, shape or file parameter", body = crate::openapi::ErrorBodyDoc),
        (status = 401, description = "Caller is not an admin", body = crate::openapi::ErrorBodyDoc),
        (status = 409, description = "Document changed since the given version", body = crate::openapi::ErrorBodyDoc),
        (status = 500, description = "Storage failure", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn post_config(
    State(state): State<ServerState>,
    caller: Caller,
    Query(query): Query<ConfigQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    finish("put", put(&state, &caller, query.file, &headers, &body).await)
}

async fn put(
    state: &ServerState,
    caller: &Caller,
    file: Option<String>,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, ApiError> {
    let (file, document) = match (file, serde_json::from_slice::<Value>(body)) {
        (Some(file), Ok(document)) => (file, document),
        (file, _) => {
            // callers without access learn nothing about their request
            state.config_service.authorize(caller.claim()).await?;
            let msg = if file.is_none() { MISSING_FILE } else { "Invalid JSON in request body" };
            return Err(ApiError::bad_request(msg));
        }
    };
    let expected = headers
        .get(header::IF_MATCH)
        .and_then(|v| v.to_str().ok())
        .and_then(from_etag)
        .map(|t| VersionToken::from_client(&t));

    let version = state
        .config_service
        .handle_put(caller.claim(), &file, document, expected)
        .await?;
    let body = SaveResponse { success: true, message: format!("Configuration updated successfully in {file}") };
    Ok(with_etag((StatusCode::OK, Json(body)).into_response(), &version))
}
