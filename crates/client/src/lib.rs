//! Typed HTTP adapter for the admin config API.
//!
//! A `ConfigClient` owns its base URL and the caller's credentials; every
//! call attaches them, (de)serializes JSON, and reduces any failure to a
//! single [`ClientError`]. No retries.

use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use common::types::{from_etag, to_etag, ConfigListResponse, ErrorBody, SaveResponse, USERNAME_HEADER};

pub const DEFAULT_CONFIG_PATH: &str = "/api/admin/configs";

/// Well-known document names.
pub mod config_files {
    pub const APP_CONFIG: &str = "config.json";
    pub const ADMINS: &str = "admins.json";
    pub const DATASET_ACCESS: &str = "dataset_access.json";
    pub const HELP_CONTENT: &str = "help_content.json";
}

/// Any failed call: `status` is `None` when no HTTP response was received.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("config operation failed ({}): {message}", status.map(|s| s.to_string()).unwrap_or_else(|| "no response".into()))]
pub struct ClientError {
    pub status: Option<u16>,
    pub message: String,
}

impl ClientError {
    fn transport(e: reqwest::Error) -> Self {
        Self { status: e.status().map(|s| s.as_u16()), message: e.to_string() }
    }

    pub fn is_unauthorized(&self) -> bool { self.status == Some(401) }
    pub fn is_not_found(&self) -> bool { self.status == Some(404) }
    pub fn is_conflict(&self) -> bool { self.status == Some(409) }
}

/// Who the client acts as.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    #[default]
    Anonymous,
    /// Sent as the `X-Username` header.
    Username(String),
    /// Sent as `Authorization: Bearer <token>`.
    Bearer(String),
}

/// A document together with the version token the server reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConfigClient {
    http: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
}

impl ConfigClient {
    /// `base_url` like `http://127.0.0.1:8081`; the default API path is appended.
    pub fn new(base_url: &str, credentials: Credentials) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, credentials)
    }

    pub fn with_http(http: reqwest::Client, base_url: &str, credentials: Credentials) -> Self {
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), DEFAULT_CONFIG_PATH);
        Self { http, endpoint, credentials }
    }

    /// Same connection pool and endpoint, different caller.
    pub fn as_caller(&self, credentials: Credentials) -> Self {
        Self { http: self.http.clone(), endpoint: self.endpoint.clone(), credentials }
    }

    pub fn credentials(&self) -> &Credentials { &self.credentials }

    fn request(&self, method: Method, query: &[(&str, &str)]) -> RequestBuilder {
        let builder = self
            .http
            .request(method, &self.endpoint)
            .query(query)
            .header(header::ACCEPT, "application/json");
        match &self.credentials {
            Credentials::Anonymous => builder,
            Credentials::Username(user) => builder.header(USERNAME_HEADER, user),
            Credentials::Bearer(token) => builder.bearer_auth(token),
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let resp = builder.send().await.map_err(ClientError::transport)?;
        let status = resp.status();
        debug!(status = status.as_u16(), url = %resp.url(), "config api response");
        if status.is_success() {
            return Ok(resp);
        }
        Err(error_from(status, resp.text().await.unwrap_or_default()))
    }

    /// All document names on the server.
    pub async fn list_config_files(&self) -> Result<Vec<String>, ClientError> {
        let resp = self.send(self.request(Method::GET, &[("list", "true")])).await?;
        let body: ConfigListResponse = resp.json().await.map_err(ClientError::transport)?;
        Ok(body.config_files)
    }

    /// Raw JSON of one document.
    pub async fn get_config_data(&self, file: &str) -> Result<Value, ClientError> {
        Ok(self.get_config_versioned(file).await?.value)
    }

    /// One document plus its version token, for a later conditional save.
    pub async fn get_config_versioned(&self, file: &str) -> Result<Versioned<Value>, ClientError> {
        let resp = self.send(self.request(Method::GET, &[("file", file)])).await?;
        let version = resp
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .and_then(from_etag);
        let value = resp.json::<Value>().await.map_err(ClientError::transport)?;
        Ok(Versioned { value, version })
    }

    /// One document decoded into `T`.
    pub async fn get_document<T: DeserializeOwned>(&self, file: &str) -> Result<T, ClientError> {
        let value = self.get_config_data(file).await?;
        serde_json::from_value(value).map_err(|e| ClientError { status: None, message: format!("unexpected document shape: {e}") })
    }

    /// The retained previous version of one document.
    pub async fn get_backup(&self, file: &str) -> Result<Value, ClientError> {
        let resp = self.send(self.request(Method::GET, &[("file", file), ("backup", "true")])).await?;
        resp.json().await.map_err(ClientError::transport)
    }

    /// Replace a document; the last writer wins.
    pub async fn save_config_data(&self, file: &str, data: &Value) -> Result<Versioned<SaveResponse>, ClientError> {
        self.save(file, data, None).await
    }

    /// Replace a document only if it still has version `version`.
    pub async fn save_config_data_if_match(
        &self,
        file: &str,
        data: &Value,
        version: &str,
    ) -> Result<Versioned<SaveResponse>, ClientError> {
        self.save(file, data, Some(version)).await
    }

    async fn save(&self, file: &str, data: &Value, version: Option<&str>) -> Result<Versioned<SaveResponse>, ClientError> {
        let mut builder = self.request(Method::POST, &[("file", file)]).json(data);
        if let Some(v) = version {
            builder = builder.header(header::IF_MATCH, to_etag(v));
        }
        let resp = self.send(builder).await?;
        let version = resp
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .and_then(from_etag);
        let value = resp.json::<SaveResponse>().await.map_err(ClientError::transport)?;
        Ok(Versioned { value, version })
    }
}

/// Prefer the server's `{ "error" }` message; fall back to the raw text or
/// the status reason.
fn error_from(status: StatusCode, text: String) -> ClientError {
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.error,
        Err(_) if !text.trim().is_empty() => text,
        Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
    };
    ClientError { status: Some(status.as_u16()), message }
}
