use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Body of `GET ?list=true`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConfigListResponse {
    #[serde(rename = "configFiles")]
    pub config_files: Vec<String>,
}

/// Body of a successful `POST ?file=<name>`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Uniform error body for every non-2xx response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// Header carrying the caller's username.
pub const USERNAME_HEADER: &str = "X-Username";
/// Legacy spelling accepted by the server as a fallback.
pub const LEGACY_USERNAME_HEADER: &str = "username";

/// Format a version token as a strong HTTP entity tag.
pub fn to_etag(token: &str) -> String {
    format!("\"{token}\"")
}

/// Strip quotes and an optional weak prefix from an entity tag.
pub fn from_etag(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let raw = raw.strip_prefix("W/").unwrap_or(raw);
    let inner = raw.trim_matches('"').trim();
    if inner.is_empty() || inner == "*" {
        None
    } else {
        Some(inner.to_string())
    }
}
