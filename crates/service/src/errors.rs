use thiserror::Error;

use crate::documents::ShapeError;

/// Rejections produced while turning a raw name into a `DocumentName`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("document name is empty")]
    Empty,
    #[error("document name must not contain path separators or control characters")]
    IllegalCharacter,
    #[error("document name must not start with '.'")]
    Hidden,
    #[error("names ending in '.bak' are reserved for backups")]
    ReservedSuffix,
    #[error("document name is longer than {0} bytes")]
    TooLong(usize),
}

/// Failures of the document store itself. Absence is not an error: `read`
/// returns `Ok(None)` for a missing document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {0} is not valid JSON")]
    Corrupt(String),
    #[error("document {name} changed since version {expected}")]
    VersionConflict { name: String, expected: String },
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Outcome taxonomy of the document service. Every variant maps to exactly
/// one HTTP status.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("corrupt document: {0}")]
    CorruptDocument(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl ServiceError {
    pub fn not_found(name: &str) -> Self { Self::NotFound(format!("Configuration file not found: {name}")) }

    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Unauthorized => 401,
            ServiceError::BadRequest(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::CorruptDocument(_) | ServiceError::StorageUnavailable(_) => 500,
        }
    }

    /// Message safe to hand to a remote caller. Storage details stay in logs.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Unauthorized => "Unauthorized".to_string(),
            ServiceError::BadRequest(msg) | ServiceError::NotFound(msg) | ServiceError::Conflict(msg) => msg.clone(),
            ServiceError::CorruptDocument(name) => format!("Configuration file is corrupt: {name}"),
            ServiceError::StorageUnavailable(_) => "Internal server error".to_string(),
        }
    }
}

impl From<NameError> for ServiceError {
    fn from(e: NameError) -> Self { ServiceError::BadRequest(format!("Invalid file parameter: {e}")) }
}

impl From<ShapeError> for ServiceError {
    fn from(e: ShapeError) -> Self { ServiceError::BadRequest(e.to_string()) }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Corrupt(name) => ServiceError::CorruptDocument(name),
            StoreError::VersionConflict { name, .. } => {
                ServiceError::Conflict(format!("Configuration file {name} was modified by another writer"))
            }
            StoreError::Unavailable(io) => ServiceError::StorageUnavailable(io.to_string()),
            StoreError::Serialize(err) => ServiceError::StorageUnavailable(err.to_string()),
        }
    }
}
