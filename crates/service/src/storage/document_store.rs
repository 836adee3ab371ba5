use async_trait::async_trait;
use serde_json::Value;

use super::{DocumentName, VersionToken};
use crate::errors::StoreError;

/// A document as read from the store, with the token of the exact bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub value: Value,
    pub version: VersionToken,
}

/// Trait abstraction for named JSON document storage.
/// Implementations can be file-backed, database-backed, or remote KV.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Names of all stored documents, sorted. Backups are never listed.
    async fn list(&self) -> Result<Vec<DocumentName>, StoreError>;

    /// `Ok(None)` when the document does not exist.
    async fn read(&self, name: &DocumentName) -> Result<Option<StoredDocument>, StoreError>;

    /// Replace the document, keeping the previous bytes as its backup. With
    /// `expected` set, the write only happens if the current version matches.
    async fn write_if(
        &self,
        name: &DocumentName,
        document: &Value,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken, StoreError>;

    /// The retained previous version, if any.
    async fn read_backup(&self, name: &DocumentName) -> Result<Option<Value>, StoreError>;

    /// Last-writer-wins replacement.
    async fn write(&self, name: &DocumentName, document: &Value) -> Result<VersionToken, StoreError> {
        self.write_if(name, document, None).await
    }
}
