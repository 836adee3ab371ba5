//! Storage abstractions for the service layer
//!
//! `DocumentStore` is the seam between the document service and the
//! filesystem; names and version tokens live here so every backend shares
//! the same validation.

pub mod name;
pub mod version;
pub mod document_store;

pub use document_store::{DocumentStore, StoredDocument};
pub use name::{DocumentName, BACKUP_SUFFIX, DOCUMENT_EXTENSION};
pub use version::VersionToken;
