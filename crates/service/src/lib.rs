//! Service layer for the admin configuration store.
//! - `storage`: document names, version tokens and the `DocumentStore` seam.
//! - `file`: the directory-backed store.
//! - `access`: caller identity and the admin-list guard.
//! - `documents`: typed shapes of the recognized documents.
//! - `config_service`: the authorized list/get/put façade.

pub mod errors;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
pub mod storage;
pub mod file;
pub mod access;
pub mod documents;
pub mod config_service;

pub use config_service::ConfigService;
