//! Document kinds recognized at the service boundary.
//!
//! Known names are parsed into typed shapes before a write is accepted;
//! anything else is stored as an opaque JSON object or array.

pub mod schemas;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::storage::DocumentName;
pub use schemas::{AdminList, AppSettings, DatasetAccess, HelpContent};

pub const APP_CONFIG: &str = "config.json";
pub const ADMINS: &str = "admins.json";
pub const DATASET_ACCESS: &str = "dataset_access.json";
pub const HELP_CONTENT: &str = "help_content.json";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Invalid configuration data format. Expected JSON object or array.")]
    NotContainer,
    #[error("Invalid {kind} document: {reason}")]
    Invalid { kind: DocumentKind, reason: String },
    #[error("Admin list must keep at least one admin")]
    EmptyAdminList,
    #[error("Admin list contains a blank username")]
    BlankAdmin,
    #[error("Admin list entry has surrounding whitespace: {0:?}")]
    UntrimmedAdmin(String),
    #[error("Admin list contains duplicate username: {0}")]
    DuplicateAdmin(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    AppSettings,
    AdminList,
    DatasetAccess,
    HelpContent,
    Opaque,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DocumentKind::AppSettings => "app-settings",
            DocumentKind::AdminList => "admin-list",
            DocumentKind::DatasetAccess => "dataset-access",
            DocumentKind::HelpContent => "help-content",
            DocumentKind::Opaque => "opaque",
        };
        f.write_str(s)
    }
}

impl DocumentKind {
    /// The admin list name is configurable, so it is passed in.
    pub fn classify(name: &DocumentName, admin_document: &DocumentName) -> Self {
        if name == admin_document {
            return DocumentKind::AdminList;
        }
        match name.as_str() {
            APP_CONFIG => DocumentKind::AppSettings,
            DATASET_ACCESS => DocumentKind::DatasetAccess,
            HELP_CONTENT => DocumentKind::HelpContent,
            _ => DocumentKind::Opaque,
        }
    }
}

/// A document after shape validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigDocument {
    AppSettings(AppSettings),
    AdminList(AdminList),
    DatasetAccess(DatasetAccess),
    HelpContent(HelpContent),
    Opaque(Value),
}

impl ConfigDocument {
    pub fn parse(kind: DocumentKind, value: &Value) -> Result<Self, ShapeError> {
        if !(value.is_object() || value.is_array()) {
            return Err(ShapeError::NotContainer);
        }
        let doc = match kind {
            DocumentKind::AppSettings => ConfigDocument::AppSettings(typed(kind, value)?),
            DocumentKind::AdminList => {
                let admins: AdminList = typed(kind, value)?;
                admins.check()?;
                ConfigDocument::AdminList(admins)
            }
            DocumentKind::DatasetAccess => ConfigDocument::DatasetAccess(typed(kind, value)?),
            DocumentKind::HelpContent => ConfigDocument::HelpContent(typed(kind, value)?),
            DocumentKind::Opaque => ConfigDocument::Opaque(value.clone()),
        };
        Ok(doc)
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            ConfigDocument::AppSettings(_) => DocumentKind::AppSettings,
            ConfigDocument::AdminList(_) => DocumentKind::AdminList,
            ConfigDocument::DatasetAccess(_) => DocumentKind::DatasetAccess,
            ConfigDocument::HelpContent(_) => DocumentKind::HelpContent,
            ConfigDocument::Opaque(_) => DocumentKind::Opaque,
        }
    }
}

fn typed<T: DeserializeOwned>(kind: DocumentKind, value: &Value) -> Result<T, ShapeError> {
    T::deserialize(value).map_err(|e| ShapeError::Invalid { kind, reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn name(raw: &str) -> DocumentName { DocumentName::parse(raw).unwrap() }

    fn admins() -> DocumentName { name(ADMINS) }

    #[test]
    fn classifies_known_names() {
        assert_eq!(DocumentKind::classify(&name("config"), &admins()), DocumentKind::AppSettings);
        assert_eq!(DocumentKind::classify(&name("admins"), &admins()), DocumentKind::AdminList);
        assert_eq!(DocumentKind::classify(&name("dataset_access"), &admins()), DocumentKind::DatasetAccess);
        assert_eq!(DocumentKind::classify(&name("help_content"), &admins()), DocumentKind::HelpContent);
        assert_eq!(DocumentKind::classify(&name("misc"), &admins()), DocumentKind::Opaque);
        assert_eq!(DocumentKind::classify(&name("staff"), &name("staff")), DocumentKind::AdminList);
    }

    #[test]
    fn scalars_are_rejected_for_every_kind() {
        for kind in [DocumentKind::Opaque, DocumentKind::AdminList, DocumentKind::HelpContent] {
            assert_eq!(ConfigDocument::parse(kind, &json!(42)), Err(ShapeError::NotContainer));
            assert_eq!(ConfigDocument::parse(kind, &json!("text")), Err(ShapeError::NotContainer));
            assert_eq!(ConfigDocument::parse(kind, &Value::Null), Err(ShapeError::NotContainer));
        }
        assert!(ConfigDocument::parse(DocumentKind::Opaque, &json!([1, 2])).is_ok());
    }

    #[test]
    fn admin_list_rules() {
        let ok = ConfigDocument::parse(DocumentKind::AdminList, &json!({"admins": ["alice", "bob"]})).unwrap();
        assert_eq!(ok.kind(), DocumentKind::AdminList);
        assert_eq!(
            ConfigDocument::parse(DocumentKind::AdminList, &json!({"admins": []})),
            Err(ShapeError::EmptyAdminList)
        );
        assert_eq!(
            ConfigDocument::parse(DocumentKind::AdminList, &json!({"admins": ["alice", "alice"]})),
            Err(ShapeError::DuplicateAdmin("alice".into()))
        );
        assert_eq!(
            ConfigDocument::parse(DocumentKind::AdminList, &json!({"admins": ["alice", " "]})),
            Err(ShapeError::BlankAdmin)
        );
        assert_eq!(
            ConfigDocument::parse(DocumentKind::AdminList, &json!({"admins": ["alice", " bob"]})),
            Err(ShapeError::UntrimmedAdmin(" bob".into()))
        );
        assert!(matches!(
            ConfigDocument::parse(DocumentKind::AdminList, &json!(["alice"])),
            Err(ShapeError::Invalid { kind: DocumentKind::AdminList, .. })
        ));
    }

    #[test]
    fn app_settings_shape() {
        let doc = json!({
            "app": {
                "search": {"cooldownTime": 5},
                "files": {"maxToShow": 100},
                "api": {"timeout": 30},
                "info": {"lastUpdated": "2024-01-01"}
            },
            "savedSearches": [{"name": "n", "tab": "t", "category": "c", "query": "q", "officialOnly": true}],
            "tabs": {"dune": {"categories": [{"name": "Raw", "namespace": "dune"}]}},
            "extra": "kept"
        });
        match ConfigDocument::parse(DocumentKind::AppSettings, &doc).unwrap() {
            ConfigDocument::AppSettings(s) => {
                assert_eq!(s.app.files.max_to_show, 100);
                assert_eq!(s.saved_searches.len(), 1);
                assert_eq!(s.tabs["dune"].categories[0].namespace, "dune");
            }
            other => panic!("unexpected {other:?}"),
        }
        let missing_app = json!({"tabs": {}});
        assert!(matches!(
            ConfigDocument::parse(DocumentKind::AppSettings, &missing_app),
            Err(ShapeError::Invalid { kind: DocumentKind::AppSettings, .. })
        ));
    }

    #[test]
    fn dataset_access_and_help_content() {
        let stats = json!({"dune:raw": {"timesAccessed": 3, "lastAccessed": "2024-01-01T00:00:00Z", "locations": ["FNAL"]}});
        assert!(ConfigDocument::parse(DocumentKind::DatasetAccess, &stats).is_ok());
        let negative = json!({"dune:raw": {"timesAccessed": -1, "lastAccessed": "x"}});
        assert!(ConfigDocument::parse(DocumentKind::DatasetAccess, &negative).is_err());

        let help = json!({"title": "Help", "sections": [{"title": "Search", "content": "Type a query"}]});
        assert!(ConfigDocument::parse(DocumentKind::HelpContent, &help).is_ok());
        assert!(ConfigDocument::parse(DocumentKind::HelpContent, &json!({"title": "Help"})).is_err());
    }
}
