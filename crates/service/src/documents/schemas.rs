//! Shapes of the documents the admin panel edits.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::ShapeError;

/// `config.json`: search/UI settings of the catalog front-end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub app: AppSection,
    #[serde(default)]
    pub saved_searches: Vec<SavedSearch>,
    #[serde(default)]
    pub tabs: BTreeMap<String, TabConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSection {
    pub search: SearchSettings,
    pub files: FileSettings,
    pub api: ApiSettings,
    pub info: InfoSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchSettings {
    /// Seconds between two searches.
    pub cooldown_time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileSettings {
    pub max_to_show: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSettings {
    pub timeout: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InfoSettings {
    pub last_updated: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    pub name: String,
    pub tab: String,
    pub category: String,
    pub query: String,
    pub official_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabConfig {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub name: String,
    pub namespace: String,
}

/// The admin list consulted by the access guard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminList {
    pub admins: Vec<String>,
}

impl AdminList {
    /// Entries are compared trimmed, as claims are; hand-edited files may
    /// carry stray whitespace.
    pub fn contains(&self, username: &str) -> bool {
        self.admins.iter().any(|a| a.trim() == username)
    }

    /// At least one admin, no blanks, no surrounding whitespace, no duplicates.
    pub fn check(&self) -> Result<(), ShapeError> {
        if self.admins.is_empty() {
            return Err(ShapeError::EmptyAdminList);
        }
        let mut seen = HashSet::new();
        for admin in &self.admins {
            if admin.trim().is_empty() {
                return Err(ShapeError::BlankAdmin);
            }
            if admin.trim() != admin {
                return Err(ShapeError::UntrimmedAdmin(admin.clone()));
            }
            if !seen.insert(admin.as_str()) {
                return Err(ShapeError::DuplicateAdmin(admin.clone()));
            }
        }
        Ok(())
    }
}

/// `dataset_access.json`: per-dataset access counters keyed by `namespace:name`.
pub type DatasetAccess = BTreeMap<String, DatasetAccessEntry>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatasetAccessEntry {
    pub times_accessed: u64,
    pub last_accessed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
}

/// `help_content.json`: the help dialog text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HelpContent {
    pub title: String,
    pub sections: Vec<HelpSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HelpSection {
    pub title: String,
    pub content: String,
}
