use std::fmt;
use std::str::FromStr;

use crate::errors::NameError;

pub const DOCUMENT_EXTENSION: &str = ".json";
pub const BACKUP_SUFFIX: &str = ".bak";
const MAX_NAME_LEN: usize = 255;

/// A validated document file name: a single path component ending in
/// `.json`, never hidden, never a backup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentName(String);

impl DocumentName {
    /// Canonicalize `raw`, appending `.json` when missing.
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
            return Err(NameError::IllegalCharacter);
        }
        // also rejects "." and ".."
        if name.starts_with('.') {
            return Err(NameError::Hidden);
        }
        if name.ends_with(BACKUP_SUFFIX) {
            return Err(NameError::ReservedSuffix);
        }
        let file = if name.ends_with(DOCUMENT_EXTENSION) {
            name.to_string()
        } else {
            format!("{name}{DOCUMENT_EXTENSION}")
        };
        if file.len() > MAX_NAME_LEN {
            return Err(NameError::TooLong(MAX_NAME_LEN));
        }
        Ok(Self(file))
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// File name of the sibling backup, e.g. `config.json.bak`.
    pub fn backup_file_name(&self) -> String { format!("{}{}", self.0, BACKUP_SUFFIX) }

    pub fn stem(&self) -> &str {
        self.0.strip_suffix(DOCUMENT_EXTENSION).unwrap_or(&self.0)
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl FromStr for DocumentName {
    type Err = NameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl AsRef<str> for DocumentName {
    fn as_ref(&self) -> &str { &self.0 }
}
