use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::storage::{DocumentName, DocumentStore, StoredDocument, VersionToken, DOCUMENT_EXTENSION};

/// Directory-backed document store: one pretty-printed JSON file per
/// document, plus a `<name>.bak` sibling holding the previous version.
///
/// Writes are serialized per store instance so the backup always captures
/// a complete file; reads never wait on them. Replacement goes through a
/// hidden temp file and a rename.
pub struct FsDocumentStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FsDocumentStore {
    /// Store rooted at `root`. Does not touch the filesystem.
    pub fn new<P: Into<PathBuf>>(root: P) -> Arc<Self> {
        Arc::new(Self { root: root.into(), write_lock: Mutex::new(()) })
    }

    /// Like `new`, creating the directory first.
    pub async fn open<P: Into<PathBuf>>(root: P) -> Result<Arc<Self>, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path { &self.root }

    fn path_of(&self, name: &DocumentName) -> PathBuf { self.root.join(name.as_str()) }

    fn backup_path_of(&self, name: &DocumentName) -> PathBuf { self.root.join(name.backup_file_name()) }

    fn temp_path_of(&self, name: &DocumentName) -> PathBuf {
        self.root.join(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
    }

    async fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn replace(tmp: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(tmp, target).await
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn list(&self) -> Result<Vec<DocumentName>, StoreError> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else { continue };
            if !file_name.ends_with(DOCUMENT_EXTENSION) {
                continue;
            }
            match DocumentName::parse(file_name) {
                Ok(name) if name.as_str() == file_name => names.push(name),
                _ => debug!(file = file_name, "skipping file with non-canonical name"),
            }
        }
        names.sort();
        Ok(names)
    }

    #[instrument(skip(self), fields(document = %name))]
    async fn read(&self, name: &DocumentName) -> Result<Option<StoredDocument>, StoreError> {
        let Some(bytes) = Self::read_bytes(&self.path_of(name)).await? else {
            debug!("document not found");
            return Ok(None);
        };
        let value = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(error = %e, "document is not valid JSON");
            StoreError::Corrupt(name.to_string())
        })?;
        Ok(Some(StoredDocument { value, version: VersionToken::of(&bytes) }))
    }

    #[instrument(skip(self, document, expected), fields(document = %name, conditional = expected.is_some()))]
    async fn write_if(
        &self,
        name: &DocumentName,
        document: &Value,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken, StoreError> {
        let bytes = serde_json::to_vec_pretty(document)?;

        let _guard = self.write_lock.lock().await;
        let path = self.path_of(name);
        let current = Self::read_bytes(&path).await?;

        if let Some(expected) = expected {
            let current_version = current.as_deref().map(VersionToken::of);
            if current_version.as_ref() != Some(expected) {
                warn!(expected = %expected, "rejecting write with stale version");
                return Err(StoreError::VersionConflict { name: name.to_string(), expected: expected.to_string() });
            }
        }

        if let Some(previous) = &current {
            match fs::write(self.backup_path_of(name), previous).await {
                Ok(()) => debug!(bytes = previous.len(), "backup written"),
                Err(e) => warn!(error = %e, "backup failed; continuing with write"),
            }
        }

        let tmp = self.temp_path_of(name);
        if let Err(e) = Self::replace(&tmp, &path, &bytes).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        let version = VersionToken::of(&bytes);
        info!(bytes = bytes.len(), version = %version, created = current.is_none(), "document written");
        Ok(version)
    }

    #[instrument(skip(self), fields(document = %name))]
    async fn read_backup(&self, name: &DocumentName) -> Result<Option<Value>, StoreError> {
        let Some(bytes) = Self::read_bytes(&self.backup_path_of(name)).await? else {
            return Ok(None);
        };
        let value = serde_json::from_slice(&bytes).map_err(|_| StoreError::Corrupt(name.backup_file_name()))?;
        Ok(Some(value))
    }
}
