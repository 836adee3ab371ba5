use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::access::{AccessClaim, AccessGuard};
use crate::documents::{ConfigDocument, DocumentKind};
use crate::errors::ServiceError;
use crate::storage::{DocumentName, DocumentStore, StoredDocument, VersionToken};

/// Authorized façade over the document store. Every operation checks the
/// caller first, then validates input, then touches storage; every outcome
/// comes back as a `Result` the transport layer maps to one status.
#[derive(Clone)]
pub struct ConfigService {
    store: Arc<dyn DocumentStore>,
    guard: AccessGuard,
}

impl ConfigService {
    pub fn new(store: Arc<dyn DocumentStore>, admin_document: DocumentName) -> Self {
        let guard = AccessGuard::new(Arc::clone(&store), admin_document);
        Self { store, guard }
    }

    pub fn guard(&self) -> &AccessGuard { &self.guard }

    /// `Unauthorized` unless the caller is on the admin list.
    pub async fn authorize(&self, claim: Option<&AccessClaim>) -> Result<(), ServiceError> {
        if self.guard.is_authorized(claim).await {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized)
        }
    }

    /// Names of all stored documents.
    #[instrument(skip_all, fields(op = "list"))]
    pub async fn handle_list(&self, claim: Option<&AccessClaim>) -> Result<Vec<String>, ServiceError> {
        self.authorize(claim).await?;
        let names = self.store.list().await.map_err(|e| {
            warn!(error = %e, "listing documents failed");
            ServiceError::from(e)
        })?;
        Ok(names.into_iter().map(|n| n.to_string()).collect())
    }

    /// Current content and version of one document.
    #[instrument(skip(self, claim), fields(op = "get"))]
    pub async fn handle_get(&self, claim: Option<&AccessClaim>, name: &str) -> Result<StoredDocument, ServiceError> {
        self.authorize(claim).await?;
        let name = DocumentName::parse(name)?;
        match self.store.read(&name).await {
            Ok(Some(doc)) => Ok(doc),
            Ok(None) => Err(ServiceError::not_found(name.as_str())),
            Err(e) => {
                warn!(document = %name, error = %e, "reading document failed");
                Err(e.into())
            }
        }
    }

    /// The retained previous version of one document.
    #[instrument(skip(self, claim), fields(op = "get_backup"))]
    pub async fn handle_get_backup(&self, claim: Option<&AccessClaim>, name: &str) -> Result<Value, ServiceError> {
        self.authorize(claim).await?;
        let name = DocumentName::parse(name)?;
        match self.store.read_backup(&name).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(ServiceError::NotFound(format!("No backup for configuration file: {name}"))),
            Err(e) => {
                warn!(document = %name, error = %e, "reading backup failed");
                Err(e.into())
            }
        }
    }

    /// Replace a document. `expected` turns the write into compare-and-swap;
    /// without it the last writer wins.
    #[instrument(skip(self, claim, document, expected), fields(op = "put", conditional = expected.is_some()))]
    pub async fn handle_put(
        &self,
        claim: Option<&AccessClaim>,
        name: &str,
        document: Value,
        expected: Option<VersionToken>,
    ) -> Result<VersionToken, ServiceError> {
        self.authorize(claim).await?;
        let name = DocumentName::parse(name)?;
        let kind = DocumentKind::classify(&name, self.guard.admin_document());
        ConfigDocument::parse(kind, &document)?;

        let version = self.store.write_if(&name, &document, expected.as_ref()).await.map_err(|e| {
            warn!(document = %name, error = %e, "writing document failed");
            ServiceError::from(e)
        })?;
        info!(document = %name, %kind, user = claim.map(AccessClaim::username).unwrap_or(""), "document updated");
        Ok(version)
    }

    /// Write the initial admin list if none exists. Returns whether it wrote.
    /// Runs without a caller: it is a startup step, not a request.
    pub async fn seed_admins(&self, admins: &[String]) -> Result<bool, ServiceError> {
        if admins.is_empty() {
            return Ok(false);
        }
        let name = self.guard.admin_document();
        match self.store.read(name).await {
            Ok(Some(_)) => return Ok(false),
            Ok(None) => {}
            // leave a corrupt list for an operator to inspect
            Err(e) => return Err(e.into()),
        }
        let document = serde_json::json!({ "admins": admins });
        ConfigDocument::parse(DocumentKind::AdminList, &document)?;
        self.store.write(name, &document).await?;
        info!(document = %name, count = admins.len(), "seeded admin list");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::fs_document_store::FsDocumentStore;
    use crate::test_support::temp_dir;
    use serde_json::json;

    async fn service() -> anyhow::Result<(ConfigService, Arc<FsDocumentStore>)> {
        let store = FsDocumentStore::open(temp_dir("config_service")).await?;
        store.write(&DocumentName::parse("admins")?, &json!({"admins": ["alice"]})).await?;
        let svc = ConfigService::new(store.clone(), DocumentName::parse("admins.json")?);
        Ok((svc, store))
    }

    fn claim(user: &str) -> Option<AccessClaim> { AccessClaim::new(user) }

    #[tokio::test]
    async fn admin_handoff_scenario() -> anyhow::Result<()> {
        let (svc, _store) = service().await?;
        let alice = claim("alice");
        let bob = claim("bob");

        assert!(svc.guard().is_authorized(alice.as_ref()).await);
        assert!(!svc.guard().is_authorized(bob.as_ref()).await);

        let err = svc.handle_put(bob.as_ref(), "admins.json", json!({"admins": ["bob"]}), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));

        svc.handle_put(alice.as_ref(), "admins.json", json!({"admins": ["alice", "bob"]}), None).await?;
        assert!(svc.guard().is_authorized(bob.as_ref()).await);
        Ok(())
    }

    #[tokio::test]
    async fn first_run_config_scenario() -> anyhow::Result<()> {
        let (svc, _store) = service().await?;
        let alice = claim("alice");

        let err = svc.handle_get(alice.as_ref(), "config").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        // config.json is app settings and must carry the `app` section
        let err = svc.handle_put(alice.as_ref(), "config", json!({"x": 1}), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));

        svc.handle_put(alice.as_ref(), "scratch", json!({"x": 1}), None).await?;
        assert_eq!(svc.handle_get(alice.as_ref(), "scratch").await?.value, json!({"x": 1}));
        svc.handle_put(alice.as_ref(), "scratch", json!({"x": 2}), None).await?;
        assert_eq!(svc.handle_get(alice.as_ref(), "scratch").await?.value, json!({"x": 2}));
        assert_eq!(svc.handle_get_backup(alice.as_ref(), "scratch").await?, json!({"x": 1}));
        Ok(())
    }

    #[tokio::test]
    async fn unauthorized_precedes_validation() -> anyhow::Result<()> {
        let (svc, _store) = service().await?;
        let err = svc.handle_get(None, "../etc/passwd").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));
        let err = svc.handle_list(claim("mallory").as_ref()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));
        Ok(())
    }

    #[tokio::test]
    async fn bad_shapes_leave_store_untouched() -> anyhow::Result<()> {
        let (svc, store) = service().await?;
        let alice = claim("alice");
        for body in [json!(1), json!("str"), json!(true), Value::Null] {
            let err = svc.handle_put(alice.as_ref(), "scratch", body, None).await.unwrap_err();
            assert!(matches!(err, ServiceError::BadRequest(_)));
        }
        let err = svc.handle_put(alice.as_ref(), "admins", json!({"admins": []}), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
        let err = svc.handle_put(alice.as_ref(), "a/b", json!({}), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));

        assert!(store.read(&DocumentName::parse("scratch")?).await?.is_none());
        assert!(store.read_backup(&DocumentName::parse("admins")?).await?.is_none());
        assert_eq!(svc.handle_list(alice.as_ref()).await?, vec!["admins.json".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() -> anyhow::Result<()> {
        let (svc, _store) = service().await?;
        let alice = claim("alice");
        let v1 = svc.handle_put(alice.as_ref(), "help_content", json!({"title": "Help", "sections": []}), None).await?;
        let read = svc.handle_get(alice.as_ref(), "help_content").await?;
        assert_eq!(read.version, v1);

        svc.handle_put(alice.as_ref(), "help_content", json!({"title": "Help v2", "sections": []}), Some(v1.clone())).await?;
        let err = svc
            .handle_put(alice.as_ref(), "help_content", json!({"title": "Help v3", "sections": []}), Some(v1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(svc.handle_get(alice.as_ref(), "help_content").await?.value["title"], "Help v2");
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_document_surfaces_as_corrupt() -> anyhow::Result<()> {
        let (svc, store) = service().await?;
        tokio::fs::write(store.root().join("scratch.json"), b"{oops").await?;
        let err = svc.handle_get(claim("alice").as_ref(), "scratch").await.unwrap_err();
        assert!(matches!(err, ServiceError::CorruptDocument(_)));
        assert_eq!(err.status_code(), 500);
        Ok(())
    }

    #[tokio::test]
    async fn seeds_only_when_missing() -> anyhow::Result<()> {
        let store = FsDocumentStore::open(temp_dir("config_service_seed")).await?;
        let svc = ConfigService::new(store.clone(), DocumentName::parse("admins")?);
        assert!(!svc.seed_admins(&[]).await?);
        assert!(svc.seed_admins(&["root".to_string()]).await?);
        assert!(!svc.seed_admins(&["other".to_string()]).await?);
        assert!(svc.guard().is_authorized(claim("root").as_ref()).await);
        assert!(!svc.guard().is_authorized(claim("other").as_ref()).await);
        Ok(())
    }
}
