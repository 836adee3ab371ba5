use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::AccessClaim;
use crate::documents::AdminList;
use crate::storage::{DocumentName, DocumentStore};

/// Authorizes callers against the admin-list document. The list is read
/// from the store on every check; any failure to obtain a valid list
/// denies access.
#[derive(Clone)]
pub struct AccessGuard {
    store: Arc<dyn DocumentStore>,
    admin_document: DocumentName,
}

impl AccessGuard {
    pub fn new(store: Arc<dyn DocumentStore>, admin_document: DocumentName) -> Self {
        Self { store, admin_document }
    }

    pub fn admin_document(&self) -> &DocumentName { &self.admin_document }

    #[instrument(skip_all, fields(user = claim.map(AccessClaim::username).unwrap_or("")))]
    pub async fn is_authorized(&self, claim: Option<&AccessClaim>) -> bool {
        let Some(claim) = claim else {
            debug!("no caller identity supplied");
            return false;
        };
        let Some(admins) = self.load_admins().await else {
            return false;
        };
        let allowed = admins.contains(claim.username());
        debug!(allowed, "admin membership checked");
        allowed
    }

    async fn load_admins(&self) -> Option<AdminList> {
        let doc = match self.store.read(&self.admin_document).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                warn!(document = %self.admin_document, "admin list missing; denying");
                return None;
            }
            Err(e) => {
                warn!(document = %self.admin_document, error = %e, "admin list unreadable; denying");
                return None;
            }
        };
        match serde_json::from_value::<AdminList>(doc.value) {
            Ok(list) => Some(list),
            Err(e) => {
                warn!(document = %self.admin_document, error = %e, "admin list has wrong shape; denying");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::fs_document_store::FsDocumentStore;
    use crate::test_support::temp_dir;
    use serde_json::json;

    async fn guard_with(admins: Option<&[u8]>) -> anyhow::Result<AccessGuard> {
        let store = FsDocumentStore::open(temp_dir("guard")).await?;
        if let Some(bytes) = admins {
            tokio::fs::write(store.root().join("admins.json"), bytes).await?;
        }
        Ok(AccessGuard::new(store, DocumentName::parse("admins.json")?))
    }

    #[tokio::test]
    async fn members_only() -> anyhow::Result<()> {
        let guard = guard_with(Some(br#"{"admins":["alice"]}"#)).await?;
        assert!(guard.is_authorized(AccessClaim::new("alice").as_ref()).await);
        assert!(!guard.is_authorized(AccessClaim::new("bob").as_ref()).await);
        assert!(!guard.is_authorized(AccessClaim::new("").as_ref()).await);
        assert!(!guard.is_authorized(None).await);
        Ok(())
    }

    #[tokio::test]
    async fn fails_closed_without_valid_list() -> anyhow::Result<()> {
        let alice = AccessClaim::new("alice");
        assert!(!guard_with(None).await?.is_authorized(alice.as_ref()).await);
        assert!(!guard_with(Some(b"{broken")).await?.is_authorized(alice.as_ref()).await);
        assert!(!guard_with(Some(br#"["alice"]"#)).await?.is_authorized(alice.as_ref()).await);
        Ok(())
    }

    #[tokio::test]
    async fn hand_edited_entries_match_trimmed_claims() -> anyhow::Result<()> {
        let guard = guard_with(Some(br#"{"admins":[" alice ", "bob"]}"#)).await?;
        assert!(guard.is_authorized(AccessClaim::new("alice").as_ref()).await);
        assert!(guard.is_authorized(AccessClaim::new(" alice").as_ref()).await);
        assert!(!guard.is_authorized(AccessClaim::new("carol").as_ref()).await);
        Ok(())
    }

    #[tokio::test]
    async fn sees_admin_list_changes_immediately() -> anyhow::Result<()> {
        let store = FsDocumentStore::open(temp_dir("guard_live")).await?;
        let admins = DocumentName::parse("admins")?;
        store.write(&admins, &json!({"admins": ["alice"]})).await?;
        let guard = AccessGuard::new(store.clone(), admins.clone());
        let bob = AccessClaim::new("bob");
        assert!(!guard.is_authorized(bob.as_ref()).await);
        store.write(&admins, &json!({"admins": ["alice", "bob"]})).await?;
        assert!(guard.is_authorized(bob.as_ref()).await);
        Ok(())
    }
}
