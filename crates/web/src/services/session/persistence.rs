//! Where the signed-in identity survives between page loads.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tower_sessions::Session;

use super::PersistenceError;
use crate::models::{UserIdentity, session_keys};

/// Storage for the persisted identity.
pub trait IdentityPersistence: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<Option<UserIdentity>, PersistenceError>> + Send;

    fn save(
        &self,
        identity: &UserIdentity,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    fn clear(&self) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

/// The browser session, under [`session_keys::USER`].
impl IdentityPersistence for Session {
    async fn load(&self) -> Result<Option<UserIdentity>, PersistenceError> {
        Ok(self.get::<UserIdentity>(session_keys::USER).await?)
    }

    async fn save(&self, identity: &UserIdentity) -> Result<(), PersistenceError> {
        self.insert(session_keys::USER, identity).await?;
        // New privilege level, new session ID.
        self.cycle_id().await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        self.remove::<UserIdentity>(session_keys::USER).await?;
        Ok(())
    }
}

/// In-process storage, for callers without a browser session.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    slot: Arc<Mutex<Option<UserIdentity>>>,
}

impl MemoryPersistence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an identity already stored.
    #[must_use]
    pub fn with_identity(identity: UserIdentity) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(identity))),
        }
    }

    /// The currently stored identity.
    #[must_use]
    pub fn stored(&self) -> Option<UserIdentity> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, value: Option<UserIdentity>) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }
}

impl IdentityPersistence for MemoryPersistence {
    async fn load(&self) -> Result<Option<UserIdentity>, PersistenceError> {
        Ok(self.stored())
    }

    async fn save(&self, identity: &UserIdentity) -> Result<(), PersistenceError> {
        self.replace(Some(identity.clone()));
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        self.replace(None);
        Ok(())
    }
}
