//! Process-wide session store
//!
//! Holds the session returned by login or signup. The store is the only
//! place that decides whether the client is authenticated; the router and
//! the API client both read it through a cloned handle.

use std::sync::{Arc, PoisonError, RwLock};

use crate::{error::AppResult, models::user::Session};

use super::storage::{MemoryStorage, SessionStorage};

#[derive(Clone)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Session>>>,
    storage: Arc<dyn SessionStorage>,
    key: Arc<str>,
}

impl SessionStore {
    /// Restore the persisted session, if any, from `storage` under `key`
    pub fn load(storage: Arc<dyn SessionStorage>, key: &str) -> AppResult<Self> {
        let session = match storage.get_item(key)? {
            Some(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => {
                    tracing::info!("Restored session for {}", session.display_name().unwrap_or("unknown user"));
                    Some(session)
                }
                Err(e) => {
                    tracing::warn!("Discarding unreadable stored session: {}", e);
                    storage.remove_item(key)?;
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            current: Arc::new(RwLock::new(session)),
            storage,
            key: Arc::from(key),
        })
    }

    /// Empty store that persists nothing
    pub fn in_memory() -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            storage: Arc::new(MemoryStorage::new()),
            key: Arc::from("user"),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Persist and publish a new session. On a storage failure the store is left unchanged.
    pub fn set(&self, session: Session) -> AppResult<()> {
        let raw = serde_json::to_string(&session)?;

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        self.storage.set_item(&self.key, &raw)?;
        tracing::info!("Session started for {}", session.display_name().unwrap_or("unknown user"));
        *current = Some(session);
        Ok(())
    }

    /// Drop the session. Memory is always cleared; a failure to remove the
    /// persisted copy is still reported.
    pub fn clear(&self) -> AppResult<()> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = None;
        tracing::info!("Session cleared");
        self.storage.remove_item(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::storage::MockSessionStorage;
    use mockall::predicate::eq;

    #[test]
    fn test_load_restores_persisted_session() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_item("user", r#"{"token":"t1","email":"a@b.com"}"#)
            .unwrap();

        let store = SessionStore::load(storage, "user").unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("t1"));
        assert_eq!(store.current().unwrap().email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_load_discards_invalid_session() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item("user", r#"{"email":"a@b.com"}"#).unwrap();

        let store = SessionStore::load(storage.clone(), "user").unwrap();
        assert!(!store.is_authenticated());
        assert_eq!(storage.get_item("user").unwrap(), None);
    }

    #[test]
    fn test_set_and_clear_are_shared_between_handles() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::load(storage.clone(), "user").unwrap();
        let handle = store.clone();

        store.set(Session::new("t1").with_email("a@b.com")).unwrap();
        assert!(handle.is_authenticated());
        assert!(storage.get_item("user").unwrap().unwrap().contains("\"t1\""));

        // A copy taken before logout does not keep the store authenticated
        let stale = handle.current();
        handle.clear().unwrap();
        assert!(stale.is_some());
        assert!(!store.is_authenticated());
        assert_eq!(storage.get_item("user").unwrap(), None);
    }

    #[test]
    fn test_failed_persist_leaves_store_unchanged() {
        let mut storage = MockSessionStorage::new();
        storage.expect_get_item().returning(|_| Ok(None));
        storage
            .expect_set_item()
            .with(eq("user"), mockall::predicate::always())
            .times(1)
            .returning(|_, _| Err(AppError::Storage("disk full".into())));

        let store = SessionStore::load(Arc::new(storage), "user").unwrap();
        let result = store.set(Session::new("t1"));

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clear_forgets_session_even_when_storage_fails() {
        let mut storage = MockSessionStorage::new();
        storage
            .expect_get_item()
            .returning(|_| Ok(Some(r#"{"token":"t1"}"#.to_string())));
        storage
            .expect_remove_item()
            .with(eq("user"))
            .times(1)
            .returning(|_| Err(AppError::Storage("read-only".into())));

        let store = SessionStore::load(Arc::new(storage), "user").unwrap();
        assert!(store.is_authenticated());

        assert!(store.clear().is_err());
        assert!(!store.is_authenticated());
    }
}
