//! Client-side services

pub mod auth;
pub mod session;
pub mod storage;

use std::sync::Arc;

use crate::{
    api::{books::BooksClient, users::UsersClient, ApiClient},
    config::AppConfig,
    error::AppResult,
};

use session::SessionStore;
use storage::FileStorage;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub session: SessionStore,
    pub books: BooksClient,
    pub auth: auth::AuthService,
}

impl Services {
    /// Create all services around an existing session store
    pub fn new(config: &AppConfig, session: SessionStore) -> AppResult<Self> {
        let api = ApiClient::new(&config.api, session.clone())?;

        Ok(Self {
            books: BooksClient::new(api.clone()),
            auth: auth::AuthService::new(UsersClient::new(api), session.clone()),
            session,
        })
    }

    /// Create all services, restoring the session persisted on disk
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let storage = Arc::new(FileStorage::new(&config.storage.path));
        let session = SessionStore::load(storage, &config.storage.session_key)?;
        Self::new(config, session)
    }
}
