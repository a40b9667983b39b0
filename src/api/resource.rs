//! Generic CRUD client for a server-managed resource collection

use std::marker::PhantomData;

use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::AppResult;

use super::{Access, ApiClient};

/// A record type served under a collection path such as `books`
pub trait Resource: DeserializeOwned + Send {
    /// Collection path relative to the API base URL
    const COLLECTION: &'static str;

    /// Representation sent on create and update
    type Draft: Serialize + Sync;

    fn id(&self) -> &str;
}

/// `list`, `get`, `create`, `update` and `remove` for one resource type.
///
/// Mutations require a session; reads are anonymous. Update replaces the
/// whole record.
pub struct ResourceClient<R: Resource> {
    api: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", R::COLLECTION, id)
    }

    pub async fn list(&self) -> AppResult<Vec<R>> {
        self.api
            .fetch(Method::GET, R::COLLECTION, Access::Anonymous)
            .await
    }

    pub async fn get(&self, id: &str) -> AppResult<R> {
        self.api
            .fetch(Method::GET, &Self::item_path(id), Access::Anonymous)
            .await
    }

    pub async fn create(&self, draft: &R::Draft) -> AppResult<R> {
        let created: R = self
            .api
            .send(Method::POST, R::COLLECTION, draft, Access::Bearer)
            .await?;
        tracing::info!(collection = R::COLLECTION, id = created.id(), "Record created");
        Ok(created)
    }

    pub async fn update(&self, id: &str, draft: &R::Draft) -> AppResult<R> {
        let updated: R = self
            .api
            .send(Method::PUT, &Self::item_path(id), draft, Access::Bearer)
            .await?;
        tracing::info!(collection = R::COLLECTION, id, "Record replaced");
        Ok(updated)
    }

    pub async fn remove(&self, id: &str) -> AppResult<()> {
        self.api
            .execute(Method::DELETE, &Self::item_path(id), Access::Bearer)
            .await?;
        tracing::info!(collection = R::COLLECTION, id, "Record deleted");
        Ok(())
    }
}
