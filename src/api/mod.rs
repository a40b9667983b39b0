//! HTTP client for the catalog REST API

pub mod books;
pub mod resource;
pub mod users;

use std::time::Duration;

use reqwest::{header::AUTHORIZATION, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::ApiConfig,
    error::{AppError, AppResult},
    services::session::SessionStore,
};

pub use resource::{Resource, ResourceClient};

/// Whether a request carries the session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Anonymous,
    /// Bearer token required; refused locally when there is no session
    Bearer,
}

/// Thin wrapper around `reqwest` shared by all endpoint clients
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: SessionStore) -> AppResult<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request without a body, decoding the JSON response
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        access: Access,
    ) -> AppResult<T> {
        let request = self.http.request(method.clone(), self.url(path));
        let response = self.dispatch(request, &method, path, access).await?;
        decode(response).await
    }

    /// Request with a JSON body, decoding the JSON response
    pub async fn send<B, T>(&self, method: Method, path: &str, body: &B, access: Access) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.request(method.clone(), self.url(path)).json(body);
        let response = self.dispatch(request, &method, path, access).await?;
        decode(response).await
    }

    /// Request whose response body is ignored
    pub async fn execute(&self, method: Method, path: &str, access: Access) -> AppResult<()> {
        let request = self.http.request(method.clone(), self.url(path));
        self.dispatch(request, &method, path, access).await?;
        Ok(())
    }

    async fn dispatch(
        &self,
        mut request: RequestBuilder,
        method: &Method,
        path: &str,
        access: Access,
    ) -> AppResult<Response> {
        if access == Access::Bearer {
            let token = self.session.token().ok_or_else(|| {
                tracing::debug!(%method, path, "Refusing protected request without a session");
                AppError::Unauthorized {
                    status: None,
                    message: "Login required".to_string(),
                }
            })?;
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, path, "Request failed: {}", e);
            AppError::Network(e.to_string())
        })?;

        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), "API response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::from_status(status, &body))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let body = response
        .text()
        .await
        .map_err(|e| AppError::Network(format!("Failed to read response body: {}", e)))?;

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!("Malformed response body: {}", e);
        AppError::Decode(e.to_string())
    })
}
