//! User account endpoints

use reqwest::Method;

use crate::{
    error::AppResult,
    models::user::{LoginRequest, Session, SignupRequest},
};

use super::{Access, ApiClient};

#[derive(Clone)]
pub struct UsersClient {
    api: ApiClient,
}

impl UsersClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Register a new member; the server answers with a session
    pub async fn signup(&self, request: &SignupRequest) -> AppResult<Session> {
        self.api
            .send(Method::POST, "users/signup", request, Access::Anonymous)
            .await
    }

    pub async fn login(&self, request: &LoginRequest) -> AppResult<Session> {
        self.api
            .send(Method::POST, "users/login", request, Access::Anonymous)
            .await
    }
}
