//! Signup, login and logout

use crate::{
    api::users::UsersClient,
    error::AppResult,
    models::user::{LoginRequest, Session, SignupRequest},
};

use super::session::SessionStore;

/// Moves the client between the anonymous and authenticated states
#[derive(Clone)]
pub struct AuthService {
    users: UsersClient,
    session: SessionStore,
}

impl AuthService {
    pub fn new(users: UsersClient, session: SessionStore) -> Self {
        Self { users, session }
    }

    /// Register and keep the returned session
    pub async fn signup(&self, request: &SignupRequest) -> AppResult<Session> {
        let session = self.users.signup(request).await?;
        self.session.set(session.clone())?;
        Ok(session)
    }

    /// Log in and keep the returned session
    pub async fn login(&self, request: &LoginRequest) -> AppResult<Session> {
        let session = self.users.login(request).await?;
        self.session.set(session.clone())?;
        Ok(session)
    }

    pub fn logout(&self) -> AppResult<()> {
        self.session.clear()
    }
}
