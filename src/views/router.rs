//! Path routing and session gating

use std::fmt;

use crate::services::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    AddBook,
    Book(String),
    EditBook(String),
    Signup,
    Login,
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let clean = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = clean.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["add-book"] => Route::AddBook,
            ["books", id] => Route::Book(id.to_string()),
            ["edit-book", id] => Route::EditBook(id.to_string()),
            ["signup"] => Route::Signup,
            ["login"] => Route::Login,
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::AddBook => "/add-book".to_string(),
            Route::Book(id) => format!("/books/{}", id),
            Route::EditBook(id) => format!("/edit-book/{}", id),
            Route::Signup => "/signup".to_string(),
            Route::Login => "/login".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Needs an authenticated session to render
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::AddBook | Route::EditBook(_))
    }

    /// Only meaningful without a session
    pub fn is_guest_only(&self) -> bool {
        matches!(self, Route::Signup | Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(Route),
    Redirect { from: Route, to: Route },
}

impl Resolution {
    /// Route that ends up on screen
    pub fn route(&self) -> &Route {
        match self {
            Resolution::Render(route) => route,
            Resolution::Redirect { to, .. } => to,
        }
    }
}

#[derive(Clone)]
pub struct Router {
    session: SessionStore,
}

impl Router {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Read from the session store on every call, never cached
    pub fn auth_state(&self) -> AuthState {
        if self.session.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        }
    }

    pub fn resolve(&self, path: &str) -> Resolution {
        let route = Route::parse(path);
        let state = self.auth_state();

        let resolution = match state {
            AuthState::Anonymous if route.is_protected() => Resolution::Redirect {
                from: route,
                to: Route::Signup,
            },
            AuthState::Authenticated if route.is_guest_only() => Resolution::Redirect {
                from: route,
                to: Route::Home,
            },
            _ => Resolution::Render(route),
        };

        if let Resolution::Redirect { from, to } = &resolution {
            tracing::debug!(?state, "Redirecting {} to {}", from, to);
        }
        resolution
    }
}
