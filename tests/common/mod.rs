//! In-process fake of the catalog API used by the integration tests

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use book_library::{
    config::AppConfig,
    services::{session::SessionStore, Services},
};

const REQUIRED_BOOK_FIELDS: [&str; 5] = ["title", "author", "isbn", "publisher", "genre"];

#[derive(Default)]
struct Inner {
    books: BTreeMap<String, Value>,
    next_id: u64,
    requests: usize,
    tokens: HashSet<String>,
    /// email -> (password, session returned on login)
    users: HashMap<String, (String, Value)>,
    malformed_list: bool,
}

#[derive(Clone, Default)]
pub struct FakeCatalog {
    inner: Arc<Mutex<Inner>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account `a@b.com` / `x` whose login answers `{token: "t1", email: "a@b.com"}`
    pub fn with_member(self) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.users.insert(
                "a@b.com".to_string(),
                ("x".to_string(), json!({ "token": "t1", "email": "a@b.com" })),
            );
        }
        self
    }

    pub fn seed_book(&self, title: &str) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = format!("b{}", inner.next_id);
        inner.books.insert(
            id.clone(),
            json!({
                "_id": id,
                "title": title,
                "author": "Ursula K. Le Guin",
                "isbn": "9780441478125",
                "publisher": "Ace",
                "genre": "Science fiction",
                "availability": { "isAvailable": true },
                "__v": 0
            }),
        );
        id
    }

    pub fn request_count(&self) -> usize {
        self.inner.lock().unwrap().requests
    }

    pub fn book_count(&self) -> usize {
        self.inner.lock().unwrap().books.len()
    }

    pub fn set_malformed_list(&self, malformed: bool) {
        self.inner.lock().unwrap().malformed_list = malformed;
    }

    fn record(&self) {
        self.inner.lock().unwrap().requests += 1;
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        match token {
            Some(token) => self.inner.lock().unwrap().tokens.contains(token),
            None => false,
        }
    }

    /// Serve on an ephemeral port and return the API base URL
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/api/books", get(list_books).post(create_book))
            .route(
                "/api/books/:id",
                get(get_book).put(update_book).delete(delete_book),
            )
            .route("/api/users/signup", post(signup))
            .route("/api/users/login", post(login))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }
}

/// Services pointed at `base_url` with an in-memory session
pub fn services(base_url: &str) -> Services {
    let mut config = AppConfig::default();
    config.api.base_url = base_url.to_string();
    Services::new(&config, SessionStore::in_memory()).unwrap()
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn missing_fields(body: &Value) -> Vec<&'static str> {
    REQUIRED_BOOK_FIELDS
        .iter()
        .copied()
        .filter(|f| body.get(*f).and_then(Value::as_str).map_or(true, str::is_empty))
        .collect()
}

async fn list_books(State(catalog): State<FakeCatalog>) -> Response {
    catalog.record();
    let inner = catalog.inner.lock().unwrap();
    if inner.malformed_list {
        return (StatusCode::OK, "[{\"_id\": ").into_response();
    }
    Json(inner.books.values().cloned().collect::<Vec<_>>()).into_response()
}

async fn get_book(State(catalog): State<FakeCatalog>, Path(id): Path<String>) -> Response {
    catalog.record();
    if id == "slow" {
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    let inner = catalog.inner.lock().unwrap();
    match inner.books.get(&id) {
        Some(book) => Json(book.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Book not found"),
    }
}

async fn create_book(
    State(catalog): State<FakeCatalog>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    catalog.record();
    if !catalog.authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Request is not authorized");
    }
    let missing = missing_fields(&body);
    if !missing.is_empty() {
        return error(
            StatusCode::BAD_REQUEST,
            &format!("Missing fields: {}", missing.join(", ")),
        );
    }

    let mut inner = catalog.inner.lock().unwrap();
    inner.next_id += 1;
    let id = format!("b{}", inner.next_id);
    body["_id"] = json!(id);
    inner.books.insert(id, body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_book(
    State(catalog): State<FakeCatalog>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    catalog.record();
    if !catalog.authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Request is not authorized");
    }
    let missing = missing_fields(&body);
    if !missing.is_empty() {
        return error(
            StatusCode::BAD_REQUEST,
            &format!("Missing fields: {}", missing.join(", ")),
        );
    }

    let mut inner = catalog.inner.lock().unwrap();
    if !inner.books.contains_key(&id) {
        return error(StatusCode::NOT_FOUND, "Book not found");
    }
    body["_id"] = json!(id);
    inner.books.insert(id, body.clone());
    Json(body).into_response()
}

async fn delete_book(
    State(catalog): State<FakeCatalog>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    catalog.record();
    if !catalog.authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Request is not authorized");
    }
    let mut inner = catalog.inner.lock().unwrap();
    match inner.books.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => error(StatusCode::NOT_FOUND, "Book not found"),
    }
}

async fn signup(State(catalog): State<FakeCatalog>, Json(body): Json<Value>) -> Response {
    catalog.record();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    if email.is_empty() || password.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Email and password are required");
    }

    let mut inner = catalog.inner.lock().unwrap();
    if inner.users.contains_key(&email) {
        return error(StatusCode::BAD_REQUEST, "Email already in use");
    }
    let token = format!("token-{}", inner.users.len() + 1);
    let session = json!({ "token": token, "email": email, "name": body["name"] });
    inner.tokens.insert(token);
    inner.users.insert(email, (password, session.clone()));
    (StatusCode::CREATED, Json(session)).into_response()
}

async fn login(State(catalog): State<FakeCatalog>, Json(body): Json<Value>) -> Response {
    catalog.record();
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let mut inner = catalog.inner.lock().unwrap();
    let session = match inner.users.get(email) {
        Some((expected, session)) if expected == password => session.clone(),
        _ => return error(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    };
    if let Some(token) = session["token"].as_str() {
        inner.tokens.insert(token.to_string());
    }
    Json(session).into_response()
}
