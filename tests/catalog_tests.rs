//! Resource client and authentication against the fake catalog API

mod common;

use book_library::{
    error::AppError,
    models::{
        book::{Availability, BookDraft},
        user::{LoginRequest, Session, SignupRequest},
    },
    services::Services,
};
use common::{services, FakeCatalog};
use tokio_test::{assert_err, assert_ok};

async fn login(services: &Services) {
    services
        .auth
        .login(&LoginRequest {
            email: "a@b.com".into(),
            password: "x".into(),
        })
        .await
        .unwrap();
}

fn draft(title: &str) -> BookDraft {
    BookDraft {
        title: title.to_string(),
        author: "Octavia E. Butler".to_string(),
        isbn: "9780446675505".to_string(),
        publisher: "Grand Central".to_string(),
        genre: "Science fiction".to_string(),
        availability: Availability::default(),
    }
}

#[tokio::test]
async fn test_list_books_is_anonymous() {
    let catalog = FakeCatalog::new();
    catalog.seed_book("The Dispossessed");
    catalog.seed_book("The Lathe of Heaven");
    let services = services(&catalog.spawn().await);

    let books = assert_ok!(services.books.list().await);
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].title, "The Dispossessed");
    assert!(books[0].availability.is_available);
}

#[tokio::test]
async fn test_create_then_get_returns_submitted_fields() {
    let catalog = FakeCatalog::new().with_member();
    let services = services(&catalog.spawn().await);
    login(&services).await;

    let mut submitted = draft("Kindred");
    submitted.availability = Availability {
        is_available: false,
        due_date: Some("2024-09-01".into()),
        borrower: Some("Dana".into()),
    };

    let created = services.books.create(&submitted).await.unwrap();
    assert!(!created.id.is_empty());

    let fetched = services.books.get(&created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.to_draft(), submitted);
}

#[tokio::test]
async fn test_update_replaces_the_whole_record() {
    let catalog = FakeCatalog::new().with_member();
    let services = services(&catalog.spawn().await);
    login(&services).await;

    let mut original = draft("Parable of the Sower");
    original.availability = Availability {
        is_available: false,
        due_date: Some("2024-09-01".into()),
        borrower: Some("Lauren".into()),
    };
    let created = services.books.create(&original).await.unwrap();

    let replacement = draft("Parable of the Talents");
    services.books.update(&created.id, &replacement).await.unwrap();

    let fetched = services.books.get(&created.id).await.unwrap();
    assert_eq!(fetched.to_draft(), replacement);
    assert_eq!(fetched.availability.borrower, None);
}

#[tokio::test]
async fn test_remove_then_get_is_not_found() {
    let catalog = FakeCatalog::new().with_member();
    let id = catalog.seed_book("The Word for World Is Forest");
    let services = services(&catalog.spawn().await);
    login(&services).await;

    assert_ok!(services.books.remove(&id).await);
    assert!(matches!(services.books.get(&id).await, Err(AppError::NotFound(_))));
    assert!(matches!(services.books.remove(&id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_mutations_without_session_are_refused_locally() {
    let catalog = FakeCatalog::new();
    let id = catalog.seed_book("Always Coming Home");
    let services = services(&catalog.spawn().await);

    assert!(matches!(
        services.books.create(&draft("Lilith's Brood")).await,
        Err(AppError::Unauthorized { .. })
    ));
    assert!(matches!(
        services.books.update(&id, &draft("x")).await,
        Err(AppError::Unauthorized { .. })
    ));
    assert!(matches!(services.books.remove(&id).await, Err(AppError::Unauthorized { .. })));

    let err = assert_err!(services.books.remove(&id).await);
    assert_eq!(err.status(), None);

    assert_eq!(catalog.request_count(), 0);
    assert_eq!(catalog.book_count(), 1);
}

#[tokio::test]
async fn test_update_of_unknown_book_is_not_found() {
    let catalog = FakeCatalog::new().with_member();
    let services = services(&catalog.spawn().await);
    login(&services).await;

    let err = assert_err!(services.books.update("b404", &draft("Dawn")).await);
    assert!(matches!(err, AppError::NotFound(ref m) if m == "Book not found"));
    assert_eq!(err.status(), Some(404));
    assert_eq!(catalog.book_count(), 0);
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let catalog = FakeCatalog::new();
    let services = services(&catalog.spawn().await);
    services.session.set(Session::new("expired")).unwrap();

    let err = assert_err!(services.books.create(&draft("Fledgling")).await);
    assert!(matches!(err, AppError::Unauthorized { .. }));
    assert_eq!(err.status(), Some(401));
    assert_eq!(catalog.request_count(), 1);
}

#[tokio::test]
async fn test_server_validation_message_is_surfaced() {
    let catalog = FakeCatalog::new().with_member();
    let services = services(&catalog.spawn().await);
    login(&services).await;

    // Sent straight through the client, bypassing form checks
    let mut incomplete = draft("Wild Seed");
    incomplete.isbn.clear();

    match services.books.create(&incomplete).await {
        Err(AppError::Validation { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Missing fields: isbn");
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_a_hard_failure() {
    let catalog = FakeCatalog::new();
    catalog.set_malformed_list(true);
    let services = services(&catalog.spawn().await);

    let err = assert_err!(services.books.list().await);
    assert!(matches!(err, AppError::Decode(_)));
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_failure() {
    // Nothing listens on port 9 (discard) on the loopback interface
    let services = services("http://127.0.0.1:9/api");

    let err = assert_err!(services.books.list().await);
    assert!(matches!(err, AppError::Network(_)));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_login_stores_the_returned_session() {
    let catalog = FakeCatalog::new().with_member();
    let services = services(&catalog.spawn().await);
    assert!(!services.session.is_authenticated());

    let session = services
        .auth
        .login(&LoginRequest {
            email: "a@b.com".into(),
            password: "x".into(),
        })
        .await
        .unwrap();

    assert_eq!(session.token, "t1");
    assert_eq!(session.email.as_deref(), Some("a@b.com"));
    assert_eq!(services.session.current(), Some(session));
}

#[tokio::test]
async fn test_failed_login_leaves_session_empty() {
    let catalog = FakeCatalog::new().with_member();
    let services = services(&catalog.spawn().await);

    let err = services
        .auth
        .login(&LoginRequest {
            email: "a@b.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Unauthorized { status: Some(401), ref message } if message == "Invalid email or password"
    ));
    assert!(!services.session.is_authenticated());
}

#[tokio::test]
async fn test_signup_then_logout() {
    let catalog = FakeCatalog::new();
    let services = services(&catalog.spawn().await);

    let session = services
        .auth
        .signup(&SignupRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "secret".into(),
            phone_number: "0101".into(),
            gender: "female".into(),
            date_of_birth: "1815-12-10".into(),
            membership_status: true,
        })
        .await
        .unwrap();

    assert_eq!(session.display_name(), Some("Ada"));
    assert!(services.session.is_authenticated());

    // The signup token authorizes mutations
    assert_ok!(services.books.create(&draft("Notes")).await);

    services.auth.logout().unwrap();
    assert!(!services.session.is_authenticated());
    assert!(matches!(
        services.books.create(&draft("More notes")).await,
        Err(AppError::Unauthorized { .. })
    ));
}
