//! Data models for the Book Library

pub mod book;
pub mod user;

// Re-export commonly used types
pub use book::{Availability, Book, BookDraft};
pub use user::{LoginRequest, Session, SignupRequest};
