//! Book catalog endpoints

use crate::models::book::{Book, BookDraft};

use super::{Resource, ResourceClient};

impl Resource for Book {
    const COLLECTION: &'static str = "books";

    type Draft = BookDraft;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Client for `/books`
pub type BooksClient = ResourceClient<Book>;
