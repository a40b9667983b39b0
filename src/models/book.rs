//! Book (catalog record) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::forms::{optional_text, parse_toggle, FieldKind, FieldSpec, FormError, FormRecord};

/// Loan state of a book.
///
/// `due_date` and `borrower` only mean something while the book is lent out.
/// Nothing enforces this; see [`Availability::is_consistent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub is_available: bool,
    /// `YYYY-MM-DD`, kept as entered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrower: Option<String>,
}

impl Default for Availability {
    fn default() -> Self {
        Self {
            is_available: true,
            due_date: None,
            borrower: None,
        }
    }
}

impl Availability {
    /// False when an available book still carries loan data
    pub fn is_consistent(&self) -> bool {
        !self.is_available || (self.due_date.is_none() && self.borrower.is_none())
    }

    pub fn due_date_parsed(&self) -> Option<NaiveDate> {
        self.due_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
    }

    /// Lent out with a due date before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_available && self.due_date_parsed().is_some_and(|due| due < today)
    }
}

/// Book as stored by the catalog API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BookRecord")]
pub struct Book {
    /// Server-assigned, immutable
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publisher: String,
    pub genre: String,
    #[serde(default)]
    pub availability: Availability,
}

/// Wire form of a book. The id may come as `_id`, `id` or both; `_id` wins.
#[derive(Deserialize)]
struct BookRecord {
    #[serde(rename = "_id")]
    document_id: Option<String>,
    id: Option<String>,
    title: String,
    author: String,
    isbn: String,
    publisher: String,
    genre: String,
    #[serde(default)]
    availability: Availability,
}

impl TryFrom<BookRecord> for Book {
    type Error = String;

    fn try_from(record: BookRecord) -> Result<Self, Self::Error> {
        let id = record
            .document_id
            .or(record.id)
            .ok_or_else(|| "missing field `_id`".to_string())?;

        Ok(Book {
            id,
            title: record.title,
            author: record.author,
            isbn: record.isbn,
            publisher: record.publisher,
            genre: record.genre,
            availability: record.availability,
        })
    }
}

impl Book {
    /// Editable copy of this book, used to pre-populate the edit form
    pub fn to_draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: self.isbn.clone(),
            publisher: self.publisher.clone(),
            genre: self.genre.clone(),
            availability: self.availability.clone(),
        }
    }
}

/// Book being created or edited, without an id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BookDraft {
    #[validate(length(min = 1, message = "Book title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Publisher is required"))]
    pub publisher: String,
    #[validate(length(min = 1, message = "Genre is required"))]
    pub genre: String,
    #[serde(default)]
    pub availability: Availability,
}

static BOOK_FIELDS: [FieldSpec; 8] = [
    FieldSpec::required("title", "Book Title", FieldKind::Text),
    FieldSpec::required("author", "Author", FieldKind::Text),
    FieldSpec::required("isbn", "ISBN", FieldKind::Text),
    FieldSpec::required("publisher", "Publisher", FieldKind::Text),
    FieldSpec::required("genre", "Genre", FieldKind::Text),
    FieldSpec::optional("isAvailable", "Available", FieldKind::Toggle),
    FieldSpec::optional("dueDate", "Due Date", FieldKind::Date),
    FieldSpec::optional("borrower", "Borrower", FieldKind::Text),
];

impl FormRecord for BookDraft {
    fn fields() -> &'static [FieldSpec] {
        &BOOK_FIELDS
    }

    fn value(&self, name: &str) -> Option<String> {
        let value = match name {
            "title" => self.title.clone(),
            "author" => self.author.clone(),
            "isbn" => self.isbn.clone(),
            "publisher" => self.publisher.clone(),
            "genre" => self.genre.clone(),
            "isAvailable" => self.availability.is_available.to_string(),
            "dueDate" => self.availability.due_date.clone().unwrap_or_default(),
            "borrower" => self.availability.borrower.clone().unwrap_or_default(),
            _ => return None,
        };
        Some(value)
    }

    fn set_value(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        match name {
            "title" => self.title = value.to_string(),
            "author" => self.author = value.to_string(),
            "isbn" => self.isbn = value.to_string(),
            "publisher" => self.publisher = value.to_string(),
            "genre" => self.genre = value.to_string(),
            "isAvailable" => self.availability.is_available = parse_toggle(name, value)?,
            "dueDate" => self.availability.due_date = optional_text(value),
            "borrower" => self.availability.borrower = optional_text(value),
            _ => return Err(FormError::UnknownField(name.to_string())),
        }
        Ok(())
    }
}
