//! Plain text rendering of pages

use std::fmt::Write;

use chrono::{Local, NaiveDate};

use crate::forms::{FieldKind, Form, FormRecord, FormState};
use crate::models::book::Book;

use super::router::AuthState;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn navbar(auth: AuthState) -> String {
    let mut links = vec!["Home [/]", "Add Book [/add-book]"];
    match auth {
        AuthState::Anonymous => {
            links.push("Login [/login]");
            links.push("Signup [/signup]");
        }
        AuthState::Authenticated => links.push("Logout [logout]"),
    }
    format!("== Book Library ==\n{}\n", links.join(" | "))
}

/// One entry of the home page listing
pub fn book_listing(book: &Book) -> String {
    format!(
        "Book Title: {}\n  Author: {}\n  ISBN: {}\n  Publisher: {}\n  Genre: {}\n  Available: {}\n  [/books/{}]\n",
        book.title,
        book.author,
        book.isbn,
        book.publisher,
        book.genre,
        yes_no(book.availability.is_available),
        book.id,
    )
}

pub fn book_list(books: &[Book]) -> String {
    if books.is_empty() {
        return "No books in the catalog yet.\n".to_string();
    }
    books.iter().map(book_listing).collect::<Vec<_>>().join("\n")
}

/// Full details of one book, with the actions available in `auth`
pub fn book_preview(book: &Book, auth: AuthState, today: NaiveDate) -> String {
    let availability = &book.availability;
    let mut out = String::new();

    let _ = writeln!(out, "{}", book.title);
    let _ = writeln!(out, "Author: {}", book.author);
    let _ = writeln!(out, "ISBN: {}", book.isbn);
    let _ = writeln!(out, "Publisher: {}", book.publisher);
    let _ = writeln!(out, "Genre: {}", book.genre);
    let _ = writeln!(out, "Available: {}", yes_no(availability.is_available));

    let due = availability.due_date.as_deref().unwrap_or("N/A");
    if availability.is_overdue(today) {
        let _ = writeln!(out, "Due Date: {} (overdue)", due);
    } else {
        let _ = writeln!(out, "Due Date: {}", due);
    }
    let _ = writeln!(
        out,
        "Borrower: {}",
        availability.borrower.as_deref().unwrap_or("None")
    );

    if !availability.is_consistent() {
        let _ = writeln!(out, "Note: marked available but still has loan details");
    }

    let actions = match auth {
        AuthState::Authenticated => "[back] [edit] [delete]",
        AuthState::Anonymous => "[back]",
    };
    let _ = writeln!(out, "{}", actions);
    out
}

pub fn form<R: FormRecord>(title: &str, submit_label: &str, form: &Form<R>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);

    if form.state() == FormState::Loading {
        let _ = writeln!(out, "Loading...");
        return out;
    }

    for field in R::fields() {
        let value = form.value(field.name).unwrap_or_default();
        let shown = match field.kind {
            FieldKind::Password if !value.is_empty() => "********".to_string(),
            FieldKind::Toggle => yes_no(value == "true").to_string(),
            _ => value,
        };
        let marker = if field.required { " *" } else { "" };
        let _ = writeln!(out, "  {}{} ({}): {}", field.label, marker, field.name, shown);
    }

    if form.state() == FormState::Submitting {
        let _ = writeln!(out, "Submitting...");
    } else {
        let _ = writeln!(out, "[submit] {}", submit_label);
    }
    out
}

pub fn not_found(path: &str) -> String {
    format!("Page not found: {}\n[/] Back to the catalog\n", path)
}
