//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod validation;

use chrono::NaiveDate;
use uuid::Uuid;

// Re-export commonly used types
pub use author::{Author, AuthorFields, AuthorInput};
pub use book::{Book, BookDetail, BookFields, BookInput, BookListing, BookSummary, BookTitle};
pub use book_instance::{
    BookInstance, BookInstanceDetail, BookInstanceFields, BookInstanceInput, InstanceStatus,
};
pub use genre::{Genre, GenreInput};
pub use validation::{FieldError, FormInput};

/// Canonical detail path of a catalog record
pub fn catalog_url(kind: &str, id: Uuid) -> String {
    format!("/catalog/{}/{}", kind, id)
}

/// Medium date format used on every page, e.g. "Oct 21, 1929"
pub fn display_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
