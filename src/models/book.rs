//! Book model and its read projections

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::{
    author::Author,
    genre::Genre,
    validation::{trim, FieldError, FormInput},
};

/// Stored book: references are kept by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author_id: Uuid,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<Uuid>,
}

impl Book {
    pub fn url(&self) -> String {
        super::catalog_url("book", self.id)
    }
}

/// Book with author and genres populated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookDetail {
    pub id: Uuid,
    pub title: String,
    pub author: Author,
    pub summary: String,
    pub isbn: String,
    pub genres: Vec<Genre>,
}

impl BookDetail {
    pub fn url(&self) -> String {
        super::catalog_url("book", self.id)
    }
}

/// Row of the book list: title and populated author
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookListing {
    pub id: Uuid,
    pub title: String,
    pub author: Author,
}

impl BookListing {
    pub fn url(&self) -> String {
        super::catalog_url("book", self.id)
    }
}

/// Title and summary, as shown on author and genre pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
}

impl BookSummary {
    pub fn url(&self) -> String {
        super::catalog_url("book", self.id)
    }
}

/// Book reference with its title, for copy pages and selections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct BookTitle {
    pub id: Uuid,
    pub title: String,
}

impl BookTitle {
    pub fn url(&self) -> String {
        super::catalog_url("book", self.id)
    }
}

/// Validated book values for create and full-replace update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author_id: Uuid,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<Uuid>,
}

/// Book form as submitted.
///
/// `genre` is a checkbox group: absent yields an empty list, a single box a
/// one-element list, and repeated keys every checked value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BookInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title must not be empty."))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Author must not be empty."))]
    pub author: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Summary must not be empty."))]
    pub summary: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "ISBN must not be empty."))]
    pub isbn: String,
    #[serde(default)]
    pub genre: Vec<String>,
}

impl BookInput {
    /// Whether a genre box should render checked
    pub fn has_genre(&self, id: Uuid) -> bool {
        self.genre.iter().any(|g| Uuid::parse_str(g).map_or(false, |g| g == id))
    }
}

impl From<&BookDetail> for BookInput {
    fn from(book: &BookDetail) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.id.to_string(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre: book.genres.iter().map(|g| g.id.to_string()).collect(),
        }
    }
}

impl FormInput for BookInput {
    type Fields = BookFields;

    const FIELDS: &'static [&'static str] = &["title", "author", "summary", "isbn", "genre"];

    fn normalized(self) -> Self {
        Self {
            title: trim(&self.title),
            author: trim(&self.author),
            summary: trim(&self.summary),
            isbn: trim(&self.isbn),
            genre: self
                .genre
                .iter()
                .map(|g| trim(g))
                .filter(|g| !g.is_empty())
                .collect(),
        }
    }

    fn to_fields(&self) -> Result<BookFields, Vec<FieldError>> {
        let mut errors = Vec::new();

        let author_id = match Uuid::parse_str(&self.author) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(FieldError::new("author", "Author not found."));
                None
            }
        };

        let mut genre_ids = Vec::with_capacity(self.genre.len());
        for raw in &self.genre {
            match Uuid::parse_str(raw) {
                Ok(id) if !genre_ids.contains(&id) => genre_ids.push(id),
                Ok(_) => {}
                Err(_) => errors.push(FieldError::new("genre", "Genre not found.")),
            }
        }

        match author_id {
            Some(author_id) if errors.is_empty() => Ok(BookFields {
                title: self.title.clone(),
                author_id,
                summary: self.summary.clone(),
                isbn: self.isbn.clone(),
                genre_ids,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> BookInput {
        BookInput {
            title: " The Dispossessed ".to_string(),
            author: Uuid::new_v4().to_string(),
            summary: "Anarres and Urras.".to_string(),
            isbn: "9780061054884".to_string(),
            genre: vec![],
        }
    }

    #[test]
    fn test_empty_title_reported_on_title() {
        let errors = BookInput {
            title: "   ".to_string(),
            ..input()
        }
        .normalized()
        .parse()
        .unwrap_err();
        assert_eq!(errors, vec![FieldError::new("title", "Title must not be empty.")]);
    }

    #[test]
    fn test_genre_ids_deduplicated_and_blank_dropped() {
        let g = Uuid::new_v4();
        let fields = BookInput {
            genre: vec![g.to_string(), " ".to_string(), g.to_string()],
            ..input()
        }
        .normalized()
        .parse()
        .unwrap();
        assert_eq!(fields.title, "The Dispossessed");
        assert_eq!(fields.genre_ids, vec![g]);
    }

    #[test]
    fn test_malformed_references() {
        let errors = BookInput {
            author: "nobody".to_string(),
            genre: vec!["fiction".to_string()],
            ..input()
        }
        .parse()
        .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["author", "genre"]);
    }

    #[test]
    fn test_has_genre() {
        let g = Uuid::new_v4();
        let input = BookInput {
            genre: vec![g.to_string()],
            ..input()
        };
        assert!(input.has_genre(g));
        assert!(!input.has_genre(Uuid::new_v4()));
    }
}
