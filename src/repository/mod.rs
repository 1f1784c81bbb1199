//! Repository layer: the catalog storage interface and its backends

pub mod memory;
pub mod postgres;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Author, AuthorFields, Book, BookDetail, BookFields, BookInstance, BookInstanceDetail,
        BookInstanceFields, BookListing, BookSummary, BookTitle, Genre, InstanceStatus,
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Result of inserting a genre under the case-insensitive name constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenreInsert {
    Created(Genre),
    /// A genre with the same name (ignoring case) was already stored
    Existing(Genre),
}

impl GenreInsert {
    pub fn genre(&self) -> &Genre {
        match self {
            GenreInsert::Created(genre) | GenreInsert::Existing(genre) => genre,
        }
    }
}

/// Storage interface over the four catalog collections.
///
/// Lookups by id return `None` for absent records. Writes that would break a
/// reference (dangling author, deleting a referenced book...) or the genre
/// name constraint fail with `AppError::Conflict`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Check that the backend is reachable
    async fn ping(&self) -> AppResult<()>;

    // Authors

    /// All authors by family name, then first name
    async fn authors_list(&self) -> AppResult<Vec<Author>>;
    async fn authors_get(&self, id: Uuid) -> AppResult<Option<Author>>;
    async fn authors_count(&self) -> AppResult<i64>;
    async fn authors_create(&self, fields: &AuthorFields) -> AppResult<Author>;
    async fn authors_update(&self, id: Uuid, fields: &AuthorFields) -> AppResult<Option<Author>>;
    async fn authors_delete(&self, id: Uuid) -> AppResult<bool>;

    // Genres

    /// All genres by name
    async fn genres_list(&self) -> AppResult<Vec<Genre>>;
    async fn genres_get(&self, id: Uuid) -> AppResult<Option<Genre>>;
    async fn genres_count(&self) -> AppResult<i64>;
    /// Insert a genre, or return the one already holding this name
    async fn genres_insert_unique(&self, name: &str) -> AppResult<GenreInsert>;
    async fn genres_update(&self, id: Uuid, name: &str) -> AppResult<Option<Genre>>;
    async fn genres_delete(&self, id: Uuid) -> AppResult<bool>;

    // Books

    /// All books by title, author populated
    async fn books_list(&self) -> AppResult<Vec<BookListing>>;
    /// One book with author and genres populated
    async fn books_get(&self, id: Uuid) -> AppResult<Option<BookDetail>>;
    async fn books_count(&self) -> AppResult<i64>;
    /// Id and title of every book, by title
    async fn books_titles(&self) -> AppResult<Vec<BookTitle>>;
    async fn books_by_author(&self, author_id: Uuid) -> AppResult<Vec<BookSummary>>;
    async fn books_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<BookSummary>>;
    async fn books_create(&self, fields: &BookFields) -> AppResult<Book>;
    async fn books_update(&self, id: Uuid, fields: &BookFields) -> AppResult<Option<Book>>;
    async fn books_delete(&self, id: Uuid) -> AppResult<bool>;

    // Book instances

    /// All copies in insertion order, book populated
    async fn instances_list(&self) -> AppResult<Vec<BookInstanceDetail>>;
    async fn instances_get(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>>;
    async fn instances_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>>;
    /// Count copies, optionally only those with the given status
    async fn instances_count(&self, status: Option<InstanceStatus>) -> AppResult<i64>;
    async fn instances_create(&self, fields: &BookInstanceFields) -> AppResult<BookInstance>;
    async fn instances_update(
        &self,
        id: Uuid,
        fields: &BookInstanceFields,
    ) -> AppResult<Option<BookInstance>>;
    async fn instances_delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Shared handle on the configured store
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn CatalogStore>,
}

impl Repository {
    /// Create a repository backed by an empty in-memory store
    pub fn in_memory() -> Self {
        Self::with_store(MemoryStore::default())
    }

    pub fn with_store(store: impl CatalogStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

impl Deref for Repository {
    type Target = dyn CatalogStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}
