//! Catalog overview service (home page counts)

use serde::Serialize;

use crate::{error::AppResult, models::InstanceStatus, repository::Repository};

/// Record counts shown on the catalog home page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    pub books: i64,
    pub copies: i64,
    pub copies_available: i64,
    pub authors: i64,
    pub genres: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        let (books, copies, copies_available, authors, genres) = tokio::try_join!(
            self.repository.books_count(),
            self.repository.instances_count(None),
            self.repository.instances_count(Some(InstanceStatus::Available)),
            self.repository.authors_count(),
            self.repository.genres_count(),
        )?;

        Ok(CatalogCounts {
            books,
            copies,
            copies_available,
            authors,
            genres,
        })
    }

    /// Check that the store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
