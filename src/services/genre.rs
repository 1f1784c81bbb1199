//! Genre service

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{BookSummary, FieldError, Genre, GenreInput},
    repository::{GenreInsert, Repository},
};

use super::CatalogResource;

/// Genre detail page: the genre and the books filed under it
#[derive(Debug, Clone)]
pub struct GenrePage {
    pub genre: Genre,
    pub books: Vec<BookSummary>,
}

#[derive(Clone)]
pub struct GenreService {
    repository: Repository,
}

impl GenreService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CatalogResource for GenreService {
    type Record = Genre;
    type Listing = Genre;
    type Detail = GenrePage;
    type Input = GenreInput;
    type Choices = ();
    type Dependent = BookSummary;

    const SLUG: &'static str = "genre";
    const COLLECTION: &'static str = "genres";
    const NOUN: &'static str = "Genre";

    fn values_of(record: &Genre) -> GenreInput {
        GenreInput::from(record)
    }

    async fn list(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres_list().await
    }

    async fn detail(&self, id: Uuid) -> AppResult<GenrePage> {
        let (genre, books) = tokio::try_join!(
            self.repository.genres_get(id),
            self.repository.books_by_genre(id)
        )?;
        let genre = genre.ok_or_else(Self::not_found)?;
        Ok(GenrePage { genre, books })
    }

    async fn choices(&self) -> AppResult<()> {
        Ok(())
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Genre>> {
        self.repository.genres_get(id).await
    }

    async fn dependents(&self, id: Uuid) -> AppResult<Vec<BookSummary>> {
        self.repository.books_by_genre(id).await
    }

    /// A name already taken (ignoring case) resolves to the existing genre.
    async fn insert(&self, name: String) -> AppResult<Result<Uuid, Vec<FieldError>>> {
        match self.repository.genres_insert_unique(&name).await? {
            GenreInsert::Created(genre) => {
                tracing::info!("Catalog: created genre {} ({})", genre.id, genre.name);
                Ok(Ok(genre.id))
            }
            GenreInsert::Existing(genre) => {
                tracing::debug!("Catalog: genre {} already exists as {}", name, genre.id);
                Ok(Ok(genre.id))
            }
        }
    }

    async fn replace(&self, id: Uuid, name: String) -> AppResult<Result<bool, Vec<FieldError>>> {
        match self.repository.genres_update(id, &name).await {
            Ok(genre) => Ok(Ok(genre.is_some())),
            Err(AppError::Conflict(_)) => Ok(Err(vec![FieldError::new(
                "name",
                "Genre with this name already exists.",
            )])),
            Err(e) => Err(e),
        }
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        self.repository.genres_delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{DeleteOutcome, Submission};

    fn named(name: &str) -> GenreInput {
        GenreInput {
            name: name.to_string(),
        }
    }

    async fn saved(service: &GenreService, name: &str) -> Uuid {
        match service.create(named(name)).await.unwrap() {
            Submission::Saved(id) => id,
            Submission::Invalid(form) => panic!("unexpected errors: {:?}", form.errors),
        }
    }

    #[tokio::test]
    async fn test_create_is_case_insensitive_unique() {
        let service = GenreService::new(Repository::in_memory());

        let fantasy = saved(&service, "Fantasy").await;
        let again = saved(&service, "fantasy").await;

        assert_eq!(fantasy, again);
        let genres = service.list().await.unwrap();
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].name, "Fantasy");
    }

    #[tokio::test]
    async fn test_short_name_reprompts() {
        let service = GenreService::new(Repository::in_memory());

        match service.create(named("  SF ")).await.unwrap() {
            Submission::Invalid(form) => {
                assert_eq!(form.values.name, "SF");
                assert_eq!(form.errors.len(), 1);
                assert_eq!(form.errors[0].field, "name");
            }
            Submission::Saved(_) => panic!("short genre name was saved"),
        }
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rename_onto_existing_name_rejected() {
        let service = GenreService::new(Repository::in_memory());
        saved(&service, "Fantasy").await;
        let poetry = saved(&service, "Poetry").await;

        match service.update(poetry, named("FANTASY")).await.unwrap() {
            Submission::Invalid(form) => {
                assert_eq!(
                    form.errors,
                    vec![FieldError::new("name", "Genre with this name already exists.")]
                );
                assert_eq!(form.editing, Some(poetry));
            }
            Submission::Saved(_) => panic!("duplicate rename was saved"),
        }
        assert_eq!(service.find(poetry).await.unwrap().unwrap().name, "Poetry");
    }

    #[tokio::test]
    async fn test_rename_keeps_id() {
        let service = GenreService::new(Repository::in_memory());
        let id = saved(&service, "Fantasy").await;

        let Submission::Saved(renamed) = service.update(id, named("High Fantasy")).await.unwrap()
        else {
            panic!("rename failed");
        };
        assert_eq!(renamed, id);
        assert_eq!(service.detail(id).await.unwrap().genre.name, "High Fantasy");
    }

    #[tokio::test]
    async fn test_detail_missing_genre() {
        let service = GenreService::new(Repository::in_memory());
        assert!(matches!(
            service.detail(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_unused_genre() {
        let service = GenreService::new(Repository::in_memory());
        let id = saved(&service, "Fantasy").await;

        assert!(matches!(service.delete(id).await.unwrap(), DeleteOutcome::Deleted));
        assert!(matches!(service.delete(id).await.unwrap(), DeleteOutcome::Missing));
    }
}
