//! Author service

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Author, AuthorFields, AuthorInput, BookSummary, FieldError},
    repository::Repository,
};

use super::CatalogResource;

/// Author detail page: the author and the books they wrote
#[derive(Debug, Clone)]
pub struct AuthorPage {
    pub author: Author,
    pub books: Vec<BookSummary>,
}

#[derive(Clone)]
pub struct AuthorService {
    repository: Repository,
}

impl AuthorService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CatalogResource for AuthorService {
    type Record = Author;
    type Listing = Author;
    type Detail = AuthorPage;
    type Input = AuthorInput;
    type Choices = ();
    type Dependent = BookSummary;

    const SLUG: &'static str = "author";
    const COLLECTION: &'static str = "authors";
    const NOUN: &'static str = "Author";

    fn values_of(record: &Author) -> AuthorInput {
        AuthorInput::from(record)
    }

    async fn list(&self) -> AppResult<Vec<Author>> {
        self.repository.authors_list().await
    }

    async fn detail(&self, id: Uuid) -> AppResult<AuthorPage> {
        let (author, books) = tokio::try_join!(
            self.repository.authors_get(id),
            self.repository.books_by_author(id)
        )?;
        let author = author.ok_or_else(Self::not_found)?;
        Ok(AuthorPage { author, books })
    }

    async fn choices(&self) -> AppResult<()> {
        Ok(())
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Author>> {
        self.repository.authors_get(id).await
    }

    async fn dependents(&self, id: Uuid) -> AppResult<Vec<BookSummary>> {
        self.repository.books_by_author(id).await
    }

    async fn insert(&self, fields: AuthorFields) -> AppResult<Result<Uuid, Vec<FieldError>>> {
        let author = self.repository.authors_create(&fields).await?;
        tracing::info!("Catalog: created author {} ({})", author.id, author.name());
        Ok(Ok(author.id))
    }

    async fn replace(
        &self,
        id: Uuid,
        fields: AuthorFields,
    ) -> AppResult<Result<bool, Vec<FieldError>>> {
        let author = self.repository.authors_update(id, &fields).await?;
        Ok(Ok(author.is_some()))
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        self.repository.authors_delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::BookFields,
        services::{DeleteOutcome, Submission},
    };

    fn input(first_name: &str, family_name: &str) -> AuthorInput {
        AuthorInput {
            first_name: first_name.to_string(),
            family_name: family_name.to_string(),
            date_of_birth: "1929-10-21".to_string(),
            date_of_death: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_trims_and_stores_dates() {
        let service = AuthorService::new(Repository::in_memory());

        let Submission::Saved(id) = service.create(input("  Ursula ", "LeGuin")).await.unwrap()
        else {
            panic!("create failed");
        };

        let page = service.detail(id).await.unwrap();
        assert_eq!(page.author.first_name, "Ursula");
        assert_eq!(page.author.name(), "LeGuin, Ursula");
        assert_eq!(page.author.lifespan(), "Oct 21, 1929 - ");
        assert!(page.books.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_names_keep_values() {
        let service = AuthorService::new(Repository::in_memory());

        match service.create(input("", "Le Guin")).await.unwrap() {
            Submission::Invalid(form) => {
                let fields: Vec<_> = form.errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["first_name", "family_name"]);
                assert_eq!(form.values.family_name, "Le Guin");
                assert_eq!(form.values.date_of_birth, "1929-10-21");
            }
            Submission::Saved(_) => panic!("invalid author was saved"),
        }
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_author_is_not_found() {
        let service = AuthorService::new(Repository::in_memory());
        let result = service.update(Uuid::new_v4(), input("Ursula", "LeGuin")).await;
        assert!(matches!(result, Err(crate::error::AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_blocked_by_books() {
        let repository = Repository::in_memory();
        let service = AuthorService::new(repository.clone());
        let Submission::Saved(id) = service.create(input("Ursula", "LeGuin")).await.unwrap() else {
            panic!("create failed");
        };
        repository
            .books_create(&BookFields {
                title: "The Dispossessed".to_string(),
                author_id: id,
                summary: "An ambiguous utopia.".to_string(),
                isbn: "9780060512750".to_string(),
                genre_ids: Vec::new(),
            })
            .await
            .unwrap();

        match service.delete(id).await.unwrap() {
            DeleteOutcome::Blocked { record, dependents } => {
                assert_eq!(record.id, id);
                assert_eq!(dependents[0].title, "The Dispossessed");
            }
            other => panic!("expected blocked delete, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_without_books() {
        let service = AuthorService::new(Repository::in_memory());
        let Submission::Saved(id) = service.create(input("Ursula", "LeGuin")).await.unwrap() else {
            panic!("create failed");
        };

        assert!(matches!(service.delete(id).await.unwrap(), DeleteOutcome::Deleted));
        assert!(service.find(id).await.unwrap().is_none());
    }
}
