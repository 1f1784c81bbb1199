//! Book instance (copy) service

use std::convert::Infallible;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        BookInstanceDetail, BookInstanceFields, BookInstanceInput, BookTitle, FieldError,
        FormInput,
    },
    repository::Repository,
};

use super::CatalogResource;

#[derive(Clone)]
pub struct BookInstanceService {
    repository: Repository,
}

impl BookInstanceService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

/// Copies have nothing depending on them, so deletes are never blocked.
#[async_trait]
impl CatalogResource for BookInstanceService {
    type Record = BookInstanceDetail;
    type Listing = BookInstanceDetail;
    type Detail = BookInstanceDetail;
    type Input = BookInstanceInput;
    type Choices = Vec<BookTitle>;
    type Dependent = Infallible;

    const SLUG: &'static str = "bookinstance";
    const COLLECTION: &'static str = "bookinstances";
    const NOUN: &'static str = "Book copy";

    fn values_of(record: &BookInstanceDetail) -> BookInstanceInput {
        BookInstanceInput::from(record)
    }

    async fn list(&self) -> AppResult<Vec<BookInstanceDetail>> {
        self.repository.instances_list().await
    }

    async fn detail(&self, id: Uuid) -> AppResult<BookInstanceDetail> {
        self.repository
            .instances_get(id)
            .await?
            .ok_or_else(Self::not_found)
    }

    async fn choices(&self) -> AppResult<Vec<BookTitle>> {
        self.repository.books_titles().await
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>> {
        self.repository.instances_get(id).await
    }

    async fn dependents(&self, _id: Uuid) -> AppResult<Vec<Infallible>> {
        Ok(Vec::new())
    }

    /// The selected book must exist
    async fn check(
        &self,
        input: &BookInstanceInput,
    ) -> AppResult<Result<BookInstanceFields, Vec<FieldError>>> {
        let fields = match input.parse() {
            Ok(fields) => fields,
            Err(errors) => return Ok(Err(errors)),
        };

        if self.repository.books_get(fields.book_id).await?.is_none() {
            return Ok(Err(vec![FieldError::new("book", "Book not found.")]));
        }
        Ok(Ok(fields))
    }

    async fn insert(
        &self,
        fields: BookInstanceFields,
    ) -> AppResult<Result<Uuid, Vec<FieldError>>> {
        let instance = self.repository.instances_create(&fields).await?;
        tracing::info!(
            "Catalog: created copy {} of book {} ({})",
            instance.id,
            instance.book_id,
            instance.status
        );
        Ok(Ok(instance.id))
    }

    async fn replace(
        &self,
        id: Uuid,
        fields: BookInstanceFields,
    ) -> AppResult<Result<bool, Vec<FieldError>>> {
        let instance = self.repository.instances_update(id, &fields).await?;
        Ok(Ok(instance.is_some()))
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        self.repository.instances_delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        models::{AuthorFields, BookFields, InstanceStatus},
        services::{DeleteOutcome, DeletePrompt, Submission},
    };

    async fn seeded() -> (BookInstanceService, Uuid) {
        let repository = Repository::in_memory();
        let author = repository
            .authors_create(&AuthorFields {
                first_name: "Ursula".to_string(),
                family_name: "LeGuin".to_string(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap();
        let book = repository
            .books_create(&BookFields {
                title: "The Dispossessed".to_string(),
                author_id: author.id,
                summary: "An ambiguous utopia.".to_string(),
                isbn: "9780060512750".to_string(),
                genre_ids: Vec::new(),
            })
            .await
            .unwrap();
        (BookInstanceService::new(repository), book.id)
    }

    fn input(book_id: Uuid) -> BookInstanceInput {
        BookInstanceInput {
            book: book_id.to_string(),
            imprint: "Harper & Row, 1974".to_string(),
            status: "Loaned".to_string(),
            due_back: "2024-03-01".to_string(),
        }
    }

    #[tokio::test]
    async fn test_blank_form_defaults_to_maintenance() {
        let (service, book_id) = seeded().await;
        let form = service.blank_form().await.unwrap();

        assert_eq!(form.values.status, "Maintenance");
        assert!(form.values.due_back.is_empty());
        assert_eq!(form.choices.len(), 1);
        assert_eq!(form.choices[0].id, book_id);
    }

    #[tokio::test]
    async fn test_create_copy() {
        let (service, book_id) = seeded().await;

        let Submission::Saved(id) = service.create(input(book_id)).await.unwrap() else {
            panic!("create failed");
        };

        let copy = service.detail(id).await.unwrap();
        assert_eq!(copy.book.title, "The Dispossessed");
        assert_eq!(copy.status, InstanceStatus::Loaned);
        assert_eq!(copy.due_back, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(copy.due_back_formatted(), "Mar 1, 2024");
    }

    #[tokio::test]
    async fn test_invalid_date_reprompts() {
        let (service, book_id) = seeded().await;
        let mut submitted = input(book_id);
        submitted.due_back = "not-a-date".to_string();

        match service.create(submitted).await.unwrap() {
            Submission::Invalid(form) => {
                assert_eq!(form.errors, vec![FieldError::new("due_back", "Invalid date.")]);
                assert_eq!(form.values.due_back, "not-a-date");
                assert_eq!(form.choices.len(), 1);
            }
            Submission::Saved(_) => panic!("copy with invalid date was saved"),
        }
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_book_rejected() {
        let (service, _) = seeded().await;

        match service.create(input(Uuid::new_v4())).await.unwrap() {
            Submission::Invalid(form) => {
                assert_eq!(form.errors, vec![FieldError::new("book", "Book not found.")]);
            }
            Submission::Saved(_) => panic!("copy of unknown book was saved"),
        }
    }

    #[tokio::test]
    async fn test_delete_is_never_blocked() {
        let (service, book_id) = seeded().await;
        let Submission::Saved(id) = service.create(input(book_id)).await.unwrap() else {
            panic!("create failed");
        };

        assert!(matches!(
            service.delete_prompt(id).await.unwrap(),
            DeletePrompt::Confirm { .. }
        ));
        assert!(matches!(service.delete(id).await.unwrap(), DeleteOutcome::Deleted));
        assert!(matches!(service.delete(id).await.unwrap(), DeleteOutcome::Missing));
    }
}
