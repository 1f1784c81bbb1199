//! Business logic services
//!
//! Every catalog entity exposes the same list / detail / create / update /
//! delete shape through [`CatalogResource`]. Implementors supply the
//! entity-specific lookups and writes; the form and delete flows are shared.

pub mod author;
pub mod book;
pub mod book_instance;
pub mod catalog;
pub mod genre;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{catalog_url, FieldError, FormInput},
    repository::Repository,
};

/// Everything a form page needs: entered values, selectable references,
/// errors from the last submission, and the record being edited if any
#[derive(Debug, Clone)]
pub struct FormState<I, C> {
    pub values: I,
    pub choices: C,
    pub errors: Vec<FieldError>,
    pub editing: Option<Uuid>,
}

/// Outcome of a create or update submission
#[derive(Debug)]
pub enum Submission<I, C> {
    /// Stored; the id is the record to show next
    Saved(Uuid),
    /// Rejected; re-prompt with the entered values and errors
    Invalid(FormState<I, C>),
}

/// What the delete confirmation page shows
#[derive(Debug)]
pub enum DeletePrompt<T, D> {
    Confirm { record: T, dependents: Vec<D> },
    /// Nothing to delete; go back to the list
    Missing,
}

/// Outcome of a confirmed delete
#[derive(Debug)]
pub enum DeleteOutcome<T, D> {
    Deleted,
    /// Dependents still reference the record; nothing was removed
    Blocked { record: T, dependents: Vec<D> },
    Missing,
}

pub type FieldsOf<R> = <<R as CatalogResource>::Input as FormInput>::Fields;
pub type FormOf<R> = FormState<<R as CatalogResource>::Input, <R as CatalogResource>::Choices>;
pub type SubmissionOf<R> =
    Submission<<R as CatalogResource>::Input, <R as CatalogResource>::Choices>;

#[async_trait]
pub trait CatalogResource: Clone + Send + Sync + 'static {
    /// Record as shown on edit and delete pages
    type Record: Send + Sync + 'static;
    /// Row of the list page
    type Listing: Send + Sync + 'static;
    /// Everything the detail page shows
    type Detail: Send + Sync + 'static;
    /// Raw form submission
    type Input: FormInput + DeserializeOwned + Default + Send + Sync + 'static;
    /// References offered for selection on the form
    type Choices: Send + Sync + 'static;
    /// Records whose existence blocks deletion
    type Dependent: Send + Sync + 'static;

    /// Detail path segment, e.g. "book"
    const SLUG: &'static str;
    /// List path segment, e.g. "books"
    const COLLECTION: &'static str;
    /// Human name used in messages
    const NOUN: &'static str;

    fn detail_url(id: Uuid) -> String {
        catalog_url(Self::SLUG, id)
    }

    fn list_url() -> String {
        format!("/catalog/{}", Self::COLLECTION)
    }

    fn not_found() -> AppError {
        AppError::NotFound(format!("{} not found", Self::NOUN))
    }

    /// Pre-populated form values for an existing record
    fn values_of(record: &Self::Record) -> Self::Input;

    async fn list(&self) -> AppResult<Vec<Self::Listing>>;

    /// Fails with `NotFound` when the record does not exist
    async fn detail(&self, id: Uuid) -> AppResult<Self::Detail>;

    async fn choices(&self) -> AppResult<Self::Choices>;

    async fn find(&self, id: Uuid) -> AppResult<Option<Self::Record>>;

    async fn dependents(&self, id: Uuid) -> AppResult<Vec<Self::Dependent>>;

    /// Validate a normalized submission, including reference checks
    async fn check(
        &self,
        input: &Self::Input,
    ) -> AppResult<Result<FieldsOf<Self>, Vec<FieldError>>> {
        Ok(input.parse())
    }

    async fn insert(&self, fields: FieldsOf<Self>) -> AppResult<Result<Uuid, Vec<FieldError>>>;

    /// Replace all mutable fields; `Ok(false)` when the record is gone
    async fn replace(
        &self,
        id: Uuid,
        fields: FieldsOf<Self>,
    ) -> AppResult<Result<bool, Vec<FieldError>>>;

    async fn remove(&self, id: Uuid) -> AppResult<bool>;

    async fn blank_form(&self) -> AppResult<FormOf<Self>> {
        Ok(FormState {
            values: Self::Input::default(),
            choices: self.choices().await?,
            errors: Vec::new(),
            editing: None,
        })
    }

    /// Fails with `NotFound` when the record does not exist
    async fn edit_form(&self, id: Uuid) -> AppResult<FormOf<Self>> {
        let (record, choices) = tokio::try_join!(self.find(id), self.choices())?;
        let record = record.ok_or_else(Self::not_found)?;

        Ok(FormState {
            values: Self::values_of(&record),
            choices,
            errors: Vec::new(),
            editing: Some(id),
        })
    }

    async fn create(&self, input: Self::Input) -> AppResult<SubmissionOf<Self>> {
        let input = input.normalized();
        let saved = match self.check(&input).await? {
            Ok(fields) => self.insert(fields).await?,
            Err(errors) => Err(errors),
        };

        match saved {
            Ok(id) => Ok(Submission::Saved(id)),
            Err(errors) => {
                tracing::debug!("Catalog: {} form rejected ({} errors)", Self::NOUN, errors.len());
                Ok(Submission::Invalid(self.reprompt(input, errors, None).await?))
            }
        }
    }

    /// Fails with `NotFound` when valid data targets a missing record
    async fn update(&self, id: Uuid, input: Self::Input) -> AppResult<SubmissionOf<Self>> {
        let input = input.normalized();
        let saved = match self.check(&input).await? {
            Ok(fields) => self.replace(id, fields).await?,
            Err(errors) => Err(errors),
        };

        match saved {
            Ok(true) => {
                tracing::info!("Catalog: updated {} {}", Self::NOUN, id);
                Ok(Submission::Saved(id))
            }
            Ok(false) => Err(Self::not_found()),
            Err(errors) => {
                tracing::debug!("Catalog: {} form rejected ({} errors)", Self::NOUN, errors.len());
                Ok(Submission::Invalid(self.reprompt(input, errors, Some(id)).await?))
            }
        }
    }

    async fn reprompt(
        &self,
        values: Self::Input,
        errors: Vec<FieldError>,
        editing: Option<Uuid>,
    ) -> AppResult<FormOf<Self>> {
        Ok(FormState {
            values,
            choices: self.choices().await?,
            errors,
            editing,
        })
    }

    async fn delete_prompt(
        &self,
        id: Uuid,
    ) -> AppResult<DeletePrompt<Self::Record, Self::Dependent>> {
        let (record, dependents) = tokio::try_join!(self.find(id), self.dependents(id))?;
        Ok(match record {
            Some(record) => DeletePrompt::Confirm { record, dependents },
            None => DeletePrompt::Missing,
        })
    }

    /// Dependents are re-read here, so a stale confirmation cannot bypass them.
    async fn delete(&self, id: Uuid) -> AppResult<DeleteOutcome<Self::Record, Self::Dependent>> {
        let (record, dependents) = tokio::try_join!(self.find(id), self.dependents(id))?;
        let Some(record) = record else {
            return Ok(DeleteOutcome::Missing);
        };

        if !dependents.is_empty() {
            tracing::info!(
                "Catalog: refusing to delete {} {} ({} dependents)",
                Self::NOUN,
                id,
                dependents.len()
            );
            return Ok(DeleteOutcome::Blocked { record, dependents });
        }

        match self.remove(id).await {
            Ok(true) => {
                tracing::info!("Catalog: deleted {} {}", Self::NOUN, id);
                Ok(DeleteOutcome::Deleted)
            }
            Ok(false) => Ok(DeleteOutcome::Missing),
            // A dependent was added after the check above
            Err(AppError::Conflict(_)) => {
                let dependents = self.dependents(id).await?;
                Ok(DeleteOutcome::Blocked { record, dependents })
            }
            Err(e) => Err(e),
        }
    }
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub books: book::BookService,
    pub authors: author::AuthorService,
    pub genres: genre::GenreService,
    pub book_instances: book_instance::BookInstanceService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            books: book::BookService::new(repository.clone()),
            authors: author::AuthorService::new(repository.clone()),
            genres: genre::GenreService::new(repository.clone()),
            book_instances: book_instance::BookInstanceService::new(repository),
        }
    }
}
