//! Book service

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Author, BookDetail, BookFields, BookInput, BookInstance, BookListing, FieldError,
        FormInput, Genre,
    },
    repository::Repository,
};

use super::CatalogResource;

/// Authors and genres offered on the book form
#[derive(Debug, Clone, Default)]
pub struct BookChoices {
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
}

/// Book detail page: the book and all of its copies
#[derive(Debug, Clone)]
pub struct BookPage {
    pub book: BookDetail,
    pub instances: Vec<BookInstance>,
}

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
}

impl BookService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CatalogResource for BookService {
    type Record = BookDetail;
    type Listing = BookListing;
    type Detail = BookPage;
    type Input = BookInput;
    type Choices = BookChoices;
    type Dependent = BookInstance;

    const SLUG: &'static str = "book";
    const COLLECTION: &'static str = "books";
    const NOUN: &'static str = "Book";

    fn values_of(record: &BookDetail) -> BookInput {
        BookInput::from(record)
    }

    async fn list(&self) -> AppResult<Vec<BookListing>> {
        self.repository.books_list().await
    }

    async fn detail(&self, id: Uuid) -> AppResult<BookPage> {
        let (book, instances) = tokio::try_join!(
            self.repository.books_get(id),
            self.repository.instances_by_book(id)
        )?;
        let book = book.ok_or_else(Self::not_found)?;
        Ok(BookPage { book, instances })
    }

    async fn choices(&self) -> AppResult<BookChoices> {
        let (authors, genres) = tokio::try_join!(
            self.repository.authors_list(),
            self.repository.genres_list()
        )?;
        Ok(BookChoices { authors, genres })
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<BookDetail>> {
        self.repository.books_get(id).await
    }

    async fn dependents(&self, id: Uuid) -> AppResult<Vec<BookInstance>> {
        self.repository.instances_by_book(id).await
    }

    /// The author and every checked genre must exist
    async fn check(&self, input: &BookInput) -> AppResult<Result<BookFields, Vec<FieldError>>> {
        let fields = match input.parse() {
            Ok(fields) => fields,
            Err(errors) => return Ok(Err(errors)),
        };

        let (author, genres) = tokio::try_join!(
            self.repository.authors_get(fields.author_id),
            self.repository.genres_list()
        )?;

        let mut errors = Vec::new();
        if author.is_none() {
            errors.push(FieldError::new("author", "Author not found."));
        }
        if fields
            .genre_ids
            .iter()
            .any(|id| !genres.iter().any(|genre| genre.id == *id))
        {
            errors.push(FieldError::new("genre", "Genre not found."));
        }

        Ok(if errors.is_empty() { Ok(fields) } else { Err(errors) })
    }

    async fn insert(&self, fields: BookFields) -> AppResult<Result<Uuid, Vec<FieldError>>> {
        let book = self.repository.books_create(&fields).await?;
        tracing::info!("Catalog: created book {} ({})", book.id, book.title);
        Ok(Ok(book.id))
    }

    async fn replace(
        &self,
        id: Uuid,
        fields: BookFields,
    ) -> AppResult<Result<bool, Vec<FieldError>>> {
        let book = self.repository.books_update(id, &fields).await?;
        Ok(Ok(book.is_some()))
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        self.repository.books_delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{AuthorFields, BookInstanceFields, InstanceStatus},
        services::{DeleteOutcome, DeletePrompt, Submission},
    };

    async fn seeded() -> (BookService, Repository, Author, Genre) {
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
        let genre = repository
            .genres_insert_unique("Science Fiction")
            .await
            .unwrap()
            .genre()
            .clone();
        (BookService::new(repository.clone()), repository, author, genre)
    }

    fn input(author: &Author, genres: &[&Genre]) -> BookInput {
        BookInput {
            title: "The Dispossessed".to_string(),
            author: author.id.to_string(),
            summary: "An ambiguous utopia.".to_string(),
            isbn: "9780060512750".to_string(),
            genre: genres.iter().map(|g| g.id.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_and_detail() {
        let (service, _, author, genre) = seeded().await;

        let id = match service.create(input(&author, &[&genre])).await.unwrap() {
            Submission::Saved(id) => id,
            Submission::Invalid(form) => panic!("unexpected errors: {:?}", form.errors),
        };

        let page = service.detail(id).await.unwrap();
        assert_eq!(page.book.title, "The Dispossessed");
        assert_eq!(page.book.author.id, author.id);
        assert_eq!(page.book.genres, vec![genre]);
        assert!(page.instances.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_author_reprompts_with_choices() {
        let (service, _, author, genre) = seeded().await;
        let mut submitted = input(&author, &[&genre]);
        submitted.author = Uuid::new_v4().to_string();

        match service.create(submitted).await.unwrap() {
            Submission::Invalid(form) => {
                assert_eq!(form.errors, vec![FieldError::new("author", "Author not found.")]);
                assert_eq!(form.choices.authors.len(), 1);
                assert_eq!(form.choices.genres.len(), 1);
                assert!(form.values.has_genre(genre.id));
                assert_eq!(form.editing, None);
            }
            Submission::Saved(_) => panic!("book with unknown author was saved"),
        }
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_genre_rejected() {
        let (service, _, author, _) = seeded().await;
        let mut submitted = input(&author, &[]);
        submitted.genre = vec![Uuid::new_v4().to_string()];

        match service.create(submitted).await.unwrap() {
            Submission::Invalid(form) => {
                assert_eq!(form.errors, vec![FieldError::new("genre", "Genre not found.")]);
            }
            Submission::Saved(_) => panic!("book with unknown genre was saved"),
        }
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_replaces_genres() {
        let (service, repository, author, genre) = seeded().await;
        let Submission::Saved(id) = service.create(input(&author, &[&genre])).await.unwrap() else {
            panic!("create failed");
        };

        let mut changed = input(&author, &[]);
        changed.title = "The Lathe of Heaven".to_string();
        let Submission::Saved(updated) = service.update(id, changed).await.unwrap() else {
            panic!("update failed");
        };
        assert_eq!(updated, id);

        let book = repository.books_get(id).await.unwrap().unwrap();
        assert_eq!(book.title, "The Lathe of Heaven");
        assert!(book.genres.is_empty());
    }

    #[tokio::test]
    async fn test_edit_form_prefills_values() {
        let (service, _, author, genre) = seeded().await;
        let Submission::Saved(id) = service.create(input(&author, &[&genre])).await.unwrap() else {
            panic!("create failed");
        };

        let form = service.edit_form(id).await.unwrap();
        assert_eq!(form.editing, Some(id));
        assert_eq!(form.values.author, author.id.to_string());
        assert!(form.values.has_genre(genre.id));

        assert!(service.edit_form(Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_blocked_by_copies() {
        let (service, repository, author, genre) = seeded().await;
        let Submission::Saved(id) = service.create(input(&author, &[&genre])).await.unwrap() else {
            panic!("create failed");
        };
        repository
            .instances_create(&BookInstanceFields {
                book_id: id,
                imprint: "Harper, 1974".to_string(),
                status: InstanceStatus::Available,
                due_back: None,
            })
            .await
            .unwrap();

        match service.delete_prompt(id).await.unwrap() {
            DeletePrompt::Confirm { dependents, .. } => assert_eq!(dependents.len(), 1),
            DeletePrompt::Missing => panic!("book vanished"),
        }
        assert!(matches!(
            service.delete(id).await.unwrap(),
            DeleteOutcome::Blocked { .. }
        ));
        assert!(repository.books_get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_book() {
        let (service, _, _, _) = seeded().await;
        assert!(matches!(
            service.delete(Uuid::new_v4()).await.unwrap(),
            DeleteOutcome::Missing
        ));
        assert!(matches!(
            service.delete_prompt(Uuid::new_v4()).await.unwrap(),
            DeletePrompt::Missing
        ));
    }
}
