//! In-memory catalog store.
//!
//! All collections sit behind one lock, so each call sees and leaves a
//! consistent catalog. Reference rules mirror the PostgreSQL constraints.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogStore, GenreInsert};
use crate::{
    error::{AppError, AppResult},
    models::{
        Author, AuthorFields, Book, BookDetail, BookFields, BookInstance, BookInstanceDetail,
        BookInstanceFields, BookListing, BookSummary, BookTitle, Genre, InstanceStatus,
    },
};

#[derive(Debug, Default)]
struct Catalog {
    authors: Vec<Author>,
    genres: Vec<Genre>,
    books: Vec<Book>,
    instances: Vec<BookInstance>,
}

impl Catalog {
    fn author(&self, id: Uuid) -> Option<&Author> {
        self.authors.iter().find(|a| a.id == id)
    }

    fn genre(&self, id: Uuid) -> Option<&Genre> {
        self.genres.iter().find(|g| g.id == id)
    }

    fn book(&self, id: Uuid) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    fn genre_named(&self, name: &str) -> Option<&Genre> {
        let key = name.to_lowercase();
        self.genres.iter().find(|g| g.name.to_lowercase() == key)
    }

    fn populate_book(&self, book: &Book) -> AppResult<BookDetail> {
        let author = self
            .author(book.author_id)
            .cloned()
            .ok_or_else(|| dangling("book", book.id, "author", book.author_id))?;
        let mut genres: Vec<Genre> = book
            .genre_ids
            .iter()
            .filter_map(|id| self.genre(*id).cloned())
            .collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(BookDetail {
            id: book.id,
            title: book.title.clone(),
            author,
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genres,
        })
    }

    fn populate_instance(&self, instance: &BookInstance) -> AppResult<BookInstanceDetail> {
        let book = self
            .book(instance.book_id)
            .ok_or_else(|| dangling("book instance", instance.id, "book", instance.book_id))?;

        Ok(BookInstanceDetail {
            id: instance.id,
            book: BookTitle {
                id: book.id,
                title: book.title.clone(),
            },
            imprint: instance.imprint.clone(),
            status: instance.status,
            due_back: instance.due_back,
        })
    }

    fn check_book_refs(&self, fields: &BookFields) -> AppResult<()> {
        if self.author(fields.author_id).is_none() {
            return Err(AppError::Conflict(format!(
                "Author {} does not exist",
                fields.author_id
            )));
        }
        if let Some(missing) = fields.genre_ids.iter().find(|id| self.genre(**id).is_none()) {
            return Err(AppError::Conflict(format!("Genre {} does not exist", missing)));
        }
        Ok(())
    }

    fn summaries<'a>(books: impl Iterator<Item = &'a Book>) -> Vec<BookSummary> {
        let mut rows: Vec<BookSummary> = books
            .map(|b| BookSummary {
                id: b.id,
                title: b.title.clone(),
                summary: b.summary.clone(),
            })
            .collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title));
        rows
    }
}

fn dangling(kind: &str, id: Uuid, target: &str, target_id: Uuid) -> AppError {
    AppError::Internal(format!(
        "{} {} references missing {} {}",
        kind, id, target, target_id
    ))
}

/// Catalog held in process memory; contents are lost on shutdown
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: RwLock<Catalog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    async fn authors_list(&self) -> AppResult<Vec<Author>> {
        let mut authors = self.catalog.read().await.authors.clone();
        authors.sort_by(|a, b| {
            a.family_name
                .cmp(&b.family_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        Ok(authors)
    }

    async fn authors_get(&self, id: Uuid) -> AppResult<Option<Author>> {
        Ok(self.catalog.read().await.author(id).cloned())
    }

    async fn authors_count(&self) -> AppResult<i64> {
        Ok(self.catalog.read().await.authors.len() as i64)
    }

    async fn authors_create(&self, fields: &AuthorFields) -> AppResult<Author> {
        let author = Author {
            id: Uuid::new_v4(),
            first_name: fields.first_name.clone(),
            family_name: fields.family_name.clone(),
            date_of_birth: fields.date_of_birth,
            date_of_death: fields.date_of_death,
        };
        self.catalog.write().await.authors.push(author.clone());
        Ok(author)
    }

    async fn authors_update(&self, id: Uuid, fields: &AuthorFields) -> AppResult<Option<Author>> {
        let mut catalog = self.catalog.write().await;
        let Some(author) = catalog.authors.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        author.first_name = fields.first_name.clone();
        author.family_name = fields.family_name.clone();
        author.date_of_birth = fields.date_of_birth;
        author.date_of_death = fields.date_of_death;
        Ok(Some(author.clone()))
    }

    async fn authors_delete(&self, id: Uuid) -> AppResult<bool> {
        let mut catalog = self.catalog.write().await;
        if catalog.books.iter().any(|b| b.author_id == id) {
            return Err(AppError::Conflict(format!("Author {} still has books", id)));
        }
        let before = catalog.authors.len();
        catalog.authors.retain(|a| a.id != id);
        Ok(catalog.authors.len() < before)
    }

    // =========================================================================
    // GENRES
    // =========================================================================

    async fn genres_list(&self) -> AppResult<Vec<Genre>> {
        let mut genres = self.catalog.read().await.genres.clone();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn genres_get(&self, id: Uuid) -> AppResult<Option<Genre>> {
        Ok(self.catalog.read().await.genre(id).cloned())
    }

    async fn genres_count(&self) -> AppResult<i64> {
        Ok(self.catalog.read().await.genres.len() as i64)
    }

    async fn genres_insert_unique(&self, name: &str) -> AppResult<GenreInsert> {
        let mut catalog = self.catalog.write().await;
        if let Some(existing) = catalog.genre_named(name) {
            return Ok(GenreInsert::Existing(existing.clone()));
        }
        let genre = Genre {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        catalog.genres.push(genre.clone());
        Ok(GenreInsert::Created(genre))
    }

    async fn genres_update(&self, id: Uuid, name: &str) -> AppResult<Option<Genre>> {
        let mut catalog = self.catalog.write().await;
        if catalog.genre_named(name).is_some_and(|g| g.id != id) {
            return Err(AppError::Conflict(format!("Genre {} already exists", name)));
        }
        let Some(genre) = catalog.genres.iter_mut().find(|g| g.id == id) else {
            return Ok(None);
        };
        genre.name = name.to_string();
        Ok(Some(genre.clone()))
    }

    async fn genres_delete(&self, id: Uuid) -> AppResult<bool> {
        let mut catalog = self.catalog.write().await;
        if catalog.books.iter().any(|b| b.genre_ids.contains(&id)) {
            return Err(AppError::Conflict(format!("Genre {} still has books", id)));
        }
        let before = catalog.genres.len();
        catalog.genres.retain(|g| g.id != id);
        Ok(catalog.genres.len() < before)
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    async fn books_list(&self) -> AppResult<Vec<BookListing>> {
        let catalog = self.catalog.read().await;
        let mut rows = catalog
            .books
            .iter()
            .map(|book| -> AppResult<BookListing> {
                let author = catalog
                    .author(book.author_id)
                    .cloned()
                    .ok_or_else(|| dangling("book", book.id, "author", book.author_id))?;
                Ok(BookListing {
                    id: book.id,
                    title: book.title.clone(),
                    author,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        rows.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rows)
    }

    async fn books_get(&self, id: Uuid) -> AppResult<Option<BookDetail>> {
        let catalog = self.catalog.read().await;
        catalog
            .book(id)
            .map(|book| catalog.populate_book(book))
            .transpose()
    }

    async fn books_count(&self) -> AppResult<i64> {
        Ok(self.catalog.read().await.books.len() as i64)
    }

    async fn books_titles(&self) -> AppResult<Vec<BookTitle>> {
        let mut titles: Vec<BookTitle> = self
            .catalog
            .read()
            .await
            .books
            .iter()
            .map(|b| BookTitle {
                id: b.id,
                title: b.title.clone(),
            })
            .collect();
        titles.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(titles)
    }

    async fn books_by_author(&self, author_id: Uuid) -> AppResult<Vec<BookSummary>> {
        let catalog = self.catalog.read().await;
        Ok(Catalog::summaries(
            catalog.books.iter().filter(|b| b.author_id == author_id),
        ))
    }

    async fn books_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<BookSummary>> {
        let catalog = self.catalog.read().await;
        Ok(Catalog::summaries(
            catalog.books.iter().filter(|b| b.genre_ids.contains(&genre_id)),
        ))
    }

    async fn books_create(&self, fields: &BookFields) -> AppResult<Book> {
        let mut catalog = self.catalog.write().await;
        catalog.check_book_refs(fields)?;
        let book = Book {
            id: Uuid::new_v4(),
            title: fields.title.clone(),
            author_id: fields.author_id,
            summary: fields.summary.clone(),
            isbn: fields.isbn.clone(),
            genre_ids: fields.genre_ids.clone(),
        };
        catalog.books.push(book.clone());
        Ok(book)
    }

    async fn books_update(&self, id: Uuid, fields: &BookFields) -> AppResult<Option<Book>> {
        let mut catalog = self.catalog.write().await;
        catalog.check_book_refs(fields)?;
        let Some(book) = catalog.books.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        book.title = fields.title.clone();
        book.author_id = fields.author_id;
        book.summary = fields.summary.clone();
        book.isbn = fields.isbn.clone();
        book.genre_ids = fields.genre_ids.clone();
        Ok(Some(book.clone()))
    }

    async fn books_delete(&self, id: Uuid) -> AppResult<bool> {
        let mut catalog = self.catalog.write().await;
        if catalog.instances.iter().any(|i| i.book_id == id) {
            return Err(AppError::Conflict(format!("Book {} still has copies", id)));
        }
        let before = catalog.books.len();
        catalog.books.retain(|b| b.id != id);
        Ok(catalog.books.len() < before)
    }

    // =========================================================================
    // BOOK INSTANCES
    // =========================================================================

    async fn instances_list(&self) -> AppResult<Vec<BookInstanceDetail>> {
        let catalog = self.catalog.read().await;
        catalog
            .instances
            .iter()
            .map(|instance| catalog.populate_instance(instance))
            .collect()
    }

    async fn instances_get(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>> {
        let catalog = self.catalog.read().await;
        catalog
            .instances
            .iter()
            .find(|i| i.id == id)
            .map(|instance| catalog.populate_instance(instance))
            .transpose()
    }

    async fn instances_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>> {
        Ok(self
            .catalog
            .read()
            .await
            .instances
            .iter()
            .filter(|i| i.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn instances_count(&self, status: Option<InstanceStatus>) -> AppResult<i64> {
        let catalog = self.catalog.read().await;
        let count = catalog
            .instances
            .iter()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .count();
        Ok(count as i64)
    }

    async fn instances_create(&self, fields: &BookInstanceFields) -> AppResult<BookInstance> {
        let mut catalog = self.catalog.write().await;
        if catalog.book(fields.book_id).is_none() {
            return Err(AppError::Conflict(format!(
                "Book {} does not exist",
                fields.book_id
            )));
        }
        let instance = BookInstance {
            id: Uuid::new_v4(),
            book_id: fields.book_id,
            imprint: fields.imprint.clone(),
            status: fields.status,
            due_back: fields.due_back,
        };
        catalog.instances.push(instance.clone());
        Ok(instance)
    }

    async fn instances_update(
        &self,
        id: Uuid,
        fields: &BookInstanceFields,
    ) -> AppResult<Option<BookInstance>> {
        let mut catalog = self.catalog.write().await;
        if catalog.book(fields.book_id).is_none() {
            return Err(AppError::Conflict(format!(
                "Book {} does not exist",
                fields.book_id
            )));
        }
        let Some(instance) = catalog.instances.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        instance.book_id = fields.book_id;
        instance.imprint = fields.imprint.clone();
        instance.status = fields.status;
        instance.due_back = fields.due_back;
        Ok(Some(instance.clone()))
    }

    async fn instances_delete(&self, id: Uuid) -> AppResult<bool> {
        let mut catalog = self.catalog.write().await;
        let before = catalog.instances.len();
        catalog.instances.retain(|i| i.id != id);
        Ok(catalog.instances.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author_fields(family: &str) -> AuthorFields {
        AuthorFields {
            first_name: "Test".to_string(),
            family_name: family.to_string(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    #[tokio::test]
    async fn test_genre_names_unique_ignoring_case() {
        let store = MemoryStore::new();
        let created = store.genres_insert_unique("Fantasy").await.unwrap();
        assert!(matches!(created, GenreInsert::Created(_)));

        let again = store.genres_insert_unique("FANTASY").await.unwrap();
        assert_eq!(again, GenreInsert::Existing(created.genre().clone()));
        assert_eq!(store.genres_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_genre_rename_onto_existing_name_conflicts() {
        let store = MemoryStore::new();
        store.genres_insert_unique("Fantasy").await.unwrap();
        let poetry = store.genres_insert_unique("Poetry").await.unwrap();

        let err = store
            .genres_update(poetry.genre().id, "fantasy")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Case-only rename of the same genre is allowed
        let renamed = store
            .genres_update(poetry.genre().id, "POETRY")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "POETRY");
    }

    #[tokio::test]
    async fn test_references_enforced() {
        let store = MemoryStore::new();
        let author = store.authors_create(&author_fields("Herbert")).await.unwrap();
        let fields = BookFields {
            title: "Dune".to_string(),
            author_id: author.id,
            summary: "Spice.".to_string(),
            isbn: "9780441013593".to_string(),
            genre_ids: vec![],
        };

        let dangling = BookFields {
            author_id: Uuid::new_v4(),
            ..fields.clone()
        };
        assert!(matches!(
            store.books_create(&dangling).await,
            Err(AppError::Conflict(_))
        ));

        let book = store.books_create(&fields).await.unwrap();
        assert!(matches!(
            store.authors_delete(author.id).await,
            Err(AppError::Conflict(_))
        ));

        store
            .instances_create(&BookInstanceFields {
                book_id: book.id,
                imprint: "Chilton, 1965".to_string(),
                status: InstanceStatus::Available,
                due_back: None,
            })
            .await
            .unwrap();
        assert!(matches!(
            store.books_delete(book.id).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(
            store
                .instances_count(Some(InstanceStatus::Available))
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            store.instances_count(Some(InstanceStatus::Loaned)).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_genre_with_books_not_deleted() {
        let store = MemoryStore::new();
        let author = store.authors_create(&author_fields("Herbert")).await.unwrap();
        let genre = store.genres_insert_unique("Science Fiction").await.unwrap();
        let genre_id = genre.genre().id;
        let book = store
            .books_create(&BookFields {
                title: "Dune".to_string(),
                author_id: author.id,
                summary: "Spice.".to_string(),
                isbn: "9780441013593".to_string(),
                genre_ids: vec![genre_id],
            })
            .await
            .unwrap();

        let titles: Vec<String> = store
            .books_by_genre(genre_id)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, ["Dune"]);

        assert!(matches!(
            store.genres_delete(genre_id).await,
            Err(AppError::Conflict(_))
        ));
        assert!(store.genres_get(genre_id).await.unwrap().is_some());

        assert!(store.books_delete(book.id).await.unwrap());
        assert!(store.genres_delete(genre_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_authors_sorted_by_family_name() {
        let store = MemoryStore::new();
        for family in ["Tolkien", "Asimov", "LeGuin"] {
            store.authors_create(&author_fields(family)).await.unwrap();
        }
        let names: Vec<String> = store
            .authors_list()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.family_name)
            .collect();
        assert_eq!(names, ["Asimov", "LeGuin", "Tolkien"]);
    }

    #[tokio::test]
    async fn test_missing_records_are_none() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert_eq!(store.books_get(id).await.unwrap(), None);
        assert_eq!(store.instances_get(id).await.unwrap(), None);
        assert!(!store.genres_delete(id).await.unwrap());
        assert_eq!(
            store.authors_update(id, &author_fields("Nobody")).await.unwrap(),
            None
        );
    }
}
