//! PostgreSQL catalog store.
//!
//! Reference rules and genre name uniqueness are enforced by the schema
//! (see `migrations/`); constraint violations surface as `AppError::Conflict`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, Pool, Postgres, Row};
use uuid::Uuid;

use super::{CatalogStore, GenreInsert};
use crate::{
    error::{AppError, AppResult},
    models::{
        Author, AuthorFields, Book, BookDetail, BookFields, BookInstance, BookInstanceDetail,
        BookInstanceFields, BookListing, BookSummary, BookTitle, Genre, InstanceStatus,
    },
};

const AUTHOR_COLUMNS: &str = "id, first_name, family_name, date_of_birth, date_of_death";

const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.summary, b.isbn,
           a.id AS author_id, a.first_name, a.family_name,
           a.date_of_birth, a.date_of_death
    FROM books b
    JOIN authors a ON a.id = b.author_id
"#;

const INSTANCE_SELECT: &str = r#"
    SELECT i.id, i.book_id, b.title, i.imprint, i.status, i.due_back
    FROM book_instances i
    JOIN books b ON b.id = i.book_id
"#;

/// Book joined with its author
#[derive(FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    summary: String,
    isbn: String,
    author_id: Uuid,
    first_name: String,
    family_name: String,
    date_of_birth: Option<NaiveDate>,
    date_of_death: Option<NaiveDate>,
}

impl BookRow {
    fn author(&self) -> Author {
        Author {
            id: self.author_id,
            first_name: self.first_name.clone(),
            family_name: self.family_name.clone(),
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
        }
    }
}

/// Copy joined with its book title
#[derive(FromRow)]
struct InstanceRow {
    id: Uuid,
    book_id: Uuid,
    title: String,
    imprint: String,
    status: String,
    due_back: Option<NaiveDate>,
}

impl TryFrom<InstanceRow> for BookInstanceDetail {
    type Error = AppError;

    fn try_from(row: InstanceRow) -> AppResult<Self> {
        Ok(BookInstanceDetail {
            id: row.id,
            book: BookTitle {
                id: row.book_id,
                title: row.title,
            },
            imprint: row.imprint,
            status: parse_status(&row.status)?,
            due_back: row.due_back,
        })
    }
}

fn parse_status(value: &str) -> AppResult<InstanceStatus> {
    value.parse().map_err(AppError::Internal)
}

/// Map constraint violations to `Conflict`, anything else to `Database`.
fn constraint_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() || db.is_foreign_key_violation() {
            return AppError::Conflict(db.message().to_string());
        }
    }
    AppError::Database(err)
}

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn genres_of(&self, book_id: Uuid) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM genres g
            JOIN book_genres bg ON bg.genre_id = g.id
            WHERE bg.book_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    async fn count(&self, table: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    async fn authors_list(&self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors ORDER BY family_name, first_name",
            AUTHOR_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    async fn authors_get(&self, id: Uuid) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors WHERE id = $1",
            AUTHOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(author)
    }

    async fn authors_count(&self) -> AppResult<i64> {
        self.count("authors").await
    }

    async fn authors_create(&self, fields: &AuthorFields) -> AppResult<Author> {
        let author = sqlx::query_as::<_, Author>(&format!(
            r#"
            INSERT INTO authors (id, first_name, family_name, date_of_birth, date_of_death)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            AUTHOR_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&fields.first_name)
        .bind(&fields.family_name)
        .bind(fields.date_of_birth)
        .bind(fields.date_of_death)
        .fetch_one(&self.pool)
        .await?;
        Ok(author)
    }

    async fn authors_update(&self, id: Uuid, fields: &AuthorFields) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(&format!(
            r#"
            UPDATE authors SET
                first_name = $1,
                family_name = $2,
                date_of_birth = $3,
                date_of_death = $4
            WHERE id = $5
            RETURNING {}
            "#,
            AUTHOR_COLUMNS
        ))
        .bind(&fields.first_name)
        .bind(&fields.family_name)
        .bind(fields.date_of_birth)
        .bind(fields.date_of_death)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(author)
    }

    async fn authors_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(constraint_error)?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // GENRES
    // =========================================================================

    async fn genres_list(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    async fn genres_get(&self, id: Uuid) -> AppResult<Option<Genre>> {
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(genre)
    }

    async fn genres_count(&self) -> AppResult<i64> {
        self.count("genres").await
    }

    async fn genres_insert_unique(&self, name: &str) -> AppResult<GenreInsert> {
        let created = sqlx::query_as::<_, Genre>(
            r#"
            INSERT INTO genres (id, name) VALUES ($1, $2)
            ON CONFLICT ((lower(name))) DO NOTHING
            RETURNING id, name
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(genre) = created {
            return Ok(GenreInsert::Created(genre));
        }

        sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE lower(name) = lower($1)")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .map(GenreInsert::Existing)
            .ok_or_else(|| {
                AppError::Internal(format!("Genre {} conflicted but could not be found", name))
            })
    }

    async fn genres_update(&self, id: Uuid, name: &str) -> AppResult<Option<Genre>> {
        let genre = sqlx::query_as::<_, Genre>(
            "UPDATE genres SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(constraint_error)?;
        Ok(genre)
    }

    async fn genres_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(constraint_error)?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    async fn books_list(&self) -> AppResult<Vec<BookListing>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!("{} ORDER BY b.title", BOOK_SELECT))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| BookListing {
                author: row.author(),
                id: row.id,
                title: row.title,
            })
            .collect())
    }

    async fn books_get(&self, id: Uuid) -> AppResult<Option<BookDetail>> {
        let Some(row) = sqlx::query_as::<_, BookRow>(&format!("{} WHERE b.id = $1", BOOK_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let genres = self.genres_of(id).await?;

        Ok(Some(BookDetail {
            author: row.author(),
            id: row.id,
            title: row.title,
            summary: row.summary,
            isbn: row.isbn,
            genres,
        }))
    }

    async fn books_count(&self) -> AppResult<i64> {
        self.count("books").await
    }

    async fn books_titles(&self) -> AppResult<Vec<BookTitle>> {
        let titles = sqlx::query_as::<_, BookTitle>("SELECT id, title FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        Ok(titles)
    }

    async fn books_by_author(&self, author_id: Uuid) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(
            "SELECT id, title, summary FROM books WHERE author_id = $1 ORDER BY title",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn books_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT b.id, b.title, b.summary
            FROM books b
            JOIN book_genres bg ON bg.book_id = b.id
            WHERE bg.genre_id = $1
            ORDER BY b.title
            "#,
        )
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn books_create(&self, fields: &BookFields) -> AppResult<Book> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO books (id, title, author_id, summary, isbn)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&fields.title)
        .bind(fields.author_id)
        .bind(&fields.summary)
        .bind(&fields.isbn)
        .execute(&mut *tx)
        .await
        .map_err(constraint_error)?;

        sqlx::query("INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::uuid[])")
            .bind(id)
            .bind(&fields.genre_ids)
            .execute(&mut *tx)
            .await
            .map_err(constraint_error)?;

        tx.commit().await?;

        Ok(Book {
            id,
            title: fields.title.clone(),
            author_id: fields.author_id,
            summary: fields.summary.clone(),
            isbn: fields.isbn.clone(),
            genre_ids: fields.genre_ids.clone(),
        })
    }

    async fn books_update(&self, id: Uuid, fields: &BookFields) -> AppResult<Option<Book>> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = $1,
                author_id = $2,
                summary = $3,
                isbn = $4
            WHERE id = $5
            "#,
        )
        .bind(&fields.title)
        .bind(fields.author_id)
        .bind(&fields.summary)
        .bind(&fields.isbn)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(constraint_error)?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::uuid[])")
            .bind(id)
            .bind(&fields.genre_ids)
            .execute(&mut *tx)
            .await
            .map_err(constraint_error)?;

        tx.commit().await?;

        Ok(Some(Book {
            id,
            title: fields.title.clone(),
            author_id: fields.author_id,
            summary: fields.summary.clone(),
            isbn: fields.isbn.clone(),
            genre_ids: fields.genre_ids.clone(),
        }))
    }

    async fn books_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(constraint_error)?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // BOOK INSTANCES
    // =========================================================================

    async fn instances_list(&self) -> AppResult<Vec<BookInstanceDetail>> {
        sqlx::query_as::<_, InstanceRow>(&format!(
            "{} ORDER BY i.created_at, i.id",
            INSTANCE_SELECT
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(BookInstanceDetail::try_from)
        .collect()
    }

    async fn instances_get(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>> {
        sqlx::query_as::<_, InstanceRow>(&format!("{} WHERE i.id = $1", INSTANCE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(BookInstanceDetail::try_from)
            .transpose()
    }

    async fn instances_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query(
            r#"
            SELECT id, book_id, imprint, status, due_back
            FROM book_instances
            WHERE book_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| -> AppResult<BookInstance> {
                Ok(BookInstance {
                    id: r.get("id"),
                    book_id: r.get("book_id"),
                    imprint: r.get("imprint"),
                    status: parse_status(r.get("status"))?,
                    due_back: r.get("due_back"),
                })
            })
            .collect()
    }

    async fn instances_count(&self, status: Option<InstanceStatus>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE $1::text IS NULL OR status = $1",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn instances_create(&self, fields: &BookInstanceFields) -> AppResult<BookInstance> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, status, due_back)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(fields.book_id)
        .bind(&fields.imprint)
        .bind(fields.status.as_str())
        .bind(fields.due_back)
        .execute(&self.pool)
        .await
        .map_err(constraint_error)?;

        Ok(BookInstance {
            id,
            book_id: fields.book_id,
            imprint: fields.imprint.clone(),
            status: fields.status,
            due_back: fields.due_back,
        })
    }

    async fn instances_update(
        &self,
        id: Uuid,
        fields: &BookInstanceFields,
    ) -> AppResult<Option<BookInstance>> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances SET
                book_id = $1,
                imprint = $2,
                status = $3,
                due_back = $4
            WHERE id = $5
            "#,
        )
        .bind(fields.book_id)
        .bind(&fields.imprint)
        .bind(fields.status.as_str())
        .bind(fields.due_back)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(constraint_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(BookInstance {
            id,
            book_id: fields.book_id,
            imprint: fields.imprint.clone(),
            status: fields.status,
            due_back: fields.due_back,
        }))
    }

    async fn instances_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
