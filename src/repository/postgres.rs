//! PostgreSQL catalog store

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use uuid::Uuid;

use super::CatalogStore;
use crate::{
    config::{DatabaseConfig, NameMatch},
    error::AppResult,
    models::{Author, Book, BookInstance, BookStatus, BookSummary, Genre},
};

const AUTHOR_COLUMNS: &str = "id, first_name, family_name, date_of_birth, date_of_death";
const BOOK_COLUMNS: &str = "id, title, author_id, summary, isbn, genre_ids";
const INSTANCE_COLUMNS: &str = "id, book_id, imprint, status, due_back";

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open a connection pool using the database settings
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
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
        let rows = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors ORDER BY family_name",
            AUTHOR_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn authors_get(&self, id: Uuid) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors WHERE id = $1",
            AUTHOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn authors_get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors WHERE id = ANY($1)",
            AUTHOR_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn authors_insert(&self, author: &Author) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO authors (id, first_name, family_name, date_of_birth, date_of_death)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(author.id)
        .bind(&author.first_name)
        .bind(&author.family_name)
        .bind(author.date_of_birth)
        .bind(author.date_of_death)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn authors_replace(&self, author: &Author) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE authors
            SET first_name = $2, family_name = $3, date_of_birth = $4, date_of_death = $5
            WHERE id = $1
            "#,
        )
        .bind(author.id)
        .bind(&author.first_name)
        .bind(&author.family_name)
        .bind(author.date_of_birth)
        .bind(author.date_of_death)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn authors_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn authors_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // GENRES
    // =========================================================================

    async fn genres_list(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn genres_get(&self, id: Uuid) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn genres_get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn genres_find_by_name(&self, name: &str, matching: NameMatch) -> AppResult<Option<Genre>> {
        let query = match matching {
            NameMatch::Exact => "SELECT id, name FROM genres WHERE name = $1 LIMIT 1",
            NameMatch::CaseInsensitive => {
                "SELECT id, name FROM genres WHERE lower(name) = lower($1) LIMIT 1"
            }
        };
        let row = sqlx::query_as::<_, Genre>(query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn genres_insert(&self, genre: &Genre) -> AppResult<()> {
        sqlx::query("INSERT INTO genres (id, name) VALUES ($1, $2)")
            .bind(genre.id)
            .bind(&genre.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn genres_replace(&self, genre: &Genre) -> AppResult<bool> {
        let result = sqlx::query("UPDATE genres SET name = $2 WHERE id = $1")
            .bind(genre.id)
            .bind(&genre.name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn genres_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn genres_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    async fn books_list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books ORDER BY title",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn books_get(&self, id: Uuid) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn books_get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = ANY($1)",
            BOOK_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn books_by_author(&self, author_id: Uuid) -> AppResult<Vec<BookSummary>> {
        let rows = sqlx::query_as::<_, BookSummary>(
            "SELECT id, title, summary FROM books WHERE author_id = $1 ORDER BY title",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn books_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<BookSummary>> {
        let rows = sqlx::query_as::<_, BookSummary>(
            "SELECT id, title, summary FROM books WHERE $1 = ANY(genre_ids) ORDER BY title",
        )
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn books_insert(&self, book: &Book) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO books (id, title, author_id, summary, isbn, genre_ids)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(&book.genre_ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn books_replace(&self, book: &Book) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, author_id = $3, summary = $4, isbn = $5, genre_ids = $6
            WHERE id = $1
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(&book.genre_ids)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn books_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn books_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // BOOK INSTANCES
    // =========================================================================

    async fn instances_list(&self) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query_as::<_, BookInstance>(&format!(
            "SELECT {} FROM book_instances ORDER BY created_at",
            INSTANCE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn instances_get(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        let row = sqlx::query_as::<_, BookInstance>(&format!(
            "SELECT {} FROM book_instances WHERE id = $1",
            INSTANCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn instances_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query_as::<_, BookInstance>(&format!(
            "SELECT {} FROM book_instances WHERE book_id = $1 ORDER BY created_at",
            INSTANCE_COLUMNS
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn instances_insert(&self, instance: &BookInstance) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, status, due_back)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(instance.id)
        .bind(instance.book_id)
        .bind(&instance.imprint)
        .bind(instance.status)
        .bind(instance.due_back)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn instances_replace(&self, instance: &BookInstance) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances
            SET book_id = $2, imprint = $3, status = $4, due_back = $5
            WHERE id = $1
            "#,
        )
        .bind(instance.id)
        .bind(instance.book_id)
        .bind(&instance.imprint)
        .bind(instance.status)
        .bind(instance.due_back)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn instances_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn instances_count(&self, status: Option<BookStatus>) -> AppResult<i64> {
        let count: i64 = match status {
            Some(status) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
                    .bind(status)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }
}
