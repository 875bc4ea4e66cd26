//! PostgreSQL book store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use super::{BookStore, GuardedUpdate};
use crate::{
    error::{AppError, AppResult},
    models::Book,
};

const BOOK_COLUMNS: &str = "isbn, title, author_first_name, author_last_name, publisher, create_time, update_time";

#[derive(Clone)]
pub struct PgBookStore {
    pool: Pool<Postgres>,
}

impl PgBookStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn insert(&self, book: &Book) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO books (isbn, title, author_first_name, author_last_name, publisher, create_time, update_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author.first_name)
        .bind(&book.author.last_name)
        .bind(&book.publisher)
        .bind(book.create_time)
        .bind(book.update_time)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // Lost a create race: the primary key decides
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AppError::Conflict(
                format!("Book {} already exists", book.isbn),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE isbn = $1",
            BOOK_COLUMNS
        ))
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn list_all(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books ORDER BY isbn",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update(&self, book: &Book, settled_before: DateTime<Utc>) -> AppResult<GuardedUpdate> {
        let updated = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET title = $2, author_first_name = $3, author_last_name = $4,
                publisher = $5, update_time = $6
            WHERE isbn = $1 AND update_time <= $7
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author.first_name)
        .bind(&book.author.last_name)
        .bind(&book.publisher)
        .bind(book.update_time)
        .bind(settled_before)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(stored) = updated {
            return Ok(GuardedUpdate::Applied(stored));
        }

        // The guard refused: tell a recent write apart from a missing row
        let last_update: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT update_time FROM books WHERE isbn = $1")
                .bind(&book.isbn)
                .fetch_optional(&self.pool)
                .await?;

        Ok(match last_update {
            Some(last_update) => GuardedUpdate::Throttled { last_update },
            None => GuardedUpdate::Missing,
        })
    }

    async fn delete(&self, isbn: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = $1")
            .bind(isbn)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
