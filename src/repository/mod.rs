//! Repository layer for book persistence

pub mod books;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::Book};

/// Outcome of a write guarded by the cooldown window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardedUpdate {
    /// The row was overwritten; carries the stored record
    Applied(Book),
    /// The row was written too recently and was left untouched
    Throttled { last_update: DateTime<Utc> },
    /// No row with this ISBN
    Missing,
}

/// Persistence operations the book lifecycle relies on.
///
/// Implementations must make `insert` fail with `AppError::Conflict` on a
/// duplicate ISBN, and must evaluate the `update` guard and the write as one
/// atomic step.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn insert(&self, book: &Book) -> AppResult<()>;

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>>;

    /// All books, ordered by ISBN
    async fn list_all(&self) -> AppResult<Vec<Book>>;

    /// Overwrite the row for `book.isbn` only if its `update_time` is at or
    /// before `settled_before`
    async fn update(&self, book: &Book, settled_before: DateTime<Utc>) -> AppResult<GuardedUpdate>;

    /// Returns whether a row was removed
    async fn delete(&self, isbn: &str) -> AppResult<bool>;

    /// Connectivity check
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding the book store
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
}

impl Repository {
    /// Create a new repository backed by PostgreSQL
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self::with_store(Arc::new(books::PgBookStore::new(pool)))
    }

    /// Create a repository that keeps books in process memory
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(memory::MemoryBookStore::new()))
    }

    pub fn with_store(books: Arc<dyn BookStore>) -> Self {
        Self { books }
    }
}
