//! In-process book store.
//!
//! Every mutation runs under a single write lock, which gives the same
//! check-and-write atomicity the PostgreSQL store gets from its constraints
//! and conditional statements.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{BookStore, GuardedUpdate};
use crate::{
    error::{AppError, AppResult},
    models::Book,
};

#[derive(Default)]
pub struct MemoryBookStore {
    books: RwLock<BTreeMap<String, Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn insert(&self, book: &Book) -> AppResult<()> {
        let mut books = self.books.write().await;
        if books.contains_key(&book.isbn) {
            return Err(AppError::Conflict(format!("Book {} already exists", book.isbn)));
        }
        books.insert(book.isbn.clone(), book.clone());
        Ok(())
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        Ok(self.books.read().await.get(isbn).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Book>> {
        Ok(self.books.read().await.values().cloned().collect())
    }

    async fn update(&self, book: &Book, settled_before: DateTime<Utc>) -> AppResult<GuardedUpdate> {
        let mut books = self.books.write().await;
        let Some(stored) = books.get_mut(&book.isbn) else {
            return Ok(GuardedUpdate::Missing);
        };
        if stored.update_time > settled_before {
            return Ok(GuardedUpdate::Throttled { last_update: stored.update_time });
        }

        stored.title = book.title.clone();
        stored.author = book.author.clone();
        stored.publisher = book.publisher.clone();
        stored.update_time = book.update_time;
        Ok(GuardedUpdate::Applied(stored.clone()))
    }

    async fn delete(&self, isbn: &str) -> AppResult<bool> {
        Ok(self.books.write().await.remove(isbn).is_some())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
