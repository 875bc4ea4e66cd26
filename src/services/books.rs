//! Book lifecycle service
//!
//! Owns the create/read/update/delete protocol: identity checks first, then
//! the existence, immutability and cooldown rules, then storage.

use std::{future::Future, sync::Arc};

use chrono::Duration;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult, ForbiddenField},
    models::{Book, BookPayload},
    repository::{GuardedUpdate, Repository},
    validation,
};

use super::clock::{Clock, SystemClock};

const BOOK_EXISTS: &str = "A book with this ISBN already exits";
const BOOK_MISSING: &str = "The book did not exist in the library";
const BOOK_ALREADY_GONE: &str = "The book did not exist in the library or was already deleted";

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
    clock: Arc<dyn Clock>,
    cooldown: Duration,
    storage_timeout: std::time::Duration,
}

impl BookService {
    pub fn new(repository: Repository, config: &CatalogConfig) -> Self {
        Self::with_clock(repository, config, Arc::new(SystemClock))
    }

    pub fn with_clock(repository: Repository, config: &CatalogConfig, clock: Arc<dyn Clock>) -> Self {
        let cooldown_secs = config.update_cooldown_secs.min(u32::MAX as u64) as i64;
        Self {
            repository,
            clock,
            cooldown: Duration::seconds(cooldown_secs),
            storage_timeout: std::time::Duration::from_millis(config.storage_timeout_ms),
        }
    }

    /// Run a storage call, failing with a storage error once the timeout elapses
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::time::timeout(self.storage_timeout, call)
            .await
            .map_err(|_| {
                AppError::Storage(format!(
                    "{} did not complete within {:?}",
                    operation, self.storage_timeout
                ))
            })?
    }

    /// Create a book under `isbn`
    pub async fn create(&self, isbn: &str, payload: BookPayload) -> AppResult<Book> {
        validation::validate_for_create(isbn, &payload)?;

        let store = &self.repository.books;
        if self.bounded("find_by_isbn", store.find_by_isbn(isbn)).await?.is_some() {
            tracing::debug!(isbn = %isbn, "create refused, book already exists");
            return Err(AppError::Conflict(BOOK_EXISTS.to_string()));
        }
        validation::validate_record_shape(&payload)?;

        let book = Book::from_payload(isbn, payload, self.clock.now());
        match self.bounded("insert", store.insert(&book)).await {
            Ok(()) => {}
            Err(AppError::Conflict(_)) => {
                tracing::debug!(isbn = %isbn, "create lost a race on the same ISBN");
                return Err(AppError::Conflict(BOOK_EXISTS.to_string()));
            }
            Err(e) => return Err(e),
        }

        tracing::info!(isbn = %book.isbn, title = %book.title, "book created");
        Ok(book)
    }

    /// List every book in the catalog
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.bounded("list_all", self.repository.books.list_all()).await
    }

    /// Get a book by ISBN
    pub async fn find_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        self.bounded("find_by_isbn", self.repository.books.find_by_isbn(isbn))
            .await?
            .ok_or_else(|| AppError::NotFound(BOOK_MISSING.to_string()))
    }

    /// Replace the title, author and publisher of the book at `isbn`.
    ///
    /// Refused while the previous write to the same book is younger than the
    /// cooldown window. The window check and the write are a single storage
    /// operation, so concurrent updates cannot both slip through.
    pub async fn update(&self, isbn: &str, payload: BookPayload) -> AppResult<Book> {
        validation::validate_for_update(isbn, &payload)?;

        let store = &self.repository.books;
        let existing = self
            .bounded("find_by_isbn", store.find_by_isbn(isbn))
            .await?
            .ok_or_else(|| AppError::NotFound(BOOK_MISSING.to_string()))?;

        if payload.isbn().is_some_and(|body| body != isbn) {
            return Err(AppError::ForbiddenField(ForbiddenField::Isbn));
        }
        if payload.sets_timestamps() {
            return Err(AppError::ForbiddenField(ForbiddenField::Timestamps));
        }

        let now = self.clock.now();
        let revision = existing.revised(payload, now);
        match self.bounded("update", store.update(&revision, now - self.cooldown)).await? {
            GuardedUpdate::Applied(book) => {
                tracing::info!(isbn = %book.isbn, title = %book.title, "book updated");
                Ok(book)
            }
            GuardedUpdate::Throttled { last_update } => {
                let remaining = last_update + self.cooldown - now;
                tracing::debug!(isbn = %isbn, remaining_ms = remaining.num_milliseconds(), "update throttled");
                Err(AppError::Cooldown { remaining })
            }
            GuardedUpdate::Missing => Err(AppError::NotFound(BOOK_MISSING.to_string())),
        }
    }

    /// Delete the book at `isbn`
    pub async fn delete(&self, isbn: &str) -> AppResult<()> {
        if !self.bounded("delete", self.repository.books.delete(isbn)).await? {
            return Err(AppError::NotFound(BOOK_ALREADY_GONE.to_string()));
        }
        tracing::info!(isbn = %isbn, "book deleted");
        Ok(())
    }

    /// Check that storage answers
    pub async fn ping(&self) -> AppResult<()> {
        self.bounded("ping", self.repository.books.ping()).await
    }
}
