//! Record validation performed before any storage access.
//!
//! Rules are pure predicates over the path ISBN and the decoded payload. They
//! report a tagged [`RecordViolation`] which converts into an [`AppError`].

use once_cell::sync::Lazy;
use regex::Regex;
use validator::Validate;

use crate::{
    error::{AppError, ForbiddenField},
    models::BookPayload,
};

static ISBN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{13}$").expect("ISBN pattern is a valid regex"));

/// Why a record was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordViolation {
    /// One or more fields have the wrong shape
    Malformed { fields: Vec<String> },
    /// The payload writes `create_time` or `update_time`
    ServerOwnedField,
}

impl From<RecordViolation> for AppError {
    fn from(violation: RecordViolation) -> Self {
        match violation {
            RecordViolation::Malformed { fields } => AppError::Validation { fields },
            RecordViolation::ServerOwnedField => AppError::ForbiddenField(ForbiddenField::Timestamps),
        }
    }
}

/// Exactly 13 ASCII digits
pub fn is_valid_isbn(isbn: &str) -> bool {
    ISBN_PATTERN.is_match(isbn)
}

/// Field names rejected by the derived payload rules
fn shape_errors(payload: &BookPayload) -> Vec<String> {
    match payload.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => errors.errors().keys().map(|k| k.to_string()).collect(),
    }
}

fn malformed(mut fields: Vec<String>) -> Result<(), RecordViolation> {
    if fields.is_empty() {
        return Ok(());
    }
    fields.sort();
    fields.dedup();
    Err(RecordViolation::Malformed { fields })
}

/// Check the identity and server-owned fields of a record about to be
/// created under `isbn`.
///
/// Title and author are left to [`validate_record_shape`], which the create
/// operation applies once it knows the ISBN is free.
pub fn validate_for_create(isbn: &str, payload: &BookPayload) -> Result<(), RecordViolation> {
    let body_mismatch = payload.isbn().is_some_and(|body| body != isbn);
    if !is_valid_isbn(isbn) || body_mismatch {
        return malformed(vec!["isbn".to_string()]);
    }

    if payload.sets_timestamps() {
        return Err(RecordViolation::ServerOwnedField);
    }
    Ok(())
}

/// Non-empty title and author names
pub fn validate_record_shape(payload: &BookPayload) -> Result<(), RecordViolation> {
    malformed(shape_errors(payload))
}

/// Check a replacement record for the book at `isbn`.
///
/// The body ISBN is left to the identity rule of the update operation, and
/// server-owned timestamps are checked there too, after the book is found.
pub fn validate_for_update(isbn: &str, payload: &BookPayload) -> Result<(), RecordViolation> {
    let mut fields = shape_errors(payload);
    if !is_valid_isbn(isbn) {
        fields.push("isbn".to_string());
    }
    malformed(fields)
}
