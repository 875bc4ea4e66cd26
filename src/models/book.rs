//! Book model and request payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Seconds of `0001-01-01T00:00:00Z`, sent by some clients for an unset timestamp
const ZERO_INSTANT_SECS: i64 = -62_135_596_800;

/// Book author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, Validate, ToSchema)]
pub struct Author {
    #[sqlx(rename = "author_first_name")]
    #[serde(default)]
    #[validate(length(min = 1))]
    pub first_name: String,
    #[sqlx(rename = "author_last_name")]
    #[serde(default)]
    #[validate(length(min = 1))]
    pub last_name: String,
}

/// Book record as stored in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    /// 13-digit ISBN, primary key
    #[schema(example = "1233211233215")]
    pub isbn: String,
    pub title: String,
    #[sqlx(flatten)]
    pub author: Author,
    pub publisher: String,
    /// Set by the server when the book is created
    pub create_time: DateTime<Utc>,
    /// Set by the server on creation and on every update
    pub update_time: DateTime<Utc>,
}

impl Book {
    /// Build a new record from a payload; both timestamps are `now`
    pub fn from_payload(isbn: &str, payload: BookPayload, now: DateTime<Utc>) -> Self {
        Self {
            isbn: isbn.to_string(),
            title: payload.title,
            author: payload.author,
            publisher: payload.publisher,
            create_time: now,
            update_time: now,
        }
    }

    /// Copy of this record with the caller-writable fields replaced
    pub fn revised(&self, payload: BookPayload, now: DateTime<Utc>) -> Self {
        Self {
            isbn: self.isbn.clone(),
            title: payload.title,
            author: payload.author,
            publisher: payload.publisher,
            create_time: self.create_time,
            update_time: now,
        }
    }
}

/// Create/update book request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookPayload {
    /// Must match the ISBN in the path when present
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    #[validate(nested)]
    pub author: Author,
    #[serde(default)]
    pub publisher: String,
    /// Server-owned; must be absent, null or zero
    #[serde(default)]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub create_time: Option<serde_json::Value>,
    /// Server-owned; must be absent, null or zero
    #[serde(default)]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub update_time: Option<serde_json::Value>,
}

/// Null and the zero instant mean "not set"; any other JSON value is a write attempt
fn is_set(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::String(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(t) => t.timestamp() != ZERO_INSTANT_SECS || t.timestamp_subsec_nanos() != 0,
            Err(_) => true,
        },
        _ => true,
    }
}

impl BookPayload {
    /// Whether the caller tried to write `create_time` or `update_time`
    pub fn sets_timestamps(&self) -> bool {
        [&self.create_time, &self.update_time]
            .into_iter()
            .flatten()
            .any(is_set)
    }

    /// Body ISBN, treating an empty one as not supplied
    pub fn isbn(&self) -> Option<&str> {
        if self.isbn.is_empty() {
            None
        } else {
            Some(&self.isbn)
        }
    }
}
