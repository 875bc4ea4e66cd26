//! Data models for Bookshelf

pub mod book;

pub use book::{Author, Book, BookPayload};
