//! Catalogue domain model.
//!
//! # Responsibility
//! - Define the entities browsed and reviewed by the catalogue.
//! - Reject invalid entities at construction time.
//! - Own the factory functions that establish two-sided relationships.
//!
//! # Invariants
//! - Cross-entity references are keys (book id, author id, publisher name,
//!   genre name, user name), never shared pointers.
//! - Genre<->Book and Review<->User<->Book links are only established through
//!   `make_genre_association` and `make_review`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod author;
pub mod book;
pub mod genre;
pub mod inventory;
pub mod publisher;
pub mod review;
pub mod user;

/// Externally assigned book identifier.
pub type BookId = u32;

/// Externally assigned author identifier.
pub type AuthorId = u32;

/// Domain validation and conflict errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Rating outside `1..=5`.
    InvalidRating(i64),
    /// User name is blank after trim.
    InvalidUserName,
    /// Password shorter than the accepted minimum.
    PasswordTooShort { min: usize, actual: usize },
    /// Author id is negative or out of range.
    InvalidAuthorId(i64),
    /// Author full name is blank after trim.
    InvalidAuthorName,
    /// Genre is already linked to the book.
    GenreAlreadyApplied { genre: String, book_id: BookId },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRating(rating) => {
                write!(f, "rating must be between 1 and 5, got {rating}")
            }
            Self::InvalidUserName => write!(f, "user name must not be blank"),
            Self::PasswordTooShort { min, actual } => write!(
                f,
                "password must be at least {min} characters, got {actual}"
            ),
            Self::InvalidAuthorId(id) => write!(f, "invalid author id {id}"),
            Self::InvalidAuthorName => write!(f, "author full name must not be blank"),
            Self::GenreAlreadyApplied { genre, book_id } => {
                write!(f, "genre `{genre}` already applied to book {book_id}")
            }
        }
    }
}

impl Error for ModelError {}

/// Trims `value` and returns `None` when nothing is left.
pub(crate) fn normalize_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
