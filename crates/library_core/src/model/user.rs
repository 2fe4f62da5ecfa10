//! User entity.
//!
//! # Invariants
//! - `user_name` is trimmed, lower-cased and non-empty.
//! - `password` holds at least `MIN_PASSWORD_CHARS` characters. It is stored
//!   as given; callers hash it beforehand.
//! - Review and read-book collections are append-only.

use super::book::Book;
use super::review::Review;
use super::{BookId, ModelError};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

pub const MIN_PASSWORD_CHARS: usize = 7;

/// Registered catalogue user.
#[derive(Debug, Clone)]
pub struct User {
    user_name: String,
    password: String,
    reviews: Vec<Review>,
    read_books: Vec<BookId>,
    pages_read: u64,
}

impl User {
    /// Creates a user.
    ///
    /// # Errors
    /// - `InvalidUserName` when `user_name` is blank after trim.
    /// - `PasswordTooShort` when `password` has fewer than 7 characters.
    pub fn new(user_name: &str, password: &str) -> Result<Self, ModelError> {
        let user_name = normalize_user_name(user_name).ok_or(ModelError::InvalidUserName)?;
        check_password_length(password)?;

        Ok(Self {
            user_name,
            password: password.to_string(),
            reviews: Vec::new(),
            read_books: Vec::new(),
            pages_read: 0,
        })
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn read_books(&self) -> &[BookId] {
        &self.read_books
    }

    pub fn pages_read(&self) -> u64 {
        self.pages_read
    }

    /// Records `book` as read and adds its page count when known.
    pub fn read_a_book(&mut self, book: &Book) {
        self.read_books.push(book.id());
        if let Some(pages) = book.num_pages() {
            self.pages_read += u64::from(pages);
        }
    }

    pub(crate) fn add_review(&mut self, review: Review) {
        self.reviews.push(review);
    }

    pub(crate) fn clear_reviews(&mut self) {
        self.reviews.clear();
    }

    pub(crate) fn restore_reading(&mut self, read_books: Vec<BookId>, pages_read: u64) {
        self.read_books = read_books;
        self.pages_read = pages_read;
    }
}

/// Rejects passwords shorter than `MIN_PASSWORD_CHARS` characters.
///
/// Callers that hash passwords run this on the plain text first.
pub fn check_password_length(password: &str) -> Result<(), ModelError> {
    let actual = password.chars().count();
    if actual < MIN_PASSWORD_CHARS {
        return Err(ModelError::PasswordTooShort {
            min: MIN_PASSWORD_CHARS,
            actual,
        });
    }
    Ok(())
}

/// Trims and lower-cases a user name; `None` when blank.
pub fn normalize_user_name(user_name: &str) -> Option<String> {
    let trimmed = user_name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.user_name == other.user_name
    }
}

impl Eq for User {}

impl PartialOrd for User {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for User {
    fn cmp(&self, other: &Self) -> Ordering {
        self.user_name.cmp(&other.user_name)
    }
}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.user_name.hash(state);
    }
}
