//! Author entity.

use super::book::Book;
use super::{normalize_text, AuthorId, BookId, ModelError};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Book author identified by a non-negative id.
#[derive(Debug, Clone)]
pub struct Author {
    id: AuthorId,
    full_name: String,
    books: Vec<BookId>,
}

impl Author {
    /// Creates an author.
    ///
    /// # Errors
    /// - `InvalidAuthorId` when `id` is negative or does not fit `AuthorId`.
    /// - `InvalidAuthorName` when `full_name` is blank after trim.
    pub fn new(id: i64, full_name: &str) -> Result<Self, ModelError> {
        let id = AuthorId::try_from(id).map_err(|_| ModelError::InvalidAuthorId(id))?;
        let full_name = normalize_text(full_name).ok_or(ModelError::InvalidAuthorName)?;
        Ok(Self {
            id,
            full_name,
            books: Vec::new(),
        })
    }

    pub fn id(&self) -> AuthorId {
        self.id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Renames the author with the same rules as construction.
    pub fn set_full_name(&mut self, full_name: &str) -> Result<(), ModelError> {
        self.full_name = normalize_text(full_name).ok_or(ModelError::InvalidAuthorName)?;
        Ok(())
    }

    /// Attributed book ids in the order they were added.
    pub fn books(&self) -> &[BookId] {
        &self.books
    }

    /// Appends `book` unless it is already attributed.
    pub fn add_book(&mut self, book: &Book) {
        self.add_book_id(book.id());
    }

    pub fn remove_book(&mut self, book: &Book) {
        self.books.retain(|id| *id != book.id());
    }

    pub(crate) fn add_book_id(&mut self, book_id: BookId) {
        if !self.books.contains(&book_id) {
            self.books.push(book_id);
        }
    }

    pub(crate) fn clear_books(&mut self) {
        self.books.clear();
    }
}

impl PartialEq for Author {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Author {}

impl PartialOrd for Author {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Author {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Author {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
