//! Publisher entity.

use super::book::Book;
use super::{normalize_text, BookId};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Name used when a publisher name is blank.
pub const UNKNOWN_PUBLISHER_NAME: &str = "N/A";

/// Book publisher, identified by its trimmed name.
#[derive(Debug, Clone)]
pub struct Publisher {
    name: String,
    books: Vec<BookId>,
}

impl Publisher {
    /// Creates a publisher. Blank names fall back to `UNKNOWN_PUBLISHER_NAME`.
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize_publisher_name(name),
            books: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = normalize_publisher_name(name);
    }

    /// Published book ids in the order they were added.
    pub fn books(&self) -> &[BookId] {
        &self.books
    }

    /// Appends `book` unless it is already listed.
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

/// Applies publisher name normalization without constructing a publisher.
pub fn normalize_publisher_name(name: &str) -> String {
    normalize_text(name).unwrap_or_else(|| UNKNOWN_PUBLISHER_NAME.to_string())
}

impl PartialEq for Publisher {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Publisher {}

impl PartialOrd for Publisher {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Publisher {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl Hash for Publisher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
