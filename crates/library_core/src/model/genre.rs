//! Genre entity and the genre<->book association factory.

use super::book::Book;
use super::{BookId, ModelError};

/// Genre label applied to books. Equality uses the name only.
#[derive(Debug, Clone)]
pub struct Genre {
    name: String,
    books: Vec<BookId>,
}

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            books: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ids of books this genre is applied to, in association order.
    pub fn books(&self) -> &[BookId] {
        &self.books
    }

    pub fn number_of_genre_books(&self) -> usize {
        self.books.len()
    }

    pub fn is_applied_to(&self, book: &Book) -> bool {
        self.books.contains(&book.id())
    }

    pub(crate) fn add_book_id(&mut self, book_id: BookId) {
        self.books.push(book_id);
    }
}

impl PartialEq for Genre {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Genre {}

/// Links `genre` and `book` in both directions.
///
/// # Errors
/// - `GenreAlreadyApplied` when the genre is already applied to the book.
///   Neither side is modified in that case.
pub fn make_genre_association(book: &mut Book, genre: &mut Genre) -> Result<(), ModelError> {
    if genre.is_applied_to(book) {
        return Err(ModelError::GenreAlreadyApplied {
            genre: genre.name.clone(),
            book_id: book.id(),
        });
    }

    book.add_genre(&genre.name);
    genre.add_book_id(book.id());
    Ok(())
}
