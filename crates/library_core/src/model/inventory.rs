//! Stock and price bookkeeping for books.
//!
//! Not part of the repository contract.

use super::book::Book;
use super::BookId;
use std::collections::BTreeMap;

/// Books on hand with their prices and stock counts.
#[derive(Debug, Clone, Default)]
pub struct BooksInventory {
    books: BTreeMap<BookId, Book>,
    prices: BTreeMap<BookId, u32>,
    stock_counts: BTreeMap<BookId, u32>,
}

impl BooksInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces the entry for `book`.
    pub fn add_book(&mut self, book: Book, price: u32, stock_count: u32) {
        let book_id = book.id();
        self.books.insert(book_id, book);
        self.prices.insert(book_id, price);
        self.stock_counts.insert(book_id, stock_count);
    }

    /// Removes the entry and returns the book, if present.
    pub fn remove_book(&mut self, book_id: BookId) -> Option<Book> {
        self.prices.remove(&book_id);
        self.stock_counts.remove(&book_id);
        self.books.remove(&book_id)
    }

    pub fn find_book(&self, book_id: BookId) -> Option<&Book> {
        self.books.get(&book_id)
    }

    pub fn find_price(&self, book_id: BookId) -> Option<u32> {
        self.prices.get(&book_id).copied()
    }

    pub fn find_stock_count(&self, book_id: BookId) -> Option<u32> {
        self.stock_counts.get(&book_id).copied()
    }

    /// First book (by id) whose title matches exactly.
    pub fn search_book_by_title(&self, title: &str) -> Option<&Book> {
        self.books.values().find(|book| book.title() == Some(title))
    }
}
