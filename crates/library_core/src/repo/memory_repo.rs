//! In-memory catalogue repository.
//!
//! # Responsibility
//! - Reference implementation of `LibraryRepository` in process memory.
//! - Keep books in an id-ordered index with O(1) point lookup.
//!
//! # Invariants
//! - `book_order` is sorted ascending and holds exactly the keys of `books`.
//! - `arrival_order` holds the same keys in `add_book` call order.
//! - Adjacent release years are found by locating the book in `book_order`
//!   with a binary search, then scanning outward for the first strictly
//!   smaller/greater release year.
//! - Stored users and books carry only reviews written through `add_review`.
//! - Author and publisher book lists are derived from stored books in
//!   arrival order. Genre book lists keep the genre's association order,
//!   restricted to stored books.
//! - No internal locking; callers serialize writers.

use crate::model::author::Author;
use crate::model::book::Book;
use crate::model::genre::Genre;
use crate::model::publisher::Publisher;
use crate::model::review::Review;
use crate::model::user::{normalize_user_name, User};
use crate::model::BookId;
use crate::repo::{
    validate_review_linkage, LibraryRepository, RepoError, RepoResult, ReviewLinkIssue,
};
use std::collections::HashMap;

/// Catalogue repository held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryLibraryRepository {
    book_order: Vec<BookId>,
    arrival_order: Vec<BookId>,
    books: HashMap<BookId, Book>,
    authors: Vec<Author>,
    publishers: Vec<Publisher>,
    genres: Vec<Genre>,
    users: Vec<User>,
    reviews: Vec<Review>,
}

impl MemoryLibraryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of `book` in the id-ordered index.
    fn book_position(&self, book: &Book) -> Option<usize> {
        self.book_order.binary_search(&book.id()).ok()
    }

    fn release_year_at(&self, book_id: &BookId) -> Option<i32> {
        self.books.get(book_id).map(Book::release_year)
    }

    fn user_position(&self, user_name: &str) -> Option<usize> {
        let normalized = normalize_user_name(user_name)?;
        self.users
            .iter()
            .position(|user| user.user_name() == normalized)
    }

    /// Stored book ids matching `predicate`, in arrival order.
    fn arrived_book_ids(&self, predicate: impl Fn(&Book) -> bool) -> Vec<BookId> {
        self.arrival_order
            .iter()
            .filter(|id| self.books.get(*id).is_some_and(&predicate))
            .copied()
            .collect()
    }

    fn author_book_ids(&self, author: &Author) -> Vec<BookId> {
        self.arrived_book_ids(|book| book.author() == Some(author.id()))
    }

    fn publisher_book_ids(&self, publisher: &Publisher) -> Vec<BookId> {
        self.arrived_book_ids(|book| book.publisher() == Some(publisher.name()))
    }

    fn genre_book_ids(&self, genre: &Genre) -> Vec<BookId> {
        genre
            .books()
            .iter()
            .filter(|id| self.books.contains_key(*id))
            .copied()
            .collect()
    }
}

impl LibraryRepository for MemoryLibraryRepository {
    fn add_user(&mut self, user: &User) -> RepoResult<()> {
        if self.user_position(user.user_name()).is_some() {
            return Err(RepoError::DuplicateUser(user.user_name().to_string()));
        }
        let mut stored = user.clone();
        stored.clear_reviews();
        self.users.push(stored);
        Ok(())
    }

    fn get_user(&self, user_name: &str) -> RepoResult<Option<User>> {
        Ok(self
            .user_position(user_name)
            .map(|position| self.users[position].clone()))
    }

    fn add_author(&mut self, author: &Author) -> RepoResult<()> {
        if !self.authors.contains(author) {
            let mut stored = author.clone();
            stored.clear_books();
            self.authors.push(stored);
        }
        Ok(())
    }

    fn get_authors(&self) -> RepoResult<Vec<Author>> {
        Ok(self
            .authors
            .iter()
            .map(|author| {
                let mut listed = author.clone();
                for book_id in self.author_book_ids(author) {
                    listed.add_book_id(book_id);
                }
                listed
            })
            .collect())
    }

    fn add_publisher(&mut self, publisher: &Publisher) -> RepoResult<()> {
        if !self.publishers.contains(publisher) {
            let mut stored = publisher.clone();
            stored.clear_books();
            self.publishers.push(stored);
        }
        Ok(())
    }

    fn get_publishers(&self) -> RepoResult<Vec<Publisher>> {
        Ok(self
            .publishers
            .iter()
            .map(|publisher| {
                let mut listed = publisher.clone();
                for book_id in self.publisher_book_ids(publisher) {
                    listed.add_book_id(book_id);
                }
                listed
            })
            .collect())
    }

    fn add_genre(&mut self, genre: &Genre) -> RepoResult<()> {
        if !self.genres.contains(genre) {
            self.genres.push(genre.clone());
        }
        Ok(())
    }

    fn get_genres(&self) -> RepoResult<Vec<Genre>> {
        Ok(self
            .genres
            .iter()
            .map(|genre| {
                let mut listed = Genre::new(genre.name());
                for book_id in self.genre_book_ids(genre) {
                    listed.add_book_id(book_id);
                }
                listed
            })
            .collect())
    }

    fn add_book(&mut self, book: &Book) -> RepoResult<()> {
        let position = match self.book_order.binary_search(&book.id()) {
            Ok(_) => return Err(RepoError::DuplicateBook(book.id())),
            Err(position) => position,
        };

        let mut stored = book.clone();
        stored.clear_reviews();
        self.book_order.insert(position, book.id());
        self.arrival_order.push(book.id());
        self.books.insert(book.id(), stored);
        Ok(())
    }

    fn get_book(&self, book_id: BookId) -> RepoResult<Option<Book>> {
        Ok(self.books.get(&book_id).cloned())
    }

    fn get_all_books(&self) -> RepoResult<Vec<Book>> {
        Ok(self
            .book_order
            .iter()
            .filter_map(|id| self.books.get(id))
            .cloned()
            .collect())
    }

    fn get_books_by_id(&self, ids: &[BookId]) -> RepoResult<Vec<Book>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.books.get(id))
            .cloned()
            .collect())
    }

    fn get_number_of_books(&self) -> RepoResult<usize> {
        Ok(self.book_order.len())
    }

    fn get_first_book(&self) -> RepoResult<Option<Book>> {
        Ok(self
            .books
            .values()
            .min_by_key(|book| (book.release_year(), book.id()))
            .cloned())
    }

    fn get_last_book(&self) -> RepoResult<Option<Book>> {
        Ok(self
            .books
            .values()
            .max_by_key(|book| (book.release_year(), book.id()))
            .cloned())
    }

    fn get_books_by_release_year(&self, release_year: i32) -> RepoResult<Vec<Book>> {
        Ok(self
            .book_order
            .iter()
            .filter_map(|id| self.books.get(id))
            .filter(|book| book.release_year() == release_year)
            .cloned()
            .collect())
    }

    fn get_book_ids_for_genre(&self, genre_name: &str) -> RepoResult<Vec<BookId>> {
        Ok(self
            .genres
            .iter()
            .find(|genre| genre.name() == genre_name)
            .map(|genre| self.genre_book_ids(genre))
            .unwrap_or_default())
    }

    fn get_book_ids_for_author(&self, author_name: &str) -> RepoResult<Vec<BookId>> {
        Ok(self
            .authors
            .iter()
            .find(|author| author.full_name() == author_name)
            .map(|author| self.author_book_ids(author))
            .unwrap_or_default())
    }

    fn get_book_ids_for_publisher(&self, publisher_name: &str) -> RepoResult<Vec<BookId>> {
        Ok(self
            .publishers
            .iter()
            .find(|publisher| publisher.name() == publisher_name)
            .map(|publisher| self.publisher_book_ids(publisher))
            .unwrap_or_default())
    }

    fn get_release_year_of_previous_book(&self, book: &Book) -> RepoResult<Option<i32>> {
        let Some(position) = self.book_position(book) else {
            return Ok(None);
        };

        Ok(self.book_order[..position]
            .iter()
            .rev()
            .filter_map(|id| self.release_year_at(id))
            .find(|year| *year < book.release_year()))
    }

    fn get_release_year_of_next_book(&self, book: &Book) -> RepoResult<Option<i32>> {
        let Some(position) = self.book_position(book) else {
            return Ok(None);
        };

        Ok(self.book_order[position + 1..]
            .iter()
            .filter_map(|id| self.release_year_at(id))
            .find(|year| *year > book.release_year()))
    }

    fn add_review(&mut self, review: &Review, user: &User, book: &Book) -> RepoResult<()> {
        validate_review_linkage(review, user, book)?;

        let user_position = self
            .user_position(review.user_name())
            .ok_or(RepoError::UnlinkedReview(ReviewLinkIssue::UnknownUser))?;
        let stored_book = self
            .books
            .get_mut(&review.book_id())
            .ok_or(RepoError::UnlinkedReview(ReviewLinkIssue::UnknownBook))?;

        stored_book.add_review(review.clone());
        self.users[user_position].add_review(review.clone());
        self.reviews.push(review.clone());
        Ok(())
    }

    fn get_reviews(&self) -> RepoResult<Vec<Review>> {
        Ok(self.reviews.clone())
    }
}
