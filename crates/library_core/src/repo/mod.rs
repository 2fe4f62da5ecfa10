//! Catalogue repository contract and its two backends.
//!
//! # Responsibility
//! - Define the capability set every storage backend provides.
//! - Hold the review linkage check shared by all backends.
//! - Isolate storage details from services and loaders.
//!
//! # Invariants
//! - Lookups for a missing key return `Ok(None)` or an empty collection,
//!   never an error.
//! - `add_review` runs `validate_review_linkage` before mutating state.
//! - Both backends return identical results for the same sequence of writes,
//!   whatever order entities are stored in.

use crate::db::DbError;
use crate::model::author::Author;
use crate::model::book::Book;
use crate::model::genre::Genre;
use crate::model::publisher::Publisher;
use crate::model::review::Review;
use crate::model::user::User;
use crate::model::{BookId, ModelError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory_repo;
pub mod sqlite_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Why a review failed the linkage check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewLinkIssue {
    /// The review is not in the user's review collection or names another user.
    NotAttachedToUser,
    /// The review is not in the book's review collection or names another book.
    NotAttachedToBook,
    /// The user the review belongs to is not stored.
    UnknownUser,
    /// The reviewed book is not stored.
    UnknownBook,
}

impl Display for ReviewLinkIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAttachedToUser => write!(f, "review not correctly attached to a user"),
            Self::NotAttachedToBook => write!(f, "review not correctly attached to a book"),
            Self::UnknownUser => write!(f, "review user is not stored in the repository"),
            Self::UnknownBook => write!(f, "reviewed book is not stored in the repository"),
        }
    }
}

/// Repository error for catalogue persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Model(ModelError),
    /// A book with the same id is already stored.
    DuplicateBook(BookId),
    /// A user with the same normalized name is already stored.
    DuplicateUser(String),
    /// Referential integrity failure on `add_review`.
    UnlinkedReview(ReviewLinkIssue),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted into a valid entity.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Model(err) => write!(f, "{err}"),
            Self::DuplicateBook(id) => write!(f, "book already stored: {id}"),
            Self::DuplicateUser(name) => write!(f, "user already stored: {name}"),
            Self::UnlinkedReview(issue) => write!(f, "{issue}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "catalogue repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "catalogue repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted catalogue data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ModelError> for RepoError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

/// Storage contract shared by the in-memory and SQLite backends.
///
/// Callers depend on this trait only; backends are swapped at construction.
pub trait LibraryRepository {
    /// Stores a user. Fails with `DuplicateUser` when the name is taken.
    ///
    /// Reviews already attached to `user` are not stored; only `add_review`
    /// writes reviews.
    fn add_user(&mut self, user: &User) -> RepoResult<()>;
    /// Looks a user up by trimmed, case-insensitive name.
    fn get_user(&self, user_name: &str) -> RepoResult<Option<User>>;

    /// Stores an author unless one with the same id exists.
    fn add_author(&mut self, author: &Author) -> RepoResult<()>;
    /// Authors in insertion order. Each lists the stored books whose
    /// `author()` is its id, in book insertion order.
    fn get_authors(&self) -> RepoResult<Vec<Author>>;

    /// Stores a publisher unless one with the same name exists.
    fn add_publisher(&mut self, publisher: &Publisher) -> RepoResult<()>;
    /// Publishers in insertion order, each listing its stored books like
    /// `get_authors`.
    fn get_publishers(&self) -> RepoResult<Vec<Publisher>>;

    /// Stores a genre and its book list unless one with the same name exists.
    fn add_genre(&mut self, genre: &Genre) -> RepoResult<()>;
    /// Genres in insertion order. Book lists keep association order and only
    /// name books that are stored at read time.
    fn get_genres(&self) -> RepoResult<Vec<Genre>>;

    /// Stores a book with its genre names. Fails with `DuplicateBook` when the
    /// id is taken. Attached reviews are not stored.
    fn add_book(&mut self, book: &Book) -> RepoResult<()>;
    fn get_book(&self, book_id: BookId) -> RepoResult<Option<Book>>;
    /// All books sorted by id.
    fn get_all_books(&self) -> RepoResult<Vec<Book>>;
    /// Books for the stored ids in `ids`, in input order. Unknown ids are dropped.
    fn get_books_by_id(&self, ids: &[BookId]) -> RepoResult<Vec<Book>>;
    fn get_number_of_books(&self) -> RepoResult<usize>;
    /// Book with the smallest `(release_year, id)`.
    fn get_first_book(&self) -> RepoResult<Option<Book>>;
    /// Book with the largest `(release_year, id)`.
    fn get_last_book(&self) -> RepoResult<Option<Book>>;
    /// Books released in `release_year`, sorted by id.
    fn get_books_by_release_year(&self, release_year: i32) -> RepoResult<Vec<Book>>;

    /// Ids of stored books the genre named `genre_name` was applied to, in
    /// association order.
    fn get_book_ids_for_genre(&self, genre_name: &str) -> RepoResult<Vec<BookId>>;
    /// Ids of books attributed to the first author named `author_name`.
    fn get_book_ids_for_author(&self, author_name: &str) -> RepoResult<Vec<BookId>>;
    /// Ids of books published by the publisher named `publisher_name`.
    fn get_book_ids_for_publisher(&self, publisher_name: &str) -> RepoResult<Vec<BookId>>;

    /// Release year of the nearest preceding book (by id) released strictly
    /// earlier than `book`. `None` when there is none or `book` is not stored.
    ///
    /// The walk follows id order, not release-year order: a year that only
    /// appears on books after `book` is skipped. The SQLite backend runs the
    /// same walk as an id-ordered `LIMIT 1` query.
    fn get_release_year_of_previous_book(&self, book: &Book) -> RepoResult<Option<i32>>;
    /// Release year of the nearest following book (by id) released strictly
    /// later than `book`. `None` when there is none or `book` is not stored.
    fn get_release_year_of_next_book(&self, book: &Book) -> RepoResult<Option<i32>>;

    /// Stores `review` after checking it is linked into `user` and `book`.
    ///
    /// # Errors
    /// - `UnlinkedReview` when the linkage check fails or the user/book are
    ///   not stored. Nothing is written in that case.
    fn add_review(&mut self, review: &Review, user: &User, book: &Book) -> RepoResult<()>;
    /// All reviews in submission order.
    fn get_reviews(&self) -> RepoResult<Vec<Review>>;
}

/// Checks that `review` is reachable from both `user` and `book`.
pub fn validate_review_linkage(review: &Review, user: &User, book: &Book) -> RepoResult<()> {
    if review.user_name() != user.user_name() || !user.reviews().contains(review) {
        return Err(RepoError::UnlinkedReview(ReviewLinkIssue::NotAttachedToUser));
    }
    if review.book_id() != book.id() || !book.reviews().contains(review) {
        return Err(RepoError::UnlinkedReview(ReviewLinkIssue::NotAttachedToBook));
    }
    Ok(())
}

impl<R: LibraryRepository + ?Sized> LibraryRepository for &mut R {
    fn add_user(&mut self, user: &User) -> RepoResult<()> {
        (**self).add_user(user)
    }

    fn get_user(&self, user_name: &str) -> RepoResult<Option<User>> {
        (**self).get_user(user_name)
    }

    fn add_author(&mut self, author: &Author) -> RepoResult<()> {
        (**self).add_author(author)
    }

    fn get_authors(&self) -> RepoResult<Vec<Author>> {
        (**self).get_authors()
    }

    fn add_publisher(&mut self, publisher: &Publisher) -> RepoResult<()> {
        (**self).add_publisher(publisher)
    }

    fn get_publishers(&self) -> RepoResult<Vec<Publisher>> {
        (**self).get_publishers()
    }

    fn add_genre(&mut self, genre: &Genre) -> RepoResult<()> {
        (**self).add_genre(genre)
    }

    fn get_genres(&self) -> RepoResult<Vec<Genre>> {
        (**self).get_genres()
    }

    fn add_book(&mut self, book: &Book) -> RepoResult<()> {
        (**self).add_book(book)
    }

    fn get_book(&self, book_id: BookId) -> RepoResult<Option<Book>> {
        (**self).get_book(book_id)
    }

    fn get_all_books(&self) -> RepoResult<Vec<Book>> {
        (**self).get_all_books()
    }

    fn get_books_by_id(&self, ids: &[BookId]) -> RepoResult<Vec<Book>> {
        (**self).get_books_by_id(ids)
    }

    fn get_number_of_books(&self) -> RepoResult<usize> {
        (**self).get_number_of_books()
    }

    fn get_first_book(&self) -> RepoResult<Option<Book>> {
        (**self).get_first_book()
    }

    fn get_last_book(&self) -> RepoResult<Option<Book>> {
        (**self).get_last_book()
    }

    fn get_books_by_release_year(&self, release_year: i32) -> RepoResult<Vec<Book>> {
        (**self).get_books_by_release_year(release_year)
    }

    fn get_book_ids_for_genre(&self, genre_name: &str) -> RepoResult<Vec<BookId>> {
        (**self).get_book_ids_for_genre(genre_name)
    }

    fn get_book_ids_for_author(&self, author_name: &str) -> RepoResult<Vec<BookId>> {
        (**self).get_book_ids_for_author(author_name)
    }

    fn get_book_ids_for_publisher(&self, publisher_name: &str) -> RepoResult<Vec<BookId>> {
        (**self).get_book_ids_for_publisher(publisher_name)
    }

    fn get_release_year_of_previous_book(&self, book: &Book) -> RepoResult<Option<i32>> {
        (**self).get_release_year_of_previous_book(book)
    }

    fn get_release_year_of_next_book(&self, book: &Book) -> RepoResult<Option<i32>> {
        (**self).get_release_year_of_next_book(book)
    }

    fn add_review(&mut self, review: &Review, user: &User, book: &Book) -> RepoResult<()> {
        (**self).add_review(review, user, book)
    }

    fn get_reviews(&self) -> RepoResult<Vec<Review>> {
        (**self).get_reviews()
    }
}
