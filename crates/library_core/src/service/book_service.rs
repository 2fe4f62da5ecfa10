//! Book browsing and review submission use-cases.
//!
//! # Responsibility
//! - Turn repository lookups into display views.
//! - Raise typed not-found errors where the repository returns absence.
//!
//! # Invariants
//! - A missing book or user at this boundary is an error, while an empty
//!   result set is a valid value.
//! - Reviews are created through `make_review` and stored through the
//!   repository linkage check.

use crate::model::book::Book;
use crate::model::genre::Genre;
use crate::model::review::make_review;
use crate::model::{BookId, ModelError};
use crate::repo::{LibraryRepository, RepoError};
use crate::service::view::{BookView, ReviewView};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Page size used by genre browsing.
pub const DEFAULT_GENRE_PAGE_SIZE: usize = 3;

pub type BookServiceResult<T> = Result<T, BookServiceError>;

/// Service error for book use-cases.
#[derive(Debug)]
pub enum BookServiceError {
    /// Requested book id is not stored.
    NonExistentBook(BookId),
    /// Acting user is not stored.
    UnknownUser(String),
    Model(ModelError),
    Repo(RepoError),
}

impl Display for BookServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonExistentBook(book_id) => write!(f, "book does not exist: {book_id}"),
            Self::UnknownUser(user_name) => write!(f, "unknown user: `{user_name}`"),
            Self::Model(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BookServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for BookServiceError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

impl From<RepoError> for BookServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Books released in one year plus the neighbouring release years.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearPage {
    pub books: Vec<BookView>,
    pub previous_year: Option<i32>,
    pub next_year: Option<i32>,
}

/// One page of a genre listing with navigation cursors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenrePage {
    pub books: Vec<BookView>,
    /// Set when earlier pages exist.
    pub first_cursor: Option<usize>,
    pub previous_cursor: Option<usize>,
    /// Set when later pages exist.
    pub next_cursor: Option<usize>,
    pub last_cursor: Option<usize>,
}

/// Use-case service for book browsing and reviews.
pub struct BookService<R: LibraryRepository> {
    repo: R,
}

impl<R: LibraryRepository> BookService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a review by `user_name` on `book_id` and stores it.
    ///
    /// # Errors
    /// - `NonExistentBook` / `UnknownUser` when either side is not stored.
    /// - `Model(InvalidRating)` when `rating` is outside `1..=5`.
    pub fn add_review(
        &mut self,
        book_id: BookId,
        review_text: &str,
        user_name: &str,
        rating: i64,
    ) -> BookServiceResult<ReviewView> {
        let mut book = self
            .repo
            .get_book(book_id)?
            .ok_or(BookServiceError::NonExistentBook(book_id))?;
        let mut user = self
            .repo
            .get_user(user_name)?
            .ok_or_else(|| BookServiceError::UnknownUser(user_name.to_string()))?;

        let review = make_review(review_text, &mut user, &mut book, rating)?;
        self.repo.add_review(&review, &user, &book)?;
        Ok(ReviewView::from(&review))
    }

    pub fn get_book(&self, book_id: BookId) -> BookServiceResult<BookView> {
        let book = self
            .repo
            .get_book(book_id)?
            .ok_or(BookServiceError::NonExistentBook(book_id))?;
        self.to_view(&book)
    }

    pub fn get_all_books(&self) -> BookServiceResult<Vec<BookView>> {
        let books = self.repo.get_all_books()?;
        self.to_views(&books)
    }

    /// Earliest book by release year; `None` on an empty catalogue.
    pub fn get_first_book(&self) -> BookServiceResult<Option<BookView>> {
        let book = self.repo.get_first_book()?;
        self.to_optional_view(book)
    }

    /// Latest book by release year; `None` on an empty catalogue.
    pub fn get_last_book(&self) -> BookServiceResult<Option<BookView>> {
        let book = self.repo.get_last_book()?;
        self.to_optional_view(book)
    }

    /// Books of `release_year` with the years to navigate to.
    ///
    /// Neighbouring years are derived from the first matching book and are
    /// both `None` when nothing matches.
    pub fn get_books_by_release_year(&self, release_year: i32) -> BookServiceResult<YearPage> {
        let books = self.repo.get_books_by_release_year(release_year)?;
        let Some(first) = books.first() else {
            return Ok(YearPage {
                books: Vec::new(),
                previous_year: None,
                next_year: None,
            });
        };

        let previous_year = self.repo.get_release_year_of_previous_book(first)?;
        let next_year = self.repo.get_release_year_of_next_book(first)?;
        Ok(YearPage {
            books: self.to_views(&books)?,
            previous_year,
            next_year,
        })
    }

    pub fn get_book_ids_for_genre(&self, genre_name: &str) -> BookServiceResult<Vec<BookId>> {
        Ok(self.repo.get_book_ids_for_genre(genre_name)?)
    }

    pub fn get_book_ids_for_author(&self, author_name: &str) -> BookServiceResult<Vec<BookId>> {
        Ok(self.repo.get_book_ids_for_author(author_name)?)
    }

    pub fn get_book_ids_for_publisher(
        &self,
        publisher_name: &str,
    ) -> BookServiceResult<Vec<BookId>> {
        Ok(self.repo.get_book_ids_for_publisher(publisher_name)?)
    }

    pub fn get_books_by_id(&self, ids: &[BookId]) -> BookServiceResult<Vec<BookView>> {
        let books = self.repo.get_books_by_id(ids)?;
        self.to_views(&books)
    }

    /// Reviews of `book_id` in submission order.
    pub fn get_reviews_for_book(&self, book_id: BookId) -> BookServiceResult<Vec<ReviewView>> {
        let book = self
            .repo
            .get_book(book_id)?
            .ok_or(BookServiceError::NonExistentBook(book_id))?;
        Ok(book.reviews().iter().map(ReviewView::from).collect())
    }

    /// Returns the page of `genre_name` books starting at `cursor`.
    ///
    /// Cursors are offsets into the genre's book id list. A zero
    /// `page_size` is treated as one.
    pub fn get_books_for_genre_page(
        &self,
        genre_name: &str,
        cursor: usize,
        page_size: usize,
    ) -> BookServiceResult<GenrePage> {
        let page_size = page_size.max(1);
        let book_ids = self.repo.get_book_ids_for_genre(genre_name)?;
        let total = book_ids.len();

        let start = cursor.min(total);
        let end = cursor.saturating_add(page_size).min(total);
        let books = self.get_books_by_id(&book_ids[start..end])?;

        let (first_cursor, previous_cursor) = if cursor > 0 {
            (Some(0), Some(cursor.saturating_sub(page_size)))
        } else {
            (None, None)
        };

        let (next_cursor, last_cursor) = if cursor.saturating_add(page_size) < total {
            let mut last = page_size * (total / page_size);
            if total % page_size == 0 {
                last -= page_size;
            }
            (Some(cursor + page_size), Some(last))
        } else {
            (None, None)
        };

        Ok(GenrePage {
            books,
            first_cursor,
            previous_cursor,
            next_cursor,
            last_cursor,
        })
    }

    fn to_optional_view(&self, book: Option<Book>) -> BookServiceResult<Option<BookView>> {
        book.as_ref().map(|book| self.to_view(book)).transpose()
    }

    fn to_view(&self, book: &Book) -> BookServiceResult<BookView> {
        let genres = self.genres_for(std::slice::from_ref(book))?;
        Ok(BookView::from_book(book, &genres))
    }

    fn to_views(&self, books: &[Book]) -> BookServiceResult<Vec<BookView>> {
        let genres = self.genres_for(books)?;
        Ok(books
            .iter()
            .map(|book| BookView::from_book(book, &genres))
            .collect())
    }

    /// Stored genres, fetched only when some book in `books` has one.
    fn genres_for(&self, books: &[Book]) -> BookServiceResult<Vec<Genre>> {
        if books.iter().any(Book::is_genred) {
            Ok(self.repo.get_genres()?)
        } else {
            Ok(Vec::new())
        }
    }
}
