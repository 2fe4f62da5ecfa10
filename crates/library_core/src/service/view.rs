//! Plain serializable projections handed to presentation code.
//!
//! Views carry only attribute values; they never expose passwords or
//! repository handles.

use crate::model::book::Book;
use crate::model::genre::Genre;
use crate::model::review::Review;
use crate::model::user::User;
use crate::model::{AuthorId, BookId};
use serde::Serialize;

/// Display projection of a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewView {
    pub book_id: BookId,
    pub user_name: String,
    pub review_text: String,
    pub rating: u8,
    pub timestamp_ms: i64,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            book_id: review.book_id(),
            user_name: review.user_name().to_string(),
            review_text: review.review_text().to_string(),
            rating: review.rating(),
            timestamp_ms: review.timestamp_ms(),
        }
    }
}

/// Display projection of a genre with the ids of its books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreView {
    pub genre_name: String,
    pub genre_books: Vec<BookId>,
}

impl From<&Genre> for GenreView {
    fn from(genre: &Genre) -> Self {
        Self {
            genre_name: genre.name().to_string(),
            genre_books: genre.books().to_vec(),
        }
    }
}

/// Display projection of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookView {
    pub book_id: BookId,
    pub release_year: i32,
    pub title: Option<String>,
    pub author_id: Option<AuthorId>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub ebook: Option<bool>,
    pub num_pages: Option<u32>,
    pub reviews: Vec<ReviewView>,
    pub genres: Vec<GenreView>,
}

impl BookView {
    /// Builds a view, resolving genre names against `genres`.
    ///
    /// A genre name missing from `genres` is shown with no books.
    pub fn from_book(book: &Book, genres: &[Genre]) -> Self {
        let genres = book
            .genres()
            .iter()
            .map(|name| {
                genres
                    .iter()
                    .find(|genre| genre.name() == name)
                    .map(GenreView::from)
                    .unwrap_or_else(|| GenreView {
                        genre_name: name.clone(),
                        genre_books: Vec::new(),
                    })
            })
            .collect();

        Self {
            book_id: book.id(),
            release_year: book.release_year(),
            title: book.title().map(str::to_string),
            author_id: book.author(),
            publisher: book.publisher().map(str::to_string),
            description: book.description().map(str::to_string),
            image_url: book.image_url().map(str::to_string),
            ebook: book.ebook(),
            num_pages: book.num_pages(),
            reviews: book.reviews().iter().map(ReviewView::from).collect(),
            genres,
        }
    }
}

/// Display projection of a user. The password is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub user_name: String,
    pub reviews: Vec<ReviewView>,
    pub read_books: Vec<BookId>,
    pub pages_read: u64,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            user_name: user.user_name().to_string(),
            reviews: user.reviews().iter().map(ReviewView::from).collect(),
            read_books: user.read_books().to_vec(),
            pages_read: user.pages_read(),
        }
    }
}
