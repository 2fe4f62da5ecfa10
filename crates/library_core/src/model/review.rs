//! Review entity and the review<->user<->book factory.
//!
//! # Invariants
//! - `rating` is always within `1..=5`.
//! - `timestamp_ms` is captured once at construction.
//! - Equality is structural over book, text, rating and timestamp. Two reviews
//!   with identical content submitted within the same millisecond compare
//!   equal; collections keep both.

use super::book::Book;
use super::user::User;
use super::{BookId, ModelError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Text stored when the submitted review body is blank.
pub const EMPTY_REVIEW_TEXT: &str = "N/A";

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// A user's rating and comment on a book.
#[derive(Debug, Clone)]
pub struct Review {
    book_id: BookId,
    user_name: String,
    review_text: String,
    rating: u8,
    timestamp_ms: i64,
}

impl Review {
    /// Creates a standalone review stamped with the current time.
    ///
    /// The review is not linked into `user` or `book`; use `make_review` for
    /// that.
    ///
    /// # Errors
    /// - `InvalidRating` when `rating` is outside `1..=5`.
    pub fn new(
        book: &Book,
        review_text: &str,
        user: &User,
        rating: i64,
    ) -> Result<Self, ModelError> {
        Self::with_timestamp(
            book.id(),
            user.user_name(),
            review_text,
            rating,
            now_epoch_ms(),
        )
    }

    /// Rebuilds a review with a known timestamp, e.g. when reading storage.
    pub fn with_timestamp(
        book_id: BookId,
        user_name: &str,
        review_text: &str,
        rating: i64,
        timestamp_ms: i64,
    ) -> Result<Self, ModelError> {
        let rating = validate_rating(rating)?;
        let trimmed = review_text.trim();
        let review_text = if trimmed.is_empty() {
            EMPTY_REVIEW_TEXT.to_string()
        } else {
            trimmed.to_string()
        };

        Ok(Self {
            book_id,
            user_name: user_name.to_string(),
            review_text,
            rating,
            timestamp_ms,
        })
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn review_text(&self) -> &str {
        &self.review_text
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    /// Creation time in Unix epoch milliseconds.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }
}

impl PartialEq for Review {
    fn eq(&self, other: &Self) -> bool {
        self.book_id == other.book_id
            && self.review_text == other.review_text
            && self.rating == other.rating
            && self.timestamp_ms == other.timestamp_ms
    }
}

impl Eq for Review {}

/// Creates a review and appends it to both `user` and `book`.
///
/// # Errors
/// - `InvalidRating` when `rating` is outside `1..=5`; nothing is linked.
pub fn make_review(
    review_text: &str,
    user: &mut User,
    book: &mut Book,
    rating: i64,
) -> Result<Review, ModelError> {
    let review = Review::new(book, review_text, user, rating)?;
    user.add_review(review.clone());
    book.add_review(review.clone());
    Ok(review)
}

fn validate_rating(rating: i64) -> Result<u8, ModelError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        u8::try_from(rating).map_err(|_| ModelError::InvalidRating(rating))
    } else {
        Err(ModelError::InvalidRating(rating))
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
