//! Book entity.
//!
//! # Invariants
//! - `id` is assigned externally and never changes.
//! - Two books are equal iff their ids match; the total order is id ascending.
//! - `title` is either a trimmed non-empty string or `None`.
//! - Genre and review collections only grow through `make_genre_association`
//!   and `make_review`.

use super::review::Review;
use super::{normalize_text, AuthorId, BookId};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Catalogue book.
#[derive(Debug, Clone)]
pub struct Book {
    id: BookId,
    release_year: i32,
    title: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    author: Option<AuthorId>,
    publisher: Option<String>,
    genres: Vec<String>,
    reviews: Vec<Review>,
    ebook: Option<bool>,
    num_pages: Option<u32>,
}

impl Book {
    /// Creates a book with the given identity and no optional attributes.
    pub fn new(id: BookId, release_year: i32, title: &str) -> Self {
        Self {
            id,
            release_year,
            title: normalize_text(title),
            description: None,
            image_url: None,
            author: None,
            publisher: None,
            genres: Vec::new(),
            reviews: Vec::new(),
            ebook: None,
            num_pages: None,
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn release_year(&self) -> i32 {
        self.release_year
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = normalize_text(title);
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Stores the trimmed description. A blank value is kept as an empty string.
    pub fn set_description(&mut self, description: &str) {
        self.description = Some(description.trim().to_string());
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn set_image_url(&mut self, image_url: &str) {
        self.image_url = Some(image_url.to_string());
    }

    /// Id of the attributed author, if any.
    pub fn author(&self) -> Option<AuthorId> {
        self.author
    }

    pub fn set_author(&mut self, author: AuthorId) {
        self.author = Some(author);
    }

    /// Name of the publisher, if any.
    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub fn set_publisher(&mut self, publisher_name: &str) {
        self.publisher = Some(publisher_name.to_string());
    }

    pub fn ebook(&self) -> Option<bool> {
        self.ebook
    }

    pub fn set_ebook(&mut self, is_ebook: bool) {
        self.ebook = Some(is_ebook);
    }

    pub fn num_pages(&self) -> Option<u32> {
        self.num_pages
    }

    pub fn set_num_pages(&mut self, num_pages: u32) {
        self.num_pages = Some(num_pages);
    }

    /// Genre names in association order.
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn number_of_genres(&self) -> usize {
        self.genres.len()
    }

    pub fn is_genred_by(&self, genre_name: &str) -> bool {
        self.genres.iter().any(|name| name == genre_name)
    }

    pub fn is_genred(&self) -> bool {
        !self.genres.is_empty()
    }

    /// Reviews in submission order.
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn number_of_reviews(&self) -> usize {
        self.reviews.len()
    }

    pub(crate) fn add_genre(&mut self, genre_name: &str) {
        self.genres.push(genre_name.to_string());
    }

    pub(crate) fn add_review(&mut self, review: Review) {
        self.reviews.push(review);
    }

    pub(crate) fn clear_reviews(&mut self) {
        self.reviews.clear();
    }
}

impl PartialEq for Book {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Book {}

impl PartialOrd for Book {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Book {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Book {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::Book;

    #[test]
    fn title_is_trimmed_and_blank_becomes_none() {
        assert_eq!(Book::new(1, 2001, "  Dune  ").title(), Some("Dune"));
        assert_eq!(Book::new(2, 2001, "   ").title(), None);
    }

    #[test]
    fn equality_and_order_follow_id_only() {
        let first = Book::new(1, 2020, "Same");
        let other_year = Book::new(1, 1999, "Different");
        let second = Book::new(2, 1900, "Older");

        assert_eq!(first, other_year);
        assert!(first < second);
    }

    #[test]
    fn description_is_trimmed() {
        let mut book = Book::new(3, 2010, "Memo");
        book.set_description("  short blurb \n");
        assert_eq!(book.description(), Some("short blurb"));
    }
}
