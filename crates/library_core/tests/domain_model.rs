use library_core::model::inventory::BooksInventory;
use library_core::model::publisher::UNKNOWN_PUBLISHER_NAME;
use library_core::model::review::EMPTY_REVIEW_TEXT;
use library_core::{
    make_genre_association, make_review, Author, Book, Genre, ModelError, Publisher, Review, User,
};

#[test]
fn ratings_inside_range_are_accepted() {
    let user = User::new("rater", "password1").unwrap();
    let book = Book::new(1, 2000, "Title");

    for rating in 1..=5 {
        assert_eq!(Review::new(&book, "ok", &user, rating).unwrap().rating(), rating as u8);
    }
    for rating in [-1, 0, 6, 100] {
        assert_eq!(
            Review::new(&book, "ok", &user, rating).unwrap_err(),
            ModelError::InvalidRating(rating)
        );
    }
}

#[test]
fn blank_review_text_uses_sentinel() {
    let user = User::new("rater", "password1").unwrap();
    let book = Book::new(1, 2000, "Title");

    let review = Review::new(&book, "   ", &user, 3).unwrap();
    assert_eq!(review.review_text(), EMPTY_REVIEW_TEXT);
}

#[test]
fn password_length_is_enforced_at_construction() {
    let err = User::new("fmercury", "abc123").unwrap_err();
    assert_eq!(err, ModelError::PasswordTooShort { min: 7, actual: 6 });

    let user = User::new("  FMercury ", "abc1234").unwrap();
    assert_eq!(user.user_name(), "fmercury");
    assert_eq!(User::new("   ", "abc1234").unwrap_err(), ModelError::InvalidUserName);
}

#[test]
fn genre_cannot_be_applied_twice() {
    let mut book = Book::new(1, 1987, "Title");
    let mut genre = Genre::new("Crime");

    make_genre_association(&mut book, &mut genre).unwrap();
    let err = make_genre_association(&mut book, &mut genre).unwrap_err();

    assert_eq!(
        err,
        ModelError::GenreAlreadyApplied {
            genre: "Crime".to_string(),
            book_id: 1,
        }
    );
    assert_eq!(book.genres(), ["Crime"]);
    assert_eq!(genre.books(), [1]);
    assert!(genre.is_applied_to(&book));
    assert!(book.is_genred_by("Crime"));
}

#[test]
fn make_review_links_user_and_book() {
    let mut user = User::new("thorke", "password1").unwrap();
    let mut book = Book::new(2, 1988, "Title");

    let review = make_review("  Great read  ", &mut user, &mut book, 5).unwrap();

    assert_eq!(review.review_text(), "Great read");
    assert_eq!(review.user_name(), "thorke");
    assert_eq!(user.reviews(), [review.clone()]);
    assert_eq!(book.reviews(), [review]);
}

#[test]
fn invalid_rating_links_nothing() {
    let mut user = User::new("thorke", "password1").unwrap();
    let mut book = Book::new(2, 1988, "Title");

    assert!(make_review("text", &mut user, &mut book, 9).is_err());
    assert!(user.reviews().is_empty());
    assert_eq!(book.number_of_reviews(), 0);
}

#[test]
fn reading_books_accumulates_pages() {
    let mut user = User::new("reader", "password1").unwrap();
    let mut long = Book::new(1, 2000, "Long");
    long.set_num_pages(300);
    let unknown_length = Book::new(2, 2001, "Unknown");

    user.read_a_book(&long);
    user.read_a_book(&unknown_length);

    assert_eq!(user.read_books(), [1, 2]);
    assert_eq!(user.pages_read(), 300);
}

#[test]
fn author_validation_and_book_set_semantics() {
    assert_eq!(Author::new(-1, "Name").unwrap_err(), ModelError::InvalidAuthorId(-1));
    assert_eq!(Author::new(1, "  ").unwrap_err(), ModelError::InvalidAuthorName);

    let mut author = Author::new(3675, "  J. Michael Straczynski ").unwrap();
    let book = Book::new(1, 2000, "Title");
    author.add_book(&book);
    author.add_book(&book);
    assert_eq!(author.full_name(), "J. Michael Straczynski");
    assert_eq!(author.books(), [1]);

    author.remove_book(&book);
    assert!(author.books().is_empty());
}

#[test]
fn blank_publisher_name_uses_sentinel() {
    assert_eq!(Publisher::new("   ").name(), UNKNOWN_PUBLISHER_NAME);
    assert_eq!(Publisher::new(" Avatar Press ").name(), "Avatar Press");
    assert_eq!(Publisher::new("Avatar Press"), Publisher::new("  Avatar Press"));
}

#[test]
fn books_compare_by_id_only() {
    let first = Book::new(1, 2000, "A");
    let same_id = Book::new(1, 1999, "B");
    let later = Book::new(2, 1990, "C");

    assert_eq!(first, same_id);
    assert!(first < later);
    assert_eq!(Book::new(3, 2000, "   ").title(), None);
}

#[test]
fn inventory_tracks_price_and_stock() {
    let mut inventory = BooksInventory::new();
    inventory.add_book(Book::new(1, 2000, "Harbor Lights"), 25, 4);

    assert_eq!(inventory.find_price(1), Some(25));
    assert_eq!(inventory.find_stock_count(1), Some(4));
    assert_eq!(
        inventory.search_book_by_title("Harbor Lights").map(Book::id),
        Some(1)
    );

    assert!(inventory.remove_book(1).is_some());
    assert!(inventory.find_book(1).is_none());
    assert_eq!(inventory.find_price(1), None);
}
