mod common;

use common::{for_each_empty_backend, for_each_loaded_backend, ids};
use library_core::model::review::EMPTY_REVIEW_TEXT;
use library_core::{
    make_genre_association, make_review, Author, Book, Genre, LibraryRepository, Publisher,
    RepoError, Review, ReviewLinkIssue, User,
};

#[test]
fn loaded_catalogue_counts_and_orders_books_by_id() {
    for_each_loaded_backend(|backend, repo| {
        assert_eq!(repo.get_number_of_books().unwrap(), 6, "{backend}");

        let first_pass = repo.get_all_books().unwrap();
        let second_pass = repo.get_all_books().unwrap();
        assert_eq!(ids(&first_pass), vec![1, 2, 3, 4, 5, 6], "{backend}");
        assert_eq!(first_pass, second_pass, "{backend}");
    });
}

#[test]
fn first_and_last_book_follow_release_year_then_id() {
    for_each_loaded_backend(|backend, repo| {
        let first = repo.get_first_book().unwrap().unwrap();
        let last = repo.get_last_book().unwrap().unwrap();

        assert_eq!((first.id(), first.release_year()), (1, 1987), "{backend}");
        assert_eq!((last.id(), last.release_year()), (6, 2008), "{backend}");
    });
}

#[test]
fn empty_repository_reports_absence() {
    for_each_empty_backend(|backend, repo| {
        assert_eq!(repo.get_number_of_books().unwrap(), 0, "{backend}");
        assert!(repo.get_first_book().unwrap().is_none(), "{backend}");
        assert!(repo.get_last_book().unwrap().is_none(), "{backend}");
        assert!(repo.get_all_books().unwrap().is_empty(), "{backend}");
        assert!(repo.get_book(1).unwrap().is_none(), "{backend}");
        assert!(repo.get_user("thorke").unwrap().is_none(), "{backend}");
        assert!(repo.get_reviews().unwrap().is_empty(), "{backend}");
    });
}

#[test]
fn books_by_release_year_match_exactly() {
    for_each_loaded_backend(|backend, repo| {
        assert_eq!(
            ids(&repo.get_books_by_release_year(1996).unwrap()),
            vec![3, 4],
            "{backend}"
        );
        assert!(
            repo.get_books_by_release_year(1990).unwrap().is_empty(),
            "{backend}"
        );
    });
}

#[test]
fn adjacent_release_years_in_fixture() {
    for_each_loaded_backend(|backend, repo| {
        let first = repo.get_book(1).unwrap().unwrap();
        let second = repo.get_book(2).unwrap().unwrap();
        let third = repo.get_book(3).unwrap().unwrap();
        let last = repo.get_book(6).unwrap().unwrap();

        assert_eq!(
            repo.get_release_year_of_previous_book(&third).unwrap(),
            Some(1988),
            "{backend}"
        );
        assert_eq!(
            repo.get_release_year_of_next_book(&second).unwrap(),
            Some(1996),
            "{backend}"
        );
        assert_eq!(
            repo.get_release_year_of_previous_book(&first).unwrap(),
            None,
            "{backend}"
        );
        assert_eq!(
            repo.get_release_year_of_next_book(&last).unwrap(),
            None,
            "{backend}"
        );
    });
}

#[test]
fn adjacent_release_years_scan_in_id_order() {
    for_each_empty_backend(|backend, repo| {
        for (id, year) in [(3, 2005), (1, 2000), (4, 1995), (2, 1990)] {
            repo.add_book(&Book::new(id, year, "Title")).unwrap();
        }
        let book_two = repo.get_book(2).unwrap().unwrap();
        let book_four = repo.get_book(4).unwrap().unwrap();

        assert_eq!(
            repo.get_release_year_of_previous_book(&book_four).unwrap(),
            Some(1990),
            "{backend}"
        );
        assert_eq!(
            repo.get_release_year_of_next_book(&book_two).unwrap(),
            Some(2005),
            "{backend}"
        );
        assert_eq!(
            repo.get_release_year_of_previous_book(&book_two).unwrap(),
            None,
            "{backend}"
        );

        let unstored = Book::new(99, 1990, "Ghost");
        assert_eq!(
            repo.get_release_year_of_next_book(&unstored).unwrap(),
            None,
            "{backend}"
        );
    });
}

#[test]
fn book_ids_for_genre_author_and_publisher() {
    for_each_loaded_backend(|backend, repo| {
        assert_eq!(repo.get_book_ids_for_genre("Crime").unwrap(), vec![1, 4, 6], "{backend}");
        assert_eq!(repo.get_book_ids_for_genre("Horror").unwrap(), vec![1, 3], "{backend}");
        assert!(repo.get_book_ids_for_genre("Romance").unwrap().is_empty(), "{backend}");

        assert_eq!(
            repo.get_book_ids_for_author("Garth Ennis").unwrap(),
            vec![1, 4],
            "{backend}"
        );
        assert!(repo.get_book_ids_for_author("Nobody").unwrap().is_empty(), "{backend}");

        assert_eq!(
            repo.get_book_ids_for_publisher("Avatar Press").unwrap(),
            vec![1, 3],
            "{backend}"
        );
        assert_eq!(repo.get_book_ids_for_publisher("N/A").unwrap(), vec![5], "{backend}");
    });
}

#[test]
fn books_by_id_keep_input_order_and_drop_unknown_ids() {
    for_each_loaded_backend(|backend, repo| {
        let books = repo.get_books_by_id(&[6, 99, 2, 6]).unwrap();
        assert_eq!(ids(&books), vec![6, 2, 6], "{backend}");

        let single = repo.get_books_by_id(&[4]).unwrap();
        assert_eq!(ids(&single), vec![4], "{backend}");
        assert!(repo.get_books_by_id(&[]).unwrap().is_empty(), "{backend}");
    });
}

#[test]
fn stored_books_keep_their_attributes_and_links() {
    for_each_loaded_backend(|backend, repo| {
        let book = repo.get_book(1).unwrap().unwrap();
        assert_eq!(book.title(), Some("The House of Memory"), "{backend}");
        assert_eq!(book.author(), Some(8051), "{backend}");
        assert_eq!(book.publisher(), Some("Avatar Press"), "{backend}");
        assert_eq!(book.genres(), ["Crime", "Horror"], "{backend}");
        assert_eq!(book.number_of_reviews(), 2, "{backend}");
        assert_eq!(book.reviews()[0].rating(), 5, "{backend}");

        let trimmed = repo.get_book(3).unwrap().unwrap();
        assert_eq!(
            trimmed.description(),
            Some("Long description, with spaces"),
            "{backend}"
        );

        let unpublished = repo.get_book(5).unwrap().unwrap();
        assert_eq!(unpublished.publisher(), Some("N/A"), "{backend}");
        assert!(!unpublished.is_genred(), "{backend}");
        assert!(repo.get_book(99).unwrap().is_none(), "{backend}");
    });
}

#[test]
fn catalogue_entities_are_listed_in_load_order() {
    for_each_loaded_backend(|backend, repo| {
        let genres = repo.get_genres().unwrap();
        let names: Vec<&str> = genres.iter().map(|genre| genre.name()).collect();
        assert_eq!(names, ["Crime", "Horror", "War", "Thriller"], "{backend}");
        assert_eq!(genres[0].books(), [1, 4, 6], "{backend}");

        let authors = repo.get_authors().unwrap();
        assert_eq!(authors.len(), 4, "{backend}");
        assert_eq!(authors[0].full_name(), "Garth Ennis", "{backend}");
        assert_eq!(authors[0].books(), [1, 4], "{backend}");

        let publishers = repo.get_publishers().unwrap();
        let names: Vec<&str> = publishers.iter().map(|publisher| publisher.name()).collect();
        assert_eq!(names, ["Avatar Press", "Dargaud", "N/A", "Hachette"], "{backend}");
        assert_eq!(publishers[1].books(), [2, 4], "{backend}");
    });
}

#[test]
fn user_lookup_is_trimmed_and_case_insensitive() {
    for_each_loaded_backend(|backend, repo| {
        let user = repo.get_user("  THORKE ").unwrap().unwrap();
        assert_eq!(user.user_name(), "thorke", "{backend}");
        assert_eq!(user.reviews().len(), 2, "{backend}");
        assert!(user.password().starts_with("sha256$"), "{backend}");

        assert!(repo.get_user("shaun").unwrap().is_some(), "{backend}");
        assert!(repo.get_user("ghost").unwrap().is_none(), "{backend}");
        assert!(repo.get_user("   ").unwrap().is_none(), "{backend}");
    });
}

#[test]
fn reviews_are_listed_in_submission_order() {
    for_each_loaded_backend(|backend, repo| {
        let reviews = repo.get_reviews().unwrap();
        let texts: Vec<&str> = reviews.iter().map(Review::review_text).collect();
        assert_eq!(
            texts,
            [
                "Gripping from start to finish",
                "Too dark for me",
                "Solid mystery",
                EMPTY_REVIEW_TEXT,
            ],
            "{backend}"
        );
        assert_eq!(reviews[3].user_name(), "shaun", "{backend}");
    });
}

#[test]
fn linked_review_is_visible_from_user_and_book() {
    for_each_loaded_backend(|backend, repo| {
        let mut user = repo.get_user("fmercury").unwrap().unwrap();
        let mut book = repo.get_book(2).unwrap().unwrap();
        let review = make_review("Loved the art", &mut user, &mut book, 4).unwrap();

        repo.add_review(&review, &user, &book).unwrap();

        let stored_book = repo.get_book(2).unwrap().unwrap();
        assert_eq!(stored_book.reviews(), [review.clone()], "{backend}");
        let stored_user = repo.get_user("fmercury").unwrap().unwrap();
        assert!(stored_user.reviews().contains(&review), "{backend}");
        assert_eq!(repo.get_reviews().unwrap().len(), 5, "{backend}");
    });
}

#[test]
fn unlinked_review_is_rejected_without_writing() {
    for_each_loaded_backend(|backend, repo| {
        let user = repo.get_user("fmercury").unwrap().unwrap();
        let book = repo.get_book(2).unwrap().unwrap();
        let review = Review::new(&book, "Never linked", &user, 3).unwrap();

        let err = repo.add_review(&review, &user, &book).unwrap_err();
        assert!(
            matches!(
                err,
                RepoError::UnlinkedReview(ReviewLinkIssue::NotAttachedToUser)
            ),
            "{backend}: {err}"
        );
        assert_eq!(repo.get_reviews().unwrap().len(), 4, "{backend}");
        assert_eq!(
            repo.get_book(2).unwrap().unwrap().number_of_reviews(),
            0,
            "{backend}"
        );
    });
}

#[test]
fn review_by_unstored_user_is_rejected() {
    for_each_loaded_backend(|backend, repo| {
        let mut stranger = User::new("stranger", "password123").unwrap();
        let mut book = repo.get_book(2).unwrap().unwrap();
        let review = make_review("Hello", &mut stranger, &mut book, 3).unwrap();

        let err = repo.add_review(&review, &stranger, &book).unwrap_err();
        assert!(
            matches!(err, RepoError::UnlinkedReview(ReviewLinkIssue::UnknownUser)),
            "{backend}: {err}"
        );
    });
}

#[test]
fn duplicate_identities() {
    for_each_loaded_backend(|backend, repo| {
        let err = repo.add_book(&Book::new(3, 1999, "Clash")).unwrap_err();
        assert!(matches!(err, RepoError::DuplicateBook(3)), "{backend}: {err}");

        let err = repo
            .add_user(&User::new(" Thorke", "anotherpass").unwrap())
            .unwrap_err();
        assert!(
            matches!(err, RepoError::DuplicateUser(ref name) if name == "thorke"),
            "{backend}: {err}"
        );

        repo.add_genre(&library_core::Genre::new("Crime")).unwrap();
        assert_eq!(repo.get_genres().unwrap().len(), 4, "{backend}");
        assert_eq!(repo.get_book_ids_for_genre("Crime").unwrap(), vec![1, 4, 6], "{backend}");
    });
}

#[test]
fn user_reading_history_is_stored() {
    for_each_empty_backend(|backend, repo| {
        let mut book = Book::new(10, 2015, "Thick Volume");
        book.set_num_pages(420);
        book.set_ebook(true);
        repo.add_book(&book).unwrap();

        let mut user = User::new("reader", "readerpass").unwrap();
        user.read_a_book(&book);
        repo.add_user(&user).unwrap();

        let stored = repo.get_user("reader").unwrap().unwrap();
        assert_eq!(stored.read_books(), [10], "{backend}");
        assert_eq!(stored.pages_read(), 420, "{backend}");

        let stored_book = repo.get_book(10).unwrap().unwrap();
        assert_eq!(stored_book.num_pages(), Some(420), "{backend}");
        assert_eq!(stored_book.ebook(), Some(true), "{backend}");
        assert_eq!(stored_book.description(), None, "{backend}");
    });
}

#[test]
fn reviews_attached_before_storing_are_counted_once() {
    for_each_empty_backend(|backend, repo| {
        let mut user = User::new("thorke", "kj9u837j").unwrap();
        let mut book = Book::new(1, 1987, "The House of Memory");
        let review = make_review("Gripping", &mut user, &mut book, 5).unwrap();

        repo.add_user(&user).unwrap();
        repo.add_book(&book).unwrap();
        assert_eq!(
            repo.get_book(1).unwrap().unwrap().number_of_reviews(),
            0,
            "{backend}"
        );

        repo.add_review(&review, &user, &book).unwrap();

        let stored_book = repo.get_book(1).unwrap().unwrap();
        let stored_user = repo.get_user("thorke").unwrap().unwrap();
        assert_eq!(stored_book.reviews(), [review.clone()], "{backend}");
        assert_eq!(stored_user.reviews(), [review], "{backend}");
        assert_eq!(repo.get_reviews().unwrap().len(), 1, "{backend}");
    });
}

#[test]
fn author_and_publisher_stored_after_their_books_list_them() {
    for_each_empty_backend(|backend, repo| {
        for id in [3, 1] {
            let mut book = Book::new(id, 2000, "Title");
            book.set_author(7);
            book.set_publisher("Dargaud");
            repo.add_book(&book).unwrap();
        }

        let mut author = Author::new(7, "Ann Nocenti").unwrap();
        author.add_book(&Book::new(50, 1990, "Never stored"));
        repo.add_author(&author).unwrap();
        repo.add_publisher(&Publisher::new("Dargaud")).unwrap();

        let mut late = Book::new(2, 2001, "Late");
        late.set_author(7);
        late.set_publisher("Dargaud");
        repo.add_book(&late).unwrap();

        assert_eq!(
            repo.get_book_ids_for_author("Ann Nocenti").unwrap(),
            vec![3, 1, 2],
            "{backend}"
        );
        assert_eq!(repo.get_authors().unwrap()[0].books(), [3, 1, 2], "{backend}");
        assert_eq!(
            repo.get_book_ids_for_publisher("Dargaud").unwrap(),
            vec![3, 1, 2],
            "{backend}"
        );
        assert_eq!(repo.get_publishers().unwrap()[0].books(), [3, 1, 2], "{backend}");
    });
}

#[test]
fn genre_keeps_association_order_when_stored_before_its_books() {
    for_each_empty_backend(|backend, repo| {
        let mut crime = Genre::new("Crime");
        let mut book_four = Book::new(4, 1996, "Four");
        let mut book_one = Book::new(1, 1987, "One");
        make_genre_association(&mut book_four, &mut crime).unwrap();
        make_genre_association(&mut book_one, &mut crime).unwrap();

        repo.add_genre(&crime).unwrap();
        assert!(repo.get_book_ids_for_genre("Crime").unwrap().is_empty(), "{backend}");

        repo.add_book(&book_one).unwrap();
        assert_eq!(repo.get_book_ids_for_genre("Crime").unwrap(), vec![1], "{backend}");

        repo.add_book(&book_four).unwrap();
        assert_eq!(repo.get_book_ids_for_genre("Crime").unwrap(), vec![4, 1], "{backend}");
        assert_eq!(repo.get_genres().unwrap()[0].books(), [4, 1], "{backend}");
        assert_eq!(repo.get_book(4).unwrap().unwrap().genres(), ["Crime"], "{backend}");
    });
}

#[test]
fn genre_membership_comes_from_the_stored_genre() {
    for_each_empty_backend(|backend, repo| {
        repo.add_genre(&Genre::new("Drama")).unwrap();

        let mut book = Book::new(7, 2010, "Late Arrival");
        let mut later_drama = Genre::new("Drama");
        make_genre_association(&mut book, &mut later_drama).unwrap();
        repo.add_book(&book).unwrap();
        repo.add_genre(&later_drama).unwrap();

        assert!(repo.get_book_ids_for_genre("Drama").unwrap().is_empty(), "{backend}");
        assert_eq!(repo.get_book(7).unwrap().unwrap().genres(), ["Drama"], "{backend}");
    });
}

/// Identical fixtures give identical answers across backends.
#[test]
fn backends_agree_on_every_derived_query() {
    let mut snapshots = Vec::new();
    for_each_loaded_backend(|_, repo| {
        snapshots.push(snapshot(repo));
    });

    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0], snapshots[1]);
}

#[test]
fn backends_agree_when_entities_arrive_out_of_load_order() {
    let mut snapshots = Vec::new();
    for_each_empty_backend(|_, repo| {
        store_out_of_load_order(repo);
        snapshots.push(snapshot(repo));
    });

    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0], snapshots[1]);
    assert_eq!(snapshots[0].genres[0].1, vec![4, 6, 1]);
    assert_eq!(snapshots[0].authors[0].1, vec![6, 1, 2, 4]);
    assert_eq!(snapshots[0].review_count, 1);
}

/// Genres before books, authors and publishers mid-stream, a pre-linked review.
fn store_out_of_load_order(repo: &mut dyn LibraryRepository) {
    let mut user = User::new("fmercury", "mvNNbc1eLA$i").unwrap();
    let mut crime = Genre::new("Crime");
    let mut war = Genre::new("War");
    let mut books: Vec<Book> = [(6, 2008), (2, 1988), (4, 1996), (1, 1987)]
        .into_iter()
        .map(|(id, year)| {
            let mut book = Book::new(id, year, "Title");
            book.set_author(8051);
            book.set_publisher("Dargaud");
            book
        })
        .collect();
    make_genre_association(&mut books[2], &mut crime).unwrap();
    make_genre_association(&mut books[0], &mut crime).unwrap();
    make_genre_association(&mut books[3], &mut crime).unwrap();
    make_genre_association(&mut books[1], &mut war).unwrap();
    let review = make_review("Early review", &mut user, &mut books[3], 4).unwrap();

    repo.add_genre(&crime).unwrap();
    repo.add_book(&books[0]).unwrap();
    repo.add_user(&user).unwrap();
    repo.add_book(&books[3]).unwrap();
    repo.add_author(&Author::new(8051, "Garth Ennis").unwrap()).unwrap();
    repo.add_book(&books[1]).unwrap();
    repo.add_review(&review, &user, &books[3]).unwrap();
    repo.add_publisher(&Publisher::new("Dargaud")).unwrap();
    repo.add_book(&books[2]).unwrap();
    repo.add_genre(&war).unwrap();
}

#[derive(Debug, PartialEq)]
struct Snapshot {
    count: usize,
    first: Option<u32>,
    last: Option<u32>,
    by_year: Vec<(i32, Vec<u32>)>,
    genres: Vec<(String, Vec<u32>, Vec<u32>)>,
    authors: Vec<(String, Vec<u32>, Vec<u32>)>,
    publishers: Vec<(String, Vec<u32>, Vec<u32>)>,
    book_links: Vec<(u32, Vec<String>, usize)>,
    review_count: usize,
    neighbours: Vec<(u32, Option<i32>, Option<i32>)>,
}

fn snapshot(repo: &mut dyn LibraryRepository) -> Snapshot {
    let books = repo.get_all_books().unwrap();
    let genres = repo.get_genres().unwrap();
    let authors = repo.get_authors().unwrap();
    let publishers = repo.get_publishers().unwrap();

    Snapshot {
        count: repo.get_number_of_books().unwrap(),
        first: repo.get_first_book().unwrap().map(|book| book.id()),
        last: repo.get_last_book().unwrap().map(|book| book.id()),
        by_year: [1986, 1987, 1988, 1996, 2008]
            .into_iter()
            .map(|year| (year, ids(&repo.get_books_by_release_year(year).unwrap())))
            .collect(),
        genres: genres
            .iter()
            .map(|genre| {
                (
                    genre.name().to_string(),
                    genre.books().to_vec(),
                    repo.get_book_ids_for_genre(genre.name()).unwrap(),
                )
            })
            .collect(),
        authors: authors
            .iter()
            .map(|author| {
                (
                    author.full_name().to_string(),
                    author.books().to_vec(),
                    repo.get_book_ids_for_author(author.full_name()).unwrap(),
                )
            })
            .collect(),
        publishers: publishers
            .iter()
            .map(|publisher| {
                (
                    publisher.name().to_string(),
                    publisher.books().to_vec(),
                    repo.get_book_ids_for_publisher(publisher.name()).unwrap(),
                )
            })
            .collect(),
        book_links: books
            .iter()
            .map(|book| (book.id(), book.genres().to_vec(), book.number_of_reviews()))
            .collect(),
        review_count: repo.get_reviews().unwrap().len(),
        neighbours: books
            .iter()
            .map(|book| {
                (
                    book.id(),
                    repo.get_release_year_of_previous_book(book).unwrap(),
                    repo.get_release_year_of_next_book(book).unwrap(),
                )
            })
            .collect(),
    }
}
