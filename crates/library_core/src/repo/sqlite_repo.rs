//! SQLite-backed catalogue repository.
//!
//! # Responsibility
//! - Implement `LibraryRepository` over the migrated catalogue schema.
//! - Let the store compute ordering, filtering and joins.
//!
//! # Invariants
//! - The connection must be at the latest schema version.
//! - Multi-row writes run inside one transaction.
//! - Results, ordering and absence semantics match `MemoryLibraryRepository`
//!   for the same sequence of writes. Insertion order is tracked by `seq`/`id`
//!   columns.
//! - Reviews come only from `add_review`; reviews carried by a user or book
//!   passed to `add_user`/`add_book` are not written.
//! - `genre_books` keeps a genre's association order and is joined against
//!   `books` on read, so unstored book ids stay hidden until the book arrives.

use crate::db::migrations::{current_user_version, latest_version};
use crate::model::author::Author;
use crate::model::book::Book;
use crate::model::genre::Genre;
use crate::model::publisher::Publisher;
use crate::model::review::Review;
use crate::model::user::{normalize_user_name, User};
use crate::model::{AuthorId, BookId};
use crate::repo::{
    validate_review_linkage, LibraryRepository, RepoError, RepoResult, ReviewLinkIssue,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashMap;

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    release_year,
    title,
    description,
    image_url,
    author_id,
    publisher_name,
    ebook,
    num_pages
FROM books";

const REVIEW_SELECT_SQL: &str = "SELECT
    book_id,
    user_name,
    review_text,
    rating,
    timestamp_ms
FROM reviews";

const REQUIRED_TABLES: [&str; 9] = [
    "authors",
    "publishers",
    "books",
    "genres",
    "genre_books",
    "book_genres",
    "users",
    "user_read_books",
    "reviews",
];

/// SQLite-backed catalogue repository.
pub struct SqliteLibraryRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteLibraryRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not the latest.
    /// - `MissingRequiredTable` when a catalogue table is absent.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_books(&self, sql: &str, bind: impl rusqlite::Params) -> RepoResult<Vec<Book>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        drop(rows);

        for book in &mut books {
            hydrate_book(self.conn, book)?;
        }
        Ok(books)
    }

    fn query_one_book(&self, sql: &str, bind: impl rusqlite::Params) -> RepoResult<Option<Book>> {
        Ok(self.query_books(sql, bind)?.into_iter().next())
    }

    fn book_exists(&self, book_id: BookId) -> RepoResult<bool> {
        exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM books WHERE id = ?1);",
            params![book_id],
        )
    }

    fn user_exists(&self, user_name: &str) -> RepoResult<bool> {
        exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM users WHERE user_name = ?1);",
            params![user_name],
        )
    }

    fn query_book_ids(&self, sql: &str, bind: impl rusqlite::Params) -> RepoResult<Vec<BookId>> {
        let mut stmt = self.conn.prepare(sql)?;
        let ids = stmt
            .query_map(bind, |row| row.get::<_, BookId>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}

impl LibraryRepository for SqliteLibraryRepository<'_> {
    fn add_user(&mut self, user: &User) -> RepoResult<()> {
        if self.user_exists(user.user_name())? {
            return Err(RepoError::DuplicateUser(user.user_name().to_string()));
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO users (user_name, password, pages_read) VALUES (?1, ?2, ?3);",
            params![user.user_name(), user.password(), to_db_count(user.pages_read())?],
        )?;
        for book_id in user.read_books() {
            tx.execute(
                "INSERT INTO user_read_books (user_name, book_id) VALUES (?1, ?2);",
                params![user.user_name(), book_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_user(&self, user_name: &str) -> RepoResult<Option<User>> {
        let Some(normalized) = normalize_user_name(user_name) else {
            return Ok(None);
        };

        let stored = self
            .conn
            .query_row(
                "SELECT user_name, password, pages_read FROM users WHERE user_name = ?1;",
                [normalized.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>("user_name")?,
                        row.get::<_, String>("password")?,
                        row.get::<_, i64>("pages_read")?,
                    ))
                },
            )
            .optional()?;
        let Some((name, password, pages_read)) = stored else {
            return Ok(None);
        };

        let mut user = User::new(&name, &password).map_err(|err| {
            RepoError::InvalidData(format!("invalid user `{name}` in users: {err}"))
        })?;
        let pages_read = u64::try_from(pages_read).map_err(|_| {
            RepoError::InvalidData(format!("invalid pages_read `{pages_read}` in users"))
        })?;
        let read_books = self.query_book_ids(
            "SELECT book_id FROM user_read_books WHERE user_name = ?1 ORDER BY id;",
            [name.as_str()],
        )?;
        user.restore_reading(read_books, pages_read);

        for review in load_reviews(
            self.conn,
            &format!("{REVIEW_SELECT_SQL} WHERE user_name = ?1 ORDER BY id;"),
            params![name],
        )? {
            user.add_review(review);
        }

        Ok(Some(user))
    }

    fn add_author(&mut self, author: &Author) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO authors (id, full_name) VALUES (?1, ?2);",
            params![author.id(), author.full_name()],
        )?;
        Ok(())
    }

    fn get_authors(&self) -> RepoResult<Vec<Author>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, full_name FROM authors ORDER BY seq;")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>("id")?, row.get::<_, String>("full_name")?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut authors = Vec::with_capacity(rows.len());
        for (id, full_name) in rows {
            let mut author = Author::new(id, &full_name).map_err(|err| {
                RepoError::InvalidData(format!("invalid author `{id}` in authors: {err}"))
            })?;
            for book_id in self.query_book_ids(
                "SELECT id FROM books WHERE author_id = ?1 ORDER BY seq;",
                params![id],
            )? {
                author.add_book_id(book_id);
            }
            authors.push(author);
        }
        Ok(authors)
    }

    fn add_publisher(&mut self, publisher: &Publisher) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO publishers (name) VALUES (?1);",
            [publisher.name()],
        )?;
        Ok(())
    }

    fn get_publishers(&self) -> RepoResult<Vec<Publisher>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM publishers ORDER BY id;")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut publishers = Vec::with_capacity(names.len());
        for name in names {
            let mut publisher = Publisher::new(&name);
            for book_id in self.query_book_ids(
                "SELECT id FROM books WHERE publisher_name = ?1 ORDER BY seq;",
                [name.as_str()],
            )? {
                publisher.add_book_id(book_id);
            }
            publishers.push(publisher);
        }
        Ok(publishers)
    }

    fn add_genre(&mut self, genre: &Genre) -> RepoResult<()> {
        let tx = self.conn.transaction()?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO genres (name) VALUES (?1);",
            [genre.name()],
        )?;
        if inserted == 0 {
            return Ok(());
        }

        let genre_id = tx.last_insert_rowid();
        for book_id in genre.books() {
            tx.execute(
                "INSERT OR IGNORE INTO genre_books (genre_id, book_id) VALUES (?1, ?2);",
                params![genre_id, book_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_genres(&self) -> RepoResult<Vec<Genre>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM genres ORDER BY id;")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>("id")?, row.get::<_, String>("name")?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut genres = Vec::with_capacity(rows.len());
        for (genre_id, name) in rows {
            let mut genre = Genre::new(name);
            for book_id in self.query_book_ids(
                "SELECT gb.book_id
                 FROM genre_books gb
                 INNER JOIN books b ON b.id = gb.book_id
                 WHERE gb.genre_id = ?1
                 ORDER BY gb.id;",
                params![genre_id],
            )? {
                genre.add_book_id(book_id);
            }
            genres.push(genre);
        }
        Ok(genres)
    }

    fn add_book(&mut self, book: &Book) -> RepoResult<()> {
        if self.book_exists(book.id())? {
            return Err(RepoError::DuplicateBook(book.id()));
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO books (
                id,
                release_year,
                title,
                description,
                image_url,
                author_id,
                publisher_name,
                ebook,
                num_pages
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                book.id(),
                book.release_year(),
                book.title(),
                book.description(),
                book.image_url(),
                book.author(),
                book.publisher(),
                book.ebook(),
                book.num_pages(),
            ],
        )?;
        for genre_name in book.genres() {
            tx.execute(
                "INSERT OR IGNORE INTO book_genres (book_id, genre_name) VALUES (?1, ?2);",
                params![book.id(), genre_name],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_book(&self, book_id: BookId) -> RepoResult<Option<Book>> {
        self.query_one_book(
            &format!("{BOOK_SELECT_SQL} WHERE id = ?1;"),
            params![book_id],
        )
    }

    fn get_all_books(&self) -> RepoResult<Vec<Book>> {
        self.query_books(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn get_books_by_id(&self, ids: &[BookId]) -> RepoResult<Vec<Book>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let found: HashMap<BookId, Book> = self
            .query_books(
                &format!("{BOOK_SELECT_SQL} WHERE id IN ({placeholders});"),
                params_from_iter(ids.iter()),
            )?
            .into_iter()
            .map(|book| (book.id(), book))
            .collect();

        Ok(ids.iter().filter_map(|id| found.get(id).cloned()).collect())
    }

    fn get_number_of_books(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("invalid book count `{count}`")))
    }

    fn get_first_book(&self) -> RepoResult<Option<Book>> {
        self.query_one_book(
            &format!("{BOOK_SELECT_SQL} ORDER BY release_year ASC, id ASC LIMIT 1;"),
            [],
        )
    }

    fn get_last_book(&self) -> RepoResult<Option<Book>> {
        self.query_one_book(
            &format!("{BOOK_SELECT_SQL} ORDER BY release_year DESC, id DESC LIMIT 1;"),
            [],
        )
    }

    fn get_books_by_release_year(&self, release_year: i32) -> RepoResult<Vec<Book>> {
        self.query_books(
            &format!("{BOOK_SELECT_SQL} WHERE release_year = ?1 ORDER BY id ASC;"),
            params![release_year],
        )
    }

    fn get_book_ids_for_genre(&self, genre_name: &str) -> RepoResult<Vec<BookId>> {
        self.query_book_ids(
            "SELECT gb.book_id
             FROM genre_books gb
             INNER JOIN books b ON b.id = gb.book_id
             WHERE gb.genre_id = (SELECT id FROM genres WHERE name = ?1)
             ORDER BY gb.id;",
            [genre_name],
        )
    }

    fn get_book_ids_for_author(&self, author_name: &str) -> RepoResult<Vec<BookId>> {
        self.query_book_ids(
            "SELECT b.id
             FROM books b
             WHERE b.author_id = (
                SELECT id FROM authors WHERE full_name = ?1 ORDER BY seq LIMIT 1
             )
             ORDER BY b.seq;",
            [author_name],
        )
    }

    fn get_book_ids_for_publisher(&self, publisher_name: &str) -> RepoResult<Vec<BookId>> {
        self.query_book_ids(
            "SELECT b.id
             FROM books b
             WHERE b.publisher_name = ?1
               AND EXISTS (SELECT 1 FROM publishers WHERE name = ?1)
             ORDER BY b.seq;",
            [publisher_name],
        )
    }

    fn get_release_year_of_previous_book(&self, book: &Book) -> RepoResult<Option<i32>> {
        if !self.book_exists(book.id())? {
            return Ok(None);
        }

        let year = self
            .conn
            .query_row(
                "SELECT release_year
                 FROM books
                 WHERE id < ?1 AND release_year < ?2
                 ORDER BY id DESC
                 LIMIT 1;",
                params![book.id(), book.release_year()],
                |row| row.get::<_, i32>(0),
            )
            .optional()?;
        Ok(year)
    }

    fn get_release_year_of_next_book(&self, book: &Book) -> RepoResult<Option<i32>> {
        if !self.book_exists(book.id())? {
            return Ok(None);
        }

        let year = self
            .conn
            .query_row(
                "SELECT release_year
                 FROM books
                 WHERE id > ?1 AND release_year > ?2
                 ORDER BY id ASC
                 LIMIT 1;",
                params![book.id(), book.release_year()],
                |row| row.get::<_, i32>(0),
            )
            .optional()?;
        Ok(year)
    }

    fn add_review(&mut self, review: &Review, user: &User, book: &Book) -> RepoResult<()> {
        validate_review_linkage(review, user, book)?;
        if !self.user_exists(review.user_name())? {
            return Err(RepoError::UnlinkedReview(ReviewLinkIssue::UnknownUser));
        }
        if !self.book_exists(review.book_id())? {
            return Err(RepoError::UnlinkedReview(ReviewLinkIssue::UnknownBook));
        }

        self.conn.execute(
            "INSERT INTO reviews (
                user_name,
                book_id,
                review_text,
                rating,
                timestamp_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                review.user_name(),
                review.book_id(),
                review.review_text(),
                review.rating(),
                review.timestamp_ms(),
            ],
        )?;
        Ok(())
    }

    fn get_reviews(&self) -> RepoResult<Vec<Review>> {
        load_reviews(self.conn, &format!("{REVIEW_SELECT_SQL} ORDER BY id;"), [])
    }
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let id: BookId = row.get("id")?;
    let title: Option<String> = row.get("title")?;
    let mut book = Book::new(id, row.get("release_year")?, title.as_deref().unwrap_or(""));

    if let Some(description) = row.get::<_, Option<String>>("description")? {
        book.set_description(&description);
    }
    if let Some(image_url) = row.get::<_, Option<String>>("image_url")? {
        book.set_image_url(&image_url);
    }
    if let Some(author_id) = row.get::<_, Option<AuthorId>>("author_id")? {
        book.set_author(author_id);
    }
    if let Some(publisher_name) = row.get::<_, Option<String>>("publisher_name")? {
        book.set_publisher(&publisher_name);
    }
    match row.get::<_, Option<i64>>("ebook")? {
        None => {}
        Some(0) => book.set_ebook(false),
        Some(1) => book.set_ebook(true),
        Some(other) => {
            return Err(RepoError::InvalidData(format!(
                "invalid ebook value `{other}` in books.ebook"
            )));
        }
    }
    if let Some(num_pages) = row.get::<_, Option<i64>>("num_pages")? {
        let num_pages = u32::try_from(num_pages).map_err(|_| {
            RepoError::InvalidData(format!("invalid num_pages `{num_pages}` in books.num_pages"))
        })?;
        book.set_num_pages(num_pages);
    }

    Ok(book)
}

/// Loads genre names and reviews for a book parsed from `books`.
fn hydrate_book(conn: &Connection, book: &mut Book) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "SELECT genre_name FROM book_genres WHERE book_id = ?1 ORDER BY id;",
    )?;
    let genre_names = stmt
        .query_map(params![book.id()], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for genre_name in genre_names {
        book.add_genre(&genre_name);
    }

    for review in load_reviews(
        conn,
        &format!("{REVIEW_SELECT_SQL} WHERE book_id = ?1 ORDER BY id;"),
        params![book.id()],
    )? {
        book.add_review(review);
    }
    Ok(())
}

fn load_reviews(
    conn: &Connection,
    sql: &str,
    bind: impl rusqlite::Params,
) -> RepoResult<Vec<Review>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(bind)?;
    let mut reviews = Vec::new();
    while let Some(row) = rows.next()? {
        reviews.push(parse_review_row(row)?);
    }
    Ok(reviews)
}

fn parse_review_row(row: &Row<'_>) -> RepoResult<Review> {
    let book_id: BookId = row.get("book_id")?;
    let user_name: String = row.get("user_name")?;
    let review_text: String = row.get("review_text")?;
    let rating: i64 = row.get("rating")?;
    let timestamp_ms: i64 = row.get("timestamp_ms")?;

    Review::with_timestamp(book_id, &user_name, &review_text, rating, timestamp_ms).map_err(
        |err| RepoError::InvalidData(format!("invalid review of book {book_id}: {err}")),
    )
}

fn exists(conn: &Connection, sql: &str, bind: impl rusqlite::Params) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(sql, bind, |row| row.get(0))?;
    Ok(exists == 1)
}

fn to_db_count(value: u64) -> RepoResult<i64> {
    i64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("count `{value}` exceeds storage range")))
}

fn ensure_catalog_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    exists(
        conn,
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
    )
}
