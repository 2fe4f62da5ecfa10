//! Bulk catalogue loader.
//!
//! # Responsibility
//! - Populate an empty repository from `authors.csv`, `books.csv`,
//!   `users.csv` and `reviews.csv` under one data directory.
//! - Resolve natural keys between files.
//!
//! # Invariants
//! - Stages run in dependency order: authors, publishers/books/genres,
//!   users, reviews.
//! - Genre associations are made before books and genres are stored, so
//!   every backend observes the same links in the same order.
//! - Passwords are length-checked in plain text, then hashed before the
//!   user is constructed.
//! - The first failing row aborts the import; rows already stored stay.

use crate::model::author::Author;
use crate::model::book::Book;
use crate::model::genre::{make_genre_association, Genre};
use crate::model::publisher::Publisher;
use crate::model::review::make_review;
use crate::model::user::{check_password_length, User};
use crate::model::{AuthorId, BookId, ModelError};
use crate::password::PasswordHasher;
use crate::repo::{LibraryRepository, RepoError};
use log::{error, info};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

mod reader;

use reader::read_rows;

pub const AUTHORS_FILE: &str = "authors.csv";
pub const BOOKS_FILE: &str = "books.csv";
pub const USERS_FILE: &str = "users.csv";
pub const REVIEWS_FILE: &str = "reviews.csv";

/// Leading fixed columns of a `books.csv` row; genre tags follow.
const BOOK_FIXED_COLUMNS: usize = 7;

pub type ImportResult<T> = Result<T, ImportError>;

/// Error raised while loading import files.
#[derive(Debug)]
pub enum ImportError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
    /// Row is missing a column or holds an unparsable value.
    MalformedRow {
        path: PathBuf,
        line: u64,
        message: String,
    },
    /// A book row names an author key absent from `authors.csv`.
    UnknownAuthorKey {
        path: PathBuf,
        line: u64,
        key: String,
    },
    /// A review row names a user key absent from `users.csv`.
    UnknownUserKey {
        path: PathBuf,
        line: u64,
        key: String,
    },
    /// A review row names a book id that is not stored.
    UnknownBook {
        path: PathBuf,
        line: u64,
        book_id: BookId,
    },
    Model(ModelError),
    Repo(RepoError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read `{}`: {source}", path.display()),
            Self::Csv { path, source } => {
                write!(f, "cannot parse `{}`: {source}", path.display())
            }
            Self::MalformedRow {
                path,
                line,
                message,
            } => write!(f, "{}:{line}: {message}", path.display()),
            Self::UnknownAuthorKey { path, line, key } => {
                write!(f, "{}:{line}: unknown author key `{key}`", path.display())
            }
            Self::UnknownUserKey { path, line, key } => {
                write!(f, "{}:{line}: unknown user key `{key}`", path.display())
            }
            Self::UnknownBook {
                path,
                line,
                book_id,
            } => write!(f, "{}:{line}: unknown book id {book_id}", path.display()),
            Self::Model(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Model(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for ImportError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Entity counts stored by one `populate` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub authors: usize,
    pub publishers: usize,
    pub books: usize,
    pub genres: usize,
    pub users: usize,
    pub reviews: usize,
}

/// Loads the four import files under `data_dir` into `repo`.
///
/// # Errors
/// - `Io`/`Csv` when a file is missing or unreadable.
/// - `MalformedRow`, `UnknownAuthorKey`, `UnknownUserKey`, `UnknownBook`
///   for bad row content.
/// - `Model`/`Repo` when an entity is rejected.
pub fn populate<R, H>(data_dir: &Path, repo: &mut R, hasher: &H) -> ImportResult<ImportSummary>
where
    R: LibraryRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    let started_at = Instant::now();
    info!(
        "event=catalog_import module=import status=start data_dir={}",
        data_dir.display()
    );

    match run_stages(data_dir, repo, hasher) {
        Ok(summary) => {
            info!(
                "event=catalog_import module=import status=ok duration_ms={} authors={} publishers={} books={} genres={} users={} reviews={}",
                started_at.elapsed().as_millis(),
                summary.authors,
                summary.publishers,
                summary.books,
                summary.genres,
                summary.users,
                summary.reviews
            );
            Ok(summary)
        }
        Err(err) => {
            error!(
                "event=catalog_import module=import status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn run_stages<R, H>(data_dir: &Path, repo: &mut R, hasher: &H) -> ImportResult<ImportSummary>
where
    R: LibraryRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    let mut summary = ImportSummary::default();

    let authors = load_authors(&data_dir.join(AUTHORS_FILE), repo)?;
    summary.authors = authors.len();
    log_stage("authors", summary.authors);

    let catalog = load_books_and_genres(&data_dir.join(BOOKS_FILE), repo, &authors)?;
    summary.publishers = catalog.publishers;
    summary.books = catalog.books;
    summary.genres = catalog.genres;
    log_stage("books", summary.books);

    let mut users = load_users(&data_dir.join(USERS_FILE), repo, hasher)?;
    summary.users = users.len();
    log_stage("users", summary.users);

    summary.reviews = load_reviews(&data_dir.join(REVIEWS_FILE), repo, &mut users)?;
    log_stage("reviews", summary.reviews);

    Ok(summary)
}

fn log_stage(stage: &str, rows: usize) {
    info!("event=catalog_import module=import status=ok stage={stage} rows={rows}");
}

/// Returns author ids keyed by the natural key column of `authors.csv`.
fn load_authors<R>(path: &Path, repo: &mut R) -> ImportResult<HashMap<String, AuthorId>>
where
    R: LibraryRepository + ?Sized,
{
    let mut authors = HashMap::new();
    for row in read_rows(path)? {
        let key = row.field(path, 0, "id")?;
        let id: i64 = row.parse_field(path, 0, "id")?;
        let author = Author::new(id, row.field(path, 1, "full_name")?)?;
        repo.add_author(&author)?;
        authors.insert(key.to_string(), author.id());
    }
    Ok(authors)
}

struct CatalogCounts {
    publishers: usize,
    books: usize,
    genres: usize,
}

fn load_books_and_genres<R>(
    path: &Path,
    repo: &mut R,
    authors: &HashMap<String, AuthorId>,
) -> ImportResult<CatalogCounts>
where
    R: LibraryRepository + ?Sized,
{
    let mut books: Vec<Book> = Vec::new();
    let mut book_positions: HashMap<BookId, usize> = HashMap::new();
    let mut publishers: Vec<Publisher> = Vec::new();
    let mut seen_publishers: HashSet<String> = HashSet::new();
    let mut genre_groups: Vec<(String, Vec<BookId>)> = Vec::new();
    let mut genre_positions: HashMap<String, usize> = HashMap::new();

    for row in read_rows(path)? {
        let book_id: BookId = row.parse_field(path, 0, "id")?;
        let release_year: i32 = row.parse_field(path, 1, "release_year")?;
        let mut book = Book::new(book_id, release_year, row.field(path, 2, "title")?);

        let publisher = Publisher::new(row.field(path, 3, "publisher")?);
        book.set_publisher(publisher.name());
        if seen_publishers.insert(publisher.name().to_string()) {
            publishers.push(publisher);
        }

        let author_key = row.field(path, 4, "author")?;
        let author_id = authors
            .get(author_key)
            .copied()
            .ok_or_else(|| ImportError::UnknownAuthorKey {
                path: path.to_path_buf(),
                line: row.line,
                key: author_key.to_string(),
            })?;
        book.set_author(author_id);

        book.set_description(row.field(path, 5, "description")?);
        book.set_image_url(row.field(path, 6, "image_url")?);

        for genre_name in row.trailing(BOOK_FIXED_COLUMNS).filter(|name| !name.is_empty()) {
            let position = *genre_positions
                .entry(genre_name.to_string())
                .or_insert_with(|| {
                    genre_groups.push((genre_name.to_string(), Vec::new()));
                    genre_groups.len() - 1
                });
            let group = &mut genre_groups[position].1;
            if !group.contains(&book_id) {
                group.push(book_id);
            }
        }

        if book_positions.insert(book_id, books.len()).is_some() {
            return Err(ImportError::Repo(RepoError::DuplicateBook(book_id)));
        }
        books.push(book);
    }

    let mut genres = Vec::with_capacity(genre_groups.len());
    for (name, book_ids) in genre_groups {
        let mut genre = Genre::new(name);
        for book_id in book_ids {
            if let Some(&position) = book_positions.get(&book_id) {
                make_genre_association(&mut books[position], &mut genre)?;
            }
        }
        genres.push(genre);
    }

    for publisher in &publishers {
        repo.add_publisher(publisher)?;
    }
    for book in &books {
        repo.add_book(book)?;
    }
    for genre in &genres {
        repo.add_genre(genre)?;
    }

    Ok(CatalogCounts {
        publishers: publishers.len(),
        books: books.len(),
        genres: genres.len(),
    })
}

/// Returns stored users keyed by the natural key column of `users.csv`.
fn load_users<R, H>(path: &Path, repo: &mut R, hasher: &H) -> ImportResult<HashMap<String, User>>
where
    R: LibraryRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    let mut users = HashMap::new();
    for row in read_rows(path)? {
        let key = row.field(path, 0, "id")?;
        let password = row.field(path, 2, "password")?;
        check_password_length(password)?;
        let user = User::new(row.field(path, 1, "user_name")?, &hasher.hash(password))?;
        repo.add_user(&user)?;
        users.insert(key.to_string(), user);
    }
    Ok(users)
}

fn load_reviews<R>(path: &Path, repo: &mut R, users: &mut HashMap<String, User>) -> ImportResult<usize>
where
    R: LibraryRepository + ?Sized,
{
    let mut count = 0;
    for row in read_rows(path)? {
        let user_key = row.field(path, 0, "user")?;
        let user = users
            .get_mut(user_key)
            .ok_or_else(|| ImportError::UnknownUserKey {
                path: path.to_path_buf(),
                line: row.line,
                key: user_key.to_string(),
            })?;
        let book_id: BookId = row.parse_field(path, 1, "book_id")?;
        let mut book = repo
            .get_book(book_id)?
            .ok_or_else(|| ImportError::UnknownBook {
                path: path.to_path_buf(),
                line: row.line,
                book_id,
            })?;
        let rating: i64 = row.parse_field(path, 3, "rating")?;

        let review = make_review(row.field(path, 2, "review_text")?, user, &mut book, rating)?;
        repo.add_review(&review, user, &book)?;
        count += 1;
    }
    Ok(count)
}
