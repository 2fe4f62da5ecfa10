//! Core domain logic for the book catalogue.
//! This crate is the single source of truth for catalogue invariants.

pub mod config;
pub mod db;
pub mod import;
pub mod logging;
pub mod model;
pub mod password;
pub mod repo;
pub mod service;

pub use config::{ConfigError, LibraryConfig, RepositoryBackend};
pub use db::{open_db, open_db_in_memory, open_db_location, DbError};
pub use import::{populate, ImportError, ImportSummary};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::author::Author;
pub use model::book::Book;
pub use model::genre::{make_genre_association, Genre};
pub use model::publisher::Publisher;
pub use model::review::{make_review, Review};
pub use model::user::User;
pub use model::{AuthorId, BookId, ModelError};
pub use password::{PasswordHasher, Sha256PasswordHasher};
pub use repo::memory_repo::MemoryLibraryRepository;
pub use repo::sqlite_repo::SqliteLibraryRepository;
pub use repo::{LibraryRepository, RepoError, RepoResult, ReviewLinkIssue};
pub use service::auth_service::{AuthService, AuthServiceError};
pub use service::book_service::{BookService, BookServiceError, GenrePage, YearPage};
pub use service::catalog_service::CatalogService;
pub use service::view::{BookView, GenreView, ReviewView, UserView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
