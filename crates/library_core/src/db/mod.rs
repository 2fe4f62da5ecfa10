//! SQLite storage for the persistent catalogue backend.
//!
//! # Responsibility
//! - Resolve a configured database location to a configured connection.
//! - Bring the catalogue schema to the latest version before handing it out.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - `SqliteLibraryRepository` refuses connections that skipped this module.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_db_location, IN_MEMORY_LOCATION};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating a catalogue database.
#[derive(Debug)]
pub enum DbError {
    /// A blank database location was configured.
    EmptyLocation,
    /// SQLite could not open `target` (a file path or `:memory:`).
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// Catalogue migration `version` failed and was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer catalogue schema.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLocation => write!(f, "catalogue database location is empty"),
            Self::Open { target, source } => {
                write!(f, "cannot open catalogue database `{target}`: {source}")
            }
            Self::Migration { version, source } => {
                write!(f, "catalogue migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "catalogue schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Sqlite(err) => write!(f, "catalogue database error: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::EmptyLocation | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
