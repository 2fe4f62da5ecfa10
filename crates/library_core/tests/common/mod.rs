#![allow(dead_code)]

use library_core::db::open_db_in_memory;
use library_core::{
    populate, LibraryRepository, MemoryLibraryRepository, Sha256PasswordHasher,
    SqliteLibraryRepository,
};
use std::path::PathBuf;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Runs `check` against an empty repository of each backend.
pub fn for_each_empty_backend(mut check: impl FnMut(&str, &mut dyn LibraryRepository)) {
    let mut memory = MemoryLibraryRepository::new();
    check("memory", &mut memory);

    let mut conn = open_db_in_memory().unwrap();
    let mut sqlite = SqliteLibraryRepository::try_new(&mut conn).unwrap();
    check("sqlite", &mut sqlite);
}

/// Runs `check` against each backend populated from the CSV fixtures.
pub fn for_each_loaded_backend(mut check: impl FnMut(&str, &mut dyn LibraryRepository)) {
    for_each_empty_backend(|backend, repo| {
        populate(&fixtures_dir(), &mut *repo, &Sha256PasswordHasher).unwrap();
        check(backend, repo);
    });
}

pub fn ids<'a>(books: impl IntoIterator<Item = &'a library_core::Book>) -> Vec<u32> {
    books.into_iter().map(|book| book.id()).collect()
}
