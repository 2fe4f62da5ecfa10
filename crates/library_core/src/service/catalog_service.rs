//! Catalogue-wide utilities: genre listing and random picks.

use crate::model::BookId;
use crate::repo::{LibraryRepository, RepoResult};
use crate::service::view::BookView;
use rand::seq::SliceRandom;
use rand::Rng;

/// Use-case service for catalogue-wide helpers.
pub struct CatalogService<R: LibraryRepository> {
    repo: R,
}

impl<R: LibraryRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Names of all stored genres in insertion order.
    pub fn get_genre_names(&self) -> RepoResult<Vec<String>> {
        Ok(self
            .repo
            .get_genres()?
            .iter()
            .map(|genre| genre.name().to_string())
            .collect())
    }

    /// Up to `quantity` distinct random books.
    pub fn get_random_books(&self, quantity: usize) -> RepoResult<Vec<BookView>> {
        self.get_random_books_with(quantity, &mut rand::thread_rng())
    }

    /// Like `get_random_books` with a caller-supplied generator.
    pub fn get_random_books_with<G: Rng + ?Sized>(
        &self,
        quantity: usize,
        rng: &mut G,
    ) -> RepoResult<Vec<BookView>> {
        let books = self.repo.get_all_books()?;
        let ids: Vec<BookId> = books.iter().map(|book| book.id()).collect();
        let picked: Vec<BookId> = ids.choose_multiple(rng, quantity).copied().collect();

        let genres = self.repo.get_genres()?;
        Ok(self
            .repo
            .get_books_by_id(&picked)?
            .iter()
            .map(|book| BookView::from_book(book, &genres))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::CatalogService;
    use crate::model::book::Book;
    use crate::model::genre::Genre;
    use crate::repo::memory_repo::MemoryLibraryRepository;
    use crate::repo::LibraryRepository;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn seeded_repo() -> MemoryLibraryRepository {
        let mut repo = MemoryLibraryRepository::new();
        for id in 1..=5 {
            repo.add_book(&Book::new(id, 2000, "Title")).unwrap();
        }
        repo.add_genre(&Genre::new("Crime")).unwrap();
        repo.add_genre(&Genre::new("Fantasy")).unwrap();
        repo
    }

    #[test]
    fn random_books_are_distinct_and_clamped() {
        let service = CatalogService::new(seeded_repo());
        let mut rng = StdRng::seed_from_u64(7);

        let books = service.get_random_books_with(10, &mut rng).unwrap();
        let ids: HashSet<_> = books.iter().map(|book| book.book_id).collect();

        assert_eq!(books.len(), 5);
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn genre_names_keep_insertion_order() {
        let service = CatalogService::new(seeded_repo());
        assert_eq!(service.get_genre_names().unwrap(), vec!["Crime", "Fantasy"]);
    }
}
