//! Command-line browser for the book catalogue.
//!
//! # Responsibility
//! - Wire configuration, logging, a repository backend and the bulk loader.
//! - Answer browsing queries through the core services.

use clap::{Parser, Subcommand};
use library_core::service::book_service::DEFAULT_GENRE_PAGE_SIZE;
use library_core::{
    init_logging, open_db_location, populate, BookService, BookView, CatalogService,
    LibraryConfig, LibraryRepository, MemoryLibraryRepository, RepositoryBackend,
    Sha256PasswordHasher, SqliteLibraryRepository,
};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "library-cli")]
#[command(about = "Browse a book catalogue loaded from CSV import files", long_about = None)]
struct Cli {
    /// Repository backend: memory or database
    #[arg(long)]
    backend: Option<String>,
    /// Directory holding authors.csv, books.csv, users.csv and reviews.csv
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// SQLite file for the database backend, or :memory:
    #[arg(long)]
    database_path: Option<String>,
    #[arg(long)]
    log_level: Option<String>,
    /// Enables file logging under this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print catalogue counts and the first/last release years
    Summary,
    /// List books of one release year (defaults to the earliest year)
    Year { year: Option<i32> },
    /// Page through the books of a genre
    Genre {
        name: String,
        #[arg(long, default_value_t = 0)]
        cursor: usize,
        #[arg(long, default_value_t = DEFAULT_GENRE_PAGE_SIZE)]
        page_size: usize,
    },
    /// List all genre names
    Genres,
    /// List the books of an author, by full name
    Author { name: String },
    /// List the books of a publisher
    Publisher { name: String },
    /// Show one book with its reviews
    Book { id: u32 },
    /// Pick random books
    Random {
        #[arg(default_value_t = 3)]
        quantity: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = resolve_config(&cli)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }
    info!(
        "event=cli_start module=cli status=ok backend={} data_dir={}",
        config.backend.as_str(),
        config.data_dir.display()
    );

    match config.backend {
        RepositoryBackend::Memory => {
            let mut repo = MemoryLibraryRepository::new();
            load_and_execute(&config, &mut repo, &cli.command)
        }
        RepositoryBackend::Database => {
            let mut conn = open_db_location(&config.database_path)?;
            let mut repo = SqliteLibraryRepository::try_new(&mut conn)?;
            load_and_execute(&config, &mut repo, &cli.command)
        }
    }
}

/// Environment config with command-line flags applied on top.
fn resolve_config(cli: &Cli) -> CliResult<LibraryConfig> {
    let mut config = LibraryConfig::from_env()?;
    if let Some(backend) = &cli.backend {
        config.backend = RepositoryBackend::parse(backend)?;
    }
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(database_path) = &cli.database_path {
        config.database_path = database_path.clone();
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    config.validate()?;
    Ok(config)
}

fn load_and_execute<R: LibraryRepository>(
    config: &LibraryConfig,
    repo: &mut R,
    command: &Commands,
) -> CliResult<()> {
    if repo.get_number_of_books()? == 0 {
        let summary = populate(&config.data_dir, &mut *repo, &Sha256PasswordHasher)?;
        info!(
            "event=cli_populate module=cli status=ok books={} reviews={}",
            summary.books, summary.reviews
        );
    } else {
        info!("event=cli_populate module=cli status=skipped reason=non_empty_repository");
    }

    execute(repo, command)
}

fn execute<R: LibraryRepository>(repo: &mut R, command: &Commands) -> CliResult<()> {
    match command {
        Commands::Summary => {
            let books = BookService::new(&mut *repo);
            let first = books.get_first_book()?;
            let last = books.get_last_book()?;
            let count = repo.get_number_of_books()?;
            println!("books: {count}");
            println!("genres: {}", repo.get_genres()?.len());
            println!("authors: {}", repo.get_authors()?.len());
            println!("publishers: {}", repo.get_publishers()?.len());
            println!("reviews: {}", repo.get_reviews()?.len());
            if let (Some(first), Some(last)) = (first, last) {
                println!("release years: {}..={}", first.release_year, last.release_year);
            }
        }
        Commands::Year { year } => {
            let books = BookService::new(&mut *repo);
            let year = match year {
                Some(year) => *year,
                None => match books.get_first_book()? {
                    Some(first) => first.release_year,
                    None => {
                        println!("catalogue is empty");
                        return Ok(());
                    }
                },
            };
            let page = books.get_books_by_release_year(year)?;
            println!("release year {year}");
            print_books(&page.books);
            println!(
                "previous: {}  next: {}",
                display_optional(page.previous_year),
                display_optional(page.next_year)
            );
        }
        Commands::Genre {
            name,
            cursor,
            page_size,
        } => {
            let page = BookService::new(&mut *repo).get_books_for_genre_page(
                name,
                *cursor,
                *page_size,
            )?;
            println!("genre {name} from {cursor}");
            print_books(&page.books);
            println!(
                "first: {}  previous: {}  next: {}  last: {}",
                display_optional(page.first_cursor),
                display_optional(page.previous_cursor),
                display_optional(page.next_cursor),
                display_optional(page.last_cursor)
            );
        }
        Commands::Genres => {
            for name in CatalogService::new(&mut *repo).get_genre_names()? {
                println!("{name}");
            }
        }
        Commands::Author { name } => {
            let books = BookService::new(&mut *repo);
            let ids = books.get_book_ids_for_author(name)?;
            print_books(&books.get_books_by_id(&ids)?);
        }
        Commands::Publisher { name } => {
            let books = BookService::new(&mut *repo);
            let ids = books.get_book_ids_for_publisher(name)?;
            print_books(&books.get_books_by_id(&ids)?);
        }
        Commands::Book { id } => {
            let book = BookService::new(&mut *repo).get_book(*id)?;
            print_books(std::slice::from_ref(&book));
            if let Some(description) = &book.description {
                println!("  {description}");
            }
            for review in &book.reviews {
                println!(
                    "  [{}/5] {}: {}",
                    review.rating, review.user_name, review.review_text
                );
            }
        }
        Commands::Random { quantity } => {
            print_books(&CatalogService::new(&mut *repo).get_random_books(*quantity)?);
        }
    }
    Ok(())
}

fn print_books(books: &[BookView]) {
    if books.is_empty() {
        println!("(no books)");
    }
    for book in books {
        let genres: Vec<&str> = book
            .genres
            .iter()
            .map(|genre| genre.genre_name.as_str())
            .collect();
        println!(
            "{:>6}  {}  {}  [{}]",
            book.book_id,
            book.release_year,
            book.title.as_deref().unwrap_or("(untitled)"),
            genres.join(", ")
        );
    }
}

fn display_optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}
