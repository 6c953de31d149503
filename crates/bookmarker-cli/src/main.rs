//! Bookmarker CLI
//!
//! Command-line interface for Bookmarker - page references, sections,
//! authorship and citations over a reading catalogue.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use bookmarker_core::{Config, Library, SqliteCatalogue, StorageError};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "bookmarker")]
#[command(about = "Bookmarker - page references, sections and citations for your reading notes")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Catalogue database to read instead of the configured one
    #[arg(long, global = true, value_name = "FILE")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a page token (decimal or lowercase roman)
    Page {
        /// Page as typed, e.g. 42 or xiv
        token: String,
        /// Reject body pages past this page count
        #[arg(long)]
        pages: Option<u32>,
    },
    /// List a book's sections, or show the section a page falls in
    Section {
        /// Book slug or ID (full UUID or prefix)
        book: String,
        /// Page as typed
        page: Option<String>,
    },
    /// Format citations
    Cite {
        #[command(subcommand)]
        command: CiteCommands,
    },
    /// Bibliography of the sources quoted by a tag's notes
    #[command(alias = "bib")]
    Bibliography {
        /// Tag slug
        tag: String,
    },
    /// Show authors, inherited defaults and author mode
    Authors {
        #[command(subcommand)]
        command: AuthorsCommands,
    },
    /// Parse a table of contents into sections
    Outline {
        /// Outline file, or - for stdin
        file: PathBuf,
    },
    /// List notes and terms filed under a section their page isn't in
    CheckSections,
    /// Show configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum CiteCommands {
    /// Cite a book
    Book {
        /// Book slug or ID (full UUID or prefix)
        book: String,
    },
    /// Cite a section
    Section {
        /// Section ID (full UUID or prefix)
        id: String,
    },
    /// In-text citation for a note
    Note {
        /// Note ID (full UUID or prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum AuthorsCommands {
    /// Authorship of a note
    Note {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Authorship of a section
    Section {
        /// Section ID (full UUID or prefix)
        id: String,
    },
    /// Authorship of a term occurrence
    Term {
        /// Term occurrence ID (full UUID or prefix)
        id: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let config = Config::load_with_override(cli.config.as_deref())
        .context("Failed to load configuration")?;
    init_logging(&config);

    // Commands that don't need the catalogue
    match &cli.command {
        Commands::Page { token, pages } => return commands::page::show(token, *pages, &output),
        Commands::Outline { file } => return commands::outline::parse(file, &output),
        Commands::Config { command } => {
            return match command {
                Some(ConfigCommands::Show) | None => commands::config::show(
                    &config,
                    cli.config.as_deref(),
                    cli.db.as_deref(),
                    &output,
                ),
            };
        }
        _ => {}
    }

    let library = open_library(&config, cli.db.as_deref())?;

    match cli.command {
        Commands::Section { book, page } => {
            commands::section::show(&library, &book, page.as_deref(), &output)
        }
        Commands::Cite { command } => handle_cite_command(command, &library, &output),
        Commands::Bibliography { tag } => {
            commands::cite::bibliography_for_tag(&library, &tag, &output)
        }
        Commands::Authors { command } => handle_authors_command(command, &library, &output),
        Commands::CheckSections => commands::check::sections(&library, &output),
        Commands::Page { .. } | Commands::Outline { .. } | Commands::Config { .. } => {
            unreachable!() // Handled above
        }
    }
}

fn handle_cite_command(command: CiteCommands, library: &Library, output: &Output) -> Result<()> {
    match command {
        CiteCommands::Book { book } => commands::cite::book(library, &book, output),
        CiteCommands::Section { id } => commands::cite::section(library, &id, output),
        CiteCommands::Note { id } => commands::cite::note(library, &id, output),
    }
}

fn handle_authors_command(
    command: AuthorsCommands,
    library: &Library,
    output: &Output,
) -> Result<()> {
    match command {
        AuthorsCommands::Note { id } => commands::authors::note(library, &id, output),
        AuthorsCommands::Section { id } => commands::authors::section(library, &id, output),
        AuthorsCommands::Term { id } => commands::authors::term(library, &id, output),
    }
}

/// Open the catalogue and read it into memory
fn open_library(config: &Config, db: Option<&Path>) -> Result<Library> {
    let path = match db {
        Some(db) => db.to_path_buf(),
        None => config.database_path(),
    };
    debug!("Opening catalogue {:?}", path);

    let catalogue = SqliteCatalogue::open_path(&path).map_err(with_suggestion)?;
    catalogue.load().map_err(with_suggestion)
}

/// Append the recovery suggestion, if any, to a storage error
fn with_suggestion(error: StorageError) -> anyhow::Error {
    match error.recovery_suggestion() {
        Some(suggestion) => anyhow::anyhow!("{}\n{}", error, suggestion),
        None => anyhow::Error::new(error),
    }
}

/// Initialize logging from the configured level
///
/// Logs go to stderr, or to `log_file` when one is configured.
fn init_logging(config: &Config) {
    let level = &config.log_level;
    let env_filter = EnvFilter::try_new(format!(
        "bookmarker_core={},bookmarker_cli={}",
        level, level
    ))
    .unwrap_or_else(|_| EnvFilter::new("bookmarker_core=warn,bookmarker_cli=warn"));

    match &config.log_file {
        Some(log_path) => {
            let log_file = match File::options().create(true).append(true).open(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
                    return;
                }
            };
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(log_file)
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
