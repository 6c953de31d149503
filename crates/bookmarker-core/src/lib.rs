//! Bookmarker Core Library
//!
//! This crate provides the core functionality for Bookmarker, a reading
//! notebook that files quotes and vocabulary against pages of books.
//!
//! # Architecture
//!
//! - **SQLite**: the catalogue of authors, books, sections, notes and tags
//! - **Library**: an in-memory snapshot of the catalogue
//!
//! Section membership and default authorship are never stored; they are
//! derived from the snapshot whenever they are asked for.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let library = SqliteCatalogue::open(&config)?.load()?;
//!
//! let page = parse_page_token("xiv")?;
//! let section = library.resolve_section(book.id, page);
//! let citation = format_citation(&library, CitationEntry::Book(book));
//! ```
//!
//! # Modules
//!
//! - `page`: roman/decimal page references
//! - `section`: which section a page falls in
//! - `authors`: default authorship
//! - `citation`: bibliography and in-text citations
//! - `outline`: table-of-contents parsing
//! - `library`: the catalogue snapshot
//! - `storage`: SQLite loading
//! - `config`: Application configuration

pub mod authors;
pub mod citation;
pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod outline;
pub mod page;
pub mod section;
pub mod storage;

pub use authors::{AuthorMode, AuthorSelection};
pub use citation::{bibliography, format_citation, note_citation, BibliographyEntry, CitationEntry};
pub use config::Config;
pub use error::{OutlineError, PageError, SectionChoiceError};
pub use library::{Artefact, Library, Misfiled};
pub use models::{Author, AuthorSet, Book, BookDetails, Note, PageArtefact, Section, Tag, TermOccurrence};
pub use outline::{parse_outline, OutlineEntry};
pub use page::{parse_page_token, PageReference};
pub use storage::{SqliteCatalogue, StorageError, StorageResult};
