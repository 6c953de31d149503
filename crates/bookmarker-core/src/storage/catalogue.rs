//! SQLite catalogue loader
//!
//! Reads the whole catalogue into a [`Library`] snapshot. The loader never
//! writes records; it only creates the schema in a database that has none.
//!
//! Rows with malformed values (bad ids, non-positive pages, unparseable
//! dates) fail the load with [`StorageError::InvalidRow`]. Rows pointing at
//! a book that doesn't exist are skipped with a warning.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::library::Library;
use crate::models::{
    Author, AuthorSet, Book, BookDetails, Note, Section, Tag, TagCategory, TermOccurrence,
};
use crate::page::PageReference;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::schema::{get_schema_version, init_schema, needs_init, SCHEMA_VERSION};

/// Section dates are stored as ISO dates
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A catalogue database
pub struct SqliteCatalogue {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteCatalogue {
    /// Open the database named by the configuration
    pub fn open(config: &Config) -> StorageResult<Self> {
        Self::open_path(&config.database_path())
    }

    /// Open an existing database file
    pub fn open_path(path: &Path) -> StorageResult<Self> {
        std::fs::metadata(path).map_err(|e| StorageError::from_io(e, path.to_path_buf()))?;

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        if let Ok(Some(found)) = get_schema_version(&conn) {
            if found > SCHEMA_VERSION {
                return Err(StorageError::UnsupportedSchema {
                    found,
                    supported: SCHEMA_VERSION,
                });
            }
        }

        if needs_init(&conn) {
            debug!("Initializing schema in {:?}", path);
            init_schema(&conn)?;
        }

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// The database file, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the whole catalogue
    pub fn load(&self) -> StorageResult<Library> {
        let mut library = Library::new();

        for author in self.load_authors()? {
            library.add_author(author);
        }
        for book in self.load_books()? {
            library.add_book(book);
        }
        for section in self.load_sections()? {
            if library.book(section.book_id).is_none() {
                warn!("Skipping section {}: unknown book {}", section.id, section.book_id);
                continue;
            }
            library.add_section(section);
        }
        for tag in self.load_tags()? {
            library.add_tag(tag);
        }
        for note in self.load_notes()? {
            if library.book(note.book_id).is_none() {
                warn!("Skipping note {}: unknown book {}", note.id, note.book_id);
                continue;
            }
            library.add_note(note);
        }
        for term in self.load_terms()? {
            if library.book(term.book_id).is_none() {
                warn!("Skipping term occurrence {}: unknown book {}", term.id, term.book_id);
                continue;
            }
            library.add_term(term);
        }

        info!(
            "Loaded catalogue: {} books, {} sections, {} notes, {} term occurrences",
            library.books().len(),
            library.sections().count(),
            library.notes().len(),
            library.terms().len()
        );
        Ok(library)
    }

    // ==================== Private helpers ====================

    fn load_authors(&self) -> StorageResult<Vec<Author>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, slug, link FROM authors ORDER BY name")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, name, slug, link)| {
                let mut author = Author::with_id(parse_id("authors", &id)?, name, slug);
                author.link = link;
                Ok(author)
            })
            .collect()
    }

    fn load_books(&self) -> StorageResult<Vec<Book>> {
        let authors = self.load_author_sets("book_authors", "book_id")?;
        let default_authors = self.load_author_sets("book_default_authors", "book_id")?;

        let mut stmt = self.conn.prepare(
            r#"
            SELECT b.id, b.title, b.slug, b.source_url,
                   d.book_id IS NOT NULL, d.year, d.publisher, d.issue_number,
                   d.num_pages, d.has_pages, d.is_edited
            FROM books b
            LEFT JOIN book_details d ON d.book_id = b.id
            ORDER BY b.title
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(BookRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    slug: row.get(2)?,
                    source_url: row.get(3)?,
                    has_details: row.get(4)?,
                    year: row.get(5)?,
                    publisher: row.get(6)?,
                    issue_number: row.get(7)?,
                    num_pages: row.get(8)?,
                    has_pages: row.get(9)?,
                    is_edited: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|row| {
                let id = parse_id("books", &row.id)?;
                let details = if row.has_details {
                    Some(BookDetails {
                        year: row.year,
                        publisher: row.publisher,
                        issue_number: to_u32("books", &row.id, "issue_number", row.issue_number)?,
                        num_pages: to_u32("books", &row.id, "num_pages", row.num_pages)?,
                        has_pages: row.has_pages.unwrap_or(true),
                        is_edited: row.is_edited.unwrap_or(false),
                        authors: authors.get(&id).cloned().unwrap_or_default(),
                        default_authors: default_authors.get(&id).cloned().unwrap_or_default(),
                    })
                } else {
                    None
                };

                Ok(Book {
                    id,
                    title: row.title,
                    slug: row.slug,
                    source_url: row.source_url,
                    details,
                })
            })
            .collect()
    }

    /// Sections in reading order per book; same-page sections keep insertion order
    fn load_sections(&self) -> StorageResult<Vec<Section>> {
        let authors = self.load_author_sets("section_authors", "section_id")?;

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, book_id, page_number, in_preface, number, title, subtitle,
                   source_url, related_to, date, skipped
            FROM sections
            ORDER BY book_id, in_preface DESC, page_number, rowid
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(SectionRow {
                    id: row.get(0)?,
                    book_id: row.get(1)?,
                    page_number: row.get(2)?,
                    in_preface: row.get(3)?,
                    number: row.get(4)?,
                    title: row.get(5)?,
                    subtitle: row.get(6)?,
                    source_url: row.get(7)?,
                    related_to: row.get(8)?,
                    date: row.get(9)?,
                    skipped: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|row| {
                let id = parse_id("sections", &row.id)?;
                let date = row
                    .date
                    .as_deref()
                    .map(|d| {
                        NaiveDate::parse_from_str(d, DATE_FORMAT).map_err(|e| {
                            StorageError::invalid_row("sections", &row.id, format!("date '{}': {}", d, e))
                        })
                    })
                    .transpose()?;

                Ok(Section {
                    id,
                    book_id: parse_id("sections", &row.book_id)?,
                    page: page_from_columns("sections", &row.id, row.page_number, row.in_preface)?,
                    number: to_u32("sections", &row.id, "number", row.number)?,
                    title: row.title,
                    subtitle: row.subtitle,
                    authors: authors.get(&id).cloned().unwrap_or_default(),
                    source_url: row.source_url,
                    related_to: row
                        .related_to
                        .as_deref()
                        .map(|r| parse_id("sections", r))
                        .transpose()?,
                    date,
                    skipped: row.skipped,
                })
            })
            .collect()
    }

    fn load_notes(&self) -> StorageResult<Vec<Note>> {
        let authors = self.load_author_sets("note_authors", "note_id")?;
        let tags = self.load_note_tags()?;

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, book_id, section_id, page_number, in_preface, subject, quote, comment
            FROM notes
            ORDER BY book_id, in_preface DESC, page_number, rowid
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ArtefactRow {
                    id: row.get(0)?,
                    book_id: row.get(1)?,
                    section_id: row.get(2)?,
                    page_number: row.get(3)?,
                    in_preface: row.get(4)?,
                    label: row.get(5)?,
                    quote: row.get(6)?,
                    comment: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|row| {
                let base = row.parse("notes")?;
                Ok(Note {
                    id: base.id,
                    book_id: base.book_id,
                    section_id: base.section_id,
                    page: base.page,
                    subject: row.label,
                    quote: row.quote,
                    comment: row.comment,
                    authors: authors.get(&base.id).cloned().unwrap_or_default(),
                    tags: tags.get(&base.id).cloned().unwrap_or_default(),
                })
            })
            .collect()
    }

    fn load_terms(&self) -> StorageResult<Vec<TermOccurrence>> {
        let authors = self.load_author_sets("term_occurrence_authors", "term_occurrence_id")?;

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, book_id, section_id, page_number, in_preface, term, quote, NULL
            FROM term_occurrences
            ORDER BY book_id, in_preface DESC, page_number, rowid
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ArtefactRow {
                    id: row.get(0)?,
                    book_id: row.get(1)?,
                    section_id: row.get(2)?,
                    page_number: row.get(3)?,
                    in_preface: row.get(4)?,
                    label: row.get(5)?,
                    quote: row.get(6)?,
                    comment: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|row| {
                let base = row.parse("term_occurrences")?;
                Ok(TermOccurrence {
                    id: base.id,
                    book_id: base.book_id,
                    section_id: base.section_id,
                    page: base.page,
                    term: row.label,
                    quote: row.quote,
                    authors: authors.get(&base.id).cloned().unwrap_or_default(),
                })
            })
            .collect()
    }

    fn load_tags(&self) -> StorageResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT t.slug, t.description, t.faved, c.slug, c.colour
            FROM tags t
            LEFT JOIN tag_categories c ON c.slug = t.category_slug
            ORDER BY t.slug
            "#,
        )?;

        let tags = stmt
            .query_map([], |row| {
                let category_slug: Option<String> = row.get(3)?;
                let colour: Option<String> = row.get(4)?;
                Ok(Tag {
                    slug: row.get(0)?,
                    description: row.get(1)?,
                    faved: row.get(2)?,
                    category: category_slug.map(|slug| TagCategory {
                        slug,
                        colour: colour.unwrap_or_default(),
                    }),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn load_note_tags(&self) -> StorageResult<HashMap<Uuid, Vec<String>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT note_id, tag_slug FROM note_tags ORDER BY note_id, tag_slug")?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut tags: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (note_id, slug) in rows {
            tags.entry(parse_id("note_tags", &note_id)?)
                .or_default()
                .push(slug);
        }
        Ok(tags)
    }

    /// Load a `(owner, author_id)` join table into author sets keyed by owner
    fn load_author_sets(
        &self,
        table: &'static str,
        owner_column: &str,
    ) -> StorageResult<HashMap<Uuid, AuthorSet>> {
        let sql = format!("SELECT {}, author_id FROM {}", owner_column, table);
        let mut stmt = self.conn.prepare(&sql)?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut sets: HashMap<Uuid, AuthorSet> = HashMap::new();
        for (owner, author) in rows {
            sets.entry(parse_id(table, &owner)?)
                .or_default()
                .insert(parse_id(table, &author)?);
        }
        Ok(sets)
    }
}

// ==================== Internal structs ====================

struct BookRow {
    id: String,
    title: String,
    slug: String,
    source_url: Option<String>,
    has_details: bool,
    year: Option<i32>,
    publisher: Option<String>,
    issue_number: Option<i64>,
    num_pages: Option<i64>,
    has_pages: Option<bool>,
    is_edited: Option<bool>,
}

struct SectionRow {
    id: String,
    book_id: String,
    page_number: i64,
    in_preface: bool,
    number: Option<i64>,
    title: String,
    subtitle: Option<String>,
    source_url: Option<String>,
    related_to: Option<String>,
    date: Option<String>,
    skipped: bool,
}

/// Shared columns of notes and term occurrences
struct ArtefactRow {
    id: String,
    book_id: String,
    section_id: Option<String>,
    page_number: i64,
    in_preface: bool,
    /// Subject of a note, or the term
    label: String,
    quote: String,
    comment: Option<String>,
}

struct ArtefactKeys {
    id: Uuid,
    book_id: Uuid,
    section_id: Option<Uuid>,
    page: PageReference,
}

impl ArtefactRow {
    fn parse(&self, table: &'static str) -> StorageResult<ArtefactKeys> {
        Ok(ArtefactKeys {
            id: parse_id(table, &self.id)?,
            book_id: parse_id(table, &self.book_id)?,
            section_id: self
                .section_id
                .as_deref()
                .map(|s| parse_id(table, s))
                .transpose()?,
            page: page_from_columns(table, &self.id, self.page_number, self.in_preface)?,
        })
    }
}

fn parse_id(table: &'static str, id: &str) -> StorageResult<Uuid> {
    Uuid::parse_str(id).map_err(|e| StorageError::invalid_row(table, id, format!("invalid UUID: {}", e)))
}

fn page_from_columns(
    table: &'static str,
    id: &str,
    page_number: i64,
    in_preface: bool,
) -> StorageResult<PageReference> {
    let number = u32::try_from(page_number).map_err(|_| {
        StorageError::invalid_row(table, id, format!("page_number {} out of range", page_number))
    })?;
    PageReference::new(number, in_preface)
        .map_err(|e| StorageError::invalid_row(table, id, e.to_string()))
}

fn to_u32(
    table: &'static str,
    id: &str,
    column: &str,
    value: Option<i64>,
) -> StorageResult<Option<u32>> {
    value
        .map(|v| {
            u32::try_from(v).map_err(|_| {
                StorageError::invalid_row(table, id, format!("{} {} out of range", column, v))
            })
        })
        .transpose()
}
