//! SQLite schema for the catalogue
//!
//! Pages are stored as two columns, `page_number` and `in_preface`, so that
//! front matter sorts before the body with a plain `ORDER BY`.

use rusqlite::{Connection, Result};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS authors (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            link TEXT
        );

        CREATE TABLE IF NOT EXISTS books (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            slug TEXT UNIQUE NOT NULL,
            source_url TEXT
        );

        -- Present for traditional books and periodicals, absent for publications
        CREATE TABLE IF NOT EXISTS book_details (
            book_id TEXT PRIMARY KEY,
            year INTEGER,
            publisher TEXT,
            issue_number INTEGER,
            num_pages INTEGER,
            has_pages INTEGER NOT NULL DEFAULT 1,
            is_edited INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS book_authors (
            book_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            PRIMARY KEY (book_id, author_id),
            FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
            FOREIGN KEY (author_id) REFERENCES authors(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS book_default_authors (
            book_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            PRIMARY KEY (book_id, author_id),
            FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
            FOREIGN KEY (author_id) REFERENCES authors(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS sections (
            id TEXT PRIMARY KEY,
            book_id TEXT NOT NULL,
            page_number INTEGER NOT NULL,
            in_preface INTEGER NOT NULL DEFAULT 0,
            number INTEGER,
            title TEXT NOT NULL,
            subtitle TEXT,
            source_url TEXT,
            related_to TEXT,
            date TEXT,
            skipped INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
            FOREIGN KEY (related_to) REFERENCES sections(id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS section_authors (
            section_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            PRIMARY KEY (section_id, author_id),
            FOREIGN KEY (section_id) REFERENCES sections(id) ON DELETE CASCADE,
            FOREIGN KEY (author_id) REFERENCES authors(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY,
            book_id TEXT NOT NULL,
            section_id TEXT,
            page_number INTEGER NOT NULL,
            in_preface INTEGER NOT NULL DEFAULT 0,
            subject TEXT NOT NULL,
            quote TEXT NOT NULL DEFAULT '',
            comment TEXT,
            FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
            FOREIGN KEY (section_id) REFERENCES sections(id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS note_authors (
            note_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            PRIMARY KEY (note_id, author_id),
            FOREIGN KEY (note_id) REFERENCES notes(id) ON DELETE CASCADE,
            FOREIGN KEY (author_id) REFERENCES authors(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS tag_categories (
            slug TEXT PRIMARY KEY,
            colour TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS tags (
            slug TEXT PRIMARY KEY,
            description TEXT NOT NULL DEFAULT '',
            faved INTEGER NOT NULL DEFAULT 0,
            category_slug TEXT,
            FOREIGN KEY (category_slug) REFERENCES tag_categories(slug) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS note_tags (
            note_id TEXT NOT NULL,
            tag_slug TEXT NOT NULL,
            PRIMARY KEY (note_id, tag_slug),
            FOREIGN KEY (note_id) REFERENCES notes(id) ON DELETE CASCADE,
            FOREIGN KEY (tag_slug) REFERENCES tags(slug) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS term_occurrences (
            id TEXT PRIMARY KEY,
            book_id TEXT NOT NULL,
            section_id TEXT,
            page_number INTEGER NOT NULL,
            in_preface INTEGER NOT NULL DEFAULT 0,
            term TEXT NOT NULL,
            quote TEXT NOT NULL DEFAULT '',
            FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
            FOREIGN KEY (section_id) REFERENCES sections(id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS term_occurrence_authors (
            term_occurrence_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            PRIMARY KEY (term_occurrence_id, author_id),
            FOREIGN KEY (term_occurrence_id) REFERENCES term_occurrences(id) ON DELETE CASCADE,
            FOREIGN KEY (author_id) REFERENCES authors(id) ON DELETE CASCADE
        );

        -- Section resolution reads a book's sections in page order
        CREATE INDEX IF NOT EXISTS idx_sections_book_page
            ON sections(book_id, in_preface, page_number);
        CREATE INDEX IF NOT EXISTS idx_notes_book ON notes(book_id);
        CREATE INDEX IF NOT EXISTS idx_term_occurrences_book ON term_occurrences(book_id);
        CREATE INDEX IF NOT EXISTS idx_note_tags_tag ON note_tags(tag_slug);
        "#,
    )?;

    // Set schema version
    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<Option<i32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_info WHERE key = 'version'")?;
    let result: Result<String> = stmt.query_row([], |row| row.get(0));

    match result {
        Ok(version_str) => Ok(version_str.parse().ok()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Check if schema needs initialization or migration
pub fn needs_init(conn: &Connection) -> bool {
    let table_exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_info'")
        .and_then(|mut stmt| stmt.exists([]))
        .unwrap_or(false);

    if !table_exists {
        return true;
    }

    match get_schema_version(conn) {
        Ok(Some(v)) => v < SCHEMA_VERSION,
        _ => true,
    }
}
