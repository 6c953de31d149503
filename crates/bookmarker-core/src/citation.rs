//! Citation formatting
//!
//! Renders reference-list citations for books and sections, short in-text
//! citations for notes, and per-tag bibliographies.
//!
//! Names are split on whitespace: the first token gives the initial and the
//! remaining tokens form the last name. Multi-word first names, particles
//! and honorifics are not treated specially.
//!
//! ```text
//! Streeck, W. (2016). _How will capitalism end?_. Verso.
//! Gandy, O. (2009). Rational discrimination. In Smith, J. (ed.) _Coming to terms with chance._ Ashgate, pp. 55-76
//! (Streeck, 2016, p.12)
//! ```

use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;

use crate::library::Library;
use crate::models::{AuthorSet, Book, PageArtefact, Section};

/// Placeholder for an unknown year
const UNKNOWN_YEAR: &str = "????";

/// Placeholder for an unknown end page
const UNKNOWN_PAGE: &str = "?";

/// Something that can be cited on its own
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CitationEntry<'a> {
    Book(&'a Book),
    Section(&'a Section),
}

/// What a bibliography line points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum CitedEntry {
    Book(Uuid),
    Section(Uuid),
}

/// One line of a bibliography
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BibliographyEntry {
    pub citation: String,
    pub entry: CitedEntry,
}

/// `Last, I.` form of a name
pub fn citation_name(name: &str) -> String {
    let mut tokens = name.split_whitespace();
    let Some(first) = tokens.next() else {
        return String::new();
    };
    let last = tokens.collect::<Vec<_>>().join(" ");
    match first.chars().next() {
        Some(initial) => format!("{}, {}.", last, initial),
        None => last,
    }
}

/// Everything after the first token of a name
pub fn last_name(name: &str) -> String {
    name.split_whitespace().skip(1).collect::<Vec<_>>().join(" ")
}

/// Join names: `A`, `A and B`, `A, B and C`, or `A et al`
///
/// An empty list renders as `?`.
pub fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    match names {
        [] => "?".to_string(),
        [a] => a.as_ref().to_string(),
        [a, b] => format!("{} and {}", a.as_ref(), b.as_ref()),
        [a, b, c] => format!("{}, {} and {}", a.as_ref(), b.as_ref(), c.as_ref()),
        [a, ..] => format!("{} et al", a.as_ref()),
    }
}

/// Render a citation for a book or section
///
/// Returns `None` when there is nothing worth citing, e.g. a publication
/// cited directly rather than through one of its sections.
pub fn format_citation(library: &Library, entry: CitationEntry<'_>) -> Option<String> {
    match entry {
        CitationEntry::Book(book) => book_citation(library, book),
        CitationEntry::Section(section) => section_citation(library, section),
    }
}

/// Short in-text citation for a note (or any page artefact)
pub fn note_citation<A: PageArtefact + ?Sized>(library: &Library, artefact: &A) -> String {
    let names: Vec<String> = library
        .authors_of(artefact.authors())
        .iter()
        .map(|a| last_name(&a.name))
        .collect();

    let year = match library.book(artefact.book_id()) {
        Some(Book {
            details: Some(details),
            ..
        }) => details.year.map(|y| y.to_string()),
        _ => library
            .section_of(artefact)
            .and_then(|s| s.date)
            .map(|d| d.format("%Y").to_string()),
    };

    format!(
        "({}, {}, p.{})",
        join_names(&names),
        year.as_deref().unwrap_or(UNKNOWN_YEAR),
        artefact.page().display()
    )
}

/// Citations for everything a tag's notes come from, sorted by text
///
/// Sectioned notes cite their section, unless the section carries the
/// book's default authors, in which case the whole book is cited.
pub fn bibliography(library: &Library, tag: &str) -> Vec<BibliographyEntry> {
    let mut cited = BTreeSet::new();
    for note in library.notes_tagged(tag) {
        let entry = match library.section_of(note) {
            Some(section) => {
                let collapses = library
                    .book(section.book_id)
                    .and_then(|b| b.details.as_ref())
                    .is_some_and(|d| d.default_authors == section.authors);
                if collapses {
                    CitedEntry::Book(section.book_id)
                } else {
                    CitedEntry::Section(section.id)
                }
            }
            None => CitedEntry::Book(note.book_id),
        };
        cited.insert(entry);
    }

    let mut entries: Vec<BibliographyEntry> = cited
        .into_iter()
        .filter_map(|entry| {
            let citation = match entry {
                CitedEntry::Book(id) => library
                    .book(id)
                    .and_then(|b| format_citation(library, CitationEntry::Book(b))),
                CitedEntry::Section(id) => library
                    .section(id)
                    .and_then(|s| format_citation(library, CitationEntry::Section(s))),
            }?;
            Some(BibliographyEntry { citation, entry })
        })
        .collect();
    entries.sort_by(|a, b| a.citation.cmp(&b.citation));
    entries
}

fn full_names(library: &Library, ids: &AuthorSet) -> String {
    let names: Vec<String> = library
        .authors_of(ids)
        .iter()
        .map(|a| citation_name(&a.name))
        .collect();
    join_names(&names)
}

fn year_text(year: Option<i32>) -> String {
    year.map(|y| y.to_string())
        .unwrap_or_else(|| UNKNOWN_YEAR.to_string())
}

/// The section's source URL, prefixed with `separator`
fn url_ending(section: &Section, separator: &str) -> String {
    match section.source_url.as_deref() {
        Some(url) if !url.is_empty() => format!("{}{}", separator, url),
        _ => String::new(),
    }
}

fn book_citation(library: &Library, book: &Book) -> Option<String> {
    let details = book.details.as_ref()?;
    let publisher = details.publisher.as_deref().unwrap_or("");
    let year = year_text(details.year);

    if details.is_periodical() {
        // A periodical's name is recorded as its first default author
        let title = library
            .authors_of(&details.default_authors)
            .first()
            .map(|a| a.name.clone())
            .unwrap_or_default();
        return Some(format!("({}). _{}_. {}.", year, title, publisher));
    }

    Some(format!(
        "{} ({}). _{}_. {}.",
        full_names(library, &details.default_authors),
        year,
        book.title,
        publisher
    ))
}

fn section_citation(library: &Library, section: &Section) -> Option<String> {
    let book = library.book(section.book_id)?;
    let section_authors = full_names(library, &section.authors);
    let date = match section.date {
        Some(date) => date.format("%Y, %B %d").to_string(),
        None => year_text(book.details.as_ref().and_then(|d| d.year)),
    };

    let Some(details) = book.details.as_ref() else {
        // Article in a publication
        return Some(format!(
            "{} ({}). {}. _{}._{}",
            section_authors,
            date,
            section.title,
            book.title,
            url_ending(section, " ")
        ));
    };

    if details.is_periodical() {
        return Some(format!(
            "{} ({}). {}. {}{}",
            section_authors,
            date,
            section.title,
            details.issue_number.unwrap_or_default(),
            url_ending(section, "")
        ));
    }

    if !details.is_edited && section.authors == details.default_authors {
        return book_citation(library, book);
    }

    let mut container = format!("In {}", full_names(library, &details.default_authors));
    if details.is_edited {
        let suffix = if details.default_authors.len() > 1 {
            " (eds.)"
        } else {
            " (ed.)"
        };
        container.push_str(suffix);
    }
    container.push(' ');

    let end = library
        .end_page(section)
        .map(|p| p.display())
        .unwrap_or_else(|| UNKNOWN_PAGE.to_string());

    Some(format!(
        "{} ({}). {}. {}_{}._ {}, pp. {}-{}",
        section_authors,
        date,
        section.title,
        container,
        book.title,
        details.publisher.as_deref().unwrap_or(""),
        section.page.display(),
        end
    ))
}
