//! Citation command handlers

use anyhow::{bail, Result};

use bookmarker_core::citation::CitedEntry;
use bookmarker_core::{
    bibliography, format_citation, note_citation, Book, CitationEntry, Library,
};

use crate::commands::{find_book, match_id};
use crate::output::{Output, OutputFormat};

/// Number of authors listed under a bibliography
const TOP_AUTHORS: usize = 5;

/// Cite a book by slug or id
pub fn book(library: &Library, key: &str, output: &Output) -> Result<()> {
    let (book, citation) = book_citation(library, key)?;
    match citation {
        Some(citation) => print_citation(&citation, output),
        None => {
            output.message(&format!(
                "'{}' is a publication; cite one of its sections instead.",
                book.title
            ));
            Ok(())
        }
    }
}

/// Cite a section by id or id prefix
pub fn section(library: &Library, id: &str, output: &Output) -> Result<()> {
    print_citation(&section_citation(library, id)?, output)
}

/// In-text citation for a note
pub fn note(library: &Library, id: &str, output: &Output) -> Result<()> {
    print_citation(&note_citation_for(library, id)?, output)
}

/// The citation is `None` for publications, which have no citation of their own
fn book_citation<'a>(library: &'a Library, key: &str) -> Result<(&'a Book, Option<String>)> {
    let book = find_book(library, key)?;
    Ok((book, format_citation(library, CitationEntry::Book(book))))
}

fn section_citation(library: &Library, id: &str) -> Result<String> {
    let id = match_id(
        "section",
        id,
        library.sections().map(|s| (s.id, s.title.as_str())),
    )?;
    let Some(section) = library.section(id) else {
        bail!("Section not found: {}", id);
    };

    match format_citation(library, CitationEntry::Section(section)) {
        Some(citation) => Ok(citation),
        None => bail!("Section {} belongs to an unknown book", section.id),
    }
}

fn note_citation_for(library: &Library, id: &str) -> Result<String> {
    let id = match_id(
        "note",
        id,
        library.notes().iter().map(|n| (n.id, n.subject.as_str())),
    )?;
    let Some(note) = library.note(id) else {
        bail!("Note not found: {}", id);
    };
    Ok(note_citation(library, note))
}

/// Bibliography of everything a tag's notes cite
pub fn bibliography_for_tag(library: &Library, tag: &str, output: &Output) -> Result<()> {
    let entries = bibliography(library, tag);

    match output.format {
        OutputFormat::Json => output.json(&entries)?,
        OutputFormat::Quiet => {
            for entry in &entries {
                println!("{}", entry.citation);
            }
        }
        OutputFormat::Human => {
            if entries.is_empty() {
                println!("No citations for tag '{}'.", tag);
                return Ok(());
            }
            let heading = match library.tag(tag) {
                Some(tag) if !tag.description.is_empty() => {
                    format!("{} - {}", tag, tag.description)
                }
                Some(tag) => tag.to_string(),
                None => tag.to_string(),
            };
            println!("Bibliography: {}", heading);
            println!();
            for entry in &entries {
                let marker = match entry.entry {
                    CitedEntry::Book(_) => "B",
                    CitedEntry::Section(_) => "S",
                };
                println!("[{}] {}", marker, entry.citation);
            }

            let authors = library.tag_authors(tag, TOP_AUTHORS);
            if !authors.is_empty() {
                println!();
                println!("Most quoted:");
                for (author, count) in authors {
                    println!("  {} ({})", author.name, count);
                }
            }
            println!("\n{} citation(s)", entries.len());
        }
    }

    Ok(())
}

fn print_citation(citation: &str, output: &Output) -> Result<()> {
    match output.format {
        OutputFormat::Json => output.json(&serde_json::json!({ "citation": citation })),
        OutputFormat::Human | OutputFormat::Quiet => {
            println!("{}", citation);
            Ok(())
        }
    }
}
