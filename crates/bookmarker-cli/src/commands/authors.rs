//! Authors command handlers
//!
//! Shows an artefact's authors next to the ones it would inherit, and the
//! author mode an edit form would preselect.

use anyhow::{bail, Result};

use bookmarker_core::{Library, PageArtefact};

use crate::commands::match_id;
use crate::output::{author_names, Output, OutputFormat};

/// Authorship of a note
pub fn note(library: &Library, id: &str, output: &Output) -> Result<()> {
    let id = match_id(
        "note",
        id,
        library.notes().iter().map(|n| (n.id, n.subject.as_str())),
    )?;
    let Some(note) = library.note(id) else {
        bail!("Note not found: {}", id);
    };
    show(library, note, &note.subject, output)
}

/// Authorship of a section (defaults come from its book)
pub fn section(library: &Library, id: &str, output: &Output) -> Result<()> {
    let id = match_id(
        "section",
        id,
        library.sections().map(|s| (s.id, s.title.as_str())),
    )?;
    let Some(section) = library.section(id) else {
        bail!("Section not found: {}", id);
    };
    show(library, section, &section.title, output)
}

/// Authorship of a term occurrence
pub fn term(library: &Library, id: &str, output: &Output) -> Result<()> {
    let id = match_id(
        "term",
        id,
        library.terms().iter().map(|t| (t.id, t.term.as_str())),
    )?;
    let Some(term) = library.term(id) else {
        bail!("Term occurrence not found: {}", id);
    };
    show(library, term, &term.term, output)
}

fn show<A: PageArtefact + ?Sized>(
    library: &Library,
    artefact: &A,
    label: &str,
    output: &Output,
) -> Result<()> {
    let Some(selection) = library.author_selection(artefact) else {
        bail!("'{}' belongs to an unknown book", label);
    };
    let defaults = library.default_authors_for(artefact);
    let is_default = library.has_default_authors(artefact);

    match output.format {
        OutputFormat::Json => {
            output.json(&serde_json::json!({
                "authors": artefact.authors(),
                "default_authors": defaults,
                "has_default_authors": is_default,
                "mode": selection.mode,
            }))?;
        }
        OutputFormat::Quiet => {
            println!("{}", selection.mode);
        }
        OutputFormat::Human => {
            let inherited_from = match library.section_of(artefact) {
                Some(section) => format!("section '{}'", section.title),
                None => "book".to_string(),
            };
            println!("{}", label);
            println!(
                "  Authors:  {}",
                author_names(&library.authors_of(artefact.authors()))
            );
            println!(
                "  Defaults: {} (from {})",
                author_names(&library.authors_of(&defaults)),
                inherited_from
            );
            println!("  Mode:     {}", selection.mode);
        }
    }

    Ok(())
}
