//! Section check command handler
//!
//! An artefact's section is worked out when it is saved. Editing a
//! section's start page afterwards can leave artefacts filed under a
//! section their page no longer falls in; this lists them.

use anyhow::Result;

use bookmarker_core::{Library, Misfiled, PageArtefact};

use crate::output::{short_id, truncate, Output, OutputFormat};

/// Report misfiled notes and term occurrences
pub fn sections(library: &Library, output: &Output) -> Result<()> {
    let misfiled = library.misfiled_artefacts();

    match output.format {
        OutputFormat::Json => {
            let json: Vec<_> = misfiled.iter().map(misfiled_json).collect();
            output.json(&json)?;
        }
        OutputFormat::Quiet => {
            for entry in &misfiled {
                println!("{}", entry.artefact.id());
            }
        }
        OutputFormat::Human => {
            if misfiled.is_empty() {
                output.success("Every note and term is filed under the section its page falls in");
                return Ok(());
            }
            for entry in &misfiled {
                println!(
                    "{} {} | p.{:<6} | {} | filed under {} | page is in {}",
                    entry.artefact.kind(),
                    short_id(&entry.artefact.id()),
                    entry.artefact.page().display(),
                    truncate(entry.artefact.label(), 30),
                    section_title(entry.filed_under.map(|s| s.title.as_str())),
                    section_title(entry.resolves_to.map(|s| s.title.as_str())),
                );
            }
            println!("\n{} misfiled artefact(s)", misfiled.len());
        }
    }

    Ok(())
}

fn section_title(title: Option<&str>) -> String {
    match title {
        Some(title) => format!("'{}'", truncate(title, 30)),
        None => "(no section)".to_string(),
    }
}

fn misfiled_json(entry: &Misfiled<'_>) -> serde_json::Value {
    serde_json::json!({
        "kind": entry.artefact.kind(),
        "id": entry.artefact.id(),
        "label": entry.artefact.label(),
        "page": entry.artefact.page().display(),
        "filed_under": entry.filed_under.map(|s| s.id),
        "resolves_to": entry.resolves_to.map(|s| s.id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmarker_core::{parse_page_token, Book, Note, Section};

    #[test]
    fn test_misfiled_json() {
        let mut library = Library::new();
        let book = Book::new("Capital");
        let one = Section::new(book.id, "One", parse_page_token("1").unwrap());
        let two = Section::new(book.id, "Two", parse_page_token("20").unwrap());
        let mut note = Note::new(book.id, "Moved", parse_page_token("25").unwrap());
        note.section_id = Some(one.id);
        let (one_id, two_id) = (one.id, two.id);

        library.add_book(book);
        library.add_section(one);
        library.add_section(two);
        library.add_note(note);

        let misfiled = library.misfiled_artefacts();
        assert_eq!(misfiled.len(), 1);
        let json = misfiled_json(&misfiled[0]);
        assert_eq!(json["kind"], "note");
        assert_eq!(json["page"], "25");
        assert_eq!(json["filed_under"], serde_json::json!(one_id));
        assert_eq!(json["resolves_to"], serde_json::json!(two_id));

        let output = Output::new(OutputFormat::Quiet);
        assert!(sections(&library, &output).is_ok());
    }

    #[test]
    fn test_section_title() {
        assert_eq!(section_title(None), "(no section)");
        assert_eq!(section_title(Some("Preface")), "'Preface'");
    }
}
