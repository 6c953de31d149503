//! Default authorship
//!
//! Sections, notes and term occurrences inherit their authors unless the
//! user picks them explicitly. The fallback chain is:
//!
//! 1. the artefact's section, if it is filed under one;
//! 2. otherwise the book's default authors;
//! 3. otherwise nobody (publications have no defaults).
//!
//! Whether an artefact "has default authors" is always answered against the
//! current state of its section and book, never stored.

use serde::Serialize;

use crate::models::{AuthorSet, Book, PageArtefact, Section};

/// How the authors of an artefact are chosen on an edit form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorMode {
    /// Inherit from the section or book
    Default,
    /// Use an explicit list
    Custom,
    /// No authors at all
    None,
}

impl std::fmt::Display for AuthorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuthorMode::Default => "default",
            AuthorMode::Custom => "custom",
            AuthorMode::None => "none",
        };
        write!(f, "{}", name)
    }
}

/// What an edit form should preselect for an artefact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSelection {
    pub mode: AuthorMode,
    /// Only filled in for [`AuthorMode::Custom`]
    pub authors: AuthorSet,
}

/// The authors an artefact would inherit right now
///
/// `section` is the section the artefact is filed under. Pass `None` for
/// sections themselves, whose parent is the book.
pub fn default_authors(book: &Book, section: Option<&Section>) -> AuthorSet {
    match section {
        Some(section) => section.authors.clone(),
        None => book.default_authors(),
    }
}

/// The author set to store for an artefact given the chosen mode
pub fn resolve_authors(
    book: &Book,
    section: Option<&Section>,
    mode: AuthorMode,
    explicit: &AuthorSet,
) -> AuthorSet {
    match mode {
        AuthorMode::Custom => explicit.clone(),
        AuthorMode::None => AuthorSet::new(),
        AuthorMode::Default => default_authors(book, section),
    }
}

/// Whether the artefact's authors are exactly what it would inherit now
pub fn has_default_authors<A>(artefact: &A, book: &Book, section: Option<&Section>) -> bool
where
    A: PageArtefact + ?Sized,
{
    *artefact.authors() == default_authors(book, section)
}

/// Work out which mode to preselect when editing an artefact
pub fn author_selection<A>(artefact: &A, book: &Book, section: Option<&Section>) -> AuthorSelection
where
    A: PageArtefact + ?Sized,
{
    let authors = artefact.authors();
    if authors.is_empty() {
        AuthorSelection {
            mode: AuthorMode::None,
            authors: AuthorSet::new(),
        }
    } else if has_default_authors(artefact, book, section) {
        AuthorSelection {
            mode: AuthorMode::Default,
            authors: AuthorSet::new(),
        }
    } else {
        AuthorSelection {
            mode: AuthorMode::Custom,
            authors: authors.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookDetails, Note};
    use crate::page::parse_page_token;
    use uuid::Uuid;

    fn set(ids: &[Uuid]) -> AuthorSet {
        ids.iter().copied().collect()
    }

    struct Fixture {
        book: Book,
        section: Section,
        a: Uuid,
        b: Uuid,
        c: Uuid,
        editor: Uuid,
    }

    fn fixture() -> Fixture {
        let (a, b, c, editor) = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let mut details = BookDetails::default();
        details.default_authors.insert(editor);
        let book = Book::new("Essays").with_details(details);
        let mut section = Section::new(book.id, "First Essay", parse_page_token("1").unwrap());
        section.authors = set(&[a, b]);
        Fixture {
            book,
            section,
            a,
            b,
            c,
            editor,
        }
    }

    #[test]
    fn test_resolve_modes() {
        let f = fixture();
        let explicit = set(&[f.c]);

        assert_eq!(
            resolve_authors(&f.book, Some(&f.section), AuthorMode::Default, &explicit),
            set(&[f.a, f.b])
        );
        assert_eq!(
            resolve_authors(&f.book, Some(&f.section), AuthorMode::Custom, &explicit),
            set(&[f.c])
        );
        assert!(resolve_authors(&f.book, Some(&f.section), AuthorMode::None, &explicit).is_empty());
    }

    #[test]
    fn test_default_falls_back_to_book() {
        let f = fixture();
        assert_eq!(
            resolve_authors(&f.book, None, AuthorMode::Default, &AuthorSet::new()),
            set(&[f.editor])
        );

        let publication = Book::new("Jacobin");
        assert!(resolve_authors(&publication, None, AuthorMode::Default, &AuthorSet::new()).is_empty());
    }

    #[test]
    fn test_has_default_authors_tracks_section_edits() {
        let mut f = fixture();
        let mut note = Note::new(f.book.id, "Subject", parse_page_token("3").unwrap());
        note.section_id = Some(f.section.id);
        note.authors = resolve_authors(
            &f.book,
            Some(&f.section),
            AuthorMode::Default,
            &AuthorSet::new(),
        );
        assert!(has_default_authors(&note, &f.book, Some(&f.section)));

        // The section's authors change after the note was saved
        f.section.authors = set(&[f.a]);
        assert!(!has_default_authors(&note, &f.book, Some(&f.section)));

        // ...and changing back makes the note default again
        f.section.authors = set(&[f.b, f.a]);
        assert!(has_default_authors(&note, &f.book, Some(&f.section)));
    }

    #[test]
    fn test_section_default_authors() {
        let f = fixture();
        let mut section = f.section.clone();
        assert!(!has_default_authors(&section, &f.book, None));

        section.authors = set(&[f.editor]);
        assert!(has_default_authors(&section, &f.book, None));
    }

    #[test]
    fn test_unsectioned_publication_note() {
        let publication = Book::new("Jacobin");
        let mut note = Note::new(publication.id, "Subject", parse_page_token("3").unwrap());
        assert!(has_default_authors(&note, &publication, None));

        note.authors.insert(Uuid::new_v4());
        assert!(!has_default_authors(&note, &publication, None));
    }

    #[test]
    fn test_author_selection() {
        let f = fixture();
        let mut note = Note::new(f.book.id, "Subject", parse_page_token("3").unwrap());
        note.section_id = Some(f.section.id);

        let selection = author_selection(&note, &f.book, Some(&f.section));
        assert_eq!(selection.mode, AuthorMode::None);

        note.authors = set(&[f.a, f.b]);
        let selection = author_selection(&note, &f.book, Some(&f.section));
        assert_eq!(selection.mode, AuthorMode::Default);
        assert!(selection.authors.is_empty());

        note.authors = set(&[f.c]);
        let selection = author_selection(&note, &f.book, Some(&f.section));
        assert_eq!(selection.mode, AuthorMode::Custom);
        assert_eq!(selection.authors, set(&[f.c]));
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(AuthorMode::Default.to_string(), "default");
        assert_eq!(AuthorMode::Custom.to_string(), "custom");
        assert_eq!(AuthorMode::None.to_string(), "none");
        assert_eq!(serde_json::to_string(&AuthorMode::Custom).unwrap(), "\"custom\"");
    }
}
