//! In-memory catalogue snapshot
//!
//! A `Library` holds everything the resolvers need for one request: authors,
//! books with their sections, notes, term occurrences and tags. It is built
//! once (usually by [`crate::storage::SqliteCatalogue`]) and then only read.
//! Every derived answer (which section a page is in, whether an artefact has
//! default authors) is computed from the snapshot on demand.

use std::collections::HashMap;

use tracing::warn;
use uuid::Uuid;

use crate::authors::{self, AuthorSelection};
use crate::models::{Author, AuthorSet, Book, Note, PageArtefact, Section, Tag, TermOccurrence};
use crate::page::PageReference;
use crate::section;

/// A note or term occurrence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Artefact<'a> {
    Note(&'a Note),
    Term(&'a TermOccurrence),
}

impl<'a> Artefact<'a> {
    pub fn id(&self) -> Uuid {
        match self {
            Artefact::Note(note) => note.id,
            Artefact::Term(term) => term.id,
        }
    }

    /// "note" or "term"
    pub fn kind(&self) -> &'static str {
        match self {
            Artefact::Note(_) => "note",
            Artefact::Term(_) => "term",
        }
    }

    /// The note's subject or the term itself
    pub fn label(&self) -> &'a str {
        match self {
            Artefact::Note(note) => &note.subject,
            Artefact::Term(term) => &term.term,
        }
    }
}

impl PageArtefact for Artefact<'_> {
    fn page(&self) -> PageReference {
        match self {
            Artefact::Note(note) => note.page,
            Artefact::Term(term) => term.page,
        }
    }

    fn book_id(&self) -> Uuid {
        match self {
            Artefact::Note(note) => note.book_id,
            Artefact::Term(term) => term.book_id,
        }
    }

    fn authors(&self) -> &AuthorSet {
        match self {
            Artefact::Note(note) => &note.authors,
            Artefact::Term(term) => &term.authors,
        }
    }

    fn section_id(&self) -> Option<Uuid> {
        match self {
            Artefact::Note(note) => note.section_id,
            Artefact::Term(term) => term.section_id,
        }
    }
}

/// An artefact whose stored section no longer matches its page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Misfiled<'a> {
    pub artefact: Artefact<'a>,
    /// The section currently stored on the artefact
    pub filed_under: Option<&'a Section>,
    /// The section its page resolves to now
    pub resolves_to: Option<&'a Section>,
}

/// Read-only snapshot of the catalogue
#[derive(Debug, Default, Clone)]
pub struct Library {
    authors: HashMap<Uuid, Author>,
    books: Vec<Book>,
    sections: HashMap<Uuid, Vec<Section>>,
    notes: Vec<Note>,
    terms: Vec<TermOccurrence>,
    tags: Vec<Tag>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Assembly ====================

    pub fn add_author(&mut self, author: Author) {
        self.authors.insert(author.id, author);
    }

    pub fn add_book(&mut self, book: Book) {
        self.books.push(book);
    }

    /// Add a section; sections keep the order they were added in
    pub fn add_section(&mut self, section: Section) {
        self.sections.entry(section.book_id).or_default().push(section);
    }

    pub fn add_note(&mut self, note: Note) {
        self.notes.push(note);
    }

    pub fn add_term(&mut self, term: TermOccurrence) {
        self.terms.push(term);
    }

    pub fn add_tag(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    // ==================== Lookups ====================

    pub fn author(&self, id: Uuid) -> Option<&Author> {
        self.authors.get(&id)
    }

    /// Authors in a set, ordered by name
    ///
    /// Ids that aren't in the snapshot are skipped.
    pub fn authors_of(&self, ids: &AuthorSet) -> Vec<&Author> {
        let mut authors: Vec<&Author> = ids
            .iter()
            .filter_map(|id| {
                let author = self.authors.get(id);
                if author.is_none() {
                    warn!("Unknown author id {}", id);
                }
                author
            })
            .collect();
        authors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        authors
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn book(&self, id: Uuid) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn book_by_slug(&self, slug: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.slug == slug)
    }

    /// A book's sections, in the order they were added
    pub fn sections_of(&self, book_id: Uuid) -> &[Section] {
        self.sections
            .get(&book_id)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values().flatten()
    }

    pub fn section(&self, id: Uuid) -> Option<&Section> {
        self.sections().find(|s| s.id == id)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn terms(&self) -> &[TermOccurrence] {
        &self.terms
    }

    pub fn term(&self, id: Uuid) -> Option<&TermOccurrence> {
        self.terms.iter().find(|t| t.id == id)
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tag(&self, slug: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.slug == slug)
    }

    /// The section a `related_to` link points at, if it still exists
    pub fn related_section(&self, section: &Section) -> Option<&Section> {
        section.related_to.and_then(|id| self.section(id))
    }

    /// Sections in other books that link to this one
    pub fn sections_related_to(&self, section: &Section) -> Vec<&Section> {
        self.sections()
            .filter(|s| s.related_to == Some(section.id))
            .collect()
    }

    // ==================== Sections ====================

    /// The section of `book_id` that `page` falls in
    pub fn resolve_section(&self, book_id: Uuid, page: PageReference) -> Option<&Section> {
        section::resolve_section(self.sections_of(book_id), page)
    }

    /// The section an artefact is filed under
    pub fn section_of<A: PageArtefact + ?Sized>(&self, artefact: &A) -> Option<&Section> {
        artefact.section_id().and_then(|id| self.section(id))
    }

    pub fn next_section(&self, section: &Section) -> Option<&Section> {
        section::next_section(self.sections_of(section.book_id), section)
    }

    pub fn previous_section(&self, section: &Section) -> Option<&Section> {
        section::previous_section(self.sections_of(section.book_id), section)
    }

    /// The last page of a section, if it can be worked out
    pub fn end_page(&self, section: &Section) -> Option<PageReference> {
        let num_pages = self
            .book(section.book_id)
            .and_then(|b| b.details.as_ref())
            .and_then(|d| d.num_pages);
        section::end_page(self.sections_of(section.book_id), section, num_pages)
    }

    /// Notes and term occurrences filed under a section, in page order
    pub fn artefacts_in_section(&self, section_id: Uuid) -> Vec<Artefact<'_>> {
        let mut artefacts: Vec<Artefact<'_>> = self
            .notes
            .iter()
            .filter(|n| n.section_id == Some(section_id))
            .map(Artefact::Note)
            .chain(
                self.terms
                    .iter()
                    .filter(|t| t.section_id == Some(section_id))
                    .map(Artefact::Term),
            )
            .collect();
        artefacts.sort_by_key(|a| a.page());
        artefacts
    }

    /// Artefacts whose stored section differs from what their page resolves to
    ///
    /// Sections are only resolved when an artefact is saved, so moving a
    /// section's start page can leave existing artefacts filed under the
    /// wrong one. This reports them; nothing is reassigned.
    pub fn misfiled_artefacts(&self) -> Vec<Misfiled<'_>> {
        let artefacts = self
            .notes
            .iter()
            .map(Artefact::Note)
            .chain(self.terms.iter().map(Artefact::Term));

        let mut misfiled = Vec::new();
        for artefact in artefacts {
            let resolves_to = self.resolve_section(artefact.book_id(), artefact.page());
            let filed_under = self.section_of(&artefact);
            if resolves_to.map(|s| s.id) != artefact.section_id() {
                misfiled.push(Misfiled {
                    artefact,
                    filed_under,
                    resolves_to,
                });
            }
        }
        misfiled
    }

    // ==================== Authors ====================

    /// The authors an artefact would inherit right now
    pub fn default_authors_for<A: PageArtefact + ?Sized>(&self, artefact: &A) -> AuthorSet {
        match self.book(artefact.book_id()) {
            Some(book) => authors::default_authors(book, self.section_of(artefact)),
            None => AuthorSet::new(),
        }
    }

    pub fn has_default_authors<A: PageArtefact + ?Sized>(&self, artefact: &A) -> bool {
        *artefact.authors() == self.default_authors_for(artefact)
    }

    /// The author mode an edit form should preselect for an artefact
    pub fn author_selection<A: PageArtefact + ?Sized>(&self, artefact: &A) -> Option<AuthorSelection> {
        let book = self.book(artefact.book_id())?;
        Some(authors::author_selection(
            artefact,
            book,
            self.section_of(artefact),
        ))
    }

    // ==================== Tags ====================

    /// Notes carrying a tag
    pub fn notes_tagged(&self, tag: &str) -> Vec<&Note> {
        self.notes.iter().filter(|n| n.has_tag(tag)).collect()
    }

    /// Authors of a tag's notes, most notes first
    pub fn tag_authors(&self, tag: &str, limit: usize) -> Vec<(&Author, usize)> {
        let mut counts: HashMap<Uuid, usize> = HashMap::new();
        for note in self.notes_tagged(tag) {
            for id in &note.authors {
                *counts.entry(*id).or_default() += 1;
            }
        }

        let mut ranked: Vec<(&Author, usize)> = counts
            .into_iter()
            .filter_map(|(id, count)| self.author(id).map(|a| (a, count)))
            .collect();
        ranked.sort_by(|(a, x), (b, y)| y.cmp(x).then(a.name.cmp(&b.name)));
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authors::AuthorMode;
    use crate::models::BookDetails;
    use crate::page::parse_page_token;

    fn page(token: &str) -> PageReference {
        parse_page_token(token).unwrap()
    }

    struct Fixture {
        library: Library,
        book_id: Uuid,
        preface_id: Uuid,
        chapter_one_id: Uuid,
        chapter_two_id: Uuid,
        author_id: Uuid,
    }

    fn fixture() -> Fixture {
        let mut library = Library::new();
        let author = Author::new("Karl Marx");
        let author_id = author.id;
        library.add_author(author);

        let mut details = BookDetails::default();
        details.default_authors.insert(author_id);
        details.num_pages = Some(1100);
        let book = Book::new("Capital").with_details(details);
        let book_id = book.id;
        library.add_book(book);

        let mut preface = Section::new(book_id, "Preface", page("xv"));
        preface.authors.insert(author_id);
        let mut one = Section::new(book_id, "The Commodity", page("125"));
        one.authors.insert(author_id);
        let mut two = Section::new(book_id, "The Process of Exchange", page("178"));
        two.authors.insert(author_id);
        let (preface_id, chapter_one_id, chapter_two_id) = (preface.id, one.id, two.id);
        library.add_section(two);
        library.add_section(preface);
        library.add_section(one);

        Fixture {
            library,
            book_id,
            preface_id,
            chapter_one_id,
            chapter_two_id,
            author_id,
        }
    }

    #[test]
    fn test_lookups() {
        let f = fixture();
        assert_eq!(f.library.book_by_slug("capital").map(|b| b.id), Some(f.book_id));
        assert!(f.library.book_by_slug("grundrisse").is_none());
        assert_eq!(f.library.sections_of(f.book_id).len(), 3);
        assert!(f.library.sections_of(Uuid::new_v4()).is_empty());
        assert_eq!(
            f.library.section(f.preface_id).map(|s| s.title.as_str()),
            Some("Preface")
        );
    }

    #[test]
    fn test_resolve_and_neighbours() {
        let f = fixture();
        let resolved = f.library.resolve_section(f.book_id, page("150")).unwrap();
        assert_eq!(resolved.id, f.chapter_one_id);

        let next = f.library.next_section(resolved).unwrap();
        assert_eq!(next.id, f.chapter_two_id);
        let previous = f.library.previous_section(resolved).unwrap();
        assert_eq!(previous.id, f.preface_id);

        assert_eq!(f.library.end_page(resolved), Some(page("177")));
        assert_eq!(f.library.end_page(next), Some(page("1099")));
    }

    #[test]
    fn test_artefacts_in_section_are_page_ordered() {
        let mut f = fixture();
        let mut late = Note::new(f.book_id, "Fetishism", page("163"));
        late.section_id = Some(f.chapter_one_id);
        let mut early = TermOccurrence::new(f.book_id, "use-value", page("126"));
        early.section_id = Some(f.chapter_one_id);
        let mut middle = Note::new(f.book_id, "Value-form", page("138"));
        middle.section_id = Some(f.chapter_one_id);
        let elsewhere = Note::new(f.book_id, "Money", page("190"));
        f.library.add_note(late);
        f.library.add_term(early);
        f.library.add_note(middle);
        f.library.add_note(elsewhere);

        let labels: Vec<&str> = f
            .library
            .artefacts_in_section(f.chapter_one_id)
            .iter()
            .map(|a| a.label())
            .collect();
        assert_eq!(labels, vec!["use-value", "Value-form", "Fetishism"]);
    }

    #[test]
    fn test_misfiled_artefacts() {
        let mut f = fixture();
        let mut correct = Note::new(f.book_id, "Correct", page("130"));
        correct.section_id = Some(f.chapter_one_id);
        let mut stale = Note::new(f.book_id, "Stale", page("180"));
        stale.section_id = Some(f.chapter_one_id);
        let unsectioned = TermOccurrence::new(f.book_id, "surplus", page("xx"));
        let before_everything = Note::new(f.book_id, "Early", page("ii"));
        let stale_id = stale.id;
        let unsectioned_id = unsectioned.id;
        f.library.add_note(correct);
        f.library.add_note(stale);
        f.library.add_term(unsectioned);
        f.library.add_note(before_everything);

        let misfiled = f.library.misfiled_artefacts();
        assert_eq!(misfiled.len(), 2);

        let stale = misfiled.iter().find(|m| m.artefact.id() == stale_id).unwrap();
        assert_eq!(stale.filed_under.map(|s| s.id), Some(f.chapter_one_id));
        assert_eq!(stale.resolves_to.map(|s| s.id), Some(f.chapter_two_id));

        let term = misfiled
            .iter()
            .find(|m| m.artefact.id() == unsectioned_id)
            .unwrap();
        assert_eq!(term.artefact.kind(), "term");
        assert!(term.filed_under.is_none());
        assert_eq!(term.resolves_to.map(|s| s.id), Some(f.preface_id));
    }

    #[test]
    fn test_default_authors_follow_section() {
        let mut f = fixture();
        let mut note = Note::new(f.book_id, "Subject", page("130"));
        note.section_id = Some(f.chapter_one_id);
        note.authors.insert(f.author_id);
        let note_id = note.id;
        f.library.add_note(note);

        let note = f.library.note(note_id).unwrap();
        assert!(f.library.has_default_authors(note));
        let selection = f.library.author_selection(note).unwrap();
        assert_eq!(selection.mode, AuthorMode::Default);

        let unknown_book = Note::new(Uuid::new_v4(), "Orphan", page("1"));
        assert!(f.library.author_selection(&unknown_book).is_none());
    }

    #[test]
    fn test_related_sections() {
        let mut f = fixture();
        let other = Book::new("Reading Capital");
        let mut reading = Section::new(other.id, "On Commodities", page("3"));
        reading.related_to = Some(f.chapter_one_id);
        let reading_id = reading.id;
        f.library.add_book(other);
        f.library.add_section(reading);

        let reading = f.library.section(reading_id).unwrap();
        let chapter = f.library.related_section(reading).unwrap();
        assert_eq!(chapter.id, f.chapter_one_id);

        let back: Vec<Uuid> = f
            .library
            .sections_related_to(chapter)
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(back, vec![reading_id]);
    }

    #[test]
    fn test_tag_authors() {
        let mut f = fixture();
        let engels = Author::new("Friedrich Engels");
        let engels_id = engels.id;
        f.library.add_author(engels);

        for (subject, authors) in [
            ("a", vec![f.author_id]),
            ("b", vec![f.author_id, engels_id]),
            ("c", vec![f.author_id]),
        ] {
            let mut note = Note::new(f.book_id, subject, page("130"));
            note.authors = authors.into_iter().collect();
            note.add_tag("value");
            f.library.add_note(note);
        }

        let ranked = f.library.tag_authors("value", 10);
        let names: Vec<(&str, usize)> = ranked.iter().map(|(a, n)| (a.name.as_str(), *n)).collect();
        assert_eq!(names, vec![("Karl Marx", 3), ("Friedrich Engels", 1)]);

        assert_eq!(f.library.tag_authors("value", 1).len(), 1);
        assert!(f.library.tag_authors("rent", 10).is_empty());
    }

    #[test]
    fn test_authors_of_sorted_by_name() {
        let mut f = fixture();
        let engels = Author::new("Friedrich Engels");
        let mut ids = AuthorSet::new();
        ids.insert(f.author_id);
        ids.insert(engels.id);
        ids.insert(Uuid::new_v4());
        f.library.add_author(engels);

        let names: Vec<&str> = f
            .library
            .authors_of(&ids)
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["Friedrich Engels", "Karl Marx"]);
    }
}
