//! Data models for Bookmarker
//!
//! Defines the catalogue records: Author, Book (with optional details),
//! Section, Note, TermOccurrence and Tag. Notes, term occurrences and
//! sections are anchored to a page and share the [`PageArtefact`] trait.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::page::PageReference;

/// A set of author ids
pub type AuthorSet = BTreeSet<Uuid>;

/// A record anchored to a page of a book
pub trait PageArtefact {
    /// The page the record starts on
    fn page(&self) -> PageReference;

    /// The book the record belongs to
    fn book_id(&self) -> Uuid;

    /// The authors currently attached to the record
    fn authors(&self) -> &AuthorSet;

    /// The section the record is filed under (always `None` for sections)
    fn section_id(&self) -> Option<Uuid>;
}

/// A person (or, for periodicals, the periodical itself)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub link: Option<String>,
}

impl Author {
    /// Create an author, collapsing runs of whitespace in the name
    pub fn new(name: &str) -> Self {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        Self {
            id: Uuid::new_v4(),
            slug: slugify(&name),
            name,
            link: None,
        }
    }

    /// Create an author with a specific ID (for loading from storage)
    pub fn with_id(id: Uuid, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            link: None,
        }
    }
}

/// Catalogue details of a traditional book or a periodical issue
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookDetails {
    pub year: Option<i32>,
    pub publisher: Option<String>,
    /// Only set for periodicals
    pub issue_number: Option<u32>,
    pub num_pages: Option<u32>,
    pub has_pages: bool,
    /// The default authors are actually editors
    pub is_edited: bool,
    /// Authors as listed by the catalogue (display only)
    pub authors: AuthorSet,
    /// Authors assumed for sections and artefacts that don't name their own
    pub default_authors: AuthorSet,
}

impl Default for BookDetails {
    fn default() -> Self {
        Self {
            year: None,
            publisher: None,
            issue_number: None,
            num_pages: None,
            has_pages: true,
            is_edited: false,
            authors: AuthorSet::new(),
            default_authors: AuthorSet::new(),
        }
    }
}

impl BookDetails {
    pub fn is_periodical(&self) -> bool {
        self.issue_number.is_some_and(|n| n > 0)
    }
}

/// A book, or a publication when it has no details
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub source_url: Option<String>,
    pub details: Option<BookDetails>,
}

impl Book {
    /// Create a publication (no details) with the given title
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id: Uuid::new_v4(),
            slug: book_slug(&title),
            title,
            source_url: None,
            details: None,
        }
    }

    /// Attach catalogue details, turning a publication into a book
    pub fn with_details(mut self, details: BookDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn is_publication(&self) -> bool {
        self.details.is_none()
    }

    pub fn has_pages(&self) -> bool {
        self.details.as_ref().is_some_and(|d| d.has_pages)
    }

    /// The book's default authors (empty for publications)
    pub fn default_authors(&self) -> AuthorSet {
        self.details
            .as_ref()
            .map(|d| d.default_authors.clone())
            .unwrap_or_default()
    }
}

/// A chapter, article or other titled part of a book
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Section {
    pub id: Uuid,
    pub book_id: Uuid,
    pub page: PageReference,
    /// Chapter or article number
    pub number: Option<u32>,
    pub title: String,
    pub subtitle: Option<String>,
    pub authors: AuthorSet,
    pub source_url: Option<String>,
    /// A thematically related section in a different book
    pub related_to: Option<Uuid>,
    /// Only used for publications
    pub date: Option<NaiveDate>,
    pub skipped: bool,
}

impl Section {
    pub fn new(book_id: Uuid, title: impl Into<String>, page: PageReference) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            page,
            number: None,
            title: title.into(),
            subtitle: None,
            authors: AuthorSet::new(),
            source_url: None,
            related_to: None,
            date: None,
            skipped: false,
        }
    }
}

impl PageArtefact for Section {
    fn page(&self) -> PageReference {
        self.page
    }

    fn book_id(&self) -> Uuid {
        self.book_id
    }

    fn authors(&self) -> &AuthorSet {
        &self.authors
    }

    fn section_id(&self) -> Option<Uuid> {
        None
    }
}

/// A quote or remark recorded against a page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Note {
    pub id: Uuid,
    pub book_id: Uuid,
    pub section_id: Option<Uuid>,
    pub page: PageReference,
    pub subject: String,
    pub quote: String,
    pub comment: Option<String>,
    pub authors: AuthorSet,
    /// Tag slugs
    pub tags: Vec<String>,
}

impl Note {
    pub fn new(book_id: Uuid, subject: impl Into<String>, page: PageReference) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            section_id: None,
            page,
            subject: subject.into(),
            quote: String::new(),
            comment: None,
            authors: AuthorSet::new(),
            tags: Vec::new(),
        }
    }

    /// Add a tag
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl PageArtefact for Note {
    fn page(&self) -> PageReference {
        self.page
    }

    fn book_id(&self) -> Uuid {
        self.book_id
    }

    fn authors(&self) -> &AuthorSet {
        &self.authors
    }

    fn section_id(&self) -> Option<Uuid> {
        self.section_id
    }
}

/// A vocabulary term as it occurs on a page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TermOccurrence {
    pub id: Uuid,
    pub book_id: Uuid,
    pub section_id: Option<Uuid>,
    pub page: PageReference,
    pub term: String,
    pub quote: String,
    pub authors: AuthorSet,
}

impl TermOccurrence {
    pub fn new(book_id: Uuid, term: impl Into<String>, page: PageReference) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            section_id: None,
            page,
            term: term.into(),
            quote: String::new(),
            authors: AuthorSet::new(),
        }
    }
}

impl PageArtefact for TermOccurrence {
    fn page(&self) -> PageReference {
        self.page
    }

    fn book_id(&self) -> Uuid {
        self.book_id
    }

    fn authors(&self) -> &AuthorSet {
        &self.authors
    }

    fn section_id(&self) -> Option<Uuid> {
        self.section_id
    }
}

/// A grouping for tags, with a display colour
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TagCategory {
    pub slug: String,
    pub colour: String,
}

/// A tag for organizing notes
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Tag {
    pub slug: String,
    pub description: String,
    /// Whether it shows up among the favourites
    pub faved: bool,
    pub category: Option<TagCategory>,
}

impl Tag {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            description: String::new(),
            faved: false,
            category: None,
        }
    }

    /// The category colour, or an empty string for uncategorised tags
    pub fn colour(&self) -> &str {
        self.category.as_ref().map(|c| c.colour.as_str()).unwrap_or("")
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.category {
            Some(category) => write!(f, "{}/{}", category.slug, self.slug),
            None => write!(f, "{}", self.slug),
        }
    }
}

/// Lowercase, ASCII alphanumerics separated by single dashes
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if (c.is_whitespace() || c == '-' || c == '_')
            && !slug.is_empty()
            && !slug.ends_with('-')
        {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Slug for a book title: subtitle dropped, at most 50 characters,
/// cut back to the last word boundary when that leaves a reasonable slug
fn book_slug(title: &str) -> String {
    let main_title = title.split(':').next().unwrap_or(title);
    let mut slug = slugify(main_title);
    if slug.len() > 50 {
        slug.truncate(50);
        if let Some(last_dash) = slug.rfind('-') {
            if last_dash > 10 {
                slug.truncate(last_dash);
            }
        }
    }
    slug
}
