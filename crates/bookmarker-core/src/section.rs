//! Section resolution
//!
//! Works out which section of a book a page falls in, and the neighbouring
//! pages and sections of a given section. All functions take the book's
//! sections as a slice in any order and never cache their answer: the
//! section list may have changed since the artefact was filed.

use tracing::debug;

use crate::error::SectionChoiceError;
use crate::models::Section;
use crate::page::PageReference;

/// Sections in reading order (front matter first, then by page)
///
/// Sections sharing a page keep their relative order.
pub fn sorted_sections(sections: &[Section]) -> Vec<&Section> {
    let mut sorted: Vec<&Section> = sections.iter().collect();
    sorted.sort_by_key(|s| s.page);
    sorted
}

/// Find the section an artefact on `page` belongs to
///
/// Only sections in the same group (front matter or body) are considered.
/// The latest section starting at or before the page wins; when several
/// start on the same page the last one listed wins. `None` means the page
/// comes before every section of its group.
pub fn resolve_section<'a, I>(sections: I, page: PageReference) -> Option<&'a Section>
where
    I: IntoIterator<Item = &'a Section>,
{
    let resolved = sections
        .into_iter()
        .filter(|s| s.page.is_front_matter() == page.is_front_matter() && s.page <= page)
        .max_by_key(|s| s.page);

    match resolved {
        Some(section) => debug!("Page {} resolved to section '{}'", page, section.title),
        None => debug!("Page {} is not in any section", page),
    }

    resolved
}

/// The section after `section` in reading order
pub fn next_section<'a>(sections: &'a [Section], section: &Section) -> Option<&'a Section> {
    let sorted = sorted_sections(sections);
    let position = sorted.iter().position(|s| s.id == section.id)?;
    sorted.get(position + 1).copied()
}

/// The section before `section` in reading order
pub fn previous_section<'a>(sections: &'a [Section], section: &Section) -> Option<&'a Section> {
    let sorted = sorted_sections(sections);
    let position = sorted.iter().position(|s| s.id == section.id)?;
    position.checked_sub(1).map(|i| sorted[i])
}

/// The last page of `section`
///
/// One less than the start of the next section in the same group. The last
/// body section runs to one less than the book's page count, when known.
pub fn end_page(
    sections: &[Section],
    section: &Section,
    num_pages: Option<u32>,
) -> Option<PageReference> {
    let in_preface = section.page.is_front_matter();
    let next = sections
        .iter()
        .filter(|s| s.page.is_front_matter() == in_preface && s.page > section.page)
        .min_by_key(|s| s.page);

    let last = match next {
        Some(next) => next.page.ordinal() - 1,
        None if !in_preface => num_pages?.checked_sub(1)?,
        None => return None,
    };

    PageReference::new(last, in_preface).ok()
}

/// Check that an explicitly chosen section can contain `page`
pub fn check_section_choice(
    sections: &[Section],
    chosen: &Section,
    page: PageReference,
) -> Result<(), SectionChoiceError> {
    if chosen.page > page {
        return Err(SectionChoiceError::PageTooSmall);
    }

    match next_section(sections, chosen) {
        Some(next) if next.page < page => Err(SectionChoiceError::PageTooLarge),
        _ => Ok(()),
    }
}
