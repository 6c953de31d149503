//! Section command handlers
//!
//! Sections are looked up by book slug and page, the way an artefact's
//! section is worked out when it is saved.

use anyhow::Result;

use bookmarker_core::page::check_page_bound;
use bookmarker_core::section::sorted_sections;
use bookmarker_core::{Book, Library, PageReference, Section};

use crate::commands::find_book;
use crate::commands::page::parse_arg;
use crate::output::{
    author_names, page_or_unknown, section_heading, section_json, Output, OutputFormat,
};

/// List a book's sections, or show the section a page falls in
pub fn show(library: &Library, book: &str, page: Option<&str>, output: &Output) -> Result<()> {
    let book = find_book(library, book)?;

    let Some(token) = page else {
        let sections = sorted_sections(library.sections_of(book.id));
        return output.print_sections(library, &sections);
    };

    let (page, section) = resolve(library, book, token)?;
    let Some(section) = section else {
        return match output.format {
            OutputFormat::Json => output.json(&serde_json::json!({
                "book": book.slug,
                "page": page.display(),
                "section": null,
            })),
            OutputFormat::Quiet => Ok(()),
            OutputFormat::Human => {
                println!("Page {} of '{}' is not in any section.", page, book.title);
                Ok(())
            }
        };
    };

    match output.format {
        OutputFormat::Json => {
            output.json(&serde_json::json!({
                "book": book.slug,
                "page": page.display(),
                "section": section_json(library, section),
                "previous": library.previous_section(section).map(|s| s.id),
                "next": library.next_section(section).map(|s| s.id),
            }))?;
        }
        OutputFormat::Quiet => {
            println!("{}", section.id);
        }
        OutputFormat::Human => {
            println!("Book:     {}", book.title);
            println!("Page:     {}", page);
            println!("Section:  {}", section_heading(section));
            println!(
                "Pages:    {}-{}",
                section.page,
                page_or_unknown(library.end_page(section))
            );
            println!(
                "Authors:  {}",
                author_names(&library.authors_of(&section.authors))
            );
            if let Some(previous) = library.previous_section(section) {
                println!("Previous: {}", section_heading(previous));
            }
            if let Some(next) = library.next_section(section) {
                println!("Next:     {}", section_heading(next));
            }
            if let Some(related) = library.related_section(section) {
                println!("Related:  {}", section_heading(related));
            }
            if section.skipped {
                println!("(skipped)");
            }
        }
    }

    Ok(())
}

/// Parse `token`, check it against the book's page count and find its section
fn resolve<'a>(
    library: &'a Library,
    book: &Book,
    token: &str,
) -> Result<(PageReference, Option<&'a Section>)> {
    let page = parse_arg(token)?;
    check_page_bound(page, book.details.as_ref().and_then(|d| d.num_pages))?;
    Ok((page, library.resolve_section(book.id, page)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmarker_core::{parse_page_token, BookDetails};

    fn library() -> Library {
        let mut library = Library::new();
        let details = BookDetails {
            num_pages: Some(300),
            ..BookDetails::default()
        };
        let book = Book::new("Capital").with_details(details);
        let book_id = book.id;
        library.add_book(book);
        library.add_section(Section::new(book_id, "Preface", parse_page_token("v").unwrap()));
        library.add_section(Section::new(book_id, "One", parse_page_token("1").unwrap()));
        library
    }

    #[test]
    fn test_show_resolves_page() {
        let library = library();
        let output = Output::new(OutputFormat::Quiet);
        assert!(show(&library, "capital", Some("10"), &output).is_ok());
        assert!(show(&library, "capital", Some("ii"), &output).is_ok());
        assert!(show(&library, "capital", None, &output).is_ok());
    }

    #[test]
    fn test_resolve_picks_section() {
        let library = library();
        let book = find_book(&library, "capital").unwrap();
        let title = |token: &str| {
            let (_, section) = resolve(&library, book, token).unwrap();
            section.map(|s| s.title.clone())
        };

        assert_eq!(title("10").as_deref(), Some("One"));
        assert_eq!(title("300").as_deref(), Some("One"));
        assert_eq!(title("ii"), None);
        assert_eq!(title("v").as_deref(), Some("Preface"));
        assert_eq!(title("xx").as_deref(), Some("Preface"));

        let (page, _) = resolve(&library, book, "xiv").unwrap();
        assert!(page.is_front_matter());
        assert_eq!(page.ordinal(), 14);
        assert!(resolve(&library, book, "301").is_err());
    }

    #[test]
    fn test_show_rejects_pages_past_the_end() {
        let library = library();
        let output = Output::new(OutputFormat::Quiet);
        let err = show(&library, "capital", Some("301"), &output).unwrap_err();
        assert_eq!(err.to_string(), "This book has 300 pages");
    }

    #[test]
    fn test_show_unknown_book() {
        let library = library();
        let output = Output::new(OutputFormat::Quiet);
        assert!(show(&library, "grundrisse", Some("1"), &output).is_err());
    }
}
