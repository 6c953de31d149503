//! Command handlers

pub mod authors;
pub mod check;
pub mod cite;
pub mod config;
pub mod outline;
pub mod page;
pub mod section;

use anyhow::{bail, Result};
use uuid::Uuid;

use bookmarker_core::{Book, Library};

/// Resolve a full UUID or a unique prefix of one
///
/// `candidates` pairs each id with a label shown when the prefix is ambiguous.
pub fn match_id<'a, I>(kind: &str, id: &str, candidates: I) -> Result<Uuid>
where
    I: IntoIterator<Item = (Uuid, &'a str)>,
{
    // Try full UUID first
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    let prefix = id.to_lowercase();
    let matches: Vec<(Uuid, &str)> = candidates
        .into_iter()
        .filter(|(uuid, _)| uuid.to_string().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => bail!("No {} found matching: {}", kind, id),
        1 => Ok(matches[0].0),
        _ => {
            eprintln!("Multiple {}s match '{}':", kind, id);
            for (uuid, label) in &matches {
                eprintln!("  {} - {}", uuid, label);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// Find a book by slug, falling back to an id or id prefix
pub fn find_book<'a>(library: &'a Library, key: &str) -> Result<&'a Book> {
    if let Some(book) = library.book_by_slug(key) {
        return Ok(book);
    }

    let id = match_id(
        "book",
        key,
        library.books().iter().map(|b| (b.id, b.title.as_str())),
    )?;
    match library.book(id) {
        Some(book) => Ok(book),
        None => bail!("Book not found: {}", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmarker_core::Book;

    fn id(s: &str) -> Uuid {
        Uuid::parse_str(s).unwrap()
    }

    #[test]
    fn test_match_full_uuid() {
        let full = "a1b2c3d4-0000-0000-0000-000000000000";
        // A full UUID is accepted even if it isn't a candidate
        assert_eq!(match_id("note", full, Vec::new()).unwrap(), id(full));
    }

    #[test]
    fn test_match_prefix() {
        let a = id("a1b2c3d4-0000-0000-0000-000000000000");
        let b = id("a1ffffff-0000-0000-0000-000000000000");
        let candidates = vec![(a, "first"), (b, "second")];

        assert_eq!(match_id("note", "a1b2", candidates.clone()).unwrap(), a);
        assert_eq!(match_id("note", "A1FF", candidates.clone()).unwrap(), b);

        let err = match_id("note", "a1", candidates.clone()).unwrap_err();
        assert!(err.to_string().contains("Ambiguous"));

        let err = match_id("note", "ff", candidates).unwrap_err();
        assert_eq!(err.to_string(), "No note found matching: ff");
    }

    #[test]
    fn test_find_book() {
        let mut library = Library::new();
        let book = Book::new("Capital: Critique of Political Economy");
        let book_id = book.id;
        library.add_book(book);

        assert_eq!(find_book(&library, "capital").unwrap().id, book_id);
        let prefix = &book_id.to_string()[..8];
        assert_eq!(find_book(&library, prefix).unwrap().id, book_id);
        assert!(find_book(&library, "grundrisse").is_err());
    }
}
