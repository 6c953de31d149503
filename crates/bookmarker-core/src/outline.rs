//! Section outlines
//!
//! Parses a table of contents typed one section per line:
//!
//! ```text
//! Preface x
//! PART ONE
//! 1. The Commodity 125
//! 2. The Process of Exchange 178
//! ```
//!
//! The last word of each line is the section's page. A line whose last word
//! isn't a page is a group header, applied to the following sections until
//! the next header or blank line.

use serde::Serialize;

use crate::error::{OutlineError, PageError};
use crate::page::{parse_page_token, PageReference};

/// Sections numbered `1.`, `2.`, ... are only detected if numbering starts
/// within this many entries
const NUMBERING_WINDOW: usize = 3;

/// One section of a parsed outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub title: String,
    pub page: PageReference,
    pub number: Option<u32>,
    pub group_name: Option<String>,
}

/// Parse an outline into sections
pub fn parse_outline(text: &str) -> Result<Vec<OutlineEntry>, OutlineError> {
    let mut entries = Vec::new();
    let mut group_name: Option<String> = None;

    for line in text.lines() {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((last, title_words)) = words.split_last() else {
            group_name = None;
            continue;
        };

        let page = match parse_page_token(last) {
            Ok(page) => page,
            Err(PageError::NotPositive { token }) | Err(PageError::OutOfRange { token }) => {
                return Err(OutlineError::InvalidNumber { token });
            }
            Err(_) => {
                group_name = Some(words.join(" "));
                continue;
            }
        };

        if title_words.is_empty() {
            return Err(OutlineError::InvalidLine {
                line: line.trim().to_string(),
            });
        }

        entries.push(OutlineEntry {
            title: title_words.join(" "),
            page,
            number: None,
            group_name: group_name.clone(),
        });
    }

    number_entries(&mut entries);
    Ok(entries)
}

/// Strip leading `1.`, `2.`, ... from titles that are numbered in sequence
fn number_entries(entries: &mut [OutlineEntry]) {
    let mut number: u32 = 1;
    for (i, entry) in entries.iter_mut().enumerate() {
        if number == 1 && i == NUMBERING_WINDOW {
            break;
        }

        let prefix = format!("{}.", number);
        let Some(rest) = entry.title.strip_prefix(&prefix) else {
            continue;
        };
        // "4.1 Blah" is a subsection title, not section 4
        if rest.starts_with(char::is_whitespace) && !rest.trim().is_empty() {
            entry.title = rest.trim().to_string();
            entry.number = Some(number);
            number += 1;
        }
    }
}
