//! Page references
//!
//! A page is either part of the body (arabic numerals) or of the front
//! matter (lowercase roman numerals). Every front-matter page sorts before
//! every body page; within a group pages sort by number.
//!
//! Roman numerals are parsed leniently: the numeral table is walked from the
//! largest value down and each numeral is consumed for as long as it
//! matches, so non-canonical forms such as `iiii` are accepted. Only
//! canonical numerals survive a parse/display round trip.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::PageError;

/// Subtractive-notation numeral table, largest first
const NUMERALS: [(u32, &str); 13] = [
    (1000, "m"),
    (900, "cm"),
    (500, "d"),
    (400, "cd"),
    (100, "c"),
    (90, "xc"),
    (50, "l"),
    (40, "xl"),
    (10, "x"),
    (9, "ix"),
    (5, "v"),
    (4, "iv"),
    (1, "i"),
];

/// A validated page number, tagged with whether it belongs to the front matter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PageReference {
    page_number: u32,
    in_preface: bool,
}

impl PageReference {
    /// Build a reference from its stored form
    pub fn new(page_number: u32, in_preface: bool) -> Result<Self, PageError> {
        if page_number == 0 {
            return Err(PageError::NotPositive {
                token: page_number.to_string(),
            });
        }
        Ok(Self {
            page_number,
            in_preface,
        })
    }

    /// The page's numeric value (roman pages by their value)
    pub fn ordinal(&self) -> u32 {
        self.page_number
    }

    pub fn is_front_matter(&self) -> bool {
        self.in_preface
    }

    /// Render the page the way it is printed in the book
    pub fn display(&self) -> String {
        if self.in_preface {
            int_to_roman(self.page_number)
        } else {
            self.page_number.to_string()
        }
    }
}

impl Ord for PageReference {
    fn cmp(&self, other: &Self) -> Ordering {
        (!self.in_preface, self.page_number).cmp(&(!other.in_preface, other.page_number))
    }
}

impl PartialOrd for PageReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl FromStr for PageReference {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_page_token(s)
    }
}

/// Parse a page token as typed into a form
///
/// Decimal tokens become body pages, lowercase roman numerals become
/// front-matter pages. Surrounding whitespace is ignored.
pub fn parse_page_token(token: &str) -> Result<PageReference, PageError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(PageError::Empty);
    }

    if token.bytes().all(|b| b.is_ascii_digit()) {
        let value: u32 = token.parse().map_err(|_| PageError::OutOfRange {
            token: token.to_string(),
        })?;
        if value == 0 {
            return Err(PageError::NotPositive {
                token: token.to_string(),
            });
        }
        return PageReference::new(value, false);
    }

    match roman_to_int(token) {
        Some(value) if value > 0 => PageReference::new(value, true),
        _ => Err(PageError::Invalid {
            token: token.to_string(),
        }),
    }
}

/// Convert a number to lowercase canonical roman numerals
pub fn int_to_roman(mut value: u32) -> String {
    let mut result = String::new();
    for (integer, numeral) in NUMERALS {
        while value >= integer {
            result.push_str(numeral);
            value -= integer;
        }
    }
    result
}

/// Convert lowercase roman numerals to a number
///
/// Returns `None` unless the whole input is consumed.
pub fn roman_to_int(numeral: &str) -> Option<u32> {
    let mut rest = numeral;
    let mut total: u32 = 0;
    for (integer, symbol) in NUMERALS {
        while let Some(tail) = rest.strip_prefix(symbol) {
            total = total.checked_add(integer)?;
            rest = tail;
        }
    }

    if rest.is_empty() {
        Some(total)
    } else {
        None
    }
}

/// Reject body pages past the end of a book with a known page count
pub fn check_page_bound(page: PageReference, num_pages: Option<u32>) -> Result<(), PageError> {
    match num_pages {
        Some(num_pages) if num_pages > 0 => {
            if !page.is_front_matter() && page.ordinal() > num_pages {
                Err(PageError::BeyondBook { num_pages })
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}
