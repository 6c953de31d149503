//! Validation errors
//!
//! Errors raised while turning user input (page tokens, section choices,
//! outline text) into catalogue values. Each variant carries enough context
//! to be shown next to the offending form field.

use thiserror::Error;

/// A page token could not be turned into a page reference
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// Nothing was entered
    #[error("Invalid page: no page given")]
    Empty,

    /// Neither a decimal number nor a complete lowercase roman numeral
    #[error("Invalid page: '{token}'")]
    Invalid { token: String },

    /// Parsed, but resolved to zero
    #[error("Invalid page: '{token}' is not a positive page number")]
    NotPositive { token: String },

    /// Too large to be a page number
    #[error("Invalid page: '{token}' is out of range")]
    OutOfRange { token: String },

    /// A body page past the end of the book
    #[error("This book has {num_pages} pages")]
    BeyondBook { num_pages: u32 },
}

impl PageError {
    /// The short message shown next to a page field
    pub fn form_message(&self) -> String {
        match self {
            PageError::BeyondBook { .. } => self.to_string(),
            _ => "Invalid page".to_string(),
        }
    }
}

/// An explicitly chosen section does not contain the artefact's page
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SectionChoiceError {
    #[error("Page number too small for section")]
    PageTooSmall,

    #[error("Page number too large for section")]
    PageTooLarge,
}

/// A line of a section outline could not be understood
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutlineError {
    /// The line has a page but no title
    #[error("Invalid line: {line}")]
    InvalidLine { line: String },

    /// The trailing number is not a usable page
    #[error("Invalid number: {token}")]
    InvalidNumber { token: String },
}
