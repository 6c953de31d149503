//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use anyhow::Result;
use serde::Serialize;

use bookmarker_core::{Author, Library, PageReference, Section};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print any serializable value as pretty JSON
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Print a list of sections with their page ranges
    pub fn print_sections(&self, library: &Library, sections: &[&Section]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if sections.is_empty() {
                    println!("No sections found.");
                    return Ok(());
                }
                for section in sections {
                    println!(
                        "{} | {:>5}-{:<5} | {}",
                        short_id(&section.id),
                        section.page.display(),
                        page_or_unknown(library.end_page(section)),
                        section_heading(section)
                    );
                }
            }
            OutputFormat::Json => {
                let json: Vec<_> = sections
                    .iter()
                    .map(|s| section_json(library, s))
                    .collect();
                self.json(&json)?;
            }
            OutputFormat::Quiet => {
                for section in sections {
                    println!("{}", section.id);
                }
            }
        }
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// JSON view of a section including its derived end page
pub fn section_json(library: &Library, section: &Section) -> serde_json::Value {
    serde_json::json!({
        "id": section.id,
        "number": section.number,
        "title": section.title,
        "subtitle": section.subtitle,
        "start": section.page.display(),
        "end": library.end_page(section).map(|p| p.display()),
        "in_preface": section.page.is_front_matter(),
    })
}

/// "3. Title: Subtitle"
pub fn section_heading(section: &Section) -> String {
    let mut heading = match section.number {
        Some(number) => format!("{}. {}", number, section.title),
        None => section.title.clone(),
    };
    if let Some(subtitle) = section.subtitle.as_deref().filter(|s| !s.is_empty()) {
        heading.push_str(": ");
        heading.push_str(subtitle);
    }
    heading
}

pub fn page_or_unknown(page: Option<PageReference>) -> String {
    page.map(|p| p.display()).unwrap_or_else(|| "?".to_string())
}

/// Comma-separated author names, or "(none)"
pub fn author_names(authors: &[&Author]) -> String {
    if authors.is_empty() {
        return "(none)".to_string();
    }
    authors
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// First 8 characters of an id
pub fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Truncate a string to max length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmarker_core::parse_page_token;
    use uuid::Uuid;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("Überweisung an", 8), "Überw...");
    }

    #[test]
    fn test_section_heading() {
        let mut section = Section::new(Uuid::new_v4(), "The Commodity", parse_page_token("1").unwrap());
        assert_eq!(section_heading(&section), "The Commodity");

        section.number = Some(1);
        section.subtitle = Some("Use Value".to_string());
        assert_eq!(section_heading(&section), "1. The Commodity: Use Value");
    }

    #[test]
    fn test_page_or_unknown() {
        assert_eq!(page_or_unknown(None), "?");
        assert_eq!(page_or_unknown(Some(parse_page_token("xiv").unwrap())), "xiv");
    }

    #[test]
    fn test_author_names() {
        assert_eq!(author_names(&[]), "(none)");
        let a = Author::new("Karl Marx");
        let b = Author::new("Friedrich Engels");
        assert_eq!(author_names(&[&a, &b]), "Karl Marx, Friedrich Engels");
    }
}
