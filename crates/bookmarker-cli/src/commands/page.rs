//! Page command handler

use anyhow::Result;

use bookmarker_core::page::check_page_bound;
use bookmarker_core::{parse_page_token, PageReference};

use crate::output::{Output, OutputFormat};

/// Parse a page token and show the page it refers to
pub fn show(token: &str, num_pages: Option<u32>, output: &Output) -> Result<()> {
    let page = parse(token, num_pages)?;

    match output.format {
        OutputFormat::Json => {
            output.json(&serde_json::json!({
                "token": token,
                "page_number": page.ordinal(),
                "in_preface": page.is_front_matter(),
                "display": page.display(),
            }))?;
        }
        OutputFormat::Quiet => {
            println!("{}", page);
        }
        OutputFormat::Human => {
            println!("Page:    {}", page);
            println!("Number:  {}", page.ordinal());
            println!(
                "Matter:  {}",
                if page.is_front_matter() {
                    "front matter"
                } else {
                    "body"
                }
            );
        }
    }

    Ok(())
}

fn parse(token: &str, num_pages: Option<u32>) -> Result<PageReference> {
    let page = parse_page_token(token)?;
    check_page_bound(page, num_pages)?;
    Ok(page)
}

/// Parse a page argument of another command
pub fn parse_arg(token: &str) -> Result<PageReference> {
    parse(token, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_and_roman() {
        assert_eq!(parse("12", None).unwrap(), PageReference::new(12, false).unwrap());
        assert_eq!(parse("xiv", None).unwrap(), PageReference::new(14, true).unwrap());
    }

    #[test]
    fn test_parse_with_bound() {
        assert!(parse("300", Some(300)).is_ok());
        let err = parse("301", Some(300)).unwrap_err();
        assert_eq!(err.to_string(), "This book has 300 pages");
        // Front matter isn't bounded by the page count
        assert!(parse("xc", Some(10)).is_ok());
    }

    #[test]
    fn test_parse_invalid() {
        let err = parse("abc", None).unwrap_err();
        assert!(err.to_string().contains("abc"));
        assert!(parse_arg("0").is_err());
        assert!(parse_arg("").is_err());
    }
}
