//! Outline command handler

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use bookmarker_core::{parse_outline, OutlineEntry};

use crate::output::{Output, OutputFormat};

/// Parse a typed table of contents into sections
///
/// `-` reads the outline from stdin.
pub fn parse(file: &Path, output: &Output) -> Result<()> {
    let text = read_input(file)?;
    let entries = parse_outline(&text)?;
    print_entries(&entries, output)
}

fn read_input(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read outline from stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(file).with_context(|| format!("Failed to read outline: {:?}", file))
}

fn print_entries(entries: &[OutlineEntry], output: &Output) -> Result<()> {
    match output.format {
        OutputFormat::Json => output.json(entries)?,
        OutputFormat::Quiet => {
            for entry in entries {
                println!("{}\t{}", entry.page, entry.title);
            }
        }
        OutputFormat::Human => {
            if entries.is_empty() {
                println!("No sections found.");
                return Ok(());
            }
            let mut group: Option<&str> = None;
            for entry in entries {
                let entry_group = entry.group_name.as_deref();
                if entry_group != group {
                    if let Some(name) = entry_group {
                        println!("{}", name);
                    }
                    group = entry_group;
                }
                let indent = if group.is_some() { "  " } else { "" };
                let number = entry
                    .number
                    .map(|n| format!("{}. ", n))
                    .unwrap_or_default();
                println!("{}{:>6}  {}{}", indent, entry.page.display(), number, entry.title);
            }
            println!("\n{} section(s)", entries.len());
        }
    }
    Ok(())
}
