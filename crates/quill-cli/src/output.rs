//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::collections::BTreeMap;

use quill_core::{Backlink, Config, Diagnostic, List, Note};
use serde_json::json;

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

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Surface load diagnostics as warnings on stderr
    pub fn print_diagnostics(&self, diagnostics: &[Diagnostic]) {
        if self.is_quiet() {
            return;
        }
        for diagnostic in diagnostics {
            eprintln!("warning: {}", diagnostic);
        }
    }

    /// Print a listing of notes, one per line
    pub fn print_notes(&self, list: &List) {
        match self.format {
            OutputFormat::Human => {
                for note in list.iter() {
                    self.print_note_line(note);
                }
                println!();
                println!("{} note(s)", list.len());
            }
            OutputFormat::Json => {
                let notes: Vec<&Note> = list.iter().map(|n| n.as_ref()).collect();
                match serde_json::to_string_pretty(&notes) {
                    Ok(s) => println!("{}", s),
                    Err(e) => eprintln!("Error serializing to JSON: {}", e),
                }
            }
            OutputFormat::Quiet => {
                for note in list.iter() {
                    println!("{}", note.path);
                }
            }
        }
    }

    /// Print one note as a summary line
    fn print_note_line(&self, note: &Note) {
        let date = note
            .date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let tags = if note.tags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", note.tags.join(", "))
        };
        println!("{:<40} {:<17} {}{}", note.path, date, note.title, tags);
    }

    /// Print the backlinks of a note
    pub fn print_backlinks(&self, target: &Note, backlinks: &[Backlink]) {
        match self.format {
            OutputFormat::Human => {
                if backlinks.is_empty() {
                    println!("Nothing links to '{}'", target.path);
                    return;
                }
                println!("Links to '{}' ({}):", target.path, target.title);
                for backlink in backlinks {
                    println!(
                        "  {} ({})  via {}",
                        backlink.note.path,
                        backlink.note.title,
                        backlink.link.span(&backlink.note.contents),
                    );
                }
            }
            OutputFormat::Json => {
                let entries: Vec<serde_json::Value> = backlinks
                    .iter()
                    .map(|b| {
                        json!({
                            "path": &b.note.path,
                            "title": &b.note.title,
                            "link": &b.link,
                        })
                    })
                    .collect();
                match serde_json::to_string_pretty(&entries) {
                    Ok(s) => println!("{}", s),
                    Err(e) => eprintln!("Error serializing to JSON: {}", e),
                }
            }
            OutputFormat::Quiet => {
                for backlink in backlinks {
                    println!("{}", backlink.note.path);
                }
            }
        }
    }

    /// Print tag frequencies
    pub fn print_tags(&self, tags: &BTreeMap<String, usize>) {
        match self.format {
            OutputFormat::Human => {
                for (tag, count) in tags {
                    println!("{:<30} {}", tag, count);
                }
            }
            OutputFormat::Json => match serde_json::to_string_pretty(tags) {
                Ok(s) => println!("{}", s),
                Err(e) => eprintln!("Error serializing to JSON: {}", e),
            },
            OutputFormat::Quiet => {
                for tag in tags.keys() {
                    println!("{}", tag);
                }
            }
        }
    }

    /// Print the effective configuration
    pub fn print_config(&self, config: &Config, root: &std::path::Path) {
        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "notes_dir": root,
                    "note_filename": &config.note_filename,
                    "date_format": &config.date_format,
                    "builtin_tag_prefix": &config.builtin_tag_prefix,
                    "custom_tag_prefix": &config.custom_tag_prefix,
                });
                match serde_json::to_string_pretty(&value) {
                    Ok(s) => println!("{}", s),
                    Err(e) => eprintln!("Error serializing to JSON: {}", e),
                }
            }
            _ => {
                println!("notes_dir:          {}", root.display());
                println!("note_filename:      {}", config.note_filename);
                println!("date_format:        {}", config.date_format);
                println!("builtin_tag_prefix: {}", config.builtin_tag_prefix);
                println!("custom_tag_prefix:  {}", config.custom_tag_prefix);
            }
        }
    }
}
