//! Search command handler
//!
//! Maps repeatable flat command-line flags onto a [`Query`]. Each
//! occurrence of a flag contributes one OR-group of comma-separated
//! values; repeating a flag ANDs the groups together. The engine only
//! ever sees the compiled predicate.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;

use quill_core::{Collection, Query, SortCriterion};

use crate::output::Output;

#[derive(Debug, Args, Default)]
pub struct SearchArgs {
    /// Keep notes whose path starts with one of the comma-separated
    /// prefixes (repeatable; repeats are ANDed)
    #[arg(long)]
    pub path: Vec<String>,

    /// Keep notes whose title contains one of the comma-separated
    /// substrings (repeatable)
    #[arg(long)]
    pub title: Vec<String>,

    /// Keep notes whose body contains one of the comma-separated
    /// substrings (repeatable)
    #[arg(long)]
    pub content: Vec<String>,

    /// Keep notes carrying one of the comma-separated tags (repeatable)
    #[arg(long)]
    pub tag: Vec<String>,

    /// Drop notes whose path starts with one of the comma-separated
    /// prefixes (repeatable)
    #[arg(long = "no-path")]
    pub no_path: Vec<String>,

    /// Drop notes whose title contains one of the comma-separated
    /// substrings (repeatable)
    #[arg(long = "no-title")]
    pub no_title: Vec<String>,

    /// Drop notes whose body contains one of the comma-separated
    /// substrings (repeatable)
    #[arg(long = "no-content")]
    pub no_content: Vec<String>,

    /// Drop notes carrying one of the comma-separated tags (repeatable)
    #[arg(long = "no-tag")]
    pub no_tag: Vec<String>,

    /// Keep notes dated on or after this date (configured layout)
    #[arg(long)]
    pub from: Option<String>,

    /// Keep notes dated on or before this date (configured layout)
    #[arg(long)]
    pub until: Option<String>,

    /// Keep notes with a body of at least this many bytes
    #[arg(long = "min-length")]
    pub min_length: Option<usize>,

    /// Keep notes with a body of fewer than this many bytes
    #[arg(long = "max-length")]
    pub max_length: Option<usize>,
}

/// Compile the flags, filter the collection, and print the survivors.
pub fn run(
    collection: &Collection,
    args: &SearchArgs,
    date_format: &str,
    output: &Output,
) -> Result<()> {
    let query = build_query(args, date_format)?;
    let matched = collection.filter(&[query.filter()]);
    output.print_notes(&matched.list().sort(SortCriterion::Title));
    Ok(())
}

/// Translate the flat flags into a CNF [`Query`].
fn build_query(args: &SearchArgs, date_format: &str) -> Result<Query> {
    Ok(Query {
        paths: groups(&args.path),
        titles: groups(&args.title),
        contents: groups(&args.content),
        tags: groups(&args.tag),
        exclude_paths: groups(&args.no_path),
        exclude_titles: groups(&args.no_title),
        exclude_contents: groups(&args.no_content),
        exclude_tags: groups(&args.no_tag),
        date_from: parse_bound(args.from.as_deref(), date_format, "--from")?,
        date_until: parse_bound(args.until.as_deref(), date_format, "--until")?,
        min_length: args.min_length,
        max_length: args.max_length,
    })
}

/// Split each flag occurrence into one OR-group of trimmed values.
fn groups(raw: &[String]) -> Vec<Vec<String>> {
    raw.iter()
        .map(|occurrence| {
            occurrence
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect()
        })
        .collect()
}

/// Parse a date bound with the configured layout, accepting a bare
/// date where the layout carries a time.
fn parse_bound(
    value: Option<&str>,
    date_format: &str,
    flag: &str,
) -> Result<Option<NaiveDateTime>> {
    let Some(value) = value else { return Ok(None) };

    NaiveDateTime::parse_from_str(value, date_format)
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default()))
        .map(Some)
        .with_context(|| format!("{} expects a date in the '{}' layout", flag, date_format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use quill_core::Note;

    fn collection() -> Collection {
        let mut c = Collection::new();
        c.add(Arc::new(
            Note::synthetic("food/pizza", "Pizza")
                .with_contents("Pizza is great.")
                .with_tags(vec!["food".to_string()]),
        ))
        .unwrap();
        c.add(Arc::new(
            Note::synthetic("food/beans", "Beans")
                .with_contents("Beans are fine.")
                .with_tags(vec!["food".to_string(), "legume".to_string()]),
        ))
        .unwrap();
        c.add(Arc::new(
            Note::synthetic("moods/hunger", "Hunger").with_contents("So hungry."),
        ))
        .unwrap();
        c
    }

    fn matched_paths(args: &SearchArgs) -> Vec<String> {
        let query = build_query(args, "%Y-%m-%d %H:%M").unwrap();
        let mut paths: Vec<String> = collection()
            .filter(&[query.filter()])
            .iter()
            .map(|n| n.path.clone())
            .collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_comma_separated_values_are_ored() {
        let args = SearchArgs {
            path: vec!["food/,moods/".to_string()],
            ..SearchArgs::default()
        };
        assert_eq!(
            matched_paths(&args),
            vec!["food/beans", "food/pizza", "moods/hunger"]
        );
    }

    #[test]
    fn test_repeated_flags_are_anded() {
        let args = SearchArgs {
            tag: vec!["food".to_string(), "legume".to_string()],
            ..SearchArgs::default()
        };
        assert_eq!(matched_paths(&args), vec!["food/beans"]);
    }

    #[test]
    fn test_exclude_flags() {
        let args = SearchArgs {
            path: vec!["food/".to_string()],
            no_title: vec!["Beans".to_string()],
            ..SearchArgs::default()
        };
        assert_eq!(matched_paths(&args), vec!["food/pizza"]);
    }

    #[test]
    fn test_bad_date_bound_is_an_error() {
        let args = SearchArgs {
            from: Some("yesterday".to_string()),
            ..SearchArgs::default()
        };
        assert!(build_query(&args, "%Y-%m-%d %H:%M").is_err());
    }

    #[test]
    fn test_bare_date_bound_accepted() {
        let args = SearchArgs {
            from: Some("2020-01-01".to_string()),
            ..SearchArgs::default()
        };
        let query = build_query(&args, "%Y-%m-%d %H:%M").unwrap();
        assert!(query.date_from.is_some());
    }
}
