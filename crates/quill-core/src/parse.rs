//! Note parsing
//!
//! Turns raw note text into a [`Note`] record. Parsing is a pure
//! function of the text, the path, and the [`ParseOptions`]; it never
//! touches the filesystem, which is why the parser leaves `date` unset
//! when the front matter has none (the loader backfills the file
//! modification time).
//!
//! ## Format
//!
//! A note optionally opens with a front-matter block delimited by `---`
//! lines, holding YAML key-value data. `title`, `date`, and `tags` are
//! recognized; every other key passes through verbatim into the note's
//! generic metadata. Free-form body text follows. Tags may also appear
//! inline as a prefix marker followed by word characters, and links use
//! one of four literal syntaxes:
//!
//! - `[[Title]]` and `[[Title](Name)]` - by title
//! - `{{path}}` and `{{path}(Name)}` - by path

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{Link, LinkKind, Note};

/// The front-matter delimiter line
pub const FRONT_MATTER_DELIMITER: &str = "---";

/// Errors produced when note text cannot be parsed
#[derive(Debug, Error)]
pub enum ParseError {
    /// The front-matter block was opened but the closing delimiter
    /// line never appeared
    #[error("front matter opened but never closed")]
    UnterminatedFrontMatter,

    /// The front-matter block is not valid YAML mapping data
    #[error("malformed front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    /// The front-matter `date` did not match the configured layout
    #[error("invalid date '{value}': {source}")]
    Date {
        value: String,
        source: chrono::ParseError,
    },

    /// Neither the front matter nor the body's first sentence yields a
    /// title
    #[error("note has no title and no first sentence to derive one from")]
    NoTitle,
}

/// Configuration the parser depends on but does not own
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// chrono format string for front-matter `date` values
    pub date_format: String,
    /// Prefix marker for builtin inline tags
    pub builtin_tag_prefix: String,
    /// Prefix marker for custom inline tags
    pub custom_tag_prefix: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d %H:%M".to_string(),
            builtin_tag_prefix: "@?".to_string(),
            custom_tag_prefix: "@!".to_string(),
        }
    }
}

/// The three recognized front-matter keys plus everything else
#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    title: Option<String>,
    date: Option<String>,
    tags: Option<Vec<String>>,
    #[serde(flatten)]
    extra: serde_yaml::Mapping,
}

/// Parse raw note text into a [`Note`].
///
/// `path` becomes the note's unique identifier. On success the note's
/// title is non-empty, its tag and link lists exist (possibly empty),
/// and its metadata mapping is always present.
pub fn parse(text: &str, path: &str, opts: &ParseOptions) -> Result<Note, ParseError> {
    let (block, body) = split_front_matter(text)?;

    let front: FrontMatter = match block {
        Some(b) if !b.trim().is_empty() => serde_yaml::from_str(b)?,
        _ => FrontMatter::default(),
    };

    let contents = body.trim_matches(|c| c == '\n' || c == '\r').to_string();

    let title = front
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| first_sentence(&contents))
        .ok_or(ParseError::NoTitle)?;

    let date = match front.date {
        Some(value) => Some(parse_date(&value, &opts.date_format)?),
        None => None,
    };

    let mut tags = front.tags.unwrap_or_default();
    tags.extend(inline_tags(
        &contents,
        &opts.builtin_tag_prefix,
        &opts.custom_tag_prefix,
    ));

    let links = extract_links(&contents, path);

    Ok(Note {
        path: path.to_string(),
        title,
        date,
        contents,
        original_contents: text.to_string(),
        metadata: front.extra,
        tags,
        links,
        attachments: Vec::new(),
        mod_time: None,
        synthetic: false,
    })
}

/// Split text into an optional front-matter block and the body.
///
/// The block exists only when the text opens with the delimiter line.
/// Text that does not open with it is all body, no error. An opened
/// block with no closing delimiter line is an error.
fn split_front_matter(text: &str) -> Result<(Option<&str>, &str), ParseError> {
    let after = match text.strip_prefix(FRONT_MATTER_DELIMITER) {
        Some(rest) if rest.is_empty() => return Err(ParseError::UnterminatedFrontMatter),
        Some(rest) if rest.starts_with('\n') || rest.starts_with("\r\n") => {
            rest.trim_start_matches('\r').strip_prefix('\n').unwrap_or(rest)
        }
        _ => return Ok((None, text)),
    };

    let mut offset = 0;
    for line in after.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == FRONT_MATTER_DELIMITER {
            let block = &after[..offset];
            let body = &after[offset + line.len()..];
            return Ok((Some(block), body));
        }
        offset += line.len();
    }

    Err(ParseError::UnterminatedFrontMatter)
}

/// Parse a front-matter date with the supplied layout.
///
/// Layouts without a time component are accepted; the time defaults to
/// midnight.
fn parse_date(value: &str, format: &str) -> Result<NaiveDateTime, ParseError> {
    NaiveDateTime::parse_from_str(value, format)
        .or_else(|_| NaiveDate::parse_from_str(value, format).map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default()))
        .map_err(|source| ParseError::Date {
            value: value.to_string(),
            source,
        })
}

/// Derive a title from the first sentence of the body.
///
/// The sentence runs up to the first `.`, `!`, or `?` that is followed
/// by whitespace or the end of the text. Trailing punctuation and
/// whitespace are trimmed.
fn first_sentence(contents: &str) -> Option<String> {
    let mut end = contents.len();
    for (i, c) in contents.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            let next = contents[i + c.len_utf8()..].chars().next();
            if next.map_or(true, |n| n.is_whitespace()) {
                end = i;
                break;
            }
        }
    }

    let title = contents[..end]
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Scan the body for inline tags under both prefix markers.
///
/// Matches from the two markers are merged in textual order.
/// Duplicates are preserved.
fn inline_tags(contents: &str, builtin_prefix: &str, custom_prefix: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();

    for prefix in [builtin_prefix, custom_prefix] {
        if prefix.is_empty() {
            continue;
        }
        // The prefix is escaped, so the pattern is always valid.
        let Ok(re) = Regex::new(&format!(r"{}([\w-]+)", regex::escape(prefix))) else {
            continue;
        };
        for caps in re.captures_iter(contents) {
            let whole = caps.get(0).map(|m| m.start()).unwrap_or(0);
            if let Some(tag) = caps.get(1) {
                found.push((whole, tag.as_str().to_string()));
            }
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, tag)| tag).collect()
}

// The four link syntaxes are mutually exclusive: the plain forms
// require a doubled closing bracket that the named forms break with
// `](` / `}(`, and the character classes cannot cross a bracket.
static TITLE_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\[\]\n]+?)\]\]").unwrap());
static TITLE_NAMED_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\[\]\n]+?)\]\(([^()\n]+?)\)\]").unwrap());
static PATH_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^\{\}\n]+?)\}\}").unwrap());
static PATH_NAMED_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^\{\}\n]+?)\}\(([^()\n]+?)\)\}").unwrap());

/// Extract all links from the stripped body, in textual order.
fn extract_links(contents: &str, parent: &str) -> Vec<Link> {
    let mut links: Vec<Link> = Vec::new();

    let plain = [
        (&*TITLE_LINK_RE, LinkKind::Title),
        (&*PATH_LINK_RE, LinkKind::Path),
    ];
    for (re, kind) in plain {
        for caps in re.captures_iter(contents) {
            let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            links.push(Link {
                kind,
                target: target.as_str().to_string(),
                name: None,
                start: whole.start(),
                end: whole.end(),
                parent: parent.to_string(),
            });
        }
    }

    let named = [
        (&*TITLE_NAMED_LINK_RE, LinkKind::TitleWithName),
        (&*PATH_NAMED_LINK_RE, LinkKind::PathWithName),
    ];
    for (re, kind) in named {
        for caps in re.captures_iter(contents) {
            let (Some(whole), Some(target), Some(name)) =
                (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            links.push(Link {
                kind,
                target: target.as_str().to_string(),
                name: Some(name.as_str().to_string()),
                start: whole.start(),
                end: whole.end(),
                parent: parent.to_string(),
            });
        }
    }

    links.sort_by_key(|l| l.start);
    links
}
