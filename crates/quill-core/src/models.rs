//! Data models for quill
//!
//! Defines the core data structures: Note, Link, Attachment, and
//! Backlink. A Note is the atomic unit of content; everything else in
//! the crate either produces notes (the parser, the loader) or selects
//! over them (the collection, filters, lists).

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of reference a [`Link`] makes to another note.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LinkKind {
    /// `{{path}}` - reference by path
    Path,
    /// `{{path}(Name)}` - reference by path with a display name
    PathWithName,
    /// `[[Title]]` - reference by title
    Title,
    /// `[[Title](Name)]` - reference by title with a display name
    TitleWithName,
}

impl LinkKind {
    /// Whether the link targets a note path (as opposed to a title).
    pub fn is_path(self) -> bool {
        matches!(self, LinkKind::Path | LinkKind::PathWithName)
    }

    /// Whether the link targets a note title.
    pub fn is_title(self) -> bool {
        matches!(self, LinkKind::Title | LinkKind::TitleWithName)
    }
}

/// A reference from one note's body to another note
///
/// The span (`start..end`, byte offsets into the owning note's
/// `contents`) covers the entire matched markup, so downstream code can
/// substitute the markup without re-parsing. `parent` is the path of
/// the owning note; it is a plain string, never a pointer, so notes
/// stay independently constructible and serializable. Resolution goes
/// through [`Collection::resolve_link`](crate::Collection::resolve_link).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    /// Which of the four syntaxes matched
    pub kind: LinkKind,
    /// The referenced path or title, depending on `kind`
    pub target: String,
    /// Optional display name (the `(Name)` part)
    pub name: Option<String>,
    /// Byte offset of the first character of the markup in `contents`
    pub start: usize,
    /// Byte offset one past the last character of the markup
    pub end: usize,
    /// Path of the note this link appears in
    pub parent: String,
}

impl Link {
    /// The exact markup this link was parsed from.
    ///
    /// `contents` must be the `contents` of the owning note.
    pub fn span<'a>(&self, contents: &'a str) -> &'a str {
        &contents[self.start..self.end]
    }
}

/// A non-note file stored alongside a note
///
/// Any file that is not the sentinel note file but lives in the same
/// folder is treated as an attachment of that folder's note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    /// File name, without any directory components
    pub name: String,
    /// Location on disk
    pub path: PathBuf,
}

/// A parsed note
///
/// Produced by [`parse`](crate::parse::parse) from raw text, or by the
/// loader from a file on disk. Well-behaved callers treat a note as
/// immutable once constructed; filtered collections share notes by
/// reference counting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    /// Unique slash-separated identifier, the folder path relative to
    /// the notes root. Never changes after creation.
    pub path: String,
    /// Display title. Not unique across a collection.
    pub title: String,
    /// Date declared in front matter, or backfilled from the file
    /// modification time by the loader. `None` means "no date".
    pub date: Option<NaiveDateTime>,
    /// Body text with the front-matter block stripped
    pub contents: String,
    /// The raw text as read, front matter included
    pub original_contents: String,
    /// Front-matter keys other than `title`/`date`/`tags`, verbatim
    pub metadata: serde_yaml::Mapping,
    /// Tags in declaration order: front-matter tags first, then inline
    /// matches in textual order. Duplicates are preserved.
    pub tags: Vec<String>,
    /// Outbound links in textual order
    pub links: Vec<Link>,
    /// Sibling non-note files in this note's folder
    pub attachments: Vec<Attachment>,
    /// File modification time; `None` for notes not backed by disk
    pub mod_time: Option<DateTime<Utc>>,
    /// True for records constructed in memory rather than loaded from
    /// disk
    pub synthetic: bool,
}

impl Note {
    /// Create a synthetic note with the given path and title.
    ///
    /// Useful for tests and for callers that assemble notes without
    /// going through the parser. All other fields start empty.
    pub fn synthetic(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            date: None,
            contents: String::new(),
            original_contents: String::new(),
            metadata: serde_yaml::Mapping::new(),
            tags: Vec::new(),
            links: Vec::new(),
            attachments: Vec::new(),
            mod_time: None,
            synthetic: true,
        }
    }

    /// Set the body contents, keeping `original_contents` in step.
    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        let contents = contents.into();
        self.original_contents = contents.clone();
        self.contents = contents;
        self
    }

    /// Set the date.
    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Length of the note body in bytes, as used by the length filters.
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Whether the note body is empty.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// An inbound reference discovered by
/// [`Collection::find_links_to`](crate::Collection::find_links_to)
#[derive(Debug, Clone)]
pub struct Backlink {
    /// The note containing the link
    pub note: Arc<Note>,
    /// The link itself, with its span and parent path
    pub link: Link,
}
