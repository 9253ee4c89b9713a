//! Ordered note snapshots
//!
//! A [`List`] is an independent ordered copy of note references,
//! usually obtained from [`Collection::list`](crate::Collection::list).
//! It shares the note records with the collection but nothing else;
//! every operation returns a new list and leaves the original alone.

use std::sync::Arc;

use thiserror::Error;

use crate::models::Note;

/// Pagination misuse
#[derive(Debug, Error)]
pub enum ListError {
    /// The requested offset lies at or past the end of the list
    #[error("offset {offset} out of bounds for list of length {len}")]
    OutOfBounds { offset: usize, len: usize },
}

/// How to order a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCriterion {
    /// Lexicographic by title, case-insensitive first, case-sensitive
    /// to break ties
    Title,
    /// Chronological; dateless notes sort first
    Date,
}

/// An ordered, paginated, sortable snapshot of notes
#[derive(Debug, Clone, Default)]
pub struct List {
    notes: Vec<Arc<Note>>,
}

impl List {
    /// Create a list over the given notes, keeping their order.
    pub fn new(notes: Vec<Arc<Note>>) -> Self {
        Self { notes }
    }

    /// Number of notes in the list.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// The note at the given position, if any.
    pub fn get(&self, index: usize) -> Option<&Arc<Note>> {
        self.notes.get(index)
    }

    /// Iterate over the notes in order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Note>> {
        self.notes.iter()
    }

    /// Up to `n` notes starting at `offset`.
    ///
    /// Fails with [`ListError::OutOfBounds`] iff `offset >= len`.
    /// Returning fewer than `n` notes because the list runs out is not
    /// an error.
    pub fn from_offset(&self, offset: usize, n: usize) -> Result<List, ListError> {
        if offset >= self.notes.len() {
            return Err(ListError::OutOfBounds {
                offset,
                len: self.notes.len(),
            });
        }
        let end = offset.saturating_add(n).min(self.notes.len());
        Ok(List::new(self.notes[offset..end].to_vec()))
    }

    /// The first `n` notes, or all of them if fewer exist.
    pub fn first(&self, n: usize) -> List {
        let end = n.min(self.notes.len());
        List::new(self.notes[..end].to_vec())
    }

    /// The last `n` notes, or all of them if fewer exist.
    pub fn last(&self, n: usize) -> List {
        let start = self.notes.len().saturating_sub(n);
        List::new(self.notes[start..].to_vec())
    }

    /// A new list in reverse order.
    pub fn reverse(&self) -> List {
        let mut notes = self.notes.clone();
        notes.reverse();
        List::new(notes)
    }

    /// A new list sorted by the given criterion. The original is
    /// unmodified.
    pub fn sort(&self, criterion: SortCriterion) -> List {
        let mut notes = self.notes.clone();
        match criterion {
            SortCriterion::Title => {
                notes.sort_by(|a, b| {
                    a.title
                        .to_lowercase()
                        .cmp(&b.title.to_lowercase())
                        .then_with(|| a.title.cmp(&b.title))
                });
            }
            SortCriterion::Date => {
                notes.sort_by_key(|n| n.date);
            }
        }
        List::new(notes)
    }
}

impl FromIterator<Arc<Note>> for List {
    fn from_iter<I: IntoIterator<Item = Arc<Note>>>(iter: I) -> Self {
        List::new(iter.into_iter().collect())
    }
}
