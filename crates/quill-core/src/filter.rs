//! The filter algebra
//!
//! A [`Filter`] is a pure predicate over one note. Primitives each
//! carry one or more arguments that are implicitly OR'd; the
//! combinators `And`, `Or`, and `Not` compose arbitrarily. Filters
//! never mutate anything and are freely shareable across tasks;
//! applying one through [`Collection::filter`](crate::Collection::filter)
//! always yields a new collection.

use chrono::NaiveDateTime;

use crate::models::Note;

/// A composable predicate over a single note
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// True iff every inner filter is true. Empty input is the
    /// identity: always true.
    And(Vec<Filter>),
    /// True iff any inner filter is true. Empty input is always false.
    Or(Vec<Filter>),
    /// Negation
    Not(Box<Filter>),

    /// Note path starts with any of the given prefixes
    PathPrefix(Vec<String>),
    /// Note path equals any of the given paths
    PathExact(Vec<String>),
    /// Note title contains any of the given substrings
    TitleContains(Vec<String>),
    /// Note title equals any of the given strings
    TitleExact(Vec<String>),
    /// Note contents contain any of the given substrings
    ContentContains(Vec<String>),
    /// Note contents equal any of the given strings
    ContentExact(Vec<String>),
    /// Note carries any of the given tags
    HasTag(Vec<String>),
    /// Note date is on or after any of the given bounds. Dateless
    /// notes never match.
    DateFrom(Vec<NaiveDateTime>),
    /// Note date is on or before any of the given bounds. Dateless
    /// notes always match.
    DateUntil(Vec<NaiveDateTime>),
    /// Body length in bytes is at least one of the given minimums
    /// (inclusive)
    MinLength(Vec<usize>),
    /// Body length in bytes is below any of the given maximums.
    /// Evaluated as the negation of a minimum check, so the bound is
    /// exclusive, unlike `MinLength`.
    MaxLength(Vec<usize>),
}

impl Filter {
    /// Convenience constructor for `Not`.
    pub fn not(filter: Filter) -> Filter {
        Filter::Not(Box::new(filter))
    }

    /// Evaluate this filter against a note.
    pub fn matches(&self, note: &Note) -> bool {
        match self {
            Filter::And(filters) => filters.iter().all(|f| f.matches(note)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(note)),
            Filter::Not(filter) => !filter.matches(note),

            Filter::PathPrefix(prefixes) => {
                prefixes.iter().any(|p| note.path.starts_with(p.as_str()))
            }
            Filter::PathExact(paths) => paths.iter().any(|p| note.path == *p),
            Filter::TitleContains(subs) => subs.iter().any(|s| note.title.contains(s.as_str())),
            Filter::TitleExact(titles) => titles.iter().any(|t| note.title == *t),
            Filter::ContentContains(subs) => {
                subs.iter().any(|s| note.contents.contains(s.as_str()))
            }
            Filter::ContentExact(bodies) => bodies.iter().any(|b| note.contents == *b),
            Filter::HasTag(tags) => tags.iter().any(|t| note.tags.iter().any(|have| have == t)),
            Filter::DateFrom(bounds) => match note.date {
                Some(date) => bounds.iter().any(|from| date >= *from),
                None => false,
            },
            Filter::DateUntil(bounds) => match note.date {
                Some(date) => bounds.iter().any(|until| date <= *until),
                None => true,
            },
            Filter::MinLength(mins) => mins.iter().any(|min| note.len() >= *min),
            // Intentionally the exact negation of the minimum check:
            // the upper bound is exclusive while the lower bound is
            // inclusive.
            Filter::MaxLength(maxes) => maxes.iter().any(|max| !(note.len() >= *max)),
        }
    }
}
