//! The note collection
//!
//! A [`Collection`] owns two indices over shared note records: one by
//! unique path, one by non-unique title. It is the single queryable
//! view of a loaded note directory and the thing filters run against.
//!
//! Notes are held behind `Arc`, so filtering produces a structurally
//! new collection (fresh index maps) that shares the note records
//! themselves. The indices must only ever be mutated by one task at a
//! time; the loader upholds this by funnelling every `add` through its
//! orchestrating task.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::filter::Filter;
use crate::list::List;
use crate::models::{Backlink, Link, Note};

/// Index-contract violations
///
/// These indicate caller misuse rather than malformed data and always
/// propagate synchronously.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// A note with this path is already indexed
    #[error("note already exists at '{path}'")]
    AlreadyExists { path: String },

    /// No note with this path is indexed
    #[error("no note exists at '{path}'")]
    DoesNotExist { path: String },
}

/// An in-memory indexed set of notes
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Path index; keys are unique
    by_path: HashMap<String, Arc<Note>>,
    /// Title index; multiple notes may share a title. Buckets keep
    /// insertion order.
    by_title: HashMap<String, Vec<Arc<Note>>>,
}

impl Collection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed notes.
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Whether the collection holds no notes.
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// O(1) membership test by path.
    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Look up a note by its path.
    pub fn get(&self, path: &str) -> Option<&Arc<Note>> {
        self.by_path.get(path)
    }

    /// Index a note under its path and its title.
    ///
    /// Fails with [`CollectionError::AlreadyExists`] if the path is
    /// already indexed, or if a note with the same path already sits in
    /// the title bucket.
    pub fn add(&mut self, note: Arc<Note>) -> Result<(), CollectionError> {
        if self.by_path.contains_key(&note.path) {
            return Err(CollectionError::AlreadyExists {
                path: note.path.clone(),
            });
        }
        if let Some(bucket) = self.by_title.get(&note.title) {
            if bucket.iter().any(|n| n.path == note.path) {
                return Err(CollectionError::AlreadyExists {
                    path: note.path.clone(),
                });
            }
        }

        self.by_title
            .entry(note.title.clone())
            .or_default()
            .push(Arc::clone(&note));
        self.by_path.insert(note.path.clone(), note);
        Ok(())
    }

    /// Remove a note from both indices.
    ///
    /// Fails with [`CollectionError::DoesNotExist`] if the note is
    /// absent from either index. Removal from the title bucket is
    /// order-unstable (swap with last); buckets are unordered multisets
    /// apart from the resolution tie-break below.
    pub fn delete(&mut self, note: &Note) -> Result<(), CollectionError> {
        let missing = || CollectionError::DoesNotExist {
            path: note.path.clone(),
        };

        if !self.by_path.contains_key(&note.path) {
            return Err(missing());
        }
        let bucket = self.by_title.get_mut(&note.title).ok_or_else(missing)?;
        let pos = bucket
            .iter()
            .position(|n| n.path == note.path)
            .ok_or_else(missing)?;

        bucket.swap_remove(pos);
        if bucket.is_empty() {
            self.by_title.remove(&note.title);
        }
        self.by_path.remove(&note.path);
        Ok(())
    }

    /// Resolve a link to the note it refers to.
    ///
    /// Path links resolve by direct lookup. Title links return the
    /// first note added to that title's bucket; when several notes
    /// share the title, the choice is deterministic for a given add
    /// sequence but otherwise arbitrary.
    pub fn resolve_link(&self, link: &Link) -> Option<&Arc<Note>> {
        if link.kind.is_path() {
            self.by_path.get(&link.target)
        } else {
            self.by_title.get(&link.target).and_then(|b| b.first())
        }
    }

    /// Find every link in the collection that targets the given note,
    /// by path or by title.
    ///
    /// Linear scan over all indexed notes' outbound links; fine at
    /// note-collection scale, not built for more.
    pub fn find_links_to(&self, note: &Note) -> Vec<Backlink> {
        let mut backlinks = Vec::new();
        for parent in self.by_path.values() {
            for link in &parent.links {
                let hit = if link.kind.is_path() {
                    link.target == note.path
                } else {
                    link.target == note.title
                };
                if hit {
                    backlinks.push(Backlink {
                        note: Arc::clone(parent),
                        link: link.clone(),
                    });
                }
            }
        }
        backlinks
    }

    /// Produce a new collection holding only the notes that satisfy
    /// every given filter.
    ///
    /// The result has fresh index maps but shares the note records.
    /// The source collection is never mutated.
    pub fn filter(&self, filters: &[Filter]) -> Collection {
        let mut filtered = Collection::new();
        for note in self.by_path.values() {
            if filters.iter().all(|f| f.matches(note)) {
                // Paths are unique in the source, so re-adding cannot
                // collide.
                let _ = filtered.add(Arc::clone(note));
            }
        }
        filtered
    }

    /// Snapshot all indexed notes as a [`List`].
    ///
    /// Order is implementation-defined index iteration order until a
    /// sort is applied.
    pub fn list(&self) -> List {
        List::new(self.by_path.values().cloned().collect())
    }

    /// Iterate over all indexed notes.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Note>> {
        self.by_path.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkKind;

    fn note(path: &str, title: &str) -> Arc<Note> {
        Arc::new(Note::synthetic(path, title))
    }

    fn link(kind: LinkKind, target: &str, parent: &str) -> Link {
        Link {
            kind,
            target: target.to_string(),
            name: None,
            start: 0,
            end: 0,
            parent: parent.to_string(),
        }
    }

    #[test]
    fn test_add_and_contains() {
        let mut c = Collection::new();
        c.add(note("food/pizza", "Pizza")).unwrap();

        assert_eq!(c.len(), 1);
        assert!(c.contains("food/pizza"));
        assert!(!c.contains("food/beans"));
    }

    #[test]
    fn test_add_duplicate_path_fails() {
        let mut c = Collection::new();
        c.add(note("food/pizza", "Pizza")).unwrap();

        let err = c.add(note("food/pizza", "Other Title")).unwrap_err();
        assert!(matches!(err, CollectionError::AlreadyExists { .. }));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_delete_then_add_succeeds() {
        let mut c = Collection::new();
        let n = note("food/pizza", "Pizza");
        c.add(Arc::clone(&n)).unwrap();

        c.delete(&n).unwrap();
        assert_eq!(c.len(), 0);
        assert!(!c.contains("food/pizza"));

        c.add(n).unwrap();
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_delete_missing_fails() {
        let mut c = Collection::new();
        let n = note("food/pizza", "Pizza");
        let err = c.delete(&n).unwrap_err();
        assert!(matches!(err, CollectionError::DoesNotExist { .. }));
    }

    #[test]
    fn test_shared_titles_keep_both_notes() {
        let mut c = Collection::new();
        c.add(note("reviews/week1", "Weekly Review")).unwrap();
        c.add(note("reviews/week2", "Weekly Review")).unwrap();
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_resolve_path_link() {
        let mut c = Collection::new();
        c.add(note("moods/hunger", "Hunger")).unwrap();

        let l = link(LinkKind::Path, "moods/hunger", "journal/day");
        let resolved = c.resolve_link(&l).unwrap();
        assert_eq!(resolved.path, "moods/hunger");

        let dangling = link(LinkKind::Path, "moods/joy", "journal/day");
        assert!(c.resolve_link(&dangling).is_none());
    }

    #[test]
    fn test_resolve_title_link_with_shared_title() {
        let mut c = Collection::new();
        c.add(note("reviews/week1", "Weekly Review")).unwrap();
        c.add(note("reviews/week2", "Weekly Review")).unwrap();

        let l = link(LinkKind::Title, "Weekly Review", "inbox");
        let resolved = c.resolve_link(&l).unwrap();
        assert_eq!(resolved.title, "Weekly Review");
        // First added wins.
        assert_eq!(resolved.path, "reviews/week1");
    }

    #[test]
    fn test_find_links_to_by_path_and_title() {
        let mut c = Collection::new();
        let target = note("food/pizza", "Pizza");
        c.add(Arc::clone(&target)).unwrap();

        let mut by_path = Note::synthetic("journal/monday", "Monday");
        by_path.links = vec![link(LinkKind::Path, "food/pizza", "journal/monday")];
        c.add(Arc::new(by_path)).unwrap();

        let mut by_title = Note::synthetic("journal/tuesday", "Tuesday");
        by_title.links = vec![link(LinkKind::TitleWithName, "Pizza", "journal/tuesday")];
        c.add(Arc::new(by_title)).unwrap();

        let mut unrelated = Note::synthetic("journal/wednesday", "Wednesday");
        unrelated.links = vec![link(LinkKind::Path, "food/beans", "journal/wednesday")];
        c.add(Arc::new(unrelated)).unwrap();

        let mut parents: Vec<String> = c
            .find_links_to(&target)
            .into_iter()
            .map(|b| b.link.parent)
            .collect();
        parents.sort();
        assert_eq!(parents, vec!["journal/monday", "journal/tuesday"]);
    }

    #[test]
    fn test_filter_is_non_destructive() {
        let mut c = Collection::new();
        c.add(note("food/pizza", "Pizza")).unwrap();
        c.add(note("food/beans", "Beans")).unwrap();

        let kept = c.filter(&[Filter::PathPrefix(vec!["food/".to_string()])]);
        assert_eq!(kept.len(), 2);

        let none = c.filter(&[Filter::Not(Box::new(Filter::PathPrefix(vec![
            "food/".to_string(),
        ])))]);
        assert_eq!(none.len(), 0);

        // Source unaffected.
        assert_eq!(c.len(), 2);
        assert!(c.contains("food/pizza"));
        assert!(c.contains("food/beans"));
    }

    #[test]
    fn test_chained_filters_equal_conjunction() {
        let mut c = Collection::new();
        c.add(note("food/pizza", "Pizza")).unwrap();
        c.add(note("food/beans", "Beans")).unwrap();
        c.add(note("moods/hunger", "Hunger")).unwrap();

        let p1 = Filter::PathPrefix(vec!["food/".to_string()]);
        let p2 = Filter::TitleContains(vec!["ea".to_string()]);

        let chained = c.filter(&[p1.clone()]).filter(&[p2.clone()]);
        let conjoined = c.filter(&[Filter::And(vec![p1, p2])]);

        let mut a: Vec<String> = chained.iter().map(|n| n.path.clone()).collect();
        let mut b: Vec<String> = conjoined.iter().map(|n| n.path.clone()).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
        assert_eq!(a, vec!["food/beans"]);
    }

    #[test]
    fn test_filtered_collections_share_notes() {
        let mut c = Collection::new();
        let n = note("food/pizza", "Pizza");
        c.add(Arc::clone(&n)).unwrap();

        let filtered = c.filter(&[]);
        let held = filtered.get("food/pizza").unwrap();
        assert!(Arc::ptr_eq(held, &n));
    }
}
