//! Tags command handler

use std::collections::BTreeMap;

use anyhow::Result;

use quill_core::Collection;

use crate::output::Output;

/// Print every tag in the collection with its frequency.
///
/// Duplicate declarations inside one note count once each; the parser
/// preserves them deliberately.
pub fn run(collection: &Collection, output: &Output) -> Result<()> {
    let mut tags: BTreeMap<String, usize> = BTreeMap::new();
    for note in collection.iter() {
        for tag in &note.tags {
            *tags.entry(tag.clone()).or_default() += 1;
        }
    }

    output.print_tags(&tags);
    Ok(())
}
