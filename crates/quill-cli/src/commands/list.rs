//! List command handler

use anyhow::{Context, Result};

use quill_core::{Collection, SortCriterion};

use crate::output::Output;

/// Sort, paginate, and print the collection.
pub fn run(
    collection: &Collection,
    sort: SortCriterion,
    reverse: bool,
    offset: Option<usize>,
    limit: Option<usize>,
    output: &Output,
) -> Result<()> {
    let mut list = collection.list().sort(sort);
    if reverse {
        list = list.reverse();
    }

    let page = match (offset, limit) {
        (Some(offset), limit) => list
            .from_offset(offset, limit.unwrap_or(usize::MAX))
            .context("Offset past the end of the listing")?,
        (None, Some(limit)) => list.first(limit),
        (None, None) => list,
    };

    output.print_notes(&page);
    Ok(())
}
