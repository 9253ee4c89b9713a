//! Backlinks command handler

use anyhow::{anyhow, Result};

use quill_core::Collection;

use crate::output::Output;

/// Print every note linking to the note at `path`.
pub fn run(collection: &Collection, path: &str, output: &Output) -> Result<()> {
    let target = collection
        .get(path)
        .ok_or_else(|| anyhow!("No note at '{}'", path))?;

    let backlinks = collection.find_links_to(target);
    output.print_backlinks(target, &backlinks);
    Ok(())
}
