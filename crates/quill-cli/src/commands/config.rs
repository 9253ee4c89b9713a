//! Config command handler

use std::path::Path;

use anyhow::Result;

use quill_core::Config;

use crate::output::Output;

/// Show the effective configuration, including any `--dir` override.
pub fn run(config: &Config, root: &Path, output: &Output) -> Result<()> {
    output.print_config(config, root);
    Ok(())
}
