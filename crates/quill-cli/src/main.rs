//! quill CLI
//!
//! Command-line interface for quill - querying a directory tree of
//! plain-text notes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use quill_core::{loader, Config, SortCriterion};

mod commands;
mod output;

use commands::search::SearchArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "quill - index and query a directory of plain-text notes")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Notes directory (overrides configuration)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List notes
    List {
        /// Sort order
        #[arg(long, value_enum, default_value_t = SortKey::Title)]
        sort: SortKey,
        /// Reverse the sorted order
        #[arg(long)]
        reverse: bool,
        /// Skip this many notes
        #[arg(long)]
        offset: Option<usize>,
        /// Show at most this many notes
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Search notes with composable filters
    Search(SearchArgs),
    /// Show the notes that link to a note
    Backlinks {
        /// Path of the target note
        path: String,
    },
    /// List all tags with their frequencies
    Tags,
    /// Show the effective configuration
    Config,
}

/// Sort orders exposed on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortKey {
    Title,
    Date,
}

impl From<SortKey> for SortCriterion {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Title => SortCriterion::Title,
            SortKey::Date => SortCriterion::Date,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let config = Config::load().context("Failed to load configuration")?;
    let root = cli.dir.unwrap_or_else(|| config.notes_dir.clone());

    if let Commands::Config = cli.command {
        return commands::config::run(&config, &root, &output);
    }

    let loaded = loader::load(&root, &config.load_options())
        .await
        .with_context(|| format!("Failed to load notes from {:?}", root))?;
    tracing::debug!(
        notes = loaded.collection.len(),
        diagnostics = loaded.diagnostics.len(),
        "collection loaded"
    );

    // Per-file failures are warnings; the collection stays usable.
    output.print_diagnostics(&loaded.diagnostics);

    match cli.command {
        Commands::List {
            sort,
            reverse,
            offset,
            limit,
        } => commands::list::run(
            &loaded.collection,
            sort.into(),
            reverse,
            offset,
            limit,
            &output,
        ),
        Commands::Search(args) => {
            commands::search::run(&loaded.collection, &args, &config.date_format, &output)
        }
        Commands::Backlinks { path } => {
            commands::links::run(&loaded.collection, &path, &output)
        }
        Commands::Tags => commands::tags::run(&loaded.collection, &output),
        Commands::Config => unreachable!("handled before loading"),
    }
}
