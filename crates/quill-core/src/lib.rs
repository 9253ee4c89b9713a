//! quill Core Library
//!
//! This crate provides the core functionality for quill, a tool for
//! indexing and querying a directory tree of plain-text notes.
//!
//! # Architecture
//!
//! Leaf to root:
//!
//! - `parse`: pure function from raw text + path to a [`Note`] record
//! - `loader`: concurrent directory walk that parses every note file
//!   and produces a populated [`Collection`] plus non-fatal diagnostics
//! - `collection`: path and title indices with link resolution,
//!   backlinks, and non-destructive filtering
//! - `filter` / `query`: a composable predicate algebra and the
//!   declarative bundle that compiles into it
//! - `list`: an ordered, paginated, sortable snapshot of a collection
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let result = loader::load(&config.notes_dir, &config.load_options()).await?;
//!
//! let food = result.collection.filter(&[Filter::PathPrefix(vec!["food/".into()])]);
//! let recent = food.list().sort(SortCriterion::Date).reverse().first(10);
//! ```
//!
//! Notes are immutable once constructed; filtered collections share
//! note records by reference counting, and the loader's orchestrating
//! task is the only mutator of a collection while loading.

pub mod collection;
pub mod config;
pub mod filter;
pub mod list;
pub mod loader;
pub mod models;
pub mod parse;
pub mod query;

pub use collection::{Collection, CollectionError};
pub use config::Config;
pub use filter::Filter;
pub use list::{List, ListError, SortCriterion};
pub use loader::{load, load_sequential, Diagnostic, FileError, LoadError, LoadOptions, LoadResult};
pub use models::{Attachment, Backlink, Link, LinkKind, Note};
pub use parse::{parse, ParseError, ParseOptions};
pub use query::Query;
