//! Command handlers

pub mod config;
pub mod links;
pub mod list;
pub mod search;
pub mod tags;
