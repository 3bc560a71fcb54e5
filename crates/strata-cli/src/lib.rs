//! # strata-cli
//!
//! Command-line interface for the strata configuration loader.
//!
//! ## Commands
//!
//! - `strata check` — Load and validate a configuration
//! - `strata show` — Print the merged configuration
//! - `strata sources` — List the env variables and flags a schema reads
//! - `strata completions` — Generate shell completions

pub mod commands;

pub use commands::Cli;
