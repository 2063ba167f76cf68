//! # orderflow-cli — Command-Line Interface
//!
//! ## Subcommands
//!
//! - `run` — drive one order through email changes and lifecycle advances
//! - `states` — print the lifecycle transition table
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from behavior: each subcommand module
//!   exposes its `Args` struct plus plain functions that the binary calls.
//! - Lifecycle and notification rules live in `orderflow-state`, not here.

pub mod config;
pub mod logging;
pub mod run;
pub mod states;

/// Output format for subcommand reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text lines.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}
