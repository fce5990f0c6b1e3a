//! CLI command implementations.

pub mod bulk;
pub mod output;
pub mod query;
pub mod write;

use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use taskdeck_protocol::{parse_timestamp, TodoId, TodoPriority, TodoStatus};
use taskdeck_sync::{HttpBackend, SyncEngine, TracingNotifier};
use thiserror::Error;

/// The engine every command runs against.
pub type Engine = SyncEngine<HttpBackend, TracingNotifier>;

/// Result type for commands.
pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Optional todo fields shared by `create` and `update`.
#[derive(Debug, Default, Args)]
pub struct TodoFields {
    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Priority (low, medium, high)
    #[arg(long)]
    pub priority: Option<TodoPriority>,

    /// Status (pending, in_progress, completed)
    #[arg(long)]
    pub status: Option<TodoStatus>,

    /// Due instant (ISO 8601, UTC when no offset is given)
    #[arg(long, value_parser = timestamp_arg)]
    pub due: Option<DateTime<Utc>>,

    /// Tag; repeat for several
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

/// Errors raised by the CLI itself, before any request is made.
#[derive(Debug, Error)]
pub enum CliError {
    /// `update` was called without any field.
    #[error("nothing to update: pass at least one field")]
    NothingToUpdate,

    /// A bulk file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    ReadFile {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A bulk file is not valid draft JSON.
    #[error("cannot parse {}: {source}", path.display())]
    ParseFile {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// Parses a timestamp argument the way the backend's payloads are read.
pub fn timestamp_arg(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| format!("'{raw}' is not an ISO 8601 timestamp"))
}

/// Converts raw id arguments.
pub fn ids(raw: Vec<String>) -> Vec<TodoId> {
    raw.into_iter().map(TodoId::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_args_accept_local_times() {
        let due = timestamp_arg("2024-05-01T09:00").unwrap();
        assert_eq!(due.to_rfc3339(), "2024-05-01T09:00:00+00:00");
        assert!(timestamp_arg("next week").is_err());
    }
}
