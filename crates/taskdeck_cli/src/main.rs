//! Taskdeck CLI
//!
//! Command-line client for taskdeck-compatible todo services.
//!
//! # Commands
//!
//! - `list` - List one page of todos
//! - `get` / `search` - Read single todos or search
//! - `create` / `update` / `status` / `delete` - Single-item writes
//! - `bulk-status` / `bulk-delete` / `bulk-create` - Bulk writes
//! - `stats` - Aggregate statistics

mod commands;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use commands::{OutputFormat, TodoFields};
use std::path::PathBuf;
use std::time::Duration;
use taskdeck_protocol::{FilterParams, TodoPriority, TodoStatus};
use taskdeck_sync::{ClientConfig, SyncEngine, TracingNotifier};
use tracing_subscriber::EnvFilter;

/// Taskdeck command-line todo client.
#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the todo service
    #[arg(
        global = true,
        long,
        env = "TASKDECK_API_URL",
        default_value = "http://127.0.0.1:8000"
    )]
    url: String,

    /// Bearer token sent with every request
    #[arg(global = true, long, env = "TASKDECK_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(global = true, long, default_value = "10")]
    timeout_secs: u64,

    /// Output format
    #[arg(global = true, short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of todos
    List {
        /// Only this status (pending, in_progress, completed)
        #[arg(long)]
        status: Option<TodoStatus>,

        /// Only this priority (low, medium, high)
        #[arg(long)]
        priority: Option<TodoPriority>,

        /// Case-insensitive text in title or description
        #[arg(long)]
        search: Option<String>,

        /// Only todos carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Due on or before this instant (ISO 8601)
        #[arg(long, value_parser = commands::timestamp_arg)]
        due_before: Option<DateTime<Utc>>,

        /// Due on or after this instant (ISO 8601)
        #[arg(long, value_parser = commands::timestamp_arg)]
        due_after: Option<DateTime<Utc>>,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Page size
        #[arg(short, long)]
        size: Option<u32>,
    },

    /// Show a single todo
    Get {
        /// Todo id
        id: String,
    },

    /// Search titles and descriptions
    Search {
        /// Query text
        query: String,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Page size
        #[arg(short, long)]
        size: Option<u32>,
    },

    /// Create a todo
    Create {
        /// Title
        title: String,

        #[command(flatten)]
        fields: TodoFields,
    },

    /// Update fields of a todo
    Update {
        /// Todo id
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: TodoFields,
    },

    /// Change the status of a todo
    Status {
        /// Todo id
        id: String,

        /// New status (pending, in_progress, completed)
        status: TodoStatus,
    },

    /// Delete a todo
    Delete {
        /// Todo id
        id: String,
    },

    /// Show aggregate statistics
    Stats {
        /// Only todos created at or after this instant (ISO 8601)
        #[arg(long, value_parser = commands::timestamp_arg)]
        start: Option<DateTime<Utc>>,

        /// Only todos created at or before this instant (ISO 8601)
        #[arg(long, value_parser = commands::timestamp_arg)]
        end: Option<DateTime<Utc>>,
    },

    /// Set the status of several todos
    BulkStatus {
        /// New status (pending, in_progress, completed)
        status: TodoStatus,

        /// Todo ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete several todos
    BulkDelete {
        /// Todo ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Create todos from a JSON file
    BulkCreate {
        /// File holding an array of drafts or `{"todos": [...]}`
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ClientConfig::new(&cli.url).with_timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(token) = &cli.token {
        config = config.with_auth_token(token);
    }
    let engine = SyncEngine::over_http(&config, TracingNotifier)?;
    let format = cli.format;

    match cli.command {
        Commands::List {
            status,
            priority,
            search,
            tag,
            due_before,
            due_after,
            page,
            size,
        } => {
            let filters = FilterParams {
                status,
                priority,
                search,
                tag,
                due_before,
                due_after,
                page: Some(page),
                size,
            };
            commands::query::list(&engine, filters, format).await?;
        }
        Commands::Get { id } => {
            commands::query::get(&engine, &id.into(), format).await?;
        }
        Commands::Search { query, page, size } => {
            commands::query::search(&engine, &query, page, size, format).await?;
        }
        Commands::Create { title, fields } => {
            commands::write::create(&engine, title, fields, format).await?;
        }
        Commands::Update { id, title, fields } => {
            commands::write::update(&engine, &id.into(), title, fields, format).await?;
        }
        Commands::Status { id, status } => {
            commands::write::status(&engine, &id.into(), status, format).await?;
        }
        Commands::Delete { id } => {
            commands::write::delete(&engine, &id.into()).await?;
        }
        Commands::Stats { start, end } => {
            commands::query::stats(&engine, start, end, format).await?;
        }
        Commands::BulkStatus { status, ids } => {
            commands::bulk::set_status(&engine, commands::ids(ids), status, format).await?;
        }
        Commands::BulkDelete { ids } => {
            commands::bulk::delete(&engine, commands::ids(ids)).await?;
        }
        Commands::BulkCreate { file } => {
            commands::bulk::create(&engine, &file, format).await?;
        }
    }

    Ok(())
}
