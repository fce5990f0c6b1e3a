//! Read-only commands: list, get, search, stats.

use super::output::{print_page, print_stats, print_todo};
use super::{CommandResult, Engine, OutputFormat};
use chrono::{DateTime, Utc};
use taskdeck_protocol::{FilterParams, StatsRange, TodoId};
use taskdeck_sync::TodoAction;

/// Runs the list command.
pub async fn list(engine: &Engine, filters: FilterParams, format: OutputFormat) -> CommandResult {
    engine.fetch_with(filters).await?;
    print_current_page(engine, format)
}

/// Runs the get command.
pub async fn get(engine: &Engine, id: &TodoId, format: OutputFormat) -> CommandResult {
    let todo = engine.get(id).await?;
    print_todo(&todo, format)
}

/// Runs the search command.
pub async fn search(
    engine: &Engine,
    query: &str,
    page: u32,
    size: Option<u32>,
    format: OutputFormat,
) -> CommandResult {
    // Only page and size apply; the search itself is a one-shot request.
    engine.store().dispatch(TodoAction::SetFilters(FilterParams {
        page: Some(page),
        size,
        ..FilterParams::default()
    }));
    engine.search(query).await?;
    print_current_page(engine, format)
}

/// Runs the stats command.
pub async fn stats(
    engine: &Engine,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    format: OutputFormat,
) -> CommandResult {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(format!("--start {start} is after --end {end}").into());
        }
    }
    let range = StatsRange {
        start_date: start,
        end_date: end,
    };
    let stats = engine.stats(range).await?;
    print_stats(&stats, format)
}

fn print_current_page(engine: &Engine, format: OutputFormat) -> CommandResult {
    let state = engine.snapshot();
    print_page(&state.todos, state.pagination, format)
}
