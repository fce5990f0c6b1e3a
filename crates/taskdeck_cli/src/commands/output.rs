//! Rendering of todos, pages and statistics.

use super::{CommandResult, OutputFormat};
use serde::Serialize;
use taskdeck_protocol::{Pagination, Todo, TodoListResponse, TodoStats};

/// One line per todo: id, status, priority, title, then due date and tags
/// when present.
pub fn todo_line(todo: &Todo) -> String {
    let mut line = format!(
        "{}  [{:<11}] {:<6} {}",
        todo.id,
        todo.status.as_str(),
        todo.priority.as_str(),
        todo.title
    );
    if let Some(due) = todo.due_date {
        line.push_str(&format!("  (due {})", due.format("%Y-%m-%d %H:%M")));
    }
    if let Some(tags) = todo.tags.as_ref().filter(|tags| !tags.is_empty()) {
        let tags: Vec<String> = tags.iter().map(|tag| format!("#{tag}")).collect();
        line.push_str("  ");
        line.push_str(&tags.join(" "));
    }
    line
}

/// Footer under a page listing.
pub fn page_footer(pagination: &Pagination) -> String {
    format!(
        "page {} of {} ({} todos)",
        pagination.page,
        pagination.total_pages.max(1),
        pagination.total
    )
}

/// Text rendering of statistics.
pub fn stats_lines(stats: &TodoStats) -> Vec<String> {
    let mut lines = vec![
        format!("total        {}", stats.total_todos),
        format!("completed    {}", stats.completed_todos),
        format!("in progress  {}", stats.in_progress_todos),
        format!("pending      {}", stats.pending_todos),
        format!("overdue      {}", stats.overdue_todos),
        format!("high prio    {}", stats.high_priority_todos),
        format!("completion   {:.1}%", stats.completion_rate),
    ];
    if !stats.todos_by_tag.is_empty() {
        let tags: Vec<String> = stats
            .todos_by_tag
            .iter()
            .map(|(tag, count)| format!("#{tag}={count}"))
            .collect();
        lines.push(format!("tags         {}", tags.join(" ")));
    }
    lines
}

fn print_json<T: Serialize>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints a single todo.
pub fn print_todo(todo: &Todo, format: OutputFormat) -> CommandResult {
    match format {
        OutputFormat::Json => print_json(todo),
        OutputFormat::Text => {
            println!("{}", todo_line(todo));
            if let Some(description) = &todo.description {
                println!("    {description}");
            }
            Ok(())
        }
    }
}

/// Prints several todos without pagination.
pub fn print_todos(todos: &[Todo], format: OutputFormat) -> CommandResult {
    match format {
        OutputFormat::Json => print_json(&todos),
        OutputFormat::Text => {
            for todo in todos {
                println!("{}", todo_line(todo));
            }
            Ok(())
        }
    }
}

/// Prints a page with its pagination.
pub fn print_page(todos: &[Todo], pagination: Pagination, format: OutputFormat) -> CommandResult {
    match format {
        OutputFormat::Json => print_json(&TodoListResponse::new(todos.to_vec(), pagination)),
        OutputFormat::Text => {
            if todos.is_empty() {
                println!("no todos");
            }
            for todo in todos {
                println!("{}", todo_line(todo));
            }
            println!("{}", page_footer(&pagination));
            Ok(())
        }
    }
}

/// Prints statistics.
pub fn print_stats(stats: &TodoStats, format: OutputFormat) -> CommandResult {
    match format {
        OutputFormat::Json => print_json(stats),
        OutputFormat::Text => {
            for line in stats_lines(stats) {
                println!("{line}");
            }
            Ok(())
        }
    }
}
