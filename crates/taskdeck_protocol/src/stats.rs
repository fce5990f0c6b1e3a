//! Aggregate statistics over a todo collection.

use crate::messages::StatsRange;
use crate::todo::{Todo, TodoPriority, TodoStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts returned by `GET /todos/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoStats {
    /// Todos in range.
    pub total_todos: u64,
    /// Completed todos.
    pub completed_todos: u64,
    /// Pending todos.
    pub pending_todos: u64,
    /// In-progress todos.
    pub in_progress_todos: u64,
    /// Todos past their due date that are not completed.
    pub overdue_todos: u64,
    /// High-priority todos.
    pub high_priority_todos: u64,
    /// Completed share in percent, 0 when there are no todos.
    pub completion_rate: f64,
    /// Count per priority name.
    #[serde(default)]
    pub todos_by_priority: BTreeMap<String, u64>,
    /// Count per status name.
    #[serde(default)]
    pub todos_by_status: BTreeMap<String, u64>,
    /// Count per tag.
    #[serde(default)]
    pub todos_by_tag: BTreeMap<String, u64>,
    /// Overdue count per priority name.
    #[serde(default)]
    pub overdue_by_priority: BTreeMap<String, u64>,
}

impl TodoStats {
    /// Aggregates the todos whose creation time falls inside `range`.
    pub fn compute<'a, I>(todos: I, range: &StatsRange, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Todo>,
    {
        let mut stats = TodoStats::default();
        for status in TodoStatus::ALL {
            stats.todos_by_status.insert(status.as_str().to_string(), 0);
        }
        for priority in TodoPriority::ALL {
            stats.todos_by_priority.insert(priority.as_str().to_string(), 0);
            stats.overdue_by_priority.insert(priority.as_str().to_string(), 0);
        }

        for todo in todos.into_iter().filter(|t| range.contains(t.created_at)) {
            stats.total_todos += 1;
            match todo.status {
                TodoStatus::Pending => stats.pending_todos += 1,
                TodoStatus::InProgress => stats.in_progress_todos += 1,
                TodoStatus::Completed => stats.completed_todos += 1,
            }
            if todo.priority == TodoPriority::High {
                stats.high_priority_todos += 1;
            }
            *stats
                .todos_by_status
                .entry(todo.status.as_str().to_string())
                .or_default() += 1;
            *stats
                .todos_by_priority
                .entry(todo.priority.as_str().to_string())
                .or_default() += 1;
            for tag in todo.tags.iter().flatten() {
                *stats.todos_by_tag.entry(tag.clone()).or_default() += 1;
            }
            if todo.is_overdue(now) {
                stats.overdue_todos += 1;
                *stats
                    .overdue_by_priority
                    .entry(todo.priority.as_str().to_string())
                    .or_default() += 1;
            }
        }

        if stats.total_todos > 0 {
            stats.completion_rate =
                stats.completed_todos as f64 / stats.total_todos as f64 * 100.0;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::TodoId;
    use chrono::TimeZone;

    fn todo(id: &str, status: TodoStatus, priority: TodoPriority, due_day: Option<u32>) -> Todo {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        Todo {
            id: TodoId::new(id),
            title: id.into(),
            description: None,
            status,
            priority,
            due_date: due_day.map(|d| Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()),
            tags: Some(vec!["work".into()]),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn empty_collection() {
        let empty: Vec<Todo> = Vec::new();
        let stats = TodoStats::compute(&empty, &StatsRange::all(), Utc::now());
        assert_eq!(stats.total_todos, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.todos_by_status.get("pending"), Some(&0));
    }

    #[test]
    fn counts_and_rates() {
        let todos = vec![
            todo("a", TodoStatus::Completed, TodoPriority::High, Some(2)),
            todo("b", TodoStatus::Pending, TodoPriority::High, Some(2)),
            todo("c", TodoStatus::InProgress, TodoPriority::Low, None),
            todo("d", TodoStatus::Completed, TodoPriority::Medium, Some(20)),
        ];
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let stats = TodoStats::compute(&todos, &StatsRange::all(), now);

        assert_eq!(stats.total_todos, 4);
        assert_eq!(stats.completed_todos, 2);
        assert_eq!(stats.pending_todos, 1);
        assert_eq!(stats.in_progress_todos, 1);
        assert_eq!(stats.high_priority_todos, 2);
        assert_eq!(stats.overdue_todos, 1);
        assert_eq!(stats.overdue_by_priority.get("high"), Some(&1));
        assert_eq!(stats.todos_by_tag.get("work"), Some(&4));
        assert!((stats.completion_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn range_filters_on_creation_time() {
        let todos = vec![todo("a", TodoStatus::Pending, TodoPriority::Low, None)];
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let range = StatsRange {
            start_date: Some(start),
            end_date: None,
        };
        assert_eq!(TodoStats::compute(&todos, &range, Utc::now()).total_todos, 0);
    }
}
