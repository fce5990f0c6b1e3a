//! Todo fixtures.
//!
//! All timestamps derive from [`base_time`] so that fixtures compare equal
//! across runs.

use chrono::{DateTime, Duration, TimeZone, Utc};
use taskdeck_protocol::{Todo, TodoId, TodoPriority, TodoStatus};

/// Fixed reference instant used by every fixture.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Builder for test todos.
#[derive(Debug, Clone)]
pub struct TodoFixture {
    todo: Todo,
}

impl TodoFixture {
    /// A pending, medium-priority todo created at [`base_time`].
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            todo: Todo {
                id: TodoId::new(id),
                title: title.to_string(),
                description: None,
                status: TodoStatus::Pending,
                priority: TodoPriority::Medium,
                due_date: None,
                tags: None,
                created_at: base_time(),
                updated_at: base_time(),
            },
        }
    }

    /// Sets the status.
    pub fn status(mut self, status: TodoStatus) -> Self {
        self.todo.status = status;
        self
    }

    /// Marks the todo completed.
    pub fn completed(self) -> Self {
        self.status(TodoStatus::Completed)
    }

    /// Sets the priority.
    pub fn priority(mut self, priority: TodoPriority) -> Self {
        self.todo.priority = priority;
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: &str) -> Self {
        self.todo.description = Some(description.to_string());
        self
    }

    /// Sets the due date as an offset in days from [`base_time`].
    pub fn due_in_days(mut self, days: i64) -> Self {
        self.todo.due_date = Some(base_time() + Duration::days(days));
        self
    }

    /// Sets the tags.
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.todo.tags = Some(tags.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Shifts both timestamps by the given number of minutes.
    pub fn created_minutes_later(mut self, minutes: i64) -> Self {
        self.todo.created_at = base_time() + Duration::minutes(minutes);
        self.todo.updated_at = self.todo.created_at;
        self
    }

    /// Returns the todo.
    pub fn build(self) -> Todo {
        self.todo
    }
}
