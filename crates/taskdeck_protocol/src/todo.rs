//! The todo record and its drafts.

use crate::error::{ProtocolError, ProtocolResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned todo identifier.
///
/// Opaque to the client: it is compared and echoed back, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Workflow status of a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Not started.
    Pending,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
}

impl TodoStatus {
    /// All statuses in workflow order.
    pub const ALL: [TodoStatus; 3] = [
        TodoStatus::Pending,
        TodoStatus::InProgress,
        TodoStatus::Completed,
    ];

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::InProgress => "in_progress",
            TodoStatus::Completed => "completed",
        }
    }
}

impl Default for TodoStatus {
    fn default() -> Self {
        TodoStatus::Pending
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TodoStatus {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TodoStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownVariant {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// Priority of a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    /// Low priority.
    Low,
    /// Medium priority.
    Medium,
    /// High priority.
    High,
}

impl TodoPriority {
    /// All priorities, lowest first.
    pub const ALL: [TodoPriority; 3] = [TodoPriority::Low, TodoPriority::Medium, TodoPriority::High];

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoPriority::Low => "low",
            TodoPriority::Medium => "medium",
            TodoPriority::High => "high",
        }
    }
}

impl Default for TodoPriority {
    fn default() -> Self {
        TodoPriority::Medium
    }
}

impl fmt::Display for TodoPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TodoPriority {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TodoPriority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownVariant {
                kind: "priority",
                value: s.to_string(),
            })
    }
}

/// A single task record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    /// Server-assigned identifier.
    pub id: TodoId,
    /// Title, never empty.
    pub title: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Workflow status.
    pub status: TodoStatus,
    /// Priority.
    pub priority: TodoPriority,
    /// Optional due timestamp.
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DateTime<Utc>>,
    /// Optional ordered tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Creation timestamp.
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp, never decreasing.
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Returns true if the todo carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }

    /// Returns true if the due date has passed and the todo is not completed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TodoStatus::Completed && self.due_date.is_some_and(|due| due < now)
    }
}

/// Payload for creating a todo. Only the title is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoCreate {
    /// Title, must not be blank.
    pub title: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial status, `pending` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TodoStatus>,
    /// Priority, `medium` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TodoPriority>,
    /// Optional due timestamp.
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DateTime<Utc>>,
    /// Optional tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TodoCreate {
    /// Creates a draft with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the initial status.
    pub fn with_status(mut self, status: TodoStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: TodoPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the due date.
    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Sets the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Checks the draft before it is sent anywhere.
    pub fn validate(&self) -> ProtocolResult<()> {
        validate_title(&self.title)
    }
}

/// Partial update. Absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoUpdate {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TodoStatus>,
    /// New priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TodoPriority>,
    /// New due date.
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DateTime<Utc>>,
    /// Replacement tag list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TodoUpdate {
    /// A patch that only changes the status.
    pub fn status(status: TodoStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// A patch that only changes the priority.
    pub fn priority(priority: TodoPriority) -> Self {
        Self {
            priority: Some(priority),
            ..Default::default()
        }
    }

    /// A patch that only changes the title.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Returns true if the patch carries no fields.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
    }

    /// Checks the patch. A title, when present, must not be blank.
    pub fn validate(&self) -> ProtocolResult<()> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }

    /// Applies the patch to a todo in place. Does not touch timestamps.
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(title) = &self.title {
            todo.title = title.clone();
        }
        if let Some(description) = &self.description {
            todo.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            todo.status = status;
        }
        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
        if let Some(due) = self.due_date {
            todo.due_date = Some(due);
        }
        if let Some(tags) = &self.tags {
            todo.tags = Some(tags.clone());
        }
    }
}

fn validate_title(title: &str) -> ProtocolResult<()> {
    if title.trim().is_empty() {
        return Err(ProtocolError::validation("title must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Todo {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        Todo {
            id: TodoId::new("t-1"),
            title: "Write report".into(),
            description: None,
            status: TodoStatus::Pending,
            priority: TodoPriority::High,
            due_date: Some(Utc.with_ymd_and_hms(2024, 5, 3, 0, 0, 0).unwrap()),
            tags: Some(vec!["work".into()]),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TodoStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&TodoPriority::High).unwrap(),
            "\"high\""
        );
        assert_eq!("completed".parse::<TodoStatus>().unwrap(), TodoStatus::Completed);
        assert!("done".parse::<TodoStatus>().is_err());
        assert!("urgent".parse::<TodoPriority>().is_err());
    }

    #[test]
    fn todo_decodes_backend_json() {
        let json = r#"{
            "id": "abc",
            "title": "Buy milk",
            "status": "pending",
            "priority": "medium",
            "created_at": "2024-05-01T09:00:00Z",
            "updated_at": "2024-05-01T09:00:00Z"
        }"#;
        let todo: Todo = serde_json::from_str(json).unwrap();
        assert_eq!(todo.id.as_str(), "abc");
        assert!(todo.description.is_none());
        assert!(todo.tags.is_none());
    }

    #[test]
    fn todo_decodes_offsetless_timestamps() {
        let json = r#"{
            "id": "abc",
            "title": "Buy milk",
            "status": "pending",
            "priority": "medium",
            "due_date": "2024-05-01T09:00",
            "created_at": "2024-05-01T09:00:00.123456",
            "updated_at": "2024-05-01T11:00:00+02:00"
        }"#;
        let todo: Todo = serde_json::from_str(json).unwrap();
        let nine = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        assert_eq!(todo.due_date, Some(nine));
        assert_eq!(todo.updated_at, nine);
        assert_eq!(todo.created_at.timestamp(), nine.timestamp());
        assert_eq!(todo.created_at.timestamp_subsec_micros(), 123_456);

        let draft: TodoCreate =
            serde_json::from_str(r#"{ "title": "Walk dog", "due_date": null }"#).unwrap();
        assert!(draft.due_date.is_none());

        let bad = r#"{ "title": "Walk dog", "due_date": "someday" }"#;
        assert!(serde_json::from_str::<TodoCreate>(bad).is_err());
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let patch = TodoUpdate::status(TodoStatus::Completed);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "completed" }));
    }

    #[test]
    fn blank_title_fails_validation() {
        assert!(TodoCreate::new("").validate().is_err());
        assert!(TodoCreate::new("   ").validate().is_err());
        assert!(TodoCreate::new("Buy milk").validate().is_ok());

        assert!(TodoUpdate::default().validate().is_ok());
        assert!(TodoUpdate::title("").validate().is_err());
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut todo = sample();
        let patch = TodoUpdate {
            status: Some(TodoStatus::Completed),
            tags: Some(vec![]),
            ..Default::default()
        };
        patch.apply_to(&mut todo);
        assert_eq!(todo.status, TodoStatus::Completed);
        assert_eq!(todo.title, "Write report");
        assert_eq!(todo.tags, Some(vec![]));
        assert!(TodoUpdate::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn overdue_ignores_completed() {
        let mut todo = sample();
        let later = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert!(todo.is_overdue(later));
        todo.status = TodoStatus::Completed;
        assert!(!todo.is_overdue(later));
        assert!(todo.has_tag("work"));
        assert!(!todo.has_tag("home"));
    }
}
