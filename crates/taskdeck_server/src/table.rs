//! Server-side todo table.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use taskdeck_protocol::{FilterParams, Todo, TodoCreate, TodoId, TodoUpdate};
use uuid::Uuid;

/// In-memory todo table.
///
/// The table maintains:
/// - Rows in creation-descending order (newest first)
/// - Server-assigned ids (random UUIDs)
/// - `updated_at` that never moves backwards
pub struct TodoTable {
    rows: RwLock<Vec<Todo>>,
}

impl TodoTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Creates a table holding existing rows, re-sorted newest first.
    ///
    /// Ids and timestamps are kept as given.
    pub fn with_rows(mut rows: Vec<Todo>) -> Self {
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Copy of every row, newest first.
    pub fn rows(&self) -> Vec<Todo> {
        self.rows.read().clone()
    }

    /// Inserts new rows built from drafts. The last draft ends up first.
    pub fn insert(&self, drafts: &[TodoCreate], now: DateTime<Utc>) -> Vec<Todo> {
        let created: Vec<Todo> = drafts.iter().map(|draft| materialize(draft, now)).collect();
        let mut rows = self.rows.write();
        for todo in &created {
            rows.insert(0, todo.clone());
        }
        created
    }

    /// Looks up a row.
    pub fn get(&self, id: &TodoId) -> Option<Todo> {
        self.rows.read().iter().find(|todo| &todo.id == id).cloned()
    }

    /// Patches a row and returns its new state.
    pub fn update(&self, id: &TodoId, patch: &TodoUpdate, now: DateTime<Utc>) -> Option<Todo> {
        let mut rows = self.rows.write();
        let todo = rows.iter_mut().find(|todo| &todo.id == id)?;
        patch.apply_to(todo);
        todo.updated_at = now.max(todo.updated_at);
        Some(todo.clone())
    }

    /// Removes a row. Returns false if it did not exist.
    pub fn remove(&self, id: &TodoId) -> bool {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|todo| &todo.id != id);
        rows.len() < before
    }

    /// Returns the matching rows in the requested window plus the number
    /// of matching rows overall.
    pub fn query(&self, filters: &FilterParams, offset: usize, limit: usize) -> (Vec<Todo>, u64) {
        let rows = self.rows.read();
        let mut total = 0u64;
        let mut window = Vec::new();
        for todo in rows.iter().filter(|todo| filters.matches(todo)) {
            if total as usize >= offset && window.len() < limit {
                window.push(todo.clone());
            }
            total += 1;
        }
        (window, total)
    }
}

impl Default for TodoTable {
    fn default() -> Self {
        Self::new()
    }
}

fn materialize(draft: &TodoCreate, now: DateTime<Utc>) -> Todo {
    Todo {
        id: TodoId::new(Uuid::new_v4().to_string()),
        title: draft.title.trim().to_string(),
        description: draft.description.clone(),
        status: draft.status.unwrap_or_default(),
        priority: draft.priority.unwrap_or_default(),
        due_date: draft.due_date,
        tags: draft.tags.clone(),
        created_at: now,
        updated_at: now,
    }
}
