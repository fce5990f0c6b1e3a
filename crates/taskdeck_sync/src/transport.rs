//! Backend abstraction for sync operations.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use taskdeck_protocol::{
    BulkUpdateRequest, FilterParams, SearchRequest, StatsRange, Todo, TodoCreate, TodoId,
    TodoListResponse, TodoStats, TodoStatus, TodoUpdate,
};

/// The capability set every todo backend offers.
///
/// This trait abstracts the remote side, allowing for different
/// implementations (REST service, hosted database client, in-process
/// server, mock for testing).
#[async_trait]
pub trait TodoBackend: Send + Sync {
    /// Lists one page of todos matching the filters.
    async fn list(&self, filters: &FilterParams) -> SyncResult<TodoListResponse>;

    /// Fetches a single todo.
    async fn get(&self, id: &TodoId) -> SyncResult<Todo>;

    /// Creates a todo and returns the stored entity.
    async fn create(&self, draft: &TodoCreate) -> SyncResult<Todo>;

    /// Creates several todos in one call.
    async fn create_many(&self, drafts: &[TodoCreate]) -> SyncResult<Vec<Todo>>;

    /// Applies a partial update and returns the full stored entity.
    async fn update(&self, id: &TodoId, patch: &TodoUpdate) -> SyncResult<Todo>;

    /// Changes only the status.
    async fn update_status(&self, id: &TodoId, status: TodoStatus) -> SyncResult<Todo>;

    /// Deletes a todo.
    async fn delete(&self, id: &TodoId) -> SyncResult<()>;

    /// Applies one patch per id.
    async fn bulk_update(&self, request: &BulkUpdateRequest) -> SyncResult<Vec<Todo>>;

    /// Deletes several todos.
    ///
    /// The default issues one delete per id concurrently and fails if any
    /// of them failed.
    async fn bulk_delete(&self, ids: &[TodoId]) -> SyncResult<()> {
        let results = join_all(ids.iter().map(|id| self.delete(id))).await;
        results.into_iter().collect::<SyncResult<Vec<()>>>()?;
        Ok(())
    }

    /// Full-text search constrained by filters.
    async fn search(&self, request: &SearchRequest) -> SyncResult<TodoListResponse>;

    /// Aggregate statistics.
    async fn stats(&self, range: &StatsRange) -> SyncResult<TodoStats>;
}

#[async_trait]
impl<B: TodoBackend + ?Sized> TodoBackend for Arc<B> {
    async fn list(&self, filters: &FilterParams) -> SyncResult<TodoListResponse> {
        (**self).list(filters).await
    }

    async fn get(&self, id: &TodoId) -> SyncResult<Todo> {
        (**self).get(id).await
    }

    async fn create(&self, draft: &TodoCreate) -> SyncResult<Todo> {
        (**self).create(draft).await
    }

    async fn create_many(&self, drafts: &[TodoCreate]) -> SyncResult<Vec<Todo>> {
        (**self).create_many(drafts).await
    }

    async fn update(&self, id: &TodoId, patch: &TodoUpdate) -> SyncResult<Todo> {
        (**self).update(id, patch).await
    }

    async fn update_status(&self, id: &TodoId, status: TodoStatus) -> SyncResult<Todo> {
        (**self).update_status(id, status).await
    }

    async fn delete(&self, id: &TodoId) -> SyncResult<()> {
        (**self).delete(id).await
    }

    async fn bulk_update(&self, request: &BulkUpdateRequest) -> SyncResult<Vec<Todo>> {
        (**self).bulk_update(request).await
    }

    async fn bulk_delete(&self, ids: &[TodoId]) -> SyncResult<()> {
        (**self).bulk_delete(ids).await
    }

    async fn search(&self, request: &SearchRequest) -> SyncResult<TodoListResponse> {
        (**self).search(request).await
    }

    async fn stats(&self, range: &StatsRange) -> SyncResult<TodoStats> {
        (**self).stats(range).await
    }
}

/// A scripted backend for testing.
///
/// Responses are set up front; every call is recorded by name. When
/// disconnected, every call fails with a transport error.
#[derive(Debug)]
pub struct MockBackend {
    connected: AtomicBool,
    next_id: AtomicU64,
    failure: Mutex<Option<SyncError>>,
    list_response: Mutex<Option<TodoListResponse>>,
    todo_response: Mutex<Option<Todo>>,
    stats_response: Mutex<Option<TodoStats>>,
    calls: Mutex<Vec<&'static str>>,
}

impl MockBackend {
    /// Creates a connected mock with no scripted responses.
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            next_id: AtomicU64::new(1),
            failure: Mutex::new(None),
            list_response: Mutex::new(None),
            todo_response: Mutex::new(None),
            stats_response: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sets the list/search response.
    pub fn set_list_response(&self, response: TodoListResponse) {
        *self.list_response.lock() = Some(response);
    }

    /// Sets the entity returned by get/update/update_status.
    pub fn set_todo_response(&self, todo: Todo) {
        *self.todo_response.lock() = Some(todo);
    }

    /// Sets the stats response.
    pub fn set_stats_response(&self, stats: TodoStats) {
        *self.stats_response.lock() = Some(stats);
    }

    /// Makes every following call fail with `error` (or succeed again with
    /// `None`).
    pub fn set_failure(&self, error: Option<SyncError>) {
        *self.failure.lock() = error;
    }

    /// Sets the connected state.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Names of the calls made so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    /// Number of calls made to the named operation.
    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == name).count()
    }

    fn record(&self, name: &'static str) -> SyncResult<()> {
        self.calls.lock().push(name);
        if !self.connected.load(Ordering::SeqCst) {
            return Err(SyncError::Transport("connection refused".into()));
        }
        match self.failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn scripted_todo(&self) -> SyncResult<Todo> {
        self.todo_response
            .lock()
            .clone()
            .ok_or_else(|| SyncError::Decode("no mock todo response set".into()))
    }

    fn scripted_list(&self) -> SyncResult<TodoListResponse> {
        self.list_response
            .lock()
            .clone()
            .ok_or_else(|| SyncError::Decode("no mock list response set".into()))
    }

    fn materialize(&self, draft: &TodoCreate) -> Todo {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        Todo {
            id: TodoId::new(format!("mock-{n}")),
            title: draft.title.clone(),
            description: draft.description.clone(),
            status: draft.status.unwrap_or_default(),
            priority: draft.priority.unwrap_or_default(),
            due_date: draft.due_date,
            tags: draft.tags.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoBackend for MockBackend {
    async fn list(&self, _filters: &FilterParams) -> SyncResult<TodoListResponse> {
        self.record("list")?;
        self.scripted_list()
    }

    async fn get(&self, _id: &TodoId) -> SyncResult<Todo> {
        self.record("get")?;
        self.scripted_todo()
    }

    async fn create(&self, draft: &TodoCreate) -> SyncResult<Todo> {
        self.record("create")?;
        Ok(self.materialize(draft))
    }

    async fn create_many(&self, drafts: &[TodoCreate]) -> SyncResult<Vec<Todo>> {
        self.record("create_many")?;
        Ok(drafts.iter().map(|draft| self.materialize(draft)).collect())
    }

    async fn update(&self, _id: &TodoId, _patch: &TodoUpdate) -> SyncResult<Todo> {
        self.record("update")?;
        self.scripted_todo()
    }

    async fn update_status(&self, _id: &TodoId, _status: TodoStatus) -> SyncResult<Todo> {
        self.record("update_status")?;
        self.scripted_todo()
    }

    async fn delete(&self, _id: &TodoId) -> SyncResult<()> {
        self.record("delete")
    }

    async fn bulk_update(&self, request: &BulkUpdateRequest) -> SyncResult<Vec<Todo>> {
        self.record("bulk_update")?;
        let template = self.scripted_todo()?;
        Ok(request
            .updates
            .iter()
            .map(|(id, patch)| {
                let mut todo = template.clone();
                todo.id = id.clone();
                patch.apply_to(&mut todo);
                todo
            })
            .collect())
    }

    async fn search(&self, _request: &SearchRequest) -> SyncResult<TodoListResponse> {
        self.record("search")?;
        self.scripted_list()
    }

    async fn stats(&self, _range: &StatsRange) -> SyncResult<TodoStats> {
        self.record("stats")?;
        self.stats_response
            .lock()
            .clone()
            .ok_or_else(|| SyncError::Decode("no mock stats response set".into()))
    }
}
