//! Integration tests for the sync engine against the reference server.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use taskdeck_protocol::{
    BulkCreateRequest, BulkUpdateRequest, FilterParams, Pagination, SearchRequest, StatsRange,
    StatusUpdate, Todo, TodoCreate, TodoId, TodoListResponse, TodoStats, TodoStatus, TodoUpdate,
};
use taskdeck_server::{ServerConfig, ServerError, TodoServer};
use taskdeck_sync::{
    FetchOutcome, RecordingNotifier, SyncEngine, SyncError, SyncResult, TodoBackend, TodoState,
    TodoStore,
};
use taskdeck_testkit::prelude::*;
use tokio::sync::oneshot;

/// A backend that calls straight into an in-memory server.
struct InMemoryBackend {
    server: Arc<TodoServer>,
}

impl InMemoryBackend {
    fn new(server: Arc<TodoServer>) -> Self {
        Self { server }
    }
}

fn to_sync(err: ServerError) -> SyncError {
    SyncError::backend(err.status_code(), err.to_string())
}

#[async_trait]
impl TodoBackend for InMemoryBackend {
    async fn list(&self, filters: &FilterParams) -> SyncResult<TodoListResponse> {
        self.server.handle_list(filters).map_err(to_sync)
    }

    async fn get(&self, id: &TodoId) -> SyncResult<Todo> {
        self.server.handle_get(id).map_err(to_sync)
    }

    async fn create(&self, draft: &TodoCreate) -> SyncResult<Todo> {
        self.server.handle_create(draft.clone()).map_err(to_sync)
    }

    async fn create_many(&self, drafts: &[TodoCreate]) -> SyncResult<Vec<Todo>> {
        self.server
            .handle_create_many(BulkCreateRequest {
                todos: drafts.to_vec(),
            })
            .map_err(to_sync)
    }

    async fn update(&self, id: &TodoId, patch: &TodoUpdate) -> SyncResult<Todo> {
        self.server.handle_update(id, patch.clone()).map_err(to_sync)
    }

    async fn update_status(&self, id: &TodoId, status: TodoStatus) -> SyncResult<Todo> {
        self.server
            .handle_update_status(id, StatusUpdate { status })
            .map_err(to_sync)
    }

    async fn delete(&self, id: &TodoId) -> SyncResult<()> {
        self.server.handle_delete(id).map_err(to_sync)
    }

    async fn bulk_update(&self, request: &BulkUpdateRequest) -> SyncResult<Vec<Todo>> {
        self.server
            .handle_bulk_update(request.clone())
            .map_err(to_sync)
    }

    async fn search(&self, request: &SearchRequest) -> SyncResult<TodoListResponse> {
        self.server.handle_search(request.clone()).map_err(to_sync)
    }

    async fn stats(&self, range: &StatsRange) -> SyncResult<TodoStats> {
        self.server.handle_stats(range).map_err(to_sync)
    }
}

/// Holds the first list request until the gate opens.
struct GatedBackend {
    inner: InMemoryBackend,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

#[async_trait]
impl TodoBackend for GatedBackend {
    async fn list(&self, filters: &FilterParams) -> SyncResult<TodoListResponse> {
        let gate = self.gate.lock().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.inner.list(filters).await
    }

    async fn get(&self, id: &TodoId) -> SyncResult<Todo> {
        self.inner.get(id).await
    }

    async fn create(&self, draft: &TodoCreate) -> SyncResult<Todo> {
        self.inner.create(draft).await
    }

    async fn create_many(&self, drafts: &[TodoCreate]) -> SyncResult<Vec<Todo>> {
        self.inner.create_many(drafts).await
    }

    async fn update(&self, id: &TodoId, patch: &TodoUpdate) -> SyncResult<Todo> {
        self.inner.update(id, patch).await
    }

    async fn update_status(&self, id: &TodoId, status: TodoStatus) -> SyncResult<Todo> {
        self.inner.update_status(id, status).await
    }

    async fn delete(&self, id: &TodoId) -> SyncResult<()> {
        self.inner.delete(id).await
    }

    async fn bulk_update(&self, request: &BulkUpdateRequest) -> SyncResult<Vec<Todo>> {
        self.inner.bulk_update(request).await
    }

    async fn search(&self, request: &SearchRequest) -> SyncResult<TodoListResponse> {
        self.inner.search(request).await
    }

    async fn stats(&self, range: &StatsRange) -> SyncResult<TodoStats> {
        self.inner.stats(range).await
    }
}

/// Three completed and two pending todos.
fn seeded_server() -> Arc<TodoServer> {
    Arc::new(TodoServer::with_todos(
        ServerConfig::default(),
        vec![
            TodoFixture::new("c1", "Ship release").completed().build(),
            TodoFixture::new("c2", "File taxes")
                .completed()
                .created_minutes_later(1)
                .build(),
            TodoFixture::new("c3", "Renew passport")
                .completed()
                .created_minutes_later(2)
                .build(),
            TodoFixture::new("a", "Call mom").created_minutes_later(3).build(),
            TodoFixture::new("b", "Water plants")
                .tags(&["home"])
                .created_minutes_later(4)
                .build(),
        ],
    ))
}

fn engine_for(
    server: &Arc<TodoServer>,
) -> (
    SyncEngine<InMemoryBackend, Arc<RecordingNotifier>>,
    Arc<RecordingNotifier>,
) {
    let notifier = Arc::new(RecordingNotifier::new());
    let engine = SyncEngine::new(
        Arc::new(TodoStore::default()),
        InMemoryBackend::new(Arc::clone(server)),
        Arc::clone(&notifier),
    );
    (engine, notifier)
}

#[tokio::test]
async fn fetch_completed_page() {
    let server = seeded_server();
    let (engine, _) = engine_for(&server);

    let filters = FilterParams::new()
        .with_status(TodoStatus::Completed)
        .with_page(1)
        .with_size(10);
    engine.fetch_with(filters).await.unwrap();

    let state = engine.snapshot();
    assert_eq!(state.todos.len(), 3);
    assert!(state
        .todos
        .iter()
        .all(|todo| todo.status == TodoStatus::Completed));
    assert_eq!(state.pagination.total, 3);
    assert_eq!(state.pagination.total_pages, 1);
    assert!(state.initialized);
}

#[tokio::test]
async fn fetch_without_size_uses_store_page_size() {
    let server = seeded_server();
    let engine = SyncEngine::new(
        Arc::new(TodoStore::new(TodoState::with_page_size(2))),
        InMemoryBackend::new(Arc::clone(&server)),
        RecordingNotifier::new(),
    );

    let outcome = engine
        .fetch_with(FilterParams::new().with_page(2))
        .await
        .unwrap();
    assert_eq!(outcome, FetchOutcome::Applied(Pagination::new(2, 2, 5)));

    let state = engine.snapshot();
    assert_eq!(state.todos.len(), 2);
    assert_eq!(state.pagination.total_pages, 3);
    assert_eq!(state.filters.size(), 2);
}

#[tokio::test]
async fn create_lands_first_with_server_fields() {
    let server = seeded_server();
    let (engine, notifier) = engine_for(&server);
    engine.fetch().await.unwrap();

    let created = engine.create(TodoCreate::new("Buy milk")).await.unwrap();

    let state = engine.snapshot();
    let first = &state.todos[0];
    assert_eq!(first.title, "Buy milk");
    assert_eq!(first.id, created.id);
    assert!(!first.id.as_str().is_empty());
    assert_eq!(first.created_at, first.updated_at);
    assert_eq!(state.pagination.total, 6);
    assert_eq!(server.len(), 6);
    assert!(!notifier.last().unwrap().is_error());
}

#[tokio::test]
async fn blank_title_never_reaches_the_server() {
    let server = seeded_server();
    let (engine, notifier) = engine_for(&server);
    engine.fetch().await.unwrap();
    let before = engine.snapshot();

    let err = engine.create(TodoCreate::new("")).await.unwrap_err();
    assert!(matches!(err, SyncError::Validation(_)));
    assert_eq!(server.len(), 5);
    assert_eq!(engine.snapshot(), before);
    assert!(notifier.last().unwrap().is_error());
}

#[tokio::test]
async fn bulk_update_reconciles_selection() {
    let server = seeded_server();
    let (engine, notifier) = engine_for(&server);
    engine.fetch().await.unwrap();
    engine.set_selected(vec![TodoId::new("a"), TodoId::new("b")]);

    engine
        .bulk_update_selected(TodoUpdate::status(TodoStatus::Completed))
        .await
        .unwrap();

    let state = engine.snapshot();
    for id in ["a", "b"] {
        let todo = state.todo(&TodoId::new(id)).unwrap();
        assert_eq!(todo.status, TodoStatus::Completed);
    }
    assert!(state.selected.is_empty());
    assert_eq!(notifier.last().unwrap().description, "Updated 2 todos");
}

#[tokio::test]
async fn bulk_delete_removes_from_server() {
    let server = seeded_server();
    let (engine, _) = engine_for(&server);
    engine.fetch().await.unwrap();
    engine.set_selected(vec![TodoId::new("c1"), TodoId::new("c2")]);

    engine.bulk_delete_selected().await.unwrap();

    assert_eq!(server.len(), 3);
    let state = engine.snapshot();
    assert_eq!(state.pagination.total, 3);
    assert!(!state.contains(&TodoId::new("c1")));
    assert!(state.selected.is_empty());
}

#[tokio::test]
async fn bulk_delete_reports_partial_failure() {
    let server = seeded_server();
    let (engine, _) = engine_for(&server);
    engine.fetch().await.unwrap();
    engine.set_selected(vec![TodoId::new("c1")]);
    server.handle_delete(&TodoId::new("c1")).unwrap();

    let err = engine
        .bulk_delete(&[TodoId::new("c1"), TodoId::new("c2")])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    // c2 was still deleted; only a later fetch reveals it.
    assert_eq!(server.len(), 3);
    assert_eq!(engine.snapshot().selected.len(), 1);
}

#[tokio::test]
async fn missing_todo_sets_store_error() {
    let server = seeded_server();
    let (engine, notifier) = engine_for(&server);

    let err = engine.delete(&TodoId::new("ghost")).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(engine.snapshot().error.is_some());
    assert_eq!(notifier.error_count(), 1);
}

#[tokio::test]
async fn filter_changes_refetch() {
    let server = seeded_server();
    let (engine, _) = engine_for(&server);
    engine.fetch().await.unwrap();
    assert_eq!(engine.snapshot().todos.len(), 5);

    engine
        .set_filters(FilterParams::default().with_tag("home"))
        .await
        .unwrap();
    let state = engine.snapshot();
    assert_eq!(state.todos.len(), 1);
    assert_eq!(state.todos[0].id.as_str(), "b");

    engine.replace_filters(FilterParams::new()).await.unwrap();
    assert_eq!(engine.snapshot().todos.len(), 5);
}

#[tokio::test]
async fn paging_through_results() {
    let server = seeded_server();
    let (engine, _) = engine_for(&server);

    engine.set_page_size(2).await.unwrap();
    let state = engine.snapshot();
    assert_eq!(state.todos.len(), 2);
    assert_eq!(state.pagination.total_pages, 3);

    engine.set_page(3).await.unwrap();
    let state = engine.snapshot();
    assert_eq!(state.todos.len(), 1);
    assert_eq!(state.todos[0].id.as_str(), "c1");
}

#[tokio::test]
async fn search_and_stats() {
    let server = seeded_server();
    let (engine, _) = engine_for(&server);

    engine.search("PLANTS").await.unwrap();
    let state = engine.snapshot();
    assert_eq!(state.todos.len(), 1);
    assert_eq!(state.todos[0].title, "Water plants");

    let stats = engine.stats(StatsRange::all()).await.unwrap();
    assert_eq!(stats.total_todos, 5);
    assert_eq!(stats.completed_todos, 3);
    assert!((stats.completion_rate - 60.0).abs() < 1e-9);
}

#[tokio::test]
async fn create_many_then_status_change() {
    let server = Arc::new(TodoServer::default());
    let (engine, _) = engine_for(&server);

    let created = engine
        .create_many(vec![TodoCreate::new("one"), TodoCreate::new("two")])
        .await
        .unwrap();
    assert_eq!(engine.snapshot().todos.len(), 2);

    let todo = engine
        .update_status(&created[0].id, TodoStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(todo.status, TodoStatus::InProgress);
    assert!(todo.updated_at >= todo.created_at);
    let cached = engine.snapshot().todo(&created[0].id).cloned().unwrap();
    assert_eq!(cached, todo);
}

#[tokio::test]
async fn stale_response_is_discarded() {
    let server = seeded_server();
    let (open, gate) = oneshot::channel();
    let backend = GatedBackend {
        inner: InMemoryBackend::new(Arc::clone(&server)),
        gate: Mutex::new(Some(gate)),
    };
    let notifier = Arc::new(RecordingNotifier::new());
    let engine = SyncEngine::new(Arc::new(TodoStore::default()), backend, notifier);

    // The pending query is issued first but resolves last.
    let slow = engine.fetch_with(FilterParams::new().with_status(TodoStatus::Pending));
    let fast = async {
        let outcome = engine
            .fetch_with(FilterParams::new().with_status(TodoStatus::Completed))
            .await;
        let _ = open.send(());
        outcome
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(slow.unwrap(), FetchOutcome::Stale);
    assert!(fast.unwrap().is_applied());

    let state = engine.snapshot();
    assert_eq!(state.todos.len(), 3);
    assert!(state
        .todos
        .iter()
        .all(|todo| todo.status == TodoStatus::Completed));
    assert!(!state.loading);
}
