//! The sync engine.
//!
//! Bridges user intents to backend calls and translates every outcome into
//! store actions plus a user-facing notification.
//!
//! ## Fetch sequencing
//!
//! Every list request (fetch or search) takes a number from a monotonically
//! increasing sequence. When a response arrives its number is compared with
//! the latest one issued while the store is locked; older responses are
//! discarded, so a slow request can never overwrite a newer page.

use crate::config::ClientConfig;
use crate::error::{SyncError, SyncResult};
use crate::http::HttpBackend;
use crate::notify::{Notification, Notifier};
use crate::state::{TodoAction, TodoState, ViewMode};
use crate::store::TodoStore;
use crate::transport::TodoBackend;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use taskdeck_protocol::{
    BulkUpdateRequest, FilterParams, Pagination, SearchRequest, StatsRange, Todo, TodoCreate,
    TodoId, TodoListResponse, TodoStats, TodoStatus, TodoUpdate,
};

/// What happened to a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was committed to the store.
    Applied(Pagination),
    /// A newer request was issued meanwhile; the response was dropped.
    Stale,
}

impl FetchOutcome {
    /// Returns true if the response reached the store.
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied(_))
    }
}

/// Drives a [`TodoStore`] from a [`TodoBackend`].
pub struct SyncEngine<B: TodoBackend, N: Notifier> {
    store: Arc<TodoStore>,
    backend: Arc<B>,
    notifier: N,
    fetch_seq: AtomicU64,
}

impl<B: TodoBackend, N: Notifier> SyncEngine<B, N> {
    /// Creates an engine over an existing store.
    pub fn new(store: Arc<TodoStore>, backend: B, notifier: N) -> Self {
        Self {
            store,
            backend: Arc::new(backend),
            notifier,
            fetch_seq: AtomicU64::new(0),
        }
    }

    /// The store this engine drives.
    pub fn store(&self) -> &Arc<TodoStore> {
        &self.store
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> TodoState {
        self.store.snapshot()
    }

    // ---- reads ----

    /// Fetches the page described by the store's current filters.
    pub async fn fetch(&self) -> SyncResult<FetchOutcome> {
        let filters = self.store.read(|state| state.filters.clone());
        self.fetch_with(filters).await
    }

    /// Fetches the page described by `filters`.
    ///
    /// The store's filters are left untouched; use [`Self::set_filters`] to
    /// change the active query. A missing page size falls back to the
    /// store's.
    pub async fn fetch_with(&self, mut filters: FilterParams) -> SyncResult<FetchOutcome> {
        if filters.size.unwrap_or(0) == 0 {
            filters.size = Some(self.store.read(|state| state.filters.size()));
        }
        let filters = filters.normalized();
        let seq = self.begin_list_request();
        tracing::debug!(seq, page = filters.page(), size = filters.size(), "fetching todos");

        let result = self.backend.list(&filters).await;
        self.settle_list(seq, result, "Failed to fetch todos")
    }

    /// Searches with the current filters plus a free-text query.
    pub async fn search(&self, query: &str) -> SyncResult<FetchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(self.fail(
                "search",
                SyncError::validation("search query must not be empty"),
                "Failed to search todos",
            ));
        }

        let filters = self.store.read(|state| state.filters.normalized());
        let request = SearchRequest::new(query, filters);
        let seq = self.begin_list_request();
        tracing::debug!(seq, query, "searching todos");

        let result = self.backend.search(&request).await;
        self.settle_list(seq, result, "Failed to search todos")
    }

    /// Fetches one todo and refreshes its cached copy if it is loaded.
    pub async fn get(&self, id: &TodoId) -> SyncResult<Todo> {
        match self.backend.get(id).await {
            Ok(todo) => {
                self.store.dispatch(TodoAction::UpdateTodo(todo.clone()));
                Ok(todo)
            }
            Err(err) => Err(self.fail("get", err, "Failed to fetch todo")),
        }
    }

    /// Aggregate statistics. Never touches the store.
    pub async fn stats(&self, range: StatsRange) -> SyncResult<TodoStats> {
        self.backend.stats(&range).await.map_err(|err| {
            tracing::warn!(error = %err, "stats request failed");
            self.notifier
                .notify(Notification::error("Failed to fetch statistics"));
            err
        })
    }

    // ---- single-item writes ----

    /// Creates a todo and prepends the stored entity.
    pub async fn create(&self, draft: TodoCreate) -> SyncResult<Todo> {
        if let Err(err) = draft.validate() {
            return Err(self.fail("create", err.into(), "Failed to create todo"));
        }

        match self.backend.create(&draft).await {
            Ok(todo) => {
                tracing::debug!(id = %todo.id, "todo created");
                self.store.dispatch(TodoAction::AddTodo(todo.clone()));
                self.notifier
                    .notify(Notification::success("Todo created successfully"));
                Ok(todo)
            }
            Err(err) => Err(self.fail("create", err, "Failed to create todo")),
        }
    }

    /// Applies a partial update; the cache receives the full server entity.
    pub async fn update(&self, id: &TodoId, patch: TodoUpdate) -> SyncResult<Todo> {
        if let Err(err) = validate_patch(&patch) {
            return Err(self.fail("update", err, "Failed to update todo"));
        }

        match self.backend.update(id, &patch).await {
            Ok(todo) => {
                self.store.dispatch(TodoAction::UpdateTodo(todo.clone()));
                self.notifier
                    .notify(Notification::success("Todo updated successfully"));
                Ok(todo)
            }
            Err(err) => Err(self.fail("update", err, "Failed to update todo")),
        }
    }

    /// Changes only the status through the dedicated endpoint.
    pub async fn update_status(&self, id: &TodoId, status: TodoStatus) -> SyncResult<Todo> {
        match self.backend.update_status(id, status).await {
            Ok(todo) => {
                self.store.dispatch(TodoAction::UpdateTodo(todo.clone()));
                self.notifier
                    .notify(Notification::success(format!("Todo marked as {status}")));
                Ok(todo)
            }
            Err(err) => Err(self.fail("update_status", err, "Failed to update todo status")),
        }
    }

    /// Deletes a todo. On failure the entry stays loaded.
    pub async fn delete(&self, id: &TodoId) -> SyncResult<()> {
        match self.backend.delete(id).await {
            Ok(()) => {
                self.store.dispatch(TodoAction::DeleteTodo(id.clone()));
                self.notifier
                    .notify(Notification::success("Todo deleted successfully"));
                Ok(())
            }
            Err(err) => Err(self.fail("delete", err, "Failed to delete todo")),
        }
    }

    // ---- bulk writes ----

    /// Creates several todos, then reconciles with a full fetch.
    pub async fn create_many(&self, drafts: Vec<TodoCreate>) -> SyncResult<Vec<Todo>> {
        let checked = if drafts.is_empty() {
            Err(SyncError::validation("no todos to create"))
        } else {
            drafts
                .iter()
                .try_for_each(TodoCreate::validate)
                .map_err(SyncError::from)
        };
        if let Err(err) = checked {
            return Err(self.fail("create_many", err, "Failed to create todos"));
        }

        match self.backend.create_many(&drafts).await {
            Ok(created) => {
                self.reconcile().await;
                self.notifier
                    .notify(Notification::success(format!("Created {} todos", created.len())));
                Ok(created)
            }
            Err(err) => Err(self.fail("create_many", err, "Failed to create todos")),
        }
    }

    /// Applies the same patch to every id, reconciles, then clears the
    /// selection.
    pub async fn bulk_update(&self, ids: &[TodoId], patch: TodoUpdate) -> SyncResult<Vec<Todo>> {
        let checked = if ids.is_empty() {
            Err(SyncError::validation("no todos selected"))
        } else {
            validate_patch(&patch)
        };
        if let Err(err) = checked {
            return Err(self.fail("bulk_update", err, "Failed to update todos"));
        }

        let request = BulkUpdateRequest::uniform(ids, &patch);
        match self.backend.bulk_update(&request).await {
            Ok(updated) => {
                self.reconcile().await;
                self.store.dispatch(TodoAction::SetSelected(Vec::new()));
                self.notifier
                    .notify(Notification::success(format!("Updated {} todos", ids.len())));
                Ok(updated)
            }
            Err(err) => Err(self.fail("bulk_update", err, "Failed to update todos")),
        }
    }

    /// [`Self::bulk_update`] over the current selection.
    pub async fn bulk_update_selected(&self, patch: TodoUpdate) -> SyncResult<Vec<Todo>> {
        let ids = self.store.read(TodoState::selected_ids);
        self.bulk_update(&ids, patch).await
    }

    /// Deletes every id, reconciles, then clears the selection.
    pub async fn bulk_delete(&self, ids: &[TodoId]) -> SyncResult<()> {
        if ids.is_empty() {
            return Err(self.fail(
                "bulk_delete",
                SyncError::validation("no todos selected"),
                "Failed to delete todos",
            ));
        }

        match self.backend.bulk_delete(ids).await {
            Ok(()) => {
                self.reconcile().await;
                self.store.dispatch(TodoAction::SetSelected(Vec::new()));
                self.notifier
                    .notify(Notification::success(format!("Deleted {} todos", ids.len())));
                Ok(())
            }
            Err(err) => Err(self.fail("bulk_delete", err, "Failed to delete todos")),
        }
    }

    /// [`Self::bulk_delete`] over the current selection.
    pub async fn bulk_delete_selected(&self) -> SyncResult<()> {
        let ids = self.store.read(TodoState::selected_ids);
        self.bulk_delete(&ids).await
    }

    // ---- query and view intents ----

    /// Merges `partial` into the active filters and refetches if anything
    /// changed. Returns `None` when the descriptor stayed the same.
    pub async fn set_filters(&self, partial: FilterParams) -> SyncResult<Option<FetchOutcome>> {
        let previous = self.store.read(|state| state.filters.clone());
        if previous.merged(&partial) == previous {
            return Ok(None);
        }
        self.store.dispatch(TodoAction::SetFilters(partial));
        self.fetch().await.map(Some)
    }

    /// Replaces the active filters (clearing any constraint `filters`
    /// lacks) and refetches if anything changed.
    pub async fn replace_filters(&self, filters: FilterParams) -> SyncResult<Option<FetchOutcome>> {
        let filters = filters.normalized();
        if self.store.read(|state| state.filters == filters) {
            return Ok(None);
        }
        self.store.dispatch(TodoAction::ReplaceFilters(filters));
        self.fetch().await.map(Some)
    }

    /// Moves to another page.
    pub async fn set_page(&self, page: u32) -> SyncResult<Option<FetchOutcome>> {
        self.set_filters(FilterParams {
            page: Some(page.max(1)),
            ..FilterParams::default()
        })
        .await
    }

    /// Changes the page size and returns to the first page.
    pub async fn set_page_size(&self, size: u32) -> SyncResult<Option<FetchOutcome>> {
        if size == 0 {
            return Err(self.fail(
                "set_page_size",
                SyncError::validation("page size must be positive"),
                "Failed to change page size",
            ));
        }
        self.set_filters(FilterParams {
            page: Some(1),
            size: Some(size),
            ..FilterParams::default()
        })
        .await
    }

    /// Switches the view.
    pub fn set_view_mode(&self, mode: ViewMode) {
        self.store.dispatch(TodoAction::SetViewMode(mode));
    }

    /// Toggles one id in the selection.
    pub fn toggle_selection(&self, id: TodoId) {
        self.store.dispatch(TodoAction::ToggleSelection(id));
    }

    /// Replaces the selection.
    pub fn set_selected(&self, ids: Vec<TodoId>) {
        self.store.dispatch(TodoAction::SetSelected(ids));
    }

    // ---- internals ----

    fn begin_list_request(&self) -> u64 {
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.store.dispatch(TodoAction::SetLoading(true));
        seq
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.fetch_seq.load(Ordering::SeqCst) == seq
    }

    fn settle_list(
        &self,
        seq: u64,
        result: SyncResult<TodoListResponse>,
        failure: &str,
    ) -> SyncResult<FetchOutcome> {
        match result {
            Ok(response) => {
                let pagination = response.pagination();
                let applied = self.store.dispatch_if(
                    |_| self.is_latest(seq),
                    vec![
                        TodoAction::SetTodos {
                            todos: response.todos,
                            pagination,
                        },
                        TodoAction::SetInitialized(true),
                    ],
                );
                if applied {
                    tracing::debug!(seq, total = pagination.total, "page applied");
                    Ok(FetchOutcome::Applied(pagination))
                } else {
                    tracing::warn!(seq, "discarding stale list response");
                    Ok(FetchOutcome::Stale)
                }
            }
            Err(err) => {
                let applied = self.store.dispatch_if(
                    |_| self.is_latest(seq),
                    vec![
                        TodoAction::SetError(Some(err.to_string())),
                        TodoAction::SetInitialized(true),
                    ],
                );
                if applied {
                    tracing::warn!(seq, error = %err, "{failure}");
                    self.notifier.notify(Notification::error(failure));
                    Err(err)
                } else {
                    tracing::warn!(seq, error = %err, "discarding stale list failure");
                    Ok(FetchOutcome::Stale)
                }
            }
        }
    }

    /// Full refetch after a bulk operation. Its own failure is reported by
    /// `fetch` and does not fail the bulk intent.
    async fn reconcile(&self) {
        if let Err(err) = self.fetch().await {
            tracing::warn!(error = %err, "reconciliation fetch failed");
        }
    }

    /// Records a failed intent: logs it, sets the store error for failures
    /// that happened after a call was issued, and notifies the user.
    fn fail(&self, intent: &'static str, err: SyncError, message: &str) -> SyncError {
        tracing::warn!(intent, error = %err, "{message}");
        if err.sets_store_error() {
            self.store
                .dispatch(TodoAction::SetError(Some(err.to_string())));
        }
        let description = match &err {
            SyncError::Validation(reason) => format!("{message}: {reason}"),
            _ => message.to_string(),
        };
        self.notifier.notify(Notification::error(description));
        err
    }
}

impl<N: Notifier> SyncEngine<HttpBackend, N> {
    /// Builds a fresh store and a REST backend from `config`.
    pub fn over_http(config: &ClientConfig, notifier: N) -> SyncResult<Self> {
        let backend = HttpBackend::new(config)?;
        let store = TodoStore::new(TodoState::with_page_size(config.default_page_size));
        Ok(Self::new(Arc::new(store), backend, notifier))
    }
}

fn validate_patch(patch: &TodoUpdate) -> SyncResult<()> {
    if patch.is_empty() {
        return Err(SyncError::validation("update has no fields"));
    }
    patch.validate().map_err(SyncError::from)
}
