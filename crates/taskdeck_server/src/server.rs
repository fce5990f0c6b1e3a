//! Main todo server.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::table::TodoTable;
use chrono::Utc;
use taskdeck_protocol::{
    BulkCreateRequest, BulkUpdateRequest, FilterParams, Pagination, SearchRequest, StatsRange,
    StatusUpdate, Todo, TodoCreate, TodoId, TodoListResponse, TodoStats, TodoUpdate,
};

/// The todo server.
///
/// Implements every endpoint of the todo REST contract in process. A
/// transport (HTTP router, test adapter) maps requests onto the
/// `handle_*` methods and errors onto [`ServerError::status_code`].
///
/// # Example
///
/// ```
/// use taskdeck_server::{ServerConfig, TodoServer};
/// use taskdeck_protocol::{FilterParams, TodoCreate};
///
/// let server = TodoServer::new(ServerConfig::default());
/// server.handle_create(TodoCreate::new("Buy milk")).unwrap();
///
/// let page = server.handle_list(&FilterParams::new()).unwrap();
/// assert_eq!(page.total, 1);
/// ```
pub struct TodoServer {
    config: ServerConfig,
    table: TodoTable,
}

impl TodoServer {
    /// Creates an empty server.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            table: TodoTable::new(),
        }
    }

    /// Creates a server preloaded with existing todos.
    pub fn with_todos(config: ServerConfig, todos: Vec<Todo>) -> Self {
        Self {
            config,
            table: TodoTable::with_rows(todos),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of stored todos.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if no todos are stored.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// `GET /todos`
    pub fn handle_list(&self, filters: &FilterParams) -> ServerResult<TodoListResponse> {
        let page = filters.page();
        let size = self.config.page_size(filters.size);
        let window = Pagination::new(page, size, 0);

        let (todos, total) = self.table.query(filters, window.offset(), size as usize);
        tracing::debug!(page, size, total, "list");
        Ok(TodoListResponse::new(todos, window.with_total(total)))
    }

    /// `GET /todos/{id}`
    pub fn handle_get(&self, id: &TodoId) -> ServerResult<Todo> {
        self.table
            .get(id)
            .ok_or_else(|| ServerError::NotFound(id.clone()))
    }

    /// `POST /todos`
    pub fn handle_create(&self, draft: TodoCreate) -> ServerResult<Todo> {
        draft.validate()?;
        let mut created = self.table.insert(std::slice::from_ref(&draft), Utc::now());
        let todo = created
            .pop()
            .ok_or_else(|| ServerError::Internal("insert produced no row".into()))?;
        tracing::debug!(id = %todo.id, "created");
        Ok(todo)
    }

    /// `POST /todos/bulk`
    ///
    /// Either every draft is stored or none is.
    pub fn handle_create_many(&self, request: BulkCreateRequest) -> ServerResult<Vec<Todo>> {
        for (index, draft) in request.todos.iter().enumerate() {
            draft
                .validate()
                .map_err(|e| ServerError::InvalidRequest(format!("todos[{index}]: {e}")))?;
        }
        let created = self.table.insert(&request.todos, Utc::now());
        tracing::debug!(count = created.len(), "bulk created");
        Ok(created)
    }

    /// `PUT /todos/{id}`
    pub fn handle_update(&self, id: &TodoId, patch: TodoUpdate) -> ServerResult<Todo> {
        patch.validate()?;
        self.table
            .update(id, &patch, Utc::now())
            .ok_or_else(|| ServerError::NotFound(id.clone()))
    }

    /// `PATCH /todos/{id}/status`
    pub fn handle_update_status(&self, id: &TodoId, body: StatusUpdate) -> ServerResult<Todo> {
        self.handle_update(id, TodoUpdate::status(body.status))
    }

    /// `DELETE /todos/{id}`
    pub fn handle_delete(&self, id: &TodoId) -> ServerResult<()> {
        if self.table.remove(id) {
            tracing::debug!(%id, "deleted");
            Ok(())
        } else {
            Err(ServerError::NotFound(id.clone()))
        }
    }

    /// `PUT /todos/bulk`
    ///
    /// Ids that do not exist are skipped; the response lists the todos that
    /// were updated.
    pub fn handle_bulk_update(&self, request: BulkUpdateRequest) -> ServerResult<Vec<Todo>> {
        for patch in request.updates.values() {
            patch.validate()?;
        }
        let now = Utc::now();
        let updated: Vec<Todo> = request
            .updates
            .iter()
            .filter_map(|(id, patch)| self.table.update(id, patch, now))
            .collect();
        tracing::debug!(requested = request.len(), updated = updated.len(), "bulk updated");
        Ok(updated)
    }

    /// `POST /todos/search`
    pub fn handle_search(&self, request: SearchRequest) -> ServerResult<TodoListResponse> {
        if request.query.trim().is_empty() {
            return Err(ServerError::InvalidRequest("query must not be empty".into()));
        }
        self.handle_list(&request.as_filters())
    }

    /// `GET /todos/stats`
    pub fn handle_stats(&self, range: &StatsRange) -> ServerResult<TodoStats> {
        let rows = self.table.rows();
        Ok(TodoStats::compute(&rows, range, Utc::now()))
    }
}

impl Default for TodoServer {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}
