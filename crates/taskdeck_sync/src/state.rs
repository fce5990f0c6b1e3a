//! Todo list state and its transition function.
//!
//! `TodoState` is a cache of one page of the backend's todo list plus the
//! client-only view state. It is changed exclusively through
//! [`TodoAction`]s; [`reduce`] never performs I/O.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use taskdeck_protocol::{FilterParams, Pagination, Todo, TodoId};

/// Visual arrangement of the todo list. Does not affect the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Flat list.
    #[default]
    List,
    /// Columns per status.
    Kanban,
    /// Due-date calendar.
    Calendar,
    /// Statistics overview.
    Dashboard,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewMode::List => "list",
            ViewMode::Kanban => "kanban",
            ViewMode::Calendar => "calendar",
            ViewMode::Dashboard => "dashboard",
        };
        f.write_str(name)
    }
}

/// The client-side todo state.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoState {
    /// Current page of todos, in server order.
    pub todos: Vec<Todo>,
    /// A list request is in flight.
    pub loading: bool,
    /// Last recorded failure.
    pub error: Option<String>,
    /// Active query descriptor.
    pub filters: FilterParams,
    /// Active view.
    pub view_mode: ViewMode,
    /// Selected ids, always a subset of the loaded ids.
    pub selected: BTreeSet<TodoId>,
    /// Pagination snapshot of the last list response, adjusted locally by
    /// add/delete.
    pub pagination: Pagination,
    /// Set once the first fetch has completed, successfully or not.
    pub initialized: bool,
}

impl TodoState {
    /// Initial state with the given page size.
    pub fn with_page_size(size: u32) -> Self {
        let filters = FilterParams::new().with_size(size).normalized();
        let pagination = Pagination::new(filters.page(), filters.size(), 0);
        Self {
            todos: Vec::new(),
            loading: false,
            error: None,
            filters,
            view_mode: ViewMode::default(),
            selected: BTreeSet::new(),
            pagination,
            initialized: false,
        }
    }

    /// Returns true if a todo with this id is loaded.
    pub fn contains(&self, id: &TodoId) -> bool {
        self.todos.iter().any(|todo| &todo.id == id)
    }

    /// Looks up a loaded todo.
    pub fn todo(&self, id: &TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| &todo.id == id)
    }

    /// Returns true if the id is selected.
    pub fn is_selected(&self, id: &TodoId) -> bool {
        self.selected.contains(id)
    }

    /// Selected ids in a stable order.
    pub fn selected_ids(&self) -> Vec<TodoId> {
        self.selected.iter().cloned().collect()
    }

    /// Applies one action in place.
    pub fn apply(&mut self, action: TodoAction) {
        match action {
            TodoAction::SetLoading(loading) => self.loading = loading,
            TodoAction::SetTodos { todos, pagination } => {
                self.todos = todos;
                self.pagination = pagination;
                self.error = None;
                self.loading = false;
                self.prune_selection();
            }
            TodoAction::AddTodo(todo) => {
                self.todos.insert(0, todo);
                self.pagination = self.pagination.with_total(self.pagination.total + 1);
            }
            TodoAction::UpdateTodo(todo) => {
                if let Some(slot) = self.todos.iter_mut().find(|t| t.id == todo.id) {
                    *slot = todo;
                }
            }
            TodoAction::DeleteTodo(id) => {
                let before = self.todos.len();
                self.todos.retain(|todo| todo.id != id);
                if self.todos.len() < before {
                    let total = self.pagination.total.saturating_sub(1);
                    self.pagination = self.pagination.with_total(total);
                    self.selected.remove(&id);
                }
            }
            TodoAction::SetError(error) => {
                self.error = error;
                self.loading = false;
            }
            TodoAction::SetFilters(partial) => self.filters.merge(&partial),
            TodoAction::ReplaceFilters(filters) => self.filters = filters,
            TodoAction::SetViewMode(mode) => self.view_mode = mode,
            TodoAction::SetSelected(ids) => {
                self.selected = ids.into_iter().filter(|id| self.contains(id)).collect();
            }
            TodoAction::ToggleSelection(id) => {
                if !self.selected.remove(&id) && self.contains(&id) {
                    self.selected.insert(id);
                }
            }
            TodoAction::SetInitialized(initialized) => self.initialized = initialized,
        }
    }

    fn prune_selection(&mut self) {
        let loaded: BTreeSet<&TodoId> = self.todos.iter().map(|todo| &todo.id).collect();
        self.selected.retain(|id| loaded.contains(id));
    }
}

impl Default for TodoState {
    fn default() -> Self {
        Self::with_page_size(taskdeck_protocol::DEFAULT_PAGE_SIZE)
    }
}

/// A state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TodoAction {
    /// Sets the loading flag.
    SetLoading(bool),
    /// Replaces the todo page and pagination; clears error and loading.
    SetTodos {
        /// New page.
        todos: Vec<Todo>,
        /// New pagination snapshot.
        pagination: Pagination,
    },
    /// Prepends a todo and increments the total.
    AddTodo(Todo),
    /// Replaces the todo with the same id; no-op if it is not loaded.
    UpdateTodo(Todo),
    /// Removes a todo and decrements the total; no-op if it is not loaded.
    DeleteTodo(TodoId),
    /// Sets or clears the error; clears loading.
    SetError(Option<String>),
    /// Shallow-merges the present fields into the filters.
    SetFilters(FilterParams),
    /// Replaces the filters wholesale, which is the only way to drop a
    /// constraint.
    ReplaceFilters(FilterParams),
    /// Sets the view mode.
    SetViewMode(ViewMode),
    /// Replaces the selection.
    SetSelected(Vec<TodoId>),
    /// Adds the id to the selection if absent, removes it otherwise.
    ToggleSelection(TodoId),
    /// Sets the initialized flag.
    SetInitialized(bool),
}

impl TodoAction {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            TodoAction::SetLoading(_) => "set-loading",
            TodoAction::SetTodos { .. } => "set-todos",
            TodoAction::AddTodo(_) => "add-todo",
            TodoAction::UpdateTodo(_) => "update-todo",
            TodoAction::DeleteTodo(_) => "delete-todo",
            TodoAction::SetError(_) => "set-error",
            TodoAction::SetFilters(_) => "set-filters",
            TodoAction::ReplaceFilters(_) => "replace-filters",
            TodoAction::SetViewMode(_) => "set-view-mode",
            TodoAction::SetSelected(_) => "set-selected",
            TodoAction::ToggleSelection(_) => "toggle-selection",
            TodoAction::SetInitialized(_) => "set-initialized",
        }
    }
}

/// Pure transition function: returns the state after `action`.
pub fn reduce(state: &TodoState, action: TodoAction) -> TodoState {
    let mut next = state.clone();
    next.apply(action);
    next
}
