//! The state-and-dispatcher object.
//!
//! A `TodoStore` is constructed by the application root and handed to
//! every consumer by reference. Dispatches are applied one at a time and
//! each committed state is published to subscribers.

use crate::state::{TodoAction, TodoState};
use tokio::sync::watch;

/// Owns the todo state and serializes every transition.
pub struct TodoStore {
    state: watch::Sender<TodoState>,
}

impl TodoStore {
    /// Creates a store holding `initial`.
    pub fn new(initial: TodoState) -> Self {
        let (state, _) = watch::channel(initial);
        Self { state }
    }

    /// Applies an action.
    pub fn dispatch(&self, action: TodoAction) {
        tracing::trace!(action = action.name(), "dispatch");
        self.state.send_modify(|state| state.apply(action));
    }

    /// Applies the actions as one transition if `guard` accepts the current
    /// state. Returns whether they were applied.
    ///
    /// The guard runs while the store is locked, so no other dispatch can
    /// slip in between the check and the update.
    pub fn dispatch_if<G>(&self, guard: G, actions: Vec<TodoAction>) -> bool
    where
        G: FnOnce(&TodoState) -> bool,
    {
        self.state.send_if_modified(|state| {
            if !guard(state) {
                return false;
            }
            for action in actions {
                tracing::trace!(action = action.name(), "dispatch");
                state.apply(action);
            }
            true
        })
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> TodoState {
        self.state.borrow().clone()
    }

    /// Reads from the current state without cloning it.
    ///
    /// The closure must not dispatch.
    pub fn read<R>(&self, f: impl FnOnce(&TodoState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Returns a receiver that observes every committed state.
    pub fn subscribe(&self) -> watch::Receiver<TodoState> {
        self.state.subscribe()
    }
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new(TodoState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ViewMode;
    use taskdeck_protocol::{Pagination, TodoId};
    use taskdeck_testkit::prelude::*;

    #[test]
    fn dispatch_updates_snapshot() {
        let store = TodoStore::default();
        store.dispatch(TodoAction::SetViewMode(ViewMode::Calendar));
        assert_eq!(store.snapshot().view_mode, ViewMode::Calendar);
        assert_eq!(store.read(|s| s.view_mode), ViewMode::Calendar);
    }

    #[test]
    fn guarded_dispatch() {
        let store = TodoStore::default();
        let applied = store.dispatch_if(|_| false, vec![TodoAction::SetLoading(true)]);
        assert!(!applied);
        assert!(!store.snapshot().loading);

        let applied = store.dispatch_if(
            |state| !state.initialized,
            vec![
                TodoAction::SetTodos {
                    todos: vec![TodoFixture::new("a", "A").build()],
                    pagination: Pagination::new(1, 10, 1),
                },
                TodoAction::SetInitialized(true),
            ],
        );
        assert!(applied);
        let state = store.snapshot();
        assert!(state.initialized);
        assert!(state.contains(&TodoId::new("a")));
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let store = TodoStore::default();
        let mut rx = store.subscribe();
        store.dispatch(TodoAction::SetLoading(true));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().loading);
    }
}
