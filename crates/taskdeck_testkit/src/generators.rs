//! Property-based test generators using proptest.
//!
//! Provides strategies for generating todos and filter descriptors that
//! respect the protocol invariants (non-empty titles, unique ids).

use crate::fixtures::base_time;
use chrono::Duration;
use proptest::prelude::*;
use std::collections::BTreeMap;
use taskdeck_protocol::{FilterParams, Todo, TodoId, TodoPriority, TodoStatus};

/// Strategy for generating opaque todo ids.
pub fn todo_id_strategy() -> impl Strategy<Value = TodoId> {
    prop::string::string_regex("[a-z0-9]{4,12}")
        .expect("Invalid regex")
        .prop_map(TodoId::new)
}

/// Strategy for generating statuses.
pub fn status_strategy() -> impl Strategy<Value = TodoStatus> {
    prop::sample::select(TodoStatus::ALL.to_vec())
}

/// Strategy for generating priorities.
pub fn priority_strategy() -> impl Strategy<Value = TodoPriority> {
    prop::sample::select(TodoPriority::ALL.to_vec())
}

/// Strategy for generating a single valid todo.
pub fn todo_strategy() -> impl Strategy<Value = Todo> {
    (
        todo_id_strategy(),
        prop::string::string_regex("[A-Za-z][A-Za-z ]{0,23}").expect("Invalid regex"),
        status_strategy(),
        priority_strategy(),
        prop::option::of(-30i64..30),
        prop::collection::vec(prop::sample::select(vec!["work", "home", "errand"]), 0..3),
        0i64..10_000,
    )
        .prop_map(|(id, title, status, priority, due, tags, minutes)| {
            let created_at = base_time() + Duration::minutes(minutes);
            Todo {
                id,
                title,
                description: None,
                status,
                priority,
                due_date: due.map(|days| base_time() + Duration::days(days)),
                tags: if tags.is_empty() {
                    None
                } else {
                    Some(tags.into_iter().map(String::from).collect())
                },
                created_at,
                updated_at: created_at,
            }
        })
}

/// Strategy for generating up to `max` todos with distinct ids.
pub fn todos_strategy(max: usize) -> impl Strategy<Value = Vec<Todo>> {
    prop::collection::vec(todo_strategy(), 0..=max).prop_map(|todos| {
        let mut by_id = BTreeMap::new();
        for todo in todos {
            by_id.entry(todo.id.clone()).or_insert(todo);
        }
        by_id.into_values().collect()
    })
}

/// Strategy for generating filter descriptors.
pub fn filter_strategy() -> impl Strategy<Value = FilterParams> {
    (
        prop::option::of(status_strategy()),
        prop::option::of(priority_strategy()),
        prop::option::of(prop::sample::select(vec!["work", "home"])),
        prop::option::of(1u32..5),
        prop::option::of(1u32..20),
    )
        .prop_map(|(status, priority, tag, page, size)| FilterParams {
            status,
            priority,
            tag: tag.map(String::from),
            page,
            size,
            ..Default::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    proptest! {
        #[test]
        fn generated_titles_are_valid(todo in todo_strategy()) {
            prop_assert!(!todo.title.trim().is_empty());
            prop_assert_eq!(todo.created_at, todo.updated_at);
        }

        #[test]
        fn generated_ids_are_unique(todos in todos_strategy(20)) {
            let ids: HashSet<_> = todos.iter().map(|t| t.id.clone()).collect();
            prop_assert_eq!(ids.len(), todos.len());
        }
    }
}
