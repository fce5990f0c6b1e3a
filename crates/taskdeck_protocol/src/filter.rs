//! Query descriptor and pagination.
//!
//! `FilterParams` is evaluated identically by every backend and by any
//! client-side filtering: an absent field is "no constraint", never
//! "match empty".

use crate::todo::{Todo, TodoPriority, TodoStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default 1-based page number.
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Filter and pagination parameters for list queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Exact status match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TodoStatus>,
    /// Exact priority match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TodoPriority>,
    /// Case-insensitive substring over title and description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Tag membership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Inclusive upper bound on the due date.
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_before: Option<DateTime<Utc>>,
    /// Inclusive lower bound on the due date.
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_after: Option<DateTime<Utc>>,
    /// 1-based page number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl FilterParams {
    /// Creates an unconstrained first page with the default size.
    pub fn new() -> Self {
        Self {
            page: Some(DEFAULT_PAGE),
            size: Some(DEFAULT_PAGE_SIZE),
            ..Default::default()
        }
    }

    /// Sets the status constraint.
    pub fn with_status(mut self, status: TodoStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the priority constraint.
    pub fn with_priority(mut self, priority: TodoPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the search text.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Sets the tag constraint.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Sets the inclusive due-date upper bound.
    pub fn with_due_before(mut self, bound: DateTime<Utc>) -> Self {
        self.due_before = Some(bound);
        self
    }

    /// Sets the inclusive due-date lower bound.
    pub fn with_due_after(mut self, bound: DateTime<Utc>) -> Self {
        self.due_after = Some(bound);
        self
    }

    /// Sets the page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets the page size.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Effective page number, never below 1.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    /// Effective page size, never zero.
    pub fn size(&self) -> u32 {
        match self.size {
            Some(0) | None => DEFAULT_PAGE_SIZE,
            Some(size) => size,
        }
    }

    /// Returns a copy with page and size filled in and clamped.
    pub fn normalized(&self) -> Self {
        Self {
            page: Some(self.page()),
            size: Some(self.size()),
            ..self.clone()
        }
    }

    /// Shallow merge: every field present in `partial` overwrites the
    /// current value, absent fields are kept.
    pub fn merge(&mut self, partial: &FilterParams) {
        fn take<T: Clone>(slot: &mut Option<T>, incoming: &Option<T>) {
            if let Some(value) = incoming {
                *slot = Some(value.clone());
            }
        }

        take(&mut self.status, &partial.status);
        take(&mut self.priority, &partial.priority);
        take(&mut self.search, &partial.search);
        take(&mut self.tag, &partial.tag);
        take(&mut self.due_before, &partial.due_before);
        take(&mut self.due_after, &partial.due_after);
        take(&mut self.page, &partial.page);
        take(&mut self.size, &partial.size);
    }

    /// Returns the merged descriptor without modifying `self`.
    pub fn merged(&self, partial: &FilterParams) -> Self {
        let mut merged = self.clone();
        merged.merge(partial);
        merged
    }

    /// Returns true if the todo satisfies every present constraint.
    ///
    /// Page and size do not take part in matching.
    pub fn matches(&self, todo: &Todo) -> bool {
        if self.status.is_some_and(|status| todo.status != status) {
            return false;
        }
        if self.priority.is_some_and(|priority| todo.priority != priority) {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !todo.has_tag(tag) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_title = todo.title.to_lowercase().contains(&needle);
            let in_description = todo
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }
        if self.due_before.is_some() || self.due_after.is_some() {
            // A bound can only be satisfied by a todo that has a due date.
            let Some(due) = todo.due_date else {
                return false;
            };
            if self.due_before.is_some_and(|bound| due > bound) {
                return false;
            }
            if self.due_after.is_some_and(|bound| due < bound) {
                return false;
            }
        }
        true
    }
}

/// Pagination snapshot of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub size: u32,
    /// Total matching records.
    pub total: u64,
    /// `ceil(total / size)`.
    pub total_pages: u64,
}

impl Pagination {
    /// Creates a snapshot, deriving `total_pages`.
    pub fn new(page: u32, size: u32, total: u64) -> Self {
        Self {
            page,
            size,
            total,
            total_pages: total_pages(total, size),
        }
    }

    /// Returns a copy with a new total and recomputed page count.
    pub fn with_total(self, total: u64) -> Self {
        Self::new(self.page, self.size, total)
    }

    /// Zero-based index of the first record on this page.
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1) * self.size as usize
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE, 0)
    }
}

fn total_pages(total: u64, size: u32) -> u64 {
    if size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::TodoId;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn todo(title: &str, status: TodoStatus) -> Todo {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Todo {
            id: TodoId::new(title),
            title: title.into(),
            description: Some("Remember the Oat Milk".into()),
            status,
            priority: TodoPriority::Medium,
            due_date: Some(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()),
            tags: Some(vec!["home".into()]),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 3).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).total_pages, 2);
        assert_eq!(Pagination::new(1, 10, 3).with_total(21).total_pages, 3);
        assert_eq!(Pagination::new(3, 10, 50).offset(), 20);
    }

    #[test]
    fn merge_is_shallow() {
        let mut filters = FilterParams::new().with_status(TodoStatus::Pending);
        filters.merge(&FilterParams::default().with_page(3).with_tag("home"));

        assert_eq!(filters.status, Some(TodoStatus::Pending));
        assert_eq!(filters.page, Some(3));
        assert_eq!(filters.size, Some(DEFAULT_PAGE_SIZE));
        assert_eq!(filters.tag.as_deref(), Some("home"));
    }

    #[test]
    fn normalized_clamps_page_and_size() {
        let filters = FilterParams::default().with_page(0).with_size(0).normalized();
        assert_eq!(filters.page, Some(1));
        assert_eq!(filters.size, Some(DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let t = todo("Buy groceries", TodoStatus::Pending);
        assert!(FilterParams::default().with_search("GROCER").matches(&t));
        assert!(FilterParams::default().with_search("oat milk").matches(&t));
        assert!(!FilterParams::default().with_search("bread").matches(&t));
    }

    #[test]
    fn due_bounds_are_inclusive() {
        let t = todo("Pay rent", TodoStatus::Pending);
        let due = t.due_date.unwrap();
        assert!(FilterParams::default().with_due_before(due).matches(&t));
        assert!(FilterParams::default().with_due_after(due).matches(&t));
        assert!(!FilterParams::default()
            .with_due_after(due + chrono::Duration::seconds(1))
            .matches(&t));

        let mut undated = t.clone();
        undated.due_date = None;
        assert!(!FilterParams::default().with_due_before(due).matches(&undated));
    }

    #[test]
    fn query_omits_absent_fields() {
        let json = serde_json::to_value(FilterParams::new().with_status(TodoStatus::Completed))
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "completed", "page": 1, "size": 10 })
        );
    }

    fn status_strategy() -> impl Strategy<Value = TodoStatus> {
        prop::sample::select(TodoStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn empty_descriptor_matches_everything(title in "[a-zA-Z ]{1,20}", status in status_strategy()) {
            let t = todo(&title, status);
            prop_assert!(FilterParams::default().matches(&t));
            prop_assert!(FilterParams::new().with_page(7).with_size(3).matches(&t));
        }

        #[test]
        fn status_filter_is_equality(a in status_strategy(), b in status_strategy()) {
            let t = todo("task", a);
            prop_assert_eq!(FilterParams::default().with_status(b).matches(&t), a == b);
        }

        #[test]
        fn merging_empty_partial_is_identity(page in 1u32..50, size in 1u32..100) {
            let filters = FilterParams::new().with_page(page).with_size(size).with_search("x");
            prop_assert_eq!(filters.merged(&FilterParams::default()), filters.clone());
        }
    }
}
