//! Request and response bodies of the REST contract.

use crate::filter::{FilterParams, Pagination};
use crate::todo::{Todo, TodoCreate, TodoId, TodoStatus, TodoUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One page of a list or search query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoListResponse {
    /// Todos on this page, in server order.
    pub todos: Vec<Todo>,
    /// Total number of matching todos.
    pub total: u64,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub size: u32,
    /// Number of pages.
    pub total_pages: u64,
}

impl TodoListResponse {
    /// Builds a response from a page of todos and its pagination.
    pub fn new(todos: Vec<Todo>, pagination: Pagination) -> Self {
        Self {
            todos,
            total: pagination.total,
            page: pagination.page,
            size: pagination.size,
            total_pages: pagination.total_pages,
        }
    }

    /// Pagination snapshot as reported by the server.
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            size: self.size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// Body of `PATCH /todos/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// New status.
    pub status: TodoStatus,
}

/// Body of `PUT /todos/bulk`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkUpdateRequest {
    /// Patch per todo id.
    pub updates: BTreeMap<TodoId, TodoUpdate>,
}

impl BulkUpdateRequest {
    /// Applies the same patch to every id.
    pub fn uniform<'a, I>(ids: I, patch: &TodoUpdate) -> Self
    where
        I: IntoIterator<Item = &'a TodoId>,
    {
        Self {
            updates: ids
                .into_iter()
                .map(|id| (id.clone(), patch.clone()))
                .collect(),
        }
    }

    /// Number of todos addressed.
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Returns true if no todo is addressed.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Body of `POST /todos/bulk`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkCreateRequest {
    /// Drafts to create, in order.
    pub todos: Vec<TodoCreate>,
}

/// Body of `POST /todos/search`.
///
/// The filters are flattened next to the query text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query.
    pub query: String,
    /// Additional constraints.
    #[serde(flatten)]
    pub filters: FilterParams,
}

impl SearchRequest {
    /// Creates a search with additional filters.
    pub fn new(query: impl Into<String>, filters: FilterParams) -> Self {
        Self {
            query: query.into(),
            filters,
        }
    }

    /// The descriptor the query is evaluated with: the filters plus the
    /// query text as the search constraint.
    pub fn as_filters(&self) -> FilterParams {
        FilterParams {
            search: Some(self.query.clone()),
            ..self.filters.clone()
        }
    }
}

/// Optional creation-date window for `GET /todos/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRange {
    /// Inclusive lower bound.
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound.
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<DateTime<Utc>>,
}

impl StatsRange {
    /// An unbounded range.
    pub fn all() -> Self {
        Self::default()
    }

    /// Creates a bounded range.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
        }
    }

    /// Returns true if the timestamp falls inside the range.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start_date.map_or(true, |start| ts >= start)
            && self.end_date.map_or(true, |end| ts <= end)
    }
}
