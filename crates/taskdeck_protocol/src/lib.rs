//! # Taskdeck Protocol
//!
//! Data model and wire types shared by the taskdeck client and backends.
//!
//! This crate provides:
//! - `Todo` and its create/update drafts
//! - `FilterParams`, the query descriptor both sides evaluate identically
//! - `Pagination` math
//! - Request/response messages for the REST contract
//! - `TodoStats` aggregation
//! - Lenient ISO-8601 timestamp decoding
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod filter;
mod messages;
mod stats;
mod timestamp;
mod todo;

pub use error::{ProtocolError, ProtocolResult};
pub use filter::{FilterParams, Pagination, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
pub use messages::{
    BulkCreateRequest, BulkUpdateRequest, SearchRequest, StatsRange, StatusUpdate,
    TodoListResponse,
};
pub use stats::TodoStats;
pub use timestamp::parse_timestamp;
pub use todo::{Todo, TodoCreate, TodoId, TodoPriority, TodoStatus, TodoUpdate};
