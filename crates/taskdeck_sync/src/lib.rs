//! # Taskdeck Sync
//!
//! Client-side todo state and the engine that keeps it in step with a
//! backend.
//!
//! This crate provides:
//! - The todo state and its pure transition function
//! - A store object that serializes dispatches and publishes every state
//! - A backend capability trait with a REST implementation and a mock
//! - The sync engine that turns intents into backend calls and actions
//! - User-facing notifications
//!
//! ## Architecture
//!
//! ```text
//! intent ──► SyncEngine ──► TodoBackend (REST / in-process / mock)
//!                │
//!                ├──► TodoStore::dispatch(TodoAction) ──► subscribers
//!                └──► Notifier
//! ```
//!
//! ## Key Invariants
//!
//! - State changes only through `TodoAction`s; the reducer never performs I/O
//! - A list response older than the latest issued request is discarded
//! - Failed intents leave the cached todos as they were
//! - Nothing is retried automatically

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod http;
mod notify;
mod state;
mod store;
mod transport;

pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use engine::{FetchOutcome, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use http::HttpBackend;
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use state::{reduce, TodoAction, TodoState, ViewMode};
pub use store::TodoStore;
pub use transport::{MockBackend, TodoBackend};
