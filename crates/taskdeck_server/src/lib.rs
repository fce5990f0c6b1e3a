//! # Taskdeck Server
//!
//! In-process reference backend for taskdeck.
//!
//! This crate provides:
//! - Every endpoint of the todo REST contract as a `handle_*` method
//! - An in-memory todo table with server-assigned ids and timestamps
//! - Filtering, pagination and statistics with the same semantics the
//!   client uses
//!
//! # Architecture
//!
//! The server holds no transport of its own. An HTTP router or a test
//! adapter maps requests onto [`TodoServer`] and reports
//! [`ServerError::status_code`] for failures.
//!
//! # Ordering
//!
//! Todos are listed newest first. `updated_at` never moves backwards.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod server;
mod table;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::TodoServer;
pub use table::TodoTable;
