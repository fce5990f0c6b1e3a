//! # Taskdeck Testkit
//!
//! Test utilities shared by the taskdeck crates.
//!
//! This crate provides:
//! - Todo fixtures with fixed, reproducible timestamps
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use taskdeck_testkit::prelude::*;
//!
//! let todo = TodoFixture::new("t-1", "Buy milk").completed().build();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::{base_time, TodoFixture};
    pub use crate::generators::{
        filter_strategy, priority_strategy, status_strategy, todo_id_strategy, todo_strategy,
        todos_strategy,
    };
}
