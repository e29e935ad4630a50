//! Document storage for Crewtrack.
//!
//! This crate provides the storage abstraction behind the dashboard:
//! employees, their tasks, and the shared email directory, kept in named
//! collections addressed by identifier. It ships an in-memory store (for
//! tests and single-process use) and a SQLite-backed store, plus the
//! best-effort local task cache the session mirrors into.

mod cache;
mod error;
mod memory;
mod sqlite;
mod traits;

pub use cache::*;
pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
