//! Core entity definitions for Crewtrack.
//!
//! This crate defines the data types shared across the Crewtrack dashboard
//! (employees, their tasks, and the email directory) together with the pure
//! derived model: task classification, scoring, progress aggregates, and the
//! date-range filter.

mod email;
mod employee;
mod filter;
mod metrics;
mod task;

pub use email::*;
pub use employee::*;
pub use filter::*;
pub use metrics::*;
pub use task::*;
