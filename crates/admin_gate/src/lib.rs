//! Admin access control for the dashboard.
//!
//! Destructive and mutating operations are guarded by a PIN-based gate.
//! The gate starts locked; depending on [`GateMode`] it either holds a
//! session unlocked by one PIN entry (the default mode) or challenges for
//! the PIN on every guarded call.

mod gate;
mod prompt;

pub use gate::{AdminGate, GateMode, GateState};
pub use prompt::{NoticeKind, Prompter};
