//! Crewtrack dashboard orchestration.
//!
//! Ties the entity model, the document store, the task cache and the admin
//! gate together into a [`session::DashboardSession`] that front-ends drive.

pub mod config;
pub mod error;
pub mod session;

pub use config::Config;
pub use error::{DashboardError, DashboardResult};
pub use session::DashboardSession;

/// Initializes tracing with the given log level.
///
/// Respects `RUST_LOG` if set, falling back to the provided level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
