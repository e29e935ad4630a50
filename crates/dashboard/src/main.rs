//! Crewtrack console report binary.
//!
//! Boots the SQLite store, walks the roster and prints each employee's task
//! table with progress metrics. Mutations go through the library API; this
//! binary only reads.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use admin_gate::{AdminGate, NoticeKind, Prompter};
use async_trait::async_trait;
use dashboard::{Config, DashboardSession, init_tracing};
use doc_store::{MemoryTaskCache, SqliteDocumentStore};

/// Prompter backed by the controlling terminal.
struct ConsolePrompter;

#[async_trait]
impl Prompter for ConsolePrompter {
    async fn prompt_secret(&self, title: &str) -> Option<String> {
        print!("{title}: ");
        io::stdout().flush().ok()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        let entered = line.trim();
        if entered.is_empty() {
            None
        } else {
            Some(entered.to_string())
        }
    }

    async fn confirm(&self, title: &str, message: &str) -> bool {
        print!("{title} {message} [y/N]: ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim(), "y" | "Y" | "yes")
    }

    async fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => println!("{message}"),
            NoticeKind::Error => eprintln!("{message}"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level);

    tracing::info!(gate_mode = config.gate_mode.as_str(), "Starting Crewtrack report");

    let store = Arc::new(SqliteDocumentStore::connect(&config.database_url).await?);
    let cache = Arc::new(MemoryTaskCache::new());
    let gate = AdminGate::new(config.admin_pin.clone()).with_mode(config.gate_mode);
    let mut session = DashboardSession::new(store, cache, Arc::new(ConsolePrompter), gate);

    session.refresh().await?;
    if session.employees().is_empty() {
        println!("No employees registered.");
        return Ok(());
    }

    let ids: Vec<_> = session.employees().iter().map(|e| e.id).collect();
    for id in ids {
        session.select_employee(id).await?;
        let employee = match session.selected() {
            Some(e) => e,
            None => continue,
        };
        println!("\n{} ({} emails)", employee.name, employee.emails.len());

        let tasks = session.filtered_tasks();
        for task in &tasks {
            println!(
                "  [{:>3}] {:<16} due {}  {}",
                task.score(),
                task.state().label(),
                task.due_date,
                task.name
            );
        }
        let buckets = session.status_buckets();
        println!(
            "  progress {}%  on-time {}  late {}  outstanding {}",
            session.progress_percent(),
            buckets.completed_on_time,
            buckets.completed_late,
            buckets.outstanding
        );
    }

    Ok(())
}
