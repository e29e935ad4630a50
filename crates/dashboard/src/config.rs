//! Dashboard configuration.

use std::env;

use admin_gate::GateMode;

/// Dashboard configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Admin PIN guarding mutating operations.
    pub admin_pin: String,
    /// Database URL.
    pub database_url: String,
    /// How guarded operations acquire admin rights.
    pub gate_mode: GateMode,
    /// Log level.
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let admin_pin = env::var("CREWTRACK_ADMIN_PIN")
            .map_err(|_| anyhow::anyhow!("CREWTRACK_ADMIN_PIN is required"))?;
        if admin_pin.trim().is_empty() {
            anyhow::bail!("CREWTRACK_ADMIN_PIN must not be empty");
        }

        let gate_mode = match env::var("CREWTRACK_GATE_MODE") {
            Ok(raw) => GateMode::parse(&raw)
                .ok_or_else(|| anyhow::anyhow!("Unknown CREWTRACK_GATE_MODE: {raw}"))?,
            Err(_) => GateMode::SessionToggle,
        };

        Ok(Self {
            admin_pin,
            database_url: env::var("CREWTRACK_DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:crewtrack.db?mode=rwc".to_string()),
            gate_mode,
            log_level: env::var("CREWTRACK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
