use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::prompt::{NoticeKind, Prompter};

/// Whether the gate currently holds an admin session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Locked,
    Unlocked,
}

impl GateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Locked => "locked",
            GateState::Unlocked => "unlocked",
        }
    }
}

/// How guarded operations acquire admin rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    /// One successful PIN entry unlocks the session until it is locked again.
    SessionToggle,
    /// Every guarded operation challenges for the PIN; nothing persists.
    PerCallChallenge,
}

impl GateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateMode::SessionToggle => "session_toggle",
            GateMode::PerCallChallenge => "per_call_challenge",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "session_toggle" => Some(GateMode::SessionToggle),
            "per_call_challenge" => Some(GateMode::PerCallChallenge),
            _ => None,
        }
    }
}

/// PIN-based admin gate.
///
/// The stored PIN is compared verbatim; rotating it is a configuration
/// concern, not a gate concern.
pub struct AdminGate {
    pin: String,
    mode: GateMode,
    state: GateState,
}

impl AdminGate {
    /// Creates a locked gate in [`GateMode::SessionToggle`] mode.
    pub fn new(pin: impl Into<String>) -> Self {
        Self {
            pin: pin.into(),
            mode: GateMode::SessionToggle,
            state: GateState::Locked,
        }
    }

    pub fn with_mode(mut self, mode: GateMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> GateMode {
        self.mode
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == GateState::Unlocked
    }

    /// Challenges the operator for the PIN once.
    async fn challenge(&self, prompter: &dyn Prompter) -> bool {
        let Some(entered) = prompter.prompt_secret("Enter Admin PIN").await else {
            return false;
        };
        if entered == self.pin {
            true
        } else {
            warn!("admin PIN rejected");
            prompter.notify(NoticeKind::Error, "Incorrect PIN").await;
            false
        }
    }

    /// Attempts to unlock the session. A no-op when already unlocked.
    pub async fn unlock(&mut self, prompter: &dyn Prompter) -> bool {
        if self.state == GateState::Unlocked {
            return true;
        }
        if self.challenge(prompter).await {
            self.state = GateState::Unlocked;
            info!("admin session unlocked");
            prompter
                .notify(NoticeKind::Success, "Admin access enabled")
                .await;
            true
        } else {
            false
        }
    }

    /// Attempts to lock the session, asking for confirmation first.
    /// Declining leaves the session unlocked.
    pub async fn lock(&mut self, prompter: &dyn Prompter) -> bool {
        if self.state == GateState::Locked {
            return true;
        }
        if prompter
            .confirm("Disable admin access?", "Guarded operations will be blocked.")
            .await
        {
            self.state = GateState::Locked;
            info!("admin session locked");
            true
        } else {
            false
        }
    }

    /// Unlocks a locked session or locks an unlocked one.
    pub async fn toggle(&mut self, prompter: &dyn Prompter) -> bool {
        match self.state {
            GateState::Locked => self.unlock(prompter).await,
            GateState::Unlocked => self.lock(prompter).await,
        }
    }

    /// Decides whether a guarded operation may proceed.
    ///
    /// In session mode this only consults the current state; in challenge
    /// mode it prompts for the PIN every time and never retains anything.
    pub async fn authorize(&self, prompter: &dyn Prompter) -> bool {
        match self.mode {
            GateMode::SessionToggle => self.is_unlocked(),
            GateMode::PerCallChallenge => self.challenge(prompter).await,
        }
    }
}
