use async_trait::async_trait;

/// Severity of a notice surfaced to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Trait for operator interaction.
///
/// The gate and the dashboard never talk to a terminal or window system
/// directly; every question goes through this trait so front-ends (and
/// tests) can answer however they like.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask for a secret value. `None` means the operator cancelled.
    async fn prompt_secret(&self, title: &str) -> Option<String>;

    /// Ask a yes/no question. `false` means the operator declined.
    async fn confirm(&self, title: &str, message: &str) -> bool;

    /// Surface an informational notice.
    async fn notify(&self, kind: NoticeKind, message: &str);
}
