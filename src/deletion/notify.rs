/// Confirmation and user notification hooks for the deletion workflow
use async_trait::async_trait;

/// Asks the user to confirm an irreversible action
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Confirmation gathered before the call (e.g. `confirm=true` on a request)
#[derive(Debug, Clone, Copy)]
pub struct Preconfirmed(pub bool);

#[async_trait]
impl Confirmer for Preconfirmed {
    async fn confirm(&self, prompt: &str) -> bool {
        if !self.0 {
            tracing::debug!(prompt, "Deletion not confirmed");
        }
        self.0
    }
}

/// Batch callers that deliberately skip the prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipConfirmation;

#[async_trait]
impl Confirmer for SkipConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt, "Confirmation skipped by caller");
        true
    }
}

/// Toast-style notices for the user
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Notifier that writes notices to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(notice = "success", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(notice = "error", "{}", message);
    }
}
