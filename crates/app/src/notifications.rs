//! User-visible notifications.

use mockall::automock;
use tracing::{error, info};

/// Surfaces outcomes to the person driving the repository.
#[automock]
pub trait Notifier: Send + Sync {
    /// Report a failure.
    fn error(&self, message: &str);

    /// Report a success.
    fn success(&self, message: &str);
}

/// Notifier that writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        error!(notification = message, "operation failed");
    }

    fn success(&self, message: &str) {
        info!(notification = message, "operation succeeded");
    }
}
