use tracing::info;

/// Sink for human-readable admin-facing messages (verified payments, renewal
/// outcomes). Production routes them to the log; tests assert on them.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        info!(target: "notifications", "{}", message);
    }
}
