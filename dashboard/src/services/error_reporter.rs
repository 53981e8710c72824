use tracing::error;

/// Receives failures the dashboard could not act on.
///
/// The UI layer typically implements this to show a toast or banner; the
/// default implementation only logs.
pub trait ErrorReporter: Send + Sync {
    /// `message` is the human readable failure, `context` names the operation
    fn handle_error(&self, message: &str, context: &str);
}

/// Reports errors through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorReporter;

impl ErrorReporter for LoggingErrorReporter {
    fn handle_error(&self, message: &str, context: &str) {
        error!(context, "{}", message);
    }
}
