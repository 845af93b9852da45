use thiserror::Error;

#[derive(Debug, Error)]
#[error("notifier: {0}")]
pub struct NotifyError(pub String);

/// Sends a voter their confirmation.
///
/// Delivery is best effort. Failures are logged by the caller and never change the outcome
/// of a vote.
pub trait Notifier: Send + Sync {
    fn notify(&self, email: &str, candidate: &str) -> Result<(), NotifyError>;
}

/// Text of the confirmation sent to a voter
pub fn confirmation_message(candidate: &str) -> String {
    format!("Thank you for voting! You have voted for {}.", candidate)
}

/// Writes confirmations to the log instead of delivering them
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, _email: &str, candidate: &str) -> Result<(), NotifyError> {
        log::info!("confirmation: {}", confirmation_message(candidate));
        Ok(())
    }
}

/// Drops every confirmation
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _email: &str, _candidate: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}
