//! Error types for the dashboard library.

use shared::{ExpenseId, LabelId};

/// Failure of a single backend request, passed through uninterpreted
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The backend answered with a non-2xx status
    #[error("Server error {status}: {message}")]
    Status { status: u16, message: String },
    /// Connection, timeout or body decoding failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl GatewayError {
    /// HTTP status of the failed response, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            GatewayError::Network(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// A backend answer the dashboard refuses to apply
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// An expense references a label that is not loaded
    #[error("Expense {expense_id} references unknown label {label_id}")]
    UnknownLabel { expense_id: ExpenseId, label_id: LabelId },
}
