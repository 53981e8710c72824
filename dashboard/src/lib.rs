//! Monthly expense dashboard.
//!
//! - [`services::api`] talks to the expense backend over HTTP
//! - [`state`] holds the selected month, loaded labels/expenses and the chart
//! - [`controller`] ties both together and routes failures to an
//!   [`services::error_reporter::ErrorReporter`]
//! - [`chart`] projects expenses into per-label totals

pub mod chart;
pub mod config;
pub mod controller;
pub mod error;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_utils;

pub use config::DashboardConfig;
pub use controller::DashboardController;
pub use error::{DashboardError, GatewayError};
pub use services::api::{ApiClient, ExpenseGateway, StaticToken, TokenProvider};
pub use services::error_reporter::{ErrorReporter, LoggingErrorReporter};
pub use state::DashboardState;
