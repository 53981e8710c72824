pub mod api;
pub mod error_reporter;
pub mod logging;
