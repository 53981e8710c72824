//! Runtime configuration read from the environment.

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_CHART_LABEL: &str = "Expenses";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const BACKEND_URL_VAR: &str = "EXPENSE_BACKEND_URL";
pub const API_TOKEN_VAR: &str = "EXPENSE_API_TOKEN";
pub const CHART_LABEL_VAR: &str = "EXPENSE_CHART_LABEL";
pub const REQUEST_TIMEOUT_VAR: &str = "EXPENSE_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Base URL of the expense backend, without trailing slash
    pub backend_url: String,
    /// Bearer token sent with every request
    pub api_token: Option<String>,
    /// Category axis entry shown under the per-label bars
    pub chart_label: String,
    pub request_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            api_token: None,
            chart_label: DEFAULT_CHART_LABEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(BACKEND_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.backend_url = url.trim().trim_end_matches('/').to_string();
        }
        config.api_token = lookup(API_TOKEN_VAR).filter(|v| !v.is_empty());
        if let Some(label) = lookup(CHART_LABEL_VAR).filter(|v| !v.is_empty()) {
            config.chart_label = label;
        }
        if let Some(raw) = lookup(REQUEST_TIMEOUT_VAR) {
            let secs = raw.trim().parse::<u64>().with_context(|| {
                format!("{} must be a whole number of seconds, got {:?}", REQUEST_TIMEOUT_VAR, raw)
            })?;
            if secs == 0 {
                bail!("{} must be greater than zero", REQUEST_TIMEOUT_VAR);
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// The API token, or an error naming the variable to set
    pub fn require_token(&self) -> Result<&str> {
        self.api_token
            .as_deref()
            .with_context(|| format!("{} is not set", API_TOKEN_VAR))
    }
}
