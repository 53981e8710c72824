use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    format_wire_date, Expense, ExpenseId, InsertExpensePayload, Label, LabelId, TotalExpenseByMonth,
};
use tracing::debug;

use crate::config::{DashboardConfig, DEFAULT_BACKEND_URL};
use crate::error::GatewayError;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Every backend call the dashboard needs.
///
/// Implementations are stateless: one call issues exactly one request, with
/// no retries, caching or deduplication.
#[async_trait]
pub trait ExpenseGateway: Send + Sync {
    /// Expenses dated within `[start, end]`, in server order
    async fn list_expenses(&self, start: NaiveDate, end: NaiveDate) -> GatewayResult<Vec<Expense>>;

    /// Server-side per-month totals, optionally restricted to one label
    async fn list_monthly_totals(
        &self,
        label_id: Option<LabelId>,
    ) -> GatewayResult<Vec<TotalExpenseByMonth>>;

    /// Persist a new expense and return it with its server-assigned id
    async fn add_expense(&self, payload: &InsertExpensePayload) -> GatewayResult<Expense>;

    async fn delete_expense(&self, expense_id: ExpenseId) -> GatewayResult<()>;

    async fn list_labels(&self) -> GatewayResult<Vec<Label>>;

    /// Delete a label on the server. Removing its expenses locally is up to the caller.
    async fn delete_label(&self, label_id: LabelId) -> GatewayResult<()>;
}

/// Supplies the bearer token attached to every request
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> String;
}

/// A token fixed at construction time
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> String {
        self.0.clone()
    }
}

/// API client for communicating with the expense backend
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    tokens: Arc<dyn TokenProvider>,
}

impl ApiClient {
    /// Create a new API client with the default base URL
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_base_url(DEFAULT_BACKEND_URL.to_string(), tokens)
    }

    /// Create a new API client with a custom base URL
    pub fn with_base_url(base_url: String, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_client(base_url, Client::new(), tokens)
    }

    /// Create an API client around a preconfigured HTTP client (proxies, TLS roots...)
    pub fn with_client(base_url: String, client: Client, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            tokens,
        }
    }

    /// Create a client from loaded configuration, applying its request timeout
    pub fn from_config(
        config: &DashboardConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(config.backend_url.clone(), client, tokens))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the headers every backend call carries
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        // `headers` replaces rather than appends, so JSON bodies keep a single content type
        request
            .bearer_auth(self.tokens.bearer_token())
            .headers(headers)
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> GatewayResult<T> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ExpenseGateway for ApiClient {
    async fn list_expenses(&self, start: NaiveDate, end: NaiveDate) -> GatewayResult<Vec<Expense>> {
        debug!("Fetching expenses from {} to {}", start, end);
        let request = self.client.get(self.url("/expense/")).query(&[
            ("startIntervalDate", format_wire_date(start)),
            ("endIntervalDate", format_wire_date(end)),
        ]);
        self.send_json(request).await
    }

    async fn list_monthly_totals(
        &self,
        label_id: Option<LabelId>,
    ) -> GatewayResult<Vec<TotalExpenseByMonth>> {
        let request = match label_id {
            Some(label_id) => {
                debug!("Fetching monthly totals for label {}", label_id);
                self.client
                    .get(self.url("/expense/getTotalExpensesByMonthByLabelId"))
                    .query(&[("labelId", label_id)])
            }
            None => {
                debug!("Fetching monthly totals");
                self.client.get(self.url("/expense/getTotalExpensesByMonth"))
            }
        };
        self.send_json(request).await
    }

    async fn add_expense(&self, payload: &InsertExpensePayload) -> GatewayResult<Expense> {
        debug!("Adding expense of {:.2} for label {}", payload.amount, payload.label_id);
        let request = self.client.post(self.url("/expense/addExpense")).json(payload);
        self.send_json(request).await
    }

    async fn delete_expense(&self, expense_id: ExpenseId) -> GatewayResult<()> {
        debug!("Deleting expense {}", expense_id);
        let request = self
            .client
            .delete(self.url("/expense/deleteExpense/"))
            .query(&[("expenseId", expense_id)]);
        self.send(request).await?;
        Ok(())
    }

    async fn list_labels(&self) -> GatewayResult<Vec<Label>> {
        debug!("Fetching labels");
        let request = self.client.get(self.url("/label/"));
        self.send_json(request).await
    }

    async fn delete_label(&self, label_id: LabelId) -> GatewayResult<()> {
        debug!("Deleting label {}", label_id);
        let request = self
            .client
            .delete(self.url("/label/deleteLabel/"))
            .query(&[("labelId", label_id)]);
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client = ApiClient::with_base_url(
            "http://localhost:8080/".to_string(),
            Arc::new(StaticToken("t".to_string())),
        );
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/expense/"), "http://localhost:8080/expense/");
    }

    #[test]
    fn test_from_config_uses_configured_url() {
        let config = DashboardConfig {
            backend_url: "https://budget.example.com".to_string(),
            ..DashboardConfig::default()
        };
        let client =
            ApiClient::from_config(&config, Arc::new(StaticToken("t".to_string()))).unwrap();
        assert_eq!(client.base_url(), "https://budget.example.com");
    }

    #[test]
    fn test_new_targets_default_backend() {
        let client = ApiClient::new(Arc::new(StaticToken("t".to_string())));
        assert_eq!(client.base_url(), DEFAULT_BACKEND_URL);
        assert_eq!(client.url("/label/"), "http://localhost:3000/label/");
    }
}
