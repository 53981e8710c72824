//! In-memory stand-ins for the backend and the error sink, shared by unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{Expense, ExpenseId, InsertExpensePayload, Label, LabelId, TotalExpenseByMonth};

use crate::error::GatewayError;
use crate::services::api::{ExpenseGateway, GatewayResult};
use crate::services::error_reporter::ErrorReporter;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn expense(id: ExpenseId, label_id: LabelId, amount: f64, on: NaiveDate) -> Expense {
    Expense { id, label_id, amount, date: Some(on) }
}

pub fn label(id: LabelId, name: &str) -> Label {
    Label { id, label: name.to_string() }
}

#[derive(Default)]
struct FakeBackend {
    labels: Vec<Label>,
    expenses: Vec<Expense>,
    interval_requests: Vec<(NaiveDate, NaiveDate)>,
    pending_failure: Option<(u16, String)>,
}

/// Gateway backed by vectors, with one-shot failure injection
#[derive(Default)]
pub struct FakeGateway {
    backend: Mutex<FakeBackend>,
}

impl FakeGateway {
    pub fn new(labels: Vec<Label>) -> Self {
        Self {
            backend: Mutex::new(FakeBackend { labels, ..FakeBackend::default() }),
        }
    }

    /// Store an expense as if it already existed on the server
    pub fn insert(&self, expense: Expense) {
        self.backend.lock().unwrap().expenses.push(expense);
    }

    /// Make the next gateway call fail with the given status
    pub fn fail_next(&self, status: u16, message: &str) {
        self.backend.lock().unwrap().pending_failure = Some((status, message.to_string()));
    }

    /// Every interval passed to `list_expenses`, in call order
    pub fn interval_requests(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.backend.lock().unwrap().interval_requests.clone()
    }

    fn take_failure(backend: &mut FakeBackend) -> GatewayResult<()> {
        match backend.pending_failure.take() {
            Some((status, message)) => Err(GatewayError::Status { status, message }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ExpenseGateway for FakeGateway {
    async fn list_expenses(&self, start: NaiveDate, end: NaiveDate) -> GatewayResult<Vec<Expense>> {
        let mut backend = self.backend.lock().unwrap();
        backend.interval_requests.push((start, end));
        Self::take_failure(&mut backend)?;
        Ok(backend
            .expenses
            .iter()
            .filter(|e| e.date.map_or(false, |d| d >= start && d <= end))
            .cloned()
            .collect())
    }

    async fn list_monthly_totals(
        &self,
        label_id: Option<LabelId>,
    ) -> GatewayResult<Vec<TotalExpenseByMonth>> {
        let mut backend = self.backend.lock().unwrap();
        Self::take_failure(&mut backend)?;
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        let matching = backend
            .expenses
            .iter()
            .filter(|e| label_id.map_or(true, |id| e.label_id == id));
        for expense in matching {
            if let Some(on) = expense.date {
                *totals.entry(on.format("%Y-%m").to_string()).or_default() += expense.amount;
            }
        }
        Ok(totals
            .into_iter()
            .map(|(month, total)| TotalExpenseByMonth { month, total })
            .collect())
    }

    async fn add_expense(&self, payload: &InsertExpensePayload) -> GatewayResult<Expense> {
        let mut backend = self.backend.lock().unwrap();
        Self::take_failure(&mut backend)?;
        let id = backend.expenses.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let created = Expense {
            id,
            label_id: payload.label_id,
            amount: payload.amount,
            date: Some(payload.date),
        };
        backend.expenses.push(created.clone());
        Ok(created)
    }

    async fn delete_expense(&self, expense_id: ExpenseId) -> GatewayResult<()> {
        let mut backend = self.backend.lock().unwrap();
        Self::take_failure(&mut backend)?;
        backend.expenses.retain(|e| e.id != expense_id);
        Ok(())
    }

    async fn list_labels(&self) -> GatewayResult<Vec<Label>> {
        let mut backend = self.backend.lock().unwrap();
        Self::take_failure(&mut backend)?;
        Ok(backend.labels.clone())
    }

    async fn delete_label(&self, label_id: LabelId) -> GatewayResult<()> {
        let mut backend = self.backend.lock().unwrap();
        Self::take_failure(&mut backend)?;
        backend.labels.retain(|l| l.id != label_id);
        backend.expenses.retain(|e| e.label_id != label_id);
        Ok(())
    }
}

/// Collects `(message, context)` pairs
#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(String, String)>>,
}

impl RecordingReporter {
    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn handle_error(&self, message: &str, context: &str) {
        self.reports
            .lock()
            .unwrap()
            .push((message.to_string(), context.to_string()));
    }
}
