//! # Dashboard Controller
//!
//! Bridges the UI-owned [`DashboardState`] and the backend. Every operation
//! follows the same shape: call the gateway once, apply the result to the
//! state on success, and hand any failure to the [`ErrorReporter`] while
//! leaving the state as it was.
//!
//! Month loads are split in two (`fetch_month` then `apply_month`) so a UI
//! can keep several requests in flight without holding the state borrowed;
//! `select_month` and `reload_month` chain both steps for the common case.

use std::sync::Arc;

use chrono::NaiveDate;
use shared::{Expense, ExpenseId, InsertExpensePayload, LabelId};
use tracing::{info, warn};

use crate::services::api::{ExpenseGateway, GatewayResult};
use crate::services::error_reporter::ErrorReporter;
use crate::state::{DashboardState, LoadOutcome, MonthLoad};

pub const CONTEXT_LOAD_LABELS: &str = "load_labels";
pub const CONTEXT_LOAD_EXPENSES: &str = "load_expenses";
pub const CONTEXT_LOAD_TOTALS: &str = "load_monthly_totals";
pub const CONTEXT_ADD_EXPENSE: &str = "add_expense";
pub const CONTEXT_DELETE_EXPENSE: &str = "delete_expense";
pub const CONTEXT_DELETE_LABEL: &str = "delete_label";

/// Response to a month load, still tagged with the ticket that started it
#[derive(Debug)]
pub struct MonthFetch {
    pub load: MonthLoad,
    pub result: GatewayResult<Vec<Expense>>,
}

pub struct DashboardController<G> {
    gateway: Arc<G>,
    reporter: Arc<dyn ErrorReporter>,
}

impl<G> Clone for DashboardController<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            reporter: Arc::clone(&self.reporter),
        }
    }
}

impl<G: ExpenseGateway> DashboardController<G> {
    pub fn new(gateway: Arc<G>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { gateway, reporter }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Load labels, then the expenses of the selected month.
    ///
    /// Returns true when both loads were applied.
    pub async fn initialize(&self, state: &mut DashboardState) -> bool {
        info!("Initializing dashboard for {}", state.selected_month());
        match self.gateway.list_labels().await {
            Ok(labels) => {
                info!("Loaded {} labels", labels.len());
                state.set_labels(labels);
            }
            Err(e) => {
                self.report(&e.to_string(), CONTEXT_LOAD_LABELS);
                return false;
            }
        }

        self.reload_month(state).await
    }

    /// Switch to the month containing `target` and load it.
    ///
    /// Selecting the month that is already shown does nothing and returns false,
    /// unless its last load failed, in which case it is loaded again.
    pub async fn select_month(&self, state: &mut DashboardState, target: NaiveDate) -> bool {
        match state.select_month(target) {
            Some(load) => {
                let fetched = self.fetch_month(load).await;
                self.apply_month(state, fetched)
            }
            None => false,
        }
    }

    /// Fetch the selected month again, superseding any load in flight
    pub async fn reload_month(&self, state: &mut DashboardState) -> bool {
        let load = state.begin_reload();
        let fetched = self.fetch_month(load).await;
        self.apply_month(state, fetched)
    }

    /// Request the expenses for a load ticket. Does not touch the state.
    pub async fn fetch_month(&self, load: MonthLoad) -> MonthFetch {
        let result = self.gateway.list_expenses(load.start(), load.end()).await;
        MonthFetch { load, result }
    }

    /// Apply a fetched month. Returns true when the state was updated.
    pub fn apply_month(&self, state: &mut DashboardState, fetched: MonthFetch) -> bool {
        let MonthFetch { load, result } = fetched;
        match result {
            Ok(expenses) => match state.apply_expenses(load, expenses) {
                Ok(LoadOutcome::Applied) => true,
                Ok(LoadOutcome::Stale) => false,
                Err(e) => {
                    state.fail_load(&load);
                    self.report(&e.to_string(), CONTEXT_LOAD_EXPENSES);
                    false
                }
            },
            Err(e) => {
                if state.fail_load(&load) {
                    self.report(&e.to_string(), CONTEXT_LOAD_EXPENSES);
                } else {
                    warn!("Ignoring failure of superseded load for {}: {}", load.month, e);
                }
                false
            }
        }
    }

    /// Load server-side per-month totals, for every label or just one
    pub async fn load_monthly_totals(
        &self,
        state: &mut DashboardState,
        label_id: Option<LabelId>,
    ) -> bool {
        match self.gateway.list_monthly_totals(label_id).await {
            Ok(totals) => {
                state.set_monthly_totals(totals);
                true
            }
            Err(e) => {
                self.report(&e.to_string(), CONTEXT_LOAD_TOTALS);
                false
            }
        }
    }

    /// Persist a new expense and show it if it belongs to the selected month.
    ///
    /// Returns the created expense when the backend accepted it.
    pub async fn add_expense(
        &self,
        state: &mut DashboardState,
        payload: InsertExpensePayload,
    ) -> Option<Expense> {
        let expense = match self.gateway.add_expense(&payload).await {
            Ok(expense) => expense,
            Err(e) => {
                self.report(&e.to_string(), CONTEXT_ADD_EXPENSE);
                return None;
            }
        };

        info!("Created expense {} ({:.2})", expense.id, expense.amount);
        if let Err(e) = state.add_expense(expense.clone()) {
            self.report(&e.to_string(), CONTEXT_ADD_EXPENSE);
        }
        Some(expense)
    }

    /// Delete an expense on the backend, then locally
    pub async fn delete_expense(&self, state: &mut DashboardState, expense_id: ExpenseId) -> bool {
        match self.gateway.delete_expense(expense_id).await {
            Ok(()) => {
                info!("Deleted expense {}", expense_id);
                state.remove_expense(expense_id);
                true
            }
            Err(e) => {
                self.report(&e.to_string(), CONTEXT_DELETE_EXPENSE);
                false
            }
        }
    }

    /// Delete a label on the backend, then drop it and its expenses locally
    pub async fn delete_label(&self, state: &mut DashboardState, label_id: LabelId) -> bool {
        match self.gateway.delete_label(label_id).await {
            Ok(()) => {
                let removed = state.remove_label(label_id);
                info!("Deleted label {} and {} of its expenses", label_id, removed);
                true
            }
            Err(e) => {
                self.report(&e.to_string(), CONTEXT_DELETE_LABEL);
                false
            }
        }
    }

    fn report(&self, message: &str, context: &str) {
        self.reporter.handle_error(message, context);
    }
}
