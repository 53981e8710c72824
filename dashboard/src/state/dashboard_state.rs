//! # Dashboard State Module
//!
//! View-state of the monthly expense dashboard: the selected month, the
//! labels and expenses loaded for it, the derived chart and the server-side
//! monthly totals.
//!
//! The state is owned by the UI layer and handed to the controller by
//! `&mut`. Every mutation that touches expenses or labels rebuilds the chart,
//! so `chart()` always reflects the current lists.
//!
//! Month loads are tagged with a generation number. Selecting a month (or
//! reloading it) bumps the generation, and a response is only applied if it
//! carries the current one, so a slow answer for an old month can never
//! overwrite a newer selection.
//!
//! Loaded expenses always belong to the selected month: switching months
//! clears them before the new load is issued, and a failed load leaves the
//! month marked [`MonthStatus::Failed`] so selecting it again retries.

use chrono::NaiveDate;
use shared::{ChartData, Expense, ExpenseId, Label, LabelId, MonthSelection, TotalExpenseByMonth};
use tracing::{debug, info, warn};

use crate::chart::project_chart;
use crate::config::DEFAULT_CHART_LABEL;
use crate::error::DashboardError;

/// Ticket for one month load, handed out when a load is started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthLoad {
    pub generation: u64,
    pub month: MonthSelection,
}

impl MonthLoad {
    /// First day of the requested interval
    pub fn start(&self) -> NaiveDate {
        self.month.start()
    }

    /// Last day of the requested interval
    pub fn end(&self) -> NaiveDate {
        self.month.end()
    }
}

/// What happened to a month load response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load was started; the response was dropped
    Stale,
}

/// Progress of the selected month's expense load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthStatus {
    NotLoaded,
    Loading,
    Loaded,
    Failed,
}

/// Where a newly created expense ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpensePlacement {
    /// Added to the in-memory list of the selected month
    CurrentMonth,
    /// Dated in another month, so it is not shown
    OtherMonth,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    selected_month: MonthSelection,
    generation: u64,
    month_status: MonthStatus,
    labels: Vec<Label>,
    expenses: Vec<Expense>,
    chart: ChartData,
    chart_category: String,
    monthly_totals: Vec<TotalExpenseByMonth>,
}

impl DashboardState {
    /// State positioned on the month containing today
    pub fn new() -> Self {
        Self::for_month(MonthSelection::current())
    }

    pub fn for_month(selected_month: MonthSelection) -> Self {
        let mut state = Self {
            selected_month,
            generation: 0,
            month_status: MonthStatus::NotLoaded,
            labels: Vec::new(),
            expenses: Vec::new(),
            chart: ChartData::default(),
            chart_category: DEFAULT_CHART_LABEL.to_string(),
            monthly_totals: Vec::new(),
        };
        state.refresh_chart();
        state
    }

    /// Use a different category axis entry for the chart
    pub fn with_chart_category(mut self, category: impl Into<String>) -> Self {
        self.chart_category = category.into();
        self.refresh_chart();
        self
    }

    pub fn selected_month(&self) -> MonthSelection {
        self.selected_month
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn month_status(&self) -> MonthStatus {
        self.month_status
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn chart(&self) -> &ChartData {
        &self.chart
    }

    pub fn monthly_totals(&self) -> &[TotalExpenseByMonth] {
        &self.monthly_totals
    }

    /// Switch to the month containing `target`.
    ///
    /// Returns the load to perform, or `None` when that month is already
    /// selected and loaded (or loading). A month whose last load failed is
    /// loaded again.
    pub fn select_month(&mut self, target: NaiveDate) -> Option<MonthLoad> {
        let month = MonthSelection::containing(target);
        if month == self.selected_month {
            if matches!(self.month_status, MonthStatus::Loading | MonthStatus::Loaded) {
                debug!("Month {} already selected", month);
                return None;
            }
            info!("Retrying month {}", month);
            return Some(self.begin_reload());
        }

        info!("Selecting month {}", month);
        self.selected_month = month;
        if !self.expenses.is_empty() {
            self.expenses.clear();
            self.refresh_chart();
        }
        Some(self.begin_reload())
    }

    /// Start a fresh load of the selected month, superseding pending ones
    pub fn begin_reload(&mut self) -> MonthLoad {
        self.generation += 1;
        self.month_status = MonthStatus::Loading;
        MonthLoad {
            generation: self.generation,
            month: self.selected_month,
        }
    }

    /// Whether the response to `load` would still be applied
    pub fn is_current(&self, load: &MonthLoad) -> bool {
        load.generation == self.generation && load.month == self.selected_month
    }

    /// Replace the expenses with a month load response.
    ///
    /// Stale responses are dropped. A response referencing a label that is not
    /// loaded is rejected as a whole and leaves the state untouched.
    pub fn apply_expenses(
        &mut self,
        load: MonthLoad,
        expenses: Vec<Expense>,
    ) -> Result<LoadOutcome, DashboardError> {
        if !self.is_current(&load) {
            warn!(
                "Dropping stale expenses for {} (generation {}, current {})",
                load.month, load.generation, self.generation
            );
            return Ok(LoadOutcome::Stale);
        }

        if let Some(orphan) = expenses.iter().find(|e| self.label(e.label_id).is_none()) {
            return Err(DashboardError::UnknownLabel {
                expense_id: orphan.id,
                label_id: orphan.label_id,
            });
        }

        info!("Loaded {} expenses for {}", expenses.len(), load.month);
        self.expenses = expenses;
        self.month_status = MonthStatus::Loaded;
        self.refresh_chart();
        Ok(LoadOutcome::Applied)
    }

    /// Mark `load` as failed. Returns false, leaving the state untouched,
    /// when a newer load superseded it.
    pub fn fail_load(&mut self, load: &MonthLoad) -> bool {
        if !self.is_current(load) {
            return false;
        }
        warn!("Load of {} failed", load.month);
        self.month_status = MonthStatus::Failed;
        true
    }

    /// Replace the label set, dropping expenses whose label disappeared
    pub fn set_labels(&mut self, labels: Vec<Label>) {
        self.labels = labels;
        let before = self.expenses.len();
        let labels = &self.labels;
        self.expenses.retain(|e| labels.iter().any(|l| l.id == e.label_id));
        if self.expenses.len() != before {
            warn!("Dropped {} expenses without a label", before - self.expenses.len());
        }
        self.refresh_chart();
    }

    /// A label was created elsewhere in the UI
    pub fn add_label(&mut self, label: Label) {
        match self.labels.iter_mut().find(|l| l.id == label.id) {
            Some(existing) => *existing = label,
            None => self.labels.push(label),
        }
        // Renaming an existing label changes its series name
        self.refresh_chart();
    }

    /// Remove a label and, locally, every expense that references it.
    ///
    /// Returns how many expenses were removed.
    pub fn remove_label(&mut self, label_id: LabelId) -> usize {
        self.labels.retain(|l| l.id != label_id);
        let before = self.expenses.len();
        self.expenses.retain(|e| e.label_id != label_id);
        self.refresh_chart();
        before - self.expenses.len()
    }

    /// Record an expense the backend already persisted
    pub fn add_expense(&mut self, expense: Expense) -> Result<ExpensePlacement, DashboardError> {
        if self.label(expense.label_id).is_none() {
            return Err(DashboardError::UnknownLabel {
                expense_id: expense.id,
                label_id: expense.label_id,
            });
        }

        if let Some(date) = expense.date {
            if !self.selected_month.contains(date) {
                debug!("Expense {} is dated {}, outside {}", expense.id, date, self.selected_month);
                return Ok(ExpensePlacement::OtherMonth);
            }
        }

        self.expenses.push(expense);
        self.refresh_chart();
        Ok(ExpensePlacement::CurrentMonth)
    }

    /// Drop an expense the backend confirmed as deleted. Returns whether it was present.
    pub fn remove_expense(&mut self, expense_id: ExpenseId) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != expense_id);
        let removed = self.expenses.len() != before;
        if removed {
            self.refresh_chart();
        }
        removed
    }

    pub fn set_monthly_totals(&mut self, totals: Vec<TotalExpenseByMonth>) {
        self.monthly_totals = totals;
    }

    /// Sum of every loaded expense; zero when nothing is loaded
    pub fn total_for_month(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    pub fn label(&self, label_id: LabelId) -> Option<&Label> {
        self.labels.iter().find(|l| l.id == label_id)
    }

    /// Months offered by the month picker: January of `today`'s year through
    /// the month containing `today`
    pub fn past_months(today: NaiveDate) -> Vec<MonthSelection> {
        MonthSelection::containing(today).months_of_year_through()
    }

    /// Whether `date` falls in the selected month
    pub fn is_selected(&self, date: NaiveDate) -> bool {
        self.selected_month.contains(date)
    }

    fn refresh_chart(&mut self) {
        self.chart = project_chart(&self.expenses, &self.labels, &self.chart_category);
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}
