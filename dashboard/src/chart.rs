//! # Chart Projection
//!
//! Turns a month's worth of expenses into per-label totals for the bar chart.
//!
//! ## Algorithm
//! 1. Group amounts into buckets keyed by label id (buckets are created lazily,
//!    so a label without expenses never gets one)
//! 2. Sum each bucket
//! 3. Name each bucket by its label's display name
//! 4. Emit one single-value dataset per bucket under one shared category
//!
//! The projection is always rebuilt from scratch; callers never patch it.

use std::collections::BTreeMap;

use shared::{ChartData, ChartDataset, Expense, Label, LabelId};
use tracing::warn;

/// Amounts grouped by label id, in ascending label id order
pub fn expenses_by_label(expenses: &[Expense]) -> BTreeMap<LabelId, Vec<f64>> {
    expenses.iter().fold(BTreeMap::new(), |mut buckets, expense| {
        buckets
            .entry(expense.label_id)
            .or_insert_with(Vec::new)
            .push(expense.amount);
        buckets
    })
}

/// Sum of amounts per label id
pub fn totals_by_label(expenses: &[Expense]) -> BTreeMap<LabelId, f64> {
    expenses_by_label(expenses)
        .into_iter()
        .map(|(label_id, amounts)| (label_id, amounts.iter().sum()))
        .collect()
}

/// Build the chart for the given expenses.
///
/// Every expense is expected to reference a label in `labels`; buckets whose
/// label is missing are left out of the chart.
pub fn project_chart(expenses: &[Expense], labels: &[Label], category: &str) -> ChartData {
    let datasets = totals_by_label(expenses)
        .into_iter()
        .filter_map(|(label_id, total)| match labels.iter().find(|l| l.id == label_id) {
            Some(label) => Some(ChartDataset {
                label: label.label.clone(),
                data: vec![total],
            }),
            None => {
                warn!("Skipping chart series for unknown label {}", label_id);
                None
            }
        })
        .collect();

    ChartData {
        labels: vec![category.to_string()],
        datasets,
        ..ChartData::default()
    }
}
