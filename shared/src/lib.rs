use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Date format used on the wire for query parameters and JSON bodies
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format used when displaying a month to the user (e.g. "March 2024")
pub const MONTH_DISPLAY_FORMAT: &str = "%B %Y";

pub type ExpenseId = i64;
pub type LabelId = i64;

/// A single dated monetary outflow linked to a label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Server-assigned identifier
    pub id: ExpenseId,
    /// Label (category) this expense belongs to
    pub label_id: LabelId,
    /// Expense amount (always an outflow)
    pub amount: f64,
    /// Day the expense occurred. Older backends omit it on list responses.
    #[serde(default, with = "wire_date::option")]
    pub date: Option<NaiveDate>,
}

/// A user-defined category for grouping expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    /// Display name
    pub label: String,
}

/// Server-side aggregate of expenses for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalExpenseByMonth {
    pub month: String,
    pub total: f64,
}

/// Body of the add-expense request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertExpensePayload {
    pub label_id: LabelId,
    pub amount: f64,
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
}

/// Chart-ready data: a shared category axis and one dataset per series.
///
/// The shape mirrors what bar-chart widgets expect, so a UI layer can hand it
/// over without reshaping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    /// Category axis entries
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
    #[serde(default)]
    pub options: ChartOptions,
}

/// Presentation hints for the bar chart that renders a [`ChartData`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    /// Resize with the surrounding container
    pub responsive: bool,
    pub show_legend: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            responsive: true,
            show_legend: true,
        }
    }
}

/// A single named series in a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
}

impl ChartData {
    /// Find a dataset by its series name
    pub fn dataset(&self, label: &str) -> Option<&ChartDataset> {
        self.datasets.iter().find(|dataset| dataset.label == label)
    }
}

/// A calendar month, normalized to its first day
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MonthSelection {
    start: NaiveDate,
}

impl MonthSelection {
    /// The month containing the given date
    pub fn containing(date: NaiveDate) -> Self {
        // Day 1 exists in every month
        let start = date.with_day(1).unwrap_or(date);
        Self { start }
    }

    /// Build from a year and a 1-based month number
    pub fn from_year_month(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|start| Self { start })
    }

    /// The month containing today's local date
    pub fn current() -> Self {
        Self::containing(chrono::Local::now().date_naive())
    }

    /// First day of the month
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the month
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// Whether the date falls inside this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Every month of this month's year, from January up to and including this one
    pub fn months_of_year_through(&self) -> Vec<MonthSelection> {
        (1..=self.month())
            .filter_map(|month| Self::from_year_month(self.year(), month))
            .collect()
    }

    /// Human readable form, e.g. "March 2024"
    pub fn display_name(&self) -> String {
        self.start.format(MONTH_DISPLAY_FORMAT).to_string()
    }
}

impl Default for MonthSelection {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for MonthSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for MonthSelection {
    type Err = MonthParseError;

    /// Parse a `YYYY-MM` string
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s.trim().split_once('-').ok_or(MonthParseError::InvalidFormat)?;
        let year = year.parse::<i32>().map_err(|_| MonthParseError::InvalidFormat)?;
        let month = month.parse::<u32>().map_err(|_| MonthParseError::InvalidFormat)?;
        Self::from_year_month(year, month).ok_or(MonthParseError::OutOfRange)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MonthParseError {
    InvalidFormat,
    OutOfRange,
}

impl fmt::Display for MonthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthParseError::InvalidFormat => write!(f, "Invalid month format, expected YYYY-MM"),
            MonthParseError::OutOfRange => write!(f, "Month out of range"),
        }
    }
}

impl std::error::Error for MonthParseError {}

/// Format a date the way the backend expects it in query strings
pub fn format_wire_date(date: NaiveDate) -> String {
    date.format(WIRE_DATE_FORMAT).to_string()
}

/// Serde helpers for `yyyy-MM-dd` dates.
///
/// Reading is lenient: a full timestamp such as `2024-03-15T00:00:00Z` is
/// accepted and truncated to its date part.
pub mod wire_date {
    use super::WIRE_DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let date_part = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, WIRE_DATE_FORMAT).ok()
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(WIRE_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {}", raw)))
    }

    pub mod option {
        use chrono::NaiveDate;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid date: {}", raw))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_containing_normalizes_to_first_day() {
        let month = MonthSelection::containing(date(2024, 3, 17));
        assert_eq!(month.start(), date(2024, 3, 1));
        assert_eq!(month, MonthSelection::containing(date(2024, 3, 31)));
        assert_ne!(month, MonthSelection::containing(date(2024, 4, 1)));
    }

    #[test]
    fn test_month_end_handles_month_lengths() {
        assert_eq!(MonthSelection::containing(date(2024, 2, 10)).end(), date(2024, 2, 29));
        assert_eq!(MonthSelection::containing(date(2023, 2, 10)).end(), date(2023, 2, 28));
        assert_eq!(MonthSelection::containing(date(2024, 4, 30)).end(), date(2024, 4, 30));
        assert_eq!(MonthSelection::containing(date(2024, 12, 5)).end(), date(2024, 12, 31));
    }

    #[test]
    fn test_months_of_year_through() {
        let months = MonthSelection::containing(date(2024, 3, 20)).months_of_year_through();
        let names: Vec<String> = months.iter().map(|m| m.display_name()).collect();
        assert_eq!(names, vec!["January 2024", "February 2024", "March 2024"]);

        let january = MonthSelection::containing(date(2025, 1, 2)).months_of_year_through();
        assert_eq!(january.len(), 1);
    }

    #[test]
    fn test_parse_month() {
        let month: MonthSelection = "2024-07".parse().unwrap();
        assert_eq!(month.start(), date(2024, 7, 1));
        assert_eq!(month.to_string(), "2024-07");

        assert_eq!("2024".parse::<MonthSelection>(), Err(MonthParseError::InvalidFormat));
        assert_eq!("2024-13".parse::<MonthSelection>(), Err(MonthParseError::OutOfRange));
    }

    #[test]
    fn test_expense_wire_format() {
        let expense: Expense = serde_json::from_str(
            r#"{"id":4,"labelId":2,"amount":12.5,"date":"2024-03-15T00:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(expense.label_id, 2);
        assert_eq!(expense.date, Some(date(2024, 3, 15)));

        let undated: Expense = serde_json::from_str(r#"{"id":5,"labelId":1,"amount":3}"#).unwrap();
        assert_eq!(undated.date, None);
    }

    #[test]
    fn test_insert_payload_serializes_camel_case() {
        let payload = InsertExpensePayload {
            label_id: 3,
            amount: 9.99,
            date: date(2024, 1, 5),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"labelId": 3, "amount": 9.99, "date": "2024-01-05"}));
    }

    #[test]
    fn test_chart_options_default_to_responsive_with_legend() {
        let chart = ChartData::default();
        assert!(chart.options.responsive);
        assert!(chart.options.show_legend);

        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["options"], serde_json::json!({"responsive": true, "showLegend": true}));

        let parsed: ChartData =
            serde_json::from_str(r#"{"labels":["Expenses"],"datasets":[]}"#).unwrap();
        assert_eq!(parsed.options, ChartOptions::default());
    }
}
