//! Value types produced by the analytics engine
//!
//! Everything here is request-scoped: built from a transaction set, serialized
//! into a response and dropped. Nothing is persisted.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Net spend for one calendar month (`expenses - income`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    /// `YYYY-MM`
    pub month: String,
    pub net_amount: Decimal,
}

/// Total expense recorded against one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub total_expense: Decimal,
}

/// Output of the aggregation engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregates {
    /// Ascending by month; months without transactions are absent
    pub monthly_buckets: Vec<MonthlyBucket>,
    /// Every expense category, largest first, ties by name ascending
    pub category_totals: Vec<CategoryTotal>,
    /// First five entries of `category_totals`
    pub top_categories: Vec<CategoryTotal>,
    pub total_expense: Decimal,
    pub total_income: Decimal,
    /// Percentage of income saved; zero when there is no income
    pub savings_rate: Decimal,
    /// Bounded to `[0, 100]`
    pub health_score: Decimal,
}

impl Aggregates {
    /// Net amount for a month key, zero when the month has no bucket
    pub fn bucket(&self, month: &str) -> Decimal {
        self.monthly_buckets
            .iter()
            .find(|b| b.month == month)
            .map(|b| b.net_amount)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Tone of an advisory insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InsightKind {
    Positive,
    Warning,
    Negative,
    Info,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Warning => "WARNING",
            Self::Negative => "NEGATIVE",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A short advisory message derived from aggregate thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
}

impl Insight {
    pub fn new(
        kind: InsightKind,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// One point of the spending trend chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub month: String,
    /// Magnitude of the month's net amount, for charting
    pub amount: Decimal,
    /// Signed net amount (`expenses - income`)
    pub net: Decimal,
}

/// One slice of the category breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdownEntry {
    pub name: String,
    pub value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopCategory {
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    pub total_spent: Decimal,
    pub total_income: Decimal,
    pub savings_rate: Decimal,
    pub health_score: Decimal,
}

/// Full spending analytics response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingReport {
    pub trends: Vec<TrendPoint>,
    pub category_breakdown: Vec<CategoryBreakdownEntry>,
    pub top_categories: Vec<TopCategory>,
    pub insights: Vec<Insight>,
    pub summary: SpendingSummary,
}
