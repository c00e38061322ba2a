//! Wire types exchanged with the prediction service

use std::fmt;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::Transaction;
use crate::window::TimeRange;

/// Confidence attached to a forecast
///
/// Labels the service invents are kept, uppercased, rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Confidence {
    Low,
    Medium,
    High,
    Other(String),
}

impl Confidence {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for Confidence {
    fn from(label: String) -> Self {
        match label.trim().to_uppercase().as_str() {
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<Confidence> for String {
    fn from(confidence: Confidence) -> Self {
        confidence.as_str().to_string()
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One month of a forecast series
///
/// Historical months carry `actual`; future months carry `predicted`. Either
/// may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub month: String,
    #[serde(default)]
    pub predicted: Option<Decimal>,
    #[serde(default)]
    pub actual: Option<Decimal>,
    /// Per-point fields the service adds, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ForecastPoint {
    pub fn new(
        month: impl Into<String>,
        predicted: Option<Decimal>,
        actual: Option<Decimal>,
    ) -> Self {
        Self {
            month: month.into(),
            predicted,
            actual,
            extra: Map::new(),
        }
    }
}

/// Forecast returned to callers, from the service or the fallback stub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastResult {
    #[serde(alias = "forecast")]
    pub points: Vec<ForecastPoint>,
    pub accuracy: Decimal,
    pub confidence: Confidence,
    /// Fields beyond the known contract, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "LOW", alias = "low")]
    Low,
    #[serde(rename = "MEDIUM", alias = "medium")]
    Medium,
    #[serde(rename = "HIGH", alias = "high")]
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// In `[0, 1]`
    pub risk_score: Decimal,
    pub risk_level: RiskLevel,
    pub reasons: Vec<String>,
    pub recommendation: String,
}

/// Historical expense sent with a forecast request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpensePoint {
    pub amount: Decimal,
    /// ISO-8601 timestamp
    pub date: String,
    pub category: String,
}

impl From<&Transaction> for ExpensePoint {
    fn from(tx: &Transaction) -> Self {
        Self {
            amount: tx.amount,
            date: iso_date(tx.occurred_on),
            category: tx.category.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub expenses: Vec<ExpensePoint>,
    pub time_range: TimeRange,
}

/// The transaction being assessed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTransaction {
    pub amount: Decimal,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    /// ISO-8601 timestamp of the assessment
    pub timestamp: String,
}

/// Historical expense sent with a risk request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalExpense {
    pub amount: Decimal,
    pub date: String,
    pub category: String,
    pub description: String,
}

impl From<&Transaction> for HistoricalExpense {
    fn from(tx: &Transaction) -> Self {
        Self {
            amount: tx.amount,
            date: iso_date(tx.occurred_on),
            category: tx.category.clone(),
            description: tx.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRequest {
    pub transaction: CandidateTransaction,
    pub historical_data: Vec<HistoricalExpense>,
}

/// Midnight UTC of `date` as an ISO-8601 string with millisecond precision
pub fn iso_date(date: NaiveDate) -> String {
    iso_timestamp(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
}

pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
