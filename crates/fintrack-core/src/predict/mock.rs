//! Mock predictor for testing
//!
//! Answers in-process without a running service. Can be made to fail or
//! stall so callers' fallback paths can be exercised.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{Error, Result};

use super::types::{
    Confidence, ForecastPoint, ForecastRequest, ForecastResult, RiskAssessment, RiskLevel,
    RiskRequest,
};
use super::Predictor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    Healthy,
    /// Every call returns an error
    Unavailable,
    /// Calls succeed after sleeping
    Slow(Duration),
}

#[derive(Clone)]
pub struct MockPredictor {
    behavior: MockBehavior,
    calls: Arc<AtomicUsize>,
}

impl Default for MockPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPredictor {
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Healthy)
    }

    pub fn unavailable() -> Self {
        Self::with_behavior(MockBehavior::Unavailable)
    }

    pub fn slow(delay: Duration) -> Self {
        Self::with_behavior(MockBehavior::Slow(delay))
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Forecast and risk calls received so far (health checks excluded)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::Healthy => Ok(()),
            MockBehavior::Unavailable => Err(Error::InvalidData(
                "mock predictor is unavailable".to_string(),
            )),
            MockBehavior::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Predictor for MockPredictor {
    async fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResult> {
        self.enter().await?;

        // Actuals per month from the supplied history, then one predicted
        // month at the historical average
        let mut months: BTreeMap<String, Decimal> = BTreeMap::new();
        for expense in &request.expenses {
            let month = expense.date.get(..7).unwrap_or(&expense.date).to_string();
            *months.entry(month).or_insert(Decimal::ZERO) += expense.amount;
        }

        let mut points: Vec<ForecastPoint> = months
            .iter()
            .map(|(month, total)| ForecastPoint::new(month.clone(), None, Some(*total)))
            .collect();

        if let Some((last, _)) = months.iter().next_back() {
            let average = months.values().copied().sum::<Decimal>() / Decimal::from(months.len());
            if let Some(next) = next_month(last) {
                points.push(ForecastPoint::new(next, Some(average.round_dp(2)), None));
            }
        }

        Ok(ForecastResult {
            points,
            accuracy: dec!(90),
            confidence: Confidence::Medium,
            extra: Default::default(),
        })
    }

    async fn assess_risk(&self, request: &RiskRequest) -> Result<RiskAssessment> {
        self.enter().await?;

        if request.historical_data.is_empty() {
            return Ok(RiskAssessment {
                risk_score: dec!(0.5),
                risk_level: RiskLevel::Medium,
                reasons: vec!["Insufficient historical data".to_string()],
                recommendation: "Monitor this transaction".to_string(),
            });
        }

        Ok(RiskAssessment {
            risk_score: dec!(0.05),
            risk_level: RiskLevel::Low,
            reasons: vec!["Consistent with spending history".to_string()],
            recommendation: "Transaction appears normal".to_string(),
        })
    }

    async fn health_check(&self) -> bool {
        self.behavior != MockBehavior::Unavailable
    }

    fn host(&self) -> &str {
        "mock"
    }
}

fn next_month(month: &str) -> Option<String> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").ok()?;
    let next = first.checked_add_months(Months::new(1))?;
    Some(next.format("%Y-%m").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::types::ExpensePoint;
    use crate::window::TimeRange;

    fn expense(amount: Decimal, date: &str) -> ExpensePoint {
        ExpensePoint {
            amount,
            date: date.to_string(),
            category: "Shopping".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_forecast_from_history() {
        let request = ForecastRequest {
            expenses: vec![
                expense(dec!(100), "2024-01-05T00:00:00.000Z"),
                expense(dec!(50), "2024-01-20T00:00:00.000Z"),
                expense(dec!(250), "2024-02-01T00:00:00.000Z"),
            ],
            time_range: TimeRange::SixMonths,
        };
        let result = MockPredictor::new().forecast(&request).await.unwrap();

        assert_eq!(result.points.len(), 3);
        assert_eq!(result.points[0].actual, Some(dec!(150)));
        assert_eq!(result.points[2].month, "2024-03");
        assert_eq!(result.points[2].predicted, Some(dec!(200)));
    }

    #[tokio::test]
    async fn test_unavailable_counts_calls() {
        let mock = MockPredictor::unavailable();
        let request = ForecastRequest {
            expenses: vec![],
            time_range: TimeRange::OneMonth,
        };
        assert!(mock.forecast(&request).await.is_err());
        assert_eq!(mock.calls(), 1);
        assert!(!mock.health_check().await);
    }

    #[test]
    fn test_next_month_rolls_year() {
        assert_eq!(next_month("2023-12").as_deref(), Some("2024-01"));
        assert_eq!(next_month("bogus"), None);
    }
}
