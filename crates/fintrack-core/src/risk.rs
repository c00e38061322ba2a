//! Transaction risk assessment
//!
//! Validates a candidate transaction, gathers the user's last 30 days of
//! expenses and asks the prediction service for a score. When the service
//! fails, a local amount/category heuristic answers instead.

use std::time::Duration;

use chrono::{DateTime, Days, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::TransactionKind;
use crate::predict::{
    iso_timestamp, CandidateTransaction, HistoricalExpense, Predictor, PredictorClient,
    RiskAssessment, RiskLevel, RiskRequest,
};
use crate::resilience::ResilientCaller;
use crate::store::{run_query, SharedStore, SortOrder, TransactionQuery};

pub const RISK_HISTORY_LIMIT: usize = 50;
pub const RISK_HISTORY_DAYS: u64 = 30;

const HIGH_AMOUNT_THRESHOLD: Decimal = dec!(1000);
const UNUSUAL_CATEGORY: &str = "crypto";

/// A transaction submitted for assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCandidate {
    pub amount: Decimal,
    pub category: String,
    #[serde(default)]
    pub merchant: Option<String>,
}

impl RiskCandidate {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.amount < Decimal::ZERO {
            errors.push("amount must be a non-negative number".to_string());
        }
        if self.category.trim().is_empty() {
            errors.push("category is required".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

#[derive(Clone)]
pub struct RiskAssessmentService {
    store: SharedStore,
    predictor: PredictorClient,
    caller: ResilientCaller,
    store_timeout: Duration,
}

impl RiskAssessmentService {
    pub fn new(
        store: SharedStore,
        predictor: PredictorClient,
        caller: ResilientCaller,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            predictor,
            caller,
            store_timeout,
        }
    }

    /// Assess `candidate` for `user_id` at time `now`.
    ///
    /// Validation and store failures are returned as errors; prediction
    /// failures are not.
    pub async fn assess(
        &self,
        user_id: &str,
        candidate: &RiskCandidate,
        now: DateTime<Utc>,
    ) -> Result<RiskAssessment> {
        candidate.validate()?;

        let today = now.date_naive();
        let since = today.checked_sub_days(Days::new(RISK_HISTORY_DAYS)).unwrap_or(today);
        let query = TransactionQuery::for_owner(user_id)
            .kind(TransactionKind::Expense)
            .since(since)
            .order(SortOrder::Descending)
            .limit(RISK_HISTORY_LIMIT);

        let history = run_query(&self.store, self.store_timeout, move |store| {
            store.find_transactions(&query)
        })
        .await?;

        debug!(user_id, history = history.len(), "Requesting risk assessment");

        let request = RiskRequest {
            transaction: CandidateTransaction {
                amount: candidate.amount,
                category: candidate.category.clone(),
                merchant: candidate.merchant.clone(),
                timestamp: iso_timestamp(now),
            },
            historical_data: history.iter().map(HistoricalExpense::from).collect(),
        };

        Ok(self
            .caller
            .call("fraud-detection", self.predictor.assess_risk(&request), || {
                fallback_assessment(candidate)
            })
            .await)
    }
}

/// Local heuristic used when the prediction service is unavailable
pub fn fallback_assessment(candidate: &RiskCandidate) -> RiskAssessment {
    if candidate.amount > HIGH_AMOUNT_THRESHOLD || candidate.category == UNUSUAL_CATEGORY {
        RiskAssessment {
            risk_score: dec!(0.75),
            risk_level: RiskLevel::High,
            reasons: vec![
                "High amount transaction".to_string(),
                "Unusual category".to_string(),
            ],
            recommendation: "Review transaction".to_string(),
        }
    } else {
        RiskAssessment {
            risk_score: dec!(0.15),
            risk_level: RiskLevel::Low,
            reasons: vec!["Normal transaction pattern".to_string()],
            recommendation: "Approve transaction".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;
    use crate::predict::MockPredictor;
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, TimeZone};
    use std::sync::Arc;

    fn candidate(amount: Decimal, category: &str) -> RiskCandidate {
        RiskCandidate {
            amount,
            category: category.to_string(),
            merchant: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn service(predictor: PredictorClient) -> RiskAssessmentService {
        let on = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let store = MemoryStore::with_transactions(vec![Transaction {
            id: 1,
            owner: "alice".into(),
            amount: dec!(40),
            kind: TransactionKind::Expense,
            category: "Food & Dining".into(),
            description: "Lunch".into(),
            occurred_on: on(10),
        }]);
        RiskAssessmentService::new(
            Arc::new(store),
            predictor,
            ResilientCaller::new(Duration::from_millis(200)),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_fallback_heuristic() {
        let high = fallback_assessment(&candidate(dec!(1500), "electronics"));
        assert_eq!(high.risk_level, RiskLevel::High);
        assert_eq!(high.risk_score, dec!(0.75));
        assert_eq!(high.reasons.len(), 2);

        let low = fallback_assessment(&candidate(dec!(50), "food"));
        assert_eq!(low.risk_level, RiskLevel::Low);
        assert_eq!(low.recommendation, "Approve transaction");

        assert_eq!(fallback_assessment(&candidate(dec!(5), "crypto")).risk_level, RiskLevel::High);
        assert_eq!(fallback_assessment(&candidate(dec!(1000), "food")).risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_validation() {
        assert!(candidate(dec!(0), "Shopping").validate().is_ok());
        let err = candidate(dec!(-1), "  ").validate().unwrap_err();
        match err {
            Error::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_validation_is_never_masked() {
        let mock = MockPredictor::new();
        let svc = service(PredictorClient::Mock(mock.clone()));
        let result = svc.assess("alice", &candidate(dec!(-5), "Shopping"), now()).await;
        assert!(result.unwrap_err().is_validation());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_passes_through() {
        let result = service(PredictorClient::mock())
            .assess("alice", &candidate(dec!(1500), "electronics"), now())
            .await
            .unwrap();
        // Mock scores low when history exists; the heuristic would say HIGH
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn test_unavailable_predictor_uses_heuristic() {
        let result = service(PredictorClient::Mock(MockPredictor::unavailable()))
            .assess("alice", &candidate(dec!(1500), "electronics"), now())
            .await
            .unwrap();
        assert_eq!(result, fallback_assessment(&candidate(dec!(1500), "electronics")));
    }
}
