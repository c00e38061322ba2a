//! Spending analytics
//!
//! Aggregates a user's transactions over a time window, derives advisory
//! insights and shapes the result into a [`SpendingReport`]. Everything is
//! computed locally; no external service is involved.

mod aggregate;
mod dashboard;
mod insights;
mod types;

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::Result;
use crate::store::{run_query, SharedStore, TransactionQuery};
use crate::window::TimeRange;

pub use aggregate::{aggregate, health_score, savings_rate, TOP_CATEGORY_LIMIT};
pub use dashboard::{
    summarize as summarize_dashboard, ChartPoint, DashboardService, DashboardSummary,
    RecentTransaction, CHART_MONTHS, RECENT_LIMIT,
};
pub use insights::{generate as generate_insights, InsightGenerator};
pub use types::*;

/// Spending analytics over the transaction store
#[derive(Clone)]
pub struct SpendingAnalyticsService {
    store: SharedStore,
    store_timeout: Duration,
}

impl SpendingAnalyticsService {
    pub fn new(store: SharedStore, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Build the spending report for `user_id` over `range`, ending `today`.
    ///
    /// Store failures propagate; there is no fallback for analytics.
    pub async fn spending_analytics(
        &self,
        user_id: &str,
        range: TimeRange,
        category: Option<&str>,
        today: NaiveDate,
    ) -> Result<SpendingReport> {
        let window = range.resolve(today);
        let query = TransactionQuery::for_owner(user_id)
            .between(window.start, window.end)
            .category(category.map(str::to_string));
        let owner = user_id.to_string();

        let (transactions, categories) = run_query(&self.store, self.store_timeout, move |store| {
            let txs = store.find_transactions(&query)?;
            let cats = store.categories(&owner)?;
            Ok((txs, cats))
        })
        .await?;

        debug!(
            user_id,
            time_range = %range,
            transactions = transactions.len(),
            "Computing spending analytics"
        );

        let aggregates = aggregate(&transactions, &window);
        let insights = generate_insights(&aggregates, today).collect();

        let colors: HashMap<String, Option<String>> =
            categories.into_iter().map(|c| (c.name, c.color)).collect();

        Ok(build_report(&aggregates, insights, &colors))
    }
}

/// Shape aggregates and insights into the response contract
pub fn build_report(
    aggregates: &Aggregates,
    insights: Vec<Insight>,
    colors: &HashMap<String, Option<String>>,
) -> SpendingReport {
    let trends = aggregates
        .monthly_buckets
        .iter()
        .map(|b| TrendPoint {
            month: b.month.clone(),
            amount: b.net_amount.abs(),
            net: b.net_amount,
        })
        .collect();

    let category_breakdown = aggregates
        .category_totals
        .iter()
        .map(|c| CategoryBreakdownEntry {
            name: c.category.clone(),
            value: c.total_expense,
            color: colors.get(&c.category).cloned().flatten(),
        })
        .collect();

    let top_categories = aggregates
        .top_categories
        .iter()
        .map(|c| TopCategory {
            name: c.category.clone(),
            amount: c.total_expense,
        })
        .collect();

    SpendingReport {
        trends,
        category_breakdown,
        top_categories,
        insights,
        summary: SpendingSummary {
            total_spent: aggregates.total_expense,
            total_income: aggregates.total_income,
            savings_rate: aggregates.savings_rate,
            health_score: aggregates.health_score,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryInfo, Transaction, TransactionKind};
    use crate::store::MemoryStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded_store() -> MemoryStore {
        let mk = |id, amount, kind, category: &str, on| Transaction {
            id,
            owner: "alice".into(),
            amount,
            kind,
            category: category.into(),
            description: String::new(),
            occurred_on: on,
        };
        let store = MemoryStore::with_transactions(vec![
            mk(1, dec!(100), TransactionKind::Expense, "Food & Dining", date(2024, 1, 10)),
            mk(2, dec!(200), TransactionKind::Expense, "Shopping", date(2024, 2, 3)),
            mk(3, dec!(50), TransactionKind::Expense, "Food & Dining", date(2024, 2, 20)),
            mk(4, dec!(1000), TransactionKind::Income, "Salary", date(2024, 2, 1)),
        ]);
        store.add_category(
            "alice",
            CategoryInfo { id: 1, name: "Shopping".into(), color: Some("#3b82f6".into()) },
        );
        store
    }

    fn service() -> SpendingAnalyticsService {
        SpendingAnalyticsService::new(Arc::new(seeded_store()), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_spending_report() {
        let service = service();
        let report = service
            .spending_analytics("alice", TimeRange::ThreeMonths, None, date(2024, 2, 29))
            .await
            .unwrap();

        assert_eq!(report.trends.len(), 2);
        assert_eq!(report.trends[1].net, dec!(-750));
        assert_eq!(report.trends[1].amount, dec!(750));
        assert_eq!(report.summary.total_spent, dec!(350));
        assert_eq!(report.summary.savings_rate, dec!(65));
        assert_eq!(report.summary.health_score, dec!(85));

        assert_eq!(report.category_breakdown[0].name, "Shopping");
        assert_eq!(report.category_breakdown[0].color.as_deref(), Some("#3b82f6"));
        assert_eq!(report.category_breakdown[1].color, None);

        assert_eq!(report.insights.len(), 1);
        assert_eq!(report.insights[0].kind, InsightKind::Positive);
    }

    #[tokio::test]
    async fn test_other_users_data_is_invisible() {
        let service = service();
        let report = service
            .spending_analytics("mallory", TimeRange::OneYear, None, date(2024, 2, 29))
            .await
            .unwrap();
        assert!(report.trends.is_empty());
        assert_eq!(report.summary.total_spent, dec!(0));
    }

    #[tokio::test]
    async fn test_category_filter() {
        let service = service();
        let report = service
            .spending_analytics(
                "alice",
                TimeRange::SixMonths,
                Some("Food & Dining"),
                date(2024, 2, 29),
            )
            .await
            .unwrap();
        assert_eq!(report.summary.total_spent, dec!(150));
        assert_eq!(report.summary.total_income, dec!(0));
        assert_eq!(report.category_breakdown.len(), 1);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = build_report(
            &aggregate(&[], &TimeRange::OneMonth.resolve(date(2024, 1, 1))),
            vec![],
            &HashMap::new(),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("categoryBreakdown").is_some());
        assert!(json.get("topCategories").is_some());
        assert!(json["summary"].get("totalSpent").is_some());
        assert!(json["summary"].get("healthScore").is_some());
    }
}
