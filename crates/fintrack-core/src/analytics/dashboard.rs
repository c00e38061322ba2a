//! Month-at-a-glance dashboard
//!
//! Current calendar month income, expenses and balance, a zero-filled
//! six-month expense chart, the chart period's category breakdown and the
//! latest transactions.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::{month_key, Transaction, TransactionKind};
use crate::store::{run_query, SharedStore, SortOrder, TransactionQuery};
use crate::window::TimeWindow;

use super::aggregate::aggregate;
use super::types::CategoryBreakdownEntry;

/// Months shown in the expense chart, current month included
pub const CHART_MONTHS: u32 = 6;

/// Transactions listed under "recent"
pub const RECENT_LIMIT: usize = 5;

/// Expenses for one chart month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// `YYYY-MM`
    pub month: String,
    /// Short month name, e.g. `Jan`
    pub label: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentTransaction {
    pub id: i64,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
    pub kind: TransactionKind,
}

impl From<&Transaction> for RecentTransaction {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            description: tx.description.clone(),
            amount: tx.amount,
            category: tx.category.clone(),
            date: tx.occurred_on,
            kind: tx.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Current month income minus expenses
    pub total_balance: Decimal,
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    pub savings_rate: Decimal,
    /// Oldest month first
    pub expense_chart: Vec<ChartPoint>,
    pub category_breakdown: Vec<CategoryBreakdownEntry>,
    /// Newest first
    pub recent_transactions: Vec<RecentTransaction>,
}

/// First and last day of `today`'s month, and the first day of the chart
fn periods(today: NaiveDate) -> (TimeWindow, NaiveDate) {
    let month_start = today.with_day(1).unwrap_or(today);
    let month_end = month_start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(today);
    let chart_start = month_start
        .checked_sub_months(Months::new(CHART_MONTHS - 1))
        .unwrap_or(month_start);

    (
        TimeWindow {
            start: month_start,
            end: month_end,
        },
        chart_start,
    )
}

/// Build the dashboard from one user's transactions.
///
/// Transactions outside the chart period are ignored.
pub fn summarize(
    transactions: &[Transaction],
    colors: &HashMap<String, Option<String>>,
    today: NaiveDate,
) -> DashboardSummary {
    let (current, chart_start) = periods(today);
    let chart_window = TimeWindow {
        start: chart_start,
        end: current.end,
    };

    let this_month = aggregate(transactions, &current);
    let chart_period = aggregate(transactions, &chart_window);

    let mut monthly_expense: HashMap<String, Decimal> = HashMap::new();
    for tx in transactions
        .iter()
        .filter(|t| t.is_expense() && chart_window.contains(t.occurred_on))
    {
        *monthly_expense.entry(tx.month_key()).or_insert(Decimal::ZERO) += tx.amount;
    }

    let expense_chart = (0..CHART_MONTHS)
        .filter_map(|i| chart_start.checked_add_months(Months::new(i)))
        .map(|month| {
            let key = month_key(month);
            ChartPoint {
                amount: monthly_expense.get(&key).copied().unwrap_or(Decimal::ZERO),
                label: month.format("%b").to_string(),
                month: key,
            }
        })
        .collect();

    let category_breakdown = chart_period
        .category_totals
        .iter()
        .map(|c| CategoryBreakdownEntry {
            name: c.category.clone(),
            value: c.total_expense,
            color: colors.get(&c.category).cloned().flatten(),
        })
        .collect();

    let mut recent: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| chart_window.contains(t.occurred_on))
        .collect();
    recent.sort_by(|a, b| b.occurred_on.cmp(&a.occurred_on).then(b.id.cmp(&a.id)));

    DashboardSummary {
        total_balance: this_month.total_income - this_month.total_expense,
        monthly_income: this_month.total_income,
        monthly_expenses: this_month.total_expense,
        savings_rate: this_month.savings_rate,
        expense_chart,
        category_breakdown,
        recent_transactions: recent
            .into_iter()
            .take(RECENT_LIMIT)
            .map(RecentTransaction::from)
            .collect(),
    }
}

#[derive(Clone)]
pub struct DashboardService {
    store: SharedStore,
    store_timeout: Duration,
}

impl DashboardService {
    pub fn new(store: SharedStore, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Dashboard for `user_id` as of `today`. Store failures propagate.
    pub async fn dashboard(&self, user_id: &str, today: NaiveDate) -> Result<DashboardSummary> {
        let (current, chart_start) = periods(today);
        let query = TransactionQuery::for_owner(user_id)
            .between(chart_start, current.end)
            .order(SortOrder::Descending);
        let owner = user_id.to_string();

        let (transactions, categories) = run_query(&self.store, self.store_timeout, move |store| {
            let txs = store.find_transactions(&query)?;
            let cats = store.categories(&owner)?;
            Ok((txs, cats))
        })
        .await?;

        debug!(user_id, transactions = transactions.len(), "Building dashboard");

        let colors: HashMap<String, Option<String>> =
            categories.into_iter().map(|c| (c.name, c.color)).collect();
        Ok(summarize(&transactions, &colors, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryInfo;
    use crate::store::MemoryStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(
        id: i64,
        amount: Decimal,
        kind: TransactionKind,
        category: &str,
        on: NaiveDate,
    ) -> Transaction {
        Transaction {
            id,
            owner: "alice".to_string(),
            amount,
            kind,
            category: category.to_string(),
            description: format!("tx {}", id),
            occurred_on: on,
        }
    }

    fn history() -> Vec<Transaction> {
        use TransactionKind::{Expense, Income};
        vec![
            // Before the chart period
            tx(1, dec!(999), Expense, "Travel", date(2023, 12, 31)),
            tx(2, dec!(100), Expense, "Food & Dining", date(2024, 1, 10)),
            tx(3, dec!(40), Expense, "Shopping", date(2024, 3, 5)),
            tx(4, dec!(2000), Income, "Salary", date(2024, 6, 1)),
            tx(5, dec!(300), Expense, "Shopping", date(2024, 6, 3)),
            tx(6, dec!(200), Expense, "Food & Dining", date(2024, 6, 20)),
        ]
    }

    #[test]
    fn test_current_month_totals() {
        let summary = summarize(&history(), &HashMap::new(), date(2024, 6, 25));
        assert_eq!(summary.monthly_income, dec!(2000));
        assert_eq!(summary.monthly_expenses, dec!(500));
        assert_eq!(summary.total_balance, dec!(1500));
        assert_eq!(summary.savings_rate, dec!(75));
    }

    #[test]
    fn test_chart_is_zero_filled() {
        let summary = summarize(&history(), &HashMap::new(), date(2024, 6, 25));
        let months: Vec<_> = summary
            .expense_chart
            .iter()
            .map(|p| p.month.as_str())
            .collect();
        assert_eq!(
            months,
            vec!["2024-01", "2024-02", "2024-03", "2024-04", "2024-05", "2024-06"]
        );
        let amounts: Vec<_> = summary.expense_chart.iter().map(|p| p.amount).collect();
        assert_eq!(
            amounts,
            vec![dec!(100), dec!(0), dec!(40), dec!(0), dec!(0), dec!(500)]
        );
        assert_eq!(summary.expense_chart[0].label, "Jan");
    }

    #[test]
    fn test_breakdown_covers_chart_period_only() {
        let summary = summarize(&history(), &HashMap::new(), date(2024, 6, 25));
        let names: Vec<_> = summary
            .category_breakdown
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Shopping", "Food & Dining"]);
        assert_eq!(summary.category_breakdown[0].value, dec!(340));
    }

    #[test]
    fn test_recent_transactions_newest_first() {
        let summary = summarize(&history(), &HashMap::new(), date(2024, 6, 25));
        let ids: Vec<_> = summary.recent_transactions.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![6, 5, 4, 3, 2]);
    }

    #[test]
    fn test_empty_month() {
        let summary = summarize(&[], &HashMap::new(), date(2024, 2, 29));
        assert_eq!(summary.savings_rate, Decimal::ZERO);
        assert_eq!(summary.total_balance, Decimal::ZERO);
        assert_eq!(summary.expense_chart.len(), CHART_MONTHS as usize);
        assert_eq!(summary.expense_chart[0].month, "2023-09");
        assert!(summary.recent_transactions.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let summary = summarize(&history(), &HashMap::new(), date(2024, 6, 25));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["totalBalance"], 1500.0);
        assert_eq!(json["recentTransactions"][0]["date"], "2024-06-20");
        assert_eq!(json["recentTransactions"][0]["kind"], "EXPENSE");
    }

    #[tokio::test]
    async fn test_service_scopes_to_user_and_attaches_colors() {
        let store = MemoryStore::with_transactions(history());
        store.insert(Transaction {
            owner: "bob".to_string(),
            ..tx(7, dec!(50), TransactionKind::Expense, "Shopping", date(2024, 6, 10))
        });
        store.add_category(
            "alice",
            CategoryInfo {
                id: 1,
                name: "Shopping".to_string(),
                color: Some("#3b82f6".to_string()),
            },
        );
        let service = DashboardService::new(Arc::new(store), Duration::from_secs(5));

        let summary = service.dashboard("alice", date(2024, 6, 25)).await.unwrap();
        assert_eq!(summary.monthly_expenses, dec!(500));
        assert_eq!(summary.category_breakdown[0].color.as_deref(), Some("#3b82f6"));
    }
}
