//! Aggregation engine: monthly buckets, category totals, savings rate and
//! health score over a time window.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{Transaction, TransactionKind};
use crate::window::TimeWindow;

use super::types::{Aggregates, CategoryTotal, MonthlyBucket};

/// Number of categories reported in `top_categories`
pub const TOP_CATEGORY_LIMIT: usize = 5;

const HEALTH_BASELINE: Decimal = dec!(85);

/// Aggregate transactions that fall inside `window`.
///
/// Input may already be filtered by the store; transactions outside the
/// window are ignored either way.
pub fn aggregate(transactions: &[Transaction], window: &TimeWindow) -> Aggregates {
    let mut buckets: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut categories: BTreeMap<&str, Decimal> = BTreeMap::new();
    let mut total_expense = Decimal::ZERO;
    let mut total_income = Decimal::ZERO;

    for tx in transactions.iter().filter(|t| window.contains(t.occurred_on)) {
        let net = buckets.entry(tx.month_key()).or_insert(Decimal::ZERO);
        match tx.kind {
            TransactionKind::Expense => {
                *net += tx.amount;
                *categories.entry(tx.category.as_str()).or_insert(Decimal::ZERO) += tx.amount;
                total_expense += tx.amount;
            }
            TransactionKind::Income => {
                *net -= tx.amount;
                total_income += tx.amount;
            }
        }
    }

    let monthly_buckets = buckets
        .into_iter()
        .map(|(month, net_amount)| MonthlyBucket { month, net_amount })
        .collect();

    let category_totals = rank_categories(categories);
    let top_categories = category_totals
        .iter()
        .take(TOP_CATEGORY_LIMIT)
        .cloned()
        .collect();

    let savings_rate = savings_rate(total_income, total_expense);

    Aggregates {
        monthly_buckets,
        category_totals,
        top_categories,
        total_expense,
        total_income,
        savings_rate,
        health_score: health_score(savings_rate),
    }
}

/// `(income - expense) / income * 100`, or zero without income
pub fn savings_rate(total_income: Decimal, total_expense: Decimal) -> Decimal {
    if total_income > Decimal::ZERO {
        (total_income - total_expense) / total_income * dec!(100)
    } else {
        Decimal::ZERO
    }
}

/// `clamp(0, 100, 85 - (rate < 0 ? |rate| * 2 : 0))`
pub fn health_score(savings_rate: Decimal) -> Decimal {
    let penalty = if savings_rate < Decimal::ZERO {
        savings_rate.abs() * dec!(2)
    } else {
        Decimal::ZERO
    };
    (HEALTH_BASELINE - penalty).clamp(Decimal::ZERO, dec!(100))
}

/// Sort by total descending, ties broken by category name ascending
fn rank_categories(totals: BTreeMap<&str, Decimal>) -> Vec<CategoryTotal> {
    let mut ranked: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total_expense)| CategoryTotal {
            category: category.to_string(),
            total_expense,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.total_expense
            .cmp(&a.total_expense)
            .then_with(|| a.category.cmp(&b.category))
    });

    ranked
}
