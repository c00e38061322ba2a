//! Rule-based insight generation
//!
//! Rules are evaluated lazily, in display order, each producing at most one
//! insight:
//!
//! 1. Savings rate above 20% (positive) or below 10% (warning). The two
//!    thresholds leave a 10–20% band where neither fires.
//! 2. Current month's net spend more than 20% above the previous month's.

use std::iter::FusedIterator;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::models::month_key;

use super::types::{Aggregates, Insight, InsightKind};

const HIGH_SAVINGS_RATE: Decimal = dec!(20);
const LOW_SAVINGS_RATE: Decimal = dec!(10);
const SPENDING_INCREASE_FACTOR: Decimal = dec!(1.2);

/// Start a lazy pass over the insight rules
pub fn generate(aggregates: &Aggregates, now: NaiveDate) -> InsightGenerator<'_> {
    InsightGenerator {
        aggregates,
        now,
        next_rule: 0,
    }
}

/// Finite, single-pass iterator over the insights for one aggregate
pub struct InsightGenerator<'a> {
    aggregates: &'a Aggregates,
    now: NaiveDate,
    next_rule: usize,
}

impl InsightGenerator<'_> {
    fn savings_rate_rule(&self) -> Option<Insight> {
        let rate = self.aggregates.savings_rate;
        if rate > HIGH_SAVINGS_RATE {
            Some(Insight::new(
                InsightKind::Positive,
                "Great Savings Rate!",
                format!(
                    "You're saving {:.1}% of your income. Keep it up!",
                    one_decimal(rate)
                ),
            ))
        } else if rate < LOW_SAVINGS_RATE {
            Some(Insight::new(
                InsightKind::Warning,
                "Low Savings Rate",
                format!(
                    "Consider increasing your savings rate. Currently at {:.1}%.",
                    one_decimal(rate)
                ),
            ))
        } else {
            None
        }
    }

    fn spending_increase_rule(&self) -> Option<Insight> {
        let current = self.aggregates.bucket(&month_key(self.now));
        let previous = previous_month(self.now)
            .map(|d| self.aggregates.bucket(&month_key(d)))
            .unwrap_or(Decimal::ZERO);

        (current > previous * SPENDING_INCREASE_FACTOR).then(|| {
            Insight::new(
                InsightKind::Warning,
                "Spending Increase",
                "Your spending has increased significantly this month.",
            )
        })
    }
}

impl Iterator for InsightGenerator<'_> {
    type Item = Insight;

    fn next(&mut self) -> Option<Insight> {
        loop {
            let rule = self.next_rule;
            self.next_rule = self.next_rule.saturating_add(1);
            let insight = match rule {
                0 => self.savings_rate_rule(),
                1 => self.spending_increase_rule(),
                _ => return None,
            };
            if insight.is_some() {
                return insight;
            }
        }
    }
}

impl FusedIterator for InsightGenerator<'_> {}

/// Round half away from zero; `Display` precision alone truncates
fn one_decimal(rate: Decimal) -> Decimal {
    rate.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// First day of the month before `date`'s month
fn previous_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?.checked_sub_months(Months::new(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::types::MonthlyBucket;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn aggregates(savings_rate: Decimal, buckets: &[(&str, Decimal)]) -> Aggregates {
        Aggregates {
            monthly_buckets: buckets
                .iter()
                .map(|(m, n)| MonthlyBucket {
                    month: m.to_string(),
                    net_amount: *n,
                })
                .collect(),
            category_totals: vec![],
            top_categories: vec![],
            total_expense: Decimal::ZERO,
            total_income: Decimal::ZERO,
            savings_rate,
            health_score: dec!(85),
        }
    }

    #[test]
    fn test_high_savings_rate() {
        let agg = aggregates(dec!(65), &[]);
        let insights: Vec<_> = generate(&agg, date(2024, 2, 15)).collect();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Positive);
        assert_eq!(insights[0].title, "Great Savings Rate!");
        assert!(insights[0].description.contains("65.0%"));
    }

    #[test]
    fn test_low_savings_rate() {
        let agg = aggregates(dec!(4.96), &[]);
        let insights: Vec<_> = generate(&agg, date(2024, 2, 15)).collect();
        assert_eq!(insights[0].kind, InsightKind::Warning);
        assert_eq!(insights[0].title, "Low Savings Rate");
        assert!(insights[0].description.contains("5.0%"));
    }

    #[test]
    fn test_savings_rate_rounds_to_one_decimal() {
        let agg = aggregates(dec!(20.05), &[]);
        let insights: Vec<_> = generate(&agg, date(2024, 2, 15)).collect();
        assert!(insights[0].description.contains("20.1%"));

        let agg = aggregates(dec!(-3.45), &[]);
        let insights: Vec<_> = generate(&agg, date(2024, 2, 15)).collect();
        assert!(insights[0].description.contains("-3.5%"));

        assert_eq!(one_decimal(dec!(4.94)).to_string(), "4.9");
    }

    #[test]
    fn test_middle_band_is_silent() {
        for rate in [dec!(10), dec!(15), dec!(20)] {
            let agg = aggregates(rate, &[]);
            assert_eq!(generate(&agg, date(2024, 2, 15)).count(), 0, "rate {}", rate);
        }
    }

    #[test]
    fn test_savings_rules_mutually_exclusive() {
        for rate in [dec!(-100), dec!(0), dec!(9.99), dec!(10), dec!(20), dec!(20.01), dec!(100)] {
            let agg = aggregates(rate, &[]);
            let savings: Vec<_> = generate(&agg, date(2024, 2, 15))
                .filter(|i| i.title != "Spending Increase")
                .collect();
            assert!(savings.len() <= 1, "rate {}", rate);
        }
    }

    #[test]
    fn test_spending_increase() {
        let agg = aggregates(dec!(15), &[("2024-01", dec!(100)), ("2024-02", dec!(121))]);
        let insights: Vec<_> = generate(&agg, date(2024, 2, 15)).collect();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "Spending Increase");
    }

    #[test]
    fn test_spending_increase_threshold_is_strict() {
        let agg = aggregates(dec!(15), &[("2024-01", dec!(100)), ("2024-02", dec!(120))]);
        assert_eq!(generate(&agg, date(2024, 2, 15)).count(), 0);
    }

    #[test]
    fn test_spending_increase_without_previous_month() {
        let agg = aggregates(dec!(15), &[("2024-02", dec!(1))]);
        assert_eq!(generate(&agg, date(2024, 2, 15)).count(), 1);

        let quiet = aggregates(dec!(15), &[]);
        assert_eq!(generate(&quiet, date(2024, 2, 15)).count(), 0);
    }

    #[test]
    fn test_previous_month_across_year() {
        let agg = aggregates(dec!(15), &[("2023-12", dec!(10)), ("2024-01", dec!(50))]);
        assert_eq!(generate(&agg, date(2024, 1, 31)).count(), 1);
    }

    #[test]
    fn test_order_and_exhaustion() {
        let agg = aggregates(dec!(2), &[("2024-02", dec!(500))]);
        let mut gen = generate(&agg, date(2024, 2, 28));
        assert_eq!(gen.next().unwrap().title, "Low Savings Rate");
        assert_eq!(gen.next().unwrap().title, "Spending Increase");
        assert!(gen.next().is_none());
        assert!(gen.next().is_none());
    }
}
