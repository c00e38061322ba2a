//! CLI command tests

use std::io::Write;

use chrono::{Datelike, Utc};
use fintrack_core::test_utils::MockPredictorServer;
use fintrack_core::{fallback_forecast, Config, Database, RiskLevel, TransactionKind};
use rust_decimal_macros::dec;
use tempfile::{NamedTempFile, TempDir};

use crate::commands::{self, round, truncate};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

/// Config pointing at `url` with a short call timeout
fn config_for(url: &str) -> Config {
    let mut config = Config::default();
    config.predictor.base_url = url.to_string();
    config.predictor.timeout_secs = 1;
    config
}

/// Nothing listens on the discard port
fn offline_config() -> Config {
    config_for("http://127.0.0.1:9")
}

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn record(db: &Database, amount: &str, kind: &str, category: &str) {
    let today = Utc::now().date_naive().to_string();
    let tx =
        commands::build_transaction("local-dev", amount, kind, category, "", Some(today.as_str()))
            .unwrap();
    commands::add_transaction(db, &tx).unwrap();
}

// ========== Helpers ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Groceries", 20), "Groceries");
    assert_eq!(truncate("A very long category name", 10), "A very ...");
    assert_eq!(truncate("Café & Crème", 7), "Café...");
}

#[test]
fn test_round_for_display() {
    assert_eq!(format!("{:.1}", round(dec!(4.96), 1)), "5.0");
    assert_eq!(format!("{:.2}", round(dec!(19.999), 2)), "20.00");
    assert_eq!(format!("{:.0}", round(dec!(84.5), 0)), "85");
    assert_eq!(format!("{:.2}", round(dec!(-0.125), 2)), "-0.13");
}

#[test]
fn test_parse_time_range() {
    assert_eq!(
        commands::parse_time_range(None).unwrap(),
        fintrack_core::TimeRange::default()
    );
    assert_eq!(
        commands::parse_time_range(Some("1year")).unwrap(),
        fintrack_core::TimeRange::OneYear
    );
    assert!(commands::parse_time_range(Some("fortnight")).is_err());
}

// ========== Init ==========

#[test]
fn test_cmd_init_seeds_categories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fintrack.db");

    commands::cmd_init(&path, "alice").unwrap();
    // Idempotent
    commands::cmd_init(&path, "alice").unwrap();

    let db = commands::open_db(&path).unwrap();
    let categories = db.list_categories("alice").unwrap();
    assert_eq!(categories.len(), fintrack_core::DEFAULT_CATEGORIES.len());
    assert!(db.list_categories("bob").unwrap().is_empty());
}

// ========== Add ==========

#[test]
fn test_build_transaction() {
    let tx = commands::build_transaction(
        "alice",
        "42.50",
        "income",
        " Salary ",
        "March pay",
        Some("2024-03-01"),
    )
    .unwrap();

    assert_eq!(tx.owner, "alice");
    assert_eq!(tx.amount, dec!(42.50));
    assert_eq!(tx.kind, TransactionKind::Income);
    assert_eq!(tx.category, "Salary");
    assert_eq!(tx.occurred_on.month(), 3);
    assert!(tx.import_hash.is_none());
}

#[test]
fn test_build_transaction_defaults_to_today() {
    let tx = commands::build_transaction("alice", "5", "expense", "Food", "", None).unwrap();
    assert_eq!(tx.occurred_on, Utc::now().date_naive());
}

#[test]
fn test_build_transaction_rejects_bad_input() {
    let build = |amount: &str, kind: &str, category: &str, date: Option<&str>| {
        commands::build_transaction("alice", amount, kind, category, "", date)
    };

    assert!(build("-5", "expense", "Food", None).is_err());
    assert!(build("abc", "expense", "Food", None).is_err());
    assert!(build("5", "refund", "Food", None).is_err());
    assert!(build("5", "expense", "  ", None).is_err());
    assert!(build("5", "expense", "Food", Some("03/01/2024")).is_err());
}

#[test]
fn test_add_same_transaction_twice_records_both() {
    let db = setup_test_db();
    record(&db, "12.00", "expense", "Food & Dining");
    record(&db, "12.00", "expense", "Food & Dining");
    assert_eq!(db.count_transactions("local-dev").unwrap(), 2);
}

// ========== Import ==========

#[test]
fn test_cmd_import_skips_duplicates_on_reimport() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fintrack.db");
    let file = csv_file(
        "date,description,amount,kind,category\n\
         2024-03-01,Paycheck,3000.00,income,Salary\n\
         2024-03-02,Groceries,120.50,expense,Food & Dining\n",
    );

    commands::cmd_import(&path, "alice", file.path()).unwrap();
    commands::cmd_import(&path, "alice", file.path()).unwrap();

    let db = commands::open_db(&path).unwrap();
    assert_eq!(db.count_transactions("alice").unwrap(), 2);
}

#[test]
fn test_cmd_import_rejects_invalid_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fintrack.db");
    let file = csv_file(
        "date,description,amount,kind,category\n\
         2024-03-01,Paycheck,lots,income,Salary\n",
    );

    assert!(commands::cmd_import(&path, "alice", file.path()).is_err());
    let db = commands::open_db(&path).unwrap();
    assert_eq!(db.count_transactions("alice").unwrap(), 0);
}

#[test]
fn test_cmd_import_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fintrack.db");
    let result = commands::cmd_import(&path, "alice", &dir.path().join("nope.csv"));
    assert!(result.is_err());
}

// ========== Analytics ==========

#[tokio::test]
async fn test_spending_report() {
    let db = setup_test_db();
    record(&db, "100", "expense", "Food & Dining");
    record(&db, "250", "expense", "Shopping");
    record(&db, "1000", "income", "Salary");

    let report =
        commands::spending_report(&db, &offline_config(), "local-dev", Some("1month"), None)
            .await
            .unwrap();

    assert_eq!(report.summary.total_spent, dec!(350));
    assert_eq!(report.summary.total_income, dec!(1000));
    assert_eq!(report.summary.savings_rate, dec!(65));
    assert_eq!(report.top_categories[0].name, "Shopping");
}

#[tokio::test]
async fn test_spending_report_category_filter() {
    let db = setup_test_db();
    record(&db, "100", "expense", "Food & Dining");
    record(&db, "250", "expense", "Shopping");

    let report = commands::spending_report(
        &db,
        &offline_config(),
        "local-dev",
        None,
        Some("Food & Dining"),
    )
    .await
    .unwrap();

    assert_eq!(report.summary.total_spent, dec!(100));
    assert_eq!(report.category_breakdown.len(), 1);
}

#[tokio::test]
async fn test_spending_report_rejects_unknown_range() {
    let db = setup_test_db();
    let result =
        commands::spending_report(&db, &offline_config(), "local-dev", Some("2weeks"), None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_dashboard_summary() {
    let db = setup_test_db();
    record(&db, "100", "expense", "Food & Dining");
    record(&db, "1000", "income", "Salary");

    let summary = commands::dashboard_summary(&db, &offline_config(), "local-dev")
        .await
        .unwrap();

    assert_eq!(summary.total_balance, dec!(900));
    assert_eq!(summary.savings_rate, dec!(90));
    assert_eq!(summary.expense_chart.last().unwrap().amount, dec!(100));
    assert_eq!(summary.recent_transactions.len(), 2);
}

#[tokio::test]
async fn test_forecast_falls_back_when_service_is_down() {
    let db = setup_test_db();
    record(&db, "80", "expense", "Transportation");

    let (result, fallback) = commands::forecast_result(&db, &offline_config(), "local-dev", None)
        .await
        .unwrap();

    assert!(fallback);
    assert_eq!(result, fallback_forecast());
}

#[tokio::test]
async fn test_forecast_uses_prediction_service() {
    let server = MockPredictorServer::start().await;
    let db = setup_test_db();
    record(&db, "80", "expense", "Transportation");

    let (result, fallback) =
        commands::forecast_result(&db, &config_for(&server.url()), "local-dev", Some("6months"))
            .await
            .unwrap();

    assert!(!fallback);
    assert_eq!(result.points.len(), 2);
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_risk_falls_back_to_local_rules() {
    let db = setup_test_db();

    let (assessment, fallback) = commands::risk_assessment(
        &db,
        &offline_config(),
        "local-dev",
        "25",
        "Food & Dining",
        None,
    )
    .await
    .unwrap();

    assert!(fallback);
    assert_eq!(assessment.risk_level, RiskLevel::Low);
    assert_eq!(assessment.recommendation, "Approve transaction");
}

#[tokio::test]
async fn test_risk_rejects_negative_amount() {
    let server = MockPredictorServer::start().await;
    let db = setup_test_db();

    let result = commands::risk_assessment(
        &db,
        &config_for(&server.url()),
        "local-dev",
        "-10",
        "Shopping",
        Some("ACME".to_string()),
    )
    .await;

    assert!(result.is_err());
    assert!(server.requests().is_empty());
}
