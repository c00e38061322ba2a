//! Analytics commands (spending, dashboard, forecast, risk)

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;

use fintrack_core::{
    Config, DashboardSummary, Database, ForecastResult, RiskAssessment, RiskCandidate,
    SpendingReport,
};

use super::{build_services, load_config, open_db, parse_time_range, round, truncate};

pub async fn spending_report(
    db: &Database,
    config: &Config,
    user: &str,
    time_range: Option<&str>,
    category: Option<&str>,
) -> Result<SpendingReport> {
    let range = parse_time_range(time_range)?;
    let services = build_services(db, config);

    services
        .spending
        .spending_analytics(user, range, category, Utc::now().date_naive())
        .await
        .context("Failed to compute spending analytics")
}

pub async fn dashboard_summary(
    db: &Database,
    config: &Config,
    user: &str,
) -> Result<DashboardSummary> {
    build_services(db, config)
        .dashboard
        .dashboard(user, Utc::now().date_naive())
        .await
        .context("Failed to build dashboard")
}

/// Forecast for `user`, plus whether the local fallback answered
pub async fn forecast_result(
    db: &Database,
    config: &Config,
    user: &str,
    time_range: Option<&str>,
) -> Result<(ForecastResult, bool)> {
    let range = parse_time_range(time_range)?;
    let services = build_services(db, config);

    let result = services
        .forecast
        .forecast(user, range)
        .await
        .context("Failed to compute forecast")?;
    Ok((result, services.call_stats().fallback > 0))
}

/// Risk assessment for a candidate, plus whether the local fallback answered
pub async fn risk_assessment(
    db: &Database,
    config: &Config,
    user: &str,
    amount: &str,
    category: &str,
    merchant: Option<String>,
) -> Result<(RiskAssessment, bool)> {
    let amount: Decimal = amount
        .trim()
        .parse()
        .with_context(|| format!("Invalid amount: {}", amount))?;
    let candidate = RiskCandidate {
        amount,
        category: category.to_string(),
        merchant,
    };
    let services = build_services(db, config);

    let assessment = services.risk.assess(user, &candidate, Utc::now()).await?;
    Ok((assessment, services.call_stats().fallback > 0))
}

pub async fn cmd_spending(
    db_path: &Path,
    config_path: Option<&Path>,
    user: &str,
    time_range: Option<&str>,
    category: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let db = open_db(db_path)?;
    let report = spending_report(&db, &config, user, time_range, category).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let summary = &report.summary;
    println!("📊 Spending Analytics");
    println!();
    println!("   Total spent:   ${:.2}", round(summary.total_spent, 2));
    println!("   Total income:  ${:.2}", round(summary.total_income, 2));
    println!("   Savings rate:  {:.1}%", round(summary.savings_rate, 1));
    println!("   Health score:  {:.0}/100", round(summary.health_score, 0));

    if !report.top_categories.is_empty() {
        println!();
        println!("   Top categories:");
        for (i, top) in report.top_categories.iter().enumerate() {
            println!(
                "   {}. {:<24} ${:>10.2}",
                i + 1,
                truncate(&top.name, 24),
                round(top.amount, 2)
            );
        }
    }

    if !report.trends.is_empty() {
        println!();
        println!("   Monthly net (expenses - income):");
        for point in &report.trends {
            println!("   {}  {:>12.2}", point.month, round(point.net, 2));
        }
    }

    if !report.insights.is_empty() {
        println!();
        println!("   Insights:");
        for insight in &report.insights {
            println!("   [{}] {}: {}", insight.kind, insight.title, insight.description);
        }
    }

    Ok(())
}

pub async fn cmd_dashboard(
    db_path: &Path,
    config_path: Option<&Path>,
    user: &str,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let db = open_db(db_path)?;
    let summary = dashboard_summary(&db, &config, user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("🏠 This Month");
    println!();
    println!("   Balance:       ${:.2}", round(summary.total_balance, 2));
    println!("   Income:        ${:.2}", round(summary.monthly_income, 2));
    println!("   Expenses:      ${:.2}", round(summary.monthly_expenses, 2));
    println!("   Savings rate:  {:.1}%", round(summary.savings_rate, 1));

    println!();
    println!("   Expenses by month:");
    for point in &summary.expense_chart {
        println!("   {} {}  {:>12.2}", point.label, point.month, round(point.amount, 2));
    }

    if !summary.recent_transactions.is_empty() {
        println!();
        println!("   Recent:");
        for tx in &summary.recent_transactions {
            println!(
                "   {}  {:<7} {:<20} {:>10.2}  {}",
                tx.date,
                tx.kind,
                truncate(&tx.category, 20),
                round(tx.amount, 2),
                truncate(&tx.description, 30)
            );
        }
    }

    Ok(())
}

pub async fn cmd_forecast(
    db_path: &Path,
    config_path: Option<&Path>,
    user: &str,
    time_range: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let db = open_db(db_path)?;
    let (result, fallback) = forecast_result(&db, &config, user, time_range).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("🔮 Spending Forecast");
    if fallback {
        println!(
            "   ⚠️  Prediction service unavailable at {}; showing placeholder data",
            config.predictor.base_url
        );
    }
    println!();
    println!("   {:<8} {:>12} {:>12}", "Month", "Actual", "Predicted");
    let cell = |v: Option<Decimal>| {
        v.map(|d| format!("{:.2}", round(d, 2)))
            .unwrap_or_else(|| "-".to_string())
    };
    for point in &result.points {
        println!(
            "   {:<8} {:>12} {:>12}",
            point.month,
            cell(point.actual),
            cell(point.predicted)
        );
    }
    println!();
    println!("   Accuracy:   {:.1}%", round(result.accuracy, 1));
    println!("   Confidence: {}", result.confidence);

    Ok(())
}

pub async fn cmd_risk(
    db_path: &Path,
    config_path: Option<&Path>,
    user: &str,
    amount: &str,
    category: &str,
    merchant: Option<String>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let db = open_db(db_path)?;
    let (assessment, fallback) =
        risk_assessment(&db, &config, user, amount, category, merchant).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
        return Ok(());
    }

    println!("🛡️  Risk Assessment");
    if fallback {
        println!("   ⚠️  Prediction service unavailable; using local rules");
    }
    println!();
    println!(
        "   Risk: {} ({:.2})",
        assessment.risk_level,
        round(assessment.risk_score, 2)
    );
    for reason in &assessment.reasons {
        println!("   - {}", reason);
    }
    println!("   Recommendation: {}", assessment.recommendation);

    Ok(())
}
