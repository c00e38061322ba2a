//! FinTrack CLI - Personal finance analytics and forecasting
//!
//! Usage:
//!   fintrack init                          Initialize database
//!   fintrack add -a 42.50 -c Shopping      Record a transaction
//!   fintrack import --file CSV             Import transactions
//!   fintrack spending -t 3months           Spending analytics
//!   fintrack dashboard                     This month at a glance
//!   fintrack forecast                      Spending forecast
//!   fintrack risk -a 1500 -c electronics   Score a candidate transaction
//!   fintrack serve --port 3000             Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, &cli.user),
        Commands::Add {
            amount,
            kind,
            category,
            description,
            date,
        } => commands::cmd_add(
            &cli.db,
            &cli.user,
            &amount,
            &kind,
            &category,
            &description,
            date.as_deref(),
        ),
        Commands::Import { file } => commands::cmd_import(&cli.db, &cli.user, &file),
        Commands::Spending {
            time_range,
            category,
            json,
        } => {
            commands::cmd_spending(
                &cli.db,
                cli.config.as_deref(),
                &cli.user,
                time_range.as_deref(),
                category.as_deref(),
                json,
            )
            .await
        }
        Commands::Dashboard { json } => {
            commands::cmd_dashboard(&cli.db, cli.config.as_deref(), &cli.user, json).await
        }
        Commands::Forecast { time_range, json } => {
            commands::cmd_forecast(
                &cli.db,
                cli.config.as_deref(),
                &cli.user,
                time_range.as_deref(),
                json,
            )
            .await
        }
        Commands::Risk {
            amount,
            category,
            merchant,
            json,
        } => {
            commands::cmd_risk(
                &cli.db,
                cli.config.as_deref(),
                &cli.user,
                &amount,
                &category,
                merchant,
                json,
            )
            .await
        }
        Commands::Serve {
            port,
            host,
            no_auth,
        } => {
            commands::cmd_serve(
                &cli.db,
                cli.config.as_deref(),
                host.as_deref(),
                port,
                no_auth,
            )
            .await
        }
    }
}
