//! CLI argument definitions using clap
//!
//! The command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FinTrack - Personal finance analytics and forecasting
#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Spending analytics, forecasts and transaction risk scoring", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "fintrack.db", global = true)]
    pub db: PathBuf,

    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// User that owns the data read and written by this command
    #[arg(short, long, default_value = fintrack_server::LOCAL_DEV_USER, global = true)]
    pub user: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed default categories
    Init,

    /// Record a single transaction
    Add {
        /// Amount (non-negative; direction comes from --kind)
        #[arg(short, long)]
        amount: String,

        /// expense or income
        #[arg(short, long, default_value = "expense")]
        kind: String,

        /// Category name
        #[arg(short, long)]
        category: String,

        /// Free-form description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Import transactions from CSV (date,description,amount,kind,category)
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show spending analytics
    Spending {
        /// 1month, 3months, 6months or 1year
        #[arg(short, long)]
        time_range: Option<String>,

        /// Restrict to one category
        #[arg(short, long)]
        category: Option<String>,

        /// Print the raw JSON report
        #[arg(long)]
        json: bool,
    },

    /// Show this month's balance, a six-month expense chart and recent activity
    Dashboard {
        /// Print the raw JSON summary
        #[arg(long)]
        json: bool,
    },

    /// Show the spending forecast
    Forecast {
        /// 1month, 3months, 6months or 1year
        #[arg(short, long)]
        time_range: Option<String>,

        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },

    /// Score a candidate transaction for risk
    Risk {
        /// Candidate amount
        #[arg(short, long)]
        amount: String,

        /// Candidate category
        #[arg(short, long)]
        category: String,

        /// Merchant name
        #[arg(short, long)]
        merchant: Option<String>,

        /// Print the raw JSON assessment
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on (defaults to server.port from config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to server.host from config)
        #[arg(long)]
        host: Option<String>,

        /// Disable authentication (for local development only!)
        #[arg(long)]
        no_auth: bool,
    },
}
