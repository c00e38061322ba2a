//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, load_config, build_services)
//! - `transactions` - Recording and importing transactions
//! - `analytics` - Spending report, forecast and risk scoring
//! - `serve` - Web server command

use rust_decimal::{Decimal, RoundingStrategy};

pub mod analytics;
pub mod core;
pub mod serve;
pub mod transactions;

// Re-export command functions for main.rs
pub use analytics::*;
pub use core::*;
pub use serve::*;
pub use transactions::*;

/// Round half away from zero for display; `{:.N}` alone truncates a `Decimal`
pub fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
