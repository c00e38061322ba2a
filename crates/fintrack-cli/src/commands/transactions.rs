//! Transaction commands (add, import)

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use fintrack_core::{
    import_csv, Database, NewTransaction, TransactionInsertResult, TransactionKind,
};

use super::{open_db, round};

/// Validate command-line fields into a new transaction for `user`
pub fn build_transaction(
    user: &str,
    amount: &str,
    kind: &str,
    category: &str,
    description: &str,
    date: Option<&str>,
) -> Result<NewTransaction> {
    let amount: Decimal = amount
        .trim()
        .parse()
        .with_context(|| format!("Invalid amount: {}", amount))?;
    if amount.is_sign_negative() {
        bail!("Amount must be non-negative; use --kind to set the direction");
    }

    let kind: TransactionKind = kind.parse().map_err(anyhow::Error::msg)?;

    let category = category.trim();
    if category.is_empty() {
        bail!("Category is required");
    }

    let occurred_on = match date {
        Some(d) => NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {}", d))?,
        None => Utc::now().date_naive(),
    };

    Ok(NewTransaction {
        owner: user.to_string(),
        amount,
        kind,
        category: category.to_string(),
        description: description.trim().to_string(),
        occurred_on,
        import_hash: None,
    })
}

pub fn add_transaction(db: &Database, tx: &NewTransaction) -> Result<i64> {
    match db
        .insert_transaction(tx)
        .context("Failed to record transaction")?
    {
        TransactionInsertResult::Inserted(id) => Ok(id),
        TransactionInsertResult::Duplicate(id) => bail!("Transaction already recorded as #{}", id),
    }
}

pub fn cmd_add(
    db_path: &Path,
    user: &str,
    amount: &str,
    kind: &str,
    category: &str,
    description: &str,
    date: Option<&str>,
) -> Result<()> {
    let tx = build_transaction(user, amount, kind, category, description, date)?;
    let db = open_db(db_path)?;
    let id = add_transaction(&db, &tx)?;

    println!(
        "✅ Recorded #{}: {} {} {:.2} ({})",
        id,
        tx.occurred_on,
        tx.kind,
        round(tx.amount, 2),
        tx.category
    );
    Ok(())
}

pub fn cmd_import(db_path: &Path, user: &str, file: &Path) -> Result<()> {
    println!("📥 Importing {}...", file.display());

    let db = open_db(db_path)?;
    let reader =
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;

    let summary = import_csv(&db, user, reader).context("Import failed")?;
    println!("   Imported:   {}", summary.imported);
    println!("   Duplicates: {} (skipped)", summary.duplicates);
    println!("✅ Done. Total transactions: {}", db.count_transactions(user)?);

    Ok(())
}
