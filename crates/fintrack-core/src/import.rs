//! CSV transaction import
//!
//! Expected header: `date,description,amount,kind,category`
//!
//! - `date`: `YYYY-MM-DD`
//! - `amount`: non-negative decimal; direction comes from `kind`
//! - `kind`: `expense` or `income` (case-insensitive)
//!
//! Each row gets a content hash so re-importing the same file is a no-op.

use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::db::{Database, TransactionInsertResult};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, TransactionKind};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    #[serde(default)]
    description: String,
    amount: String,
    kind: String,
    category: String,
}

/// Outcome of an import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub duplicates: usize,
}

/// Parse CSV rows into transactions owned by `owner`
pub fn parse_csv<R: Read>(reader: R, owner: &str) -> Result<Vec<NewTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Identical rows within one file are distinct transactions; the
    // occurrence count keeps their hashes apart
    let mut seen: HashMap<String, u32> = HashMap::new();
    let mut transactions = Vec::new();

    for (index, result) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let line = index + 2;

        let occurred_on = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
            Error::InvalidData(format!("line {}: bad date '{}': {}", line, row.date, e))
        })?;
        let amount = Decimal::from_str(&row.amount).map_err(|e| {
            Error::InvalidData(format!("line {}: bad amount '{}': {}", line, row.amount, e))
        })?;
        if amount < Decimal::ZERO {
            return Err(Error::InvalidData(format!(
                "line {}: amount must be non-negative, use kind to mark income",
                line
            )));
        }
        let kind = TransactionKind::from_str(&row.kind)
            .map_err(|e| Error::InvalidData(format!("line {}: {}", line, e)))?;
        if row.category.is_empty() {
            return Err(Error::InvalidData(format!("line {}: category is required", line)));
        }

        let base = row_hash(owner, occurred_on, &row.description, amount, kind, &row.category);
        let occurrence = seen.entry(base.clone()).or_insert(0);
        *occurrence += 1;
        let import_hash = if *occurrence == 1 {
            base
        } else {
            format!("{}-{}", base, occurrence)
        };

        transactions.push(NewTransaction {
            owner: owner.to_string(),
            amount,
            kind,
            category: row.category,
            description: row.description,
            occurred_on,
            import_hash: Some(import_hash),
        });
    }

    debug!(rows = transactions.len(), "Parsed CSV");
    Ok(transactions)
}

/// Parse and store a CSV file, skipping rows already imported
pub fn import_csv<R: Read>(db: &Database, owner: &str, reader: R) -> Result<ImportSummary> {
    let transactions = parse_csv(reader, owner)?;
    let mut summary = ImportSummary::default();

    for tx in &transactions {
        match db.insert_transaction(tx)? {
            TransactionInsertResult::Inserted(_) => summary.imported += 1,
            TransactionInsertResult::Duplicate(_) => summary.duplicates += 1,
        }
    }

    info!(
        owner,
        imported = summary.imported,
        duplicates = summary.duplicates,
        "CSV import complete"
    );
    Ok(summary)
}

fn row_hash(
    owner: &str,
    date: NaiveDate,
    description: &str,
    amount: Decimal,
    kind: TransactionKind,
    category: &str,
) -> String {
    let date = date.to_string();
    let amount = amount.normalize().to_string();

    let mut hasher = Sha256::new();
    for part in [owner, date.as_str(), description, amount.as_str(), kind.as_str(), category] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}
