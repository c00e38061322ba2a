//! Transaction operations

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, OptionalExtension, Row, ToSql};
use rust_decimal::Decimal;

use super::Database;
use crate::error::Result;
use crate::models::{CategoryInfo, NewTransaction, Transaction, TransactionKind};
use crate::store::{SortOrder, TransactionQuery, TransactionStore};

/// Result of inserting a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionInsertResult {
    Inserted(i64),
    /// Same import hash already stored; contains the existing id
    Duplicate(i64),
}

const SELECT_COLUMNS: &str =
    "SELECT id, owner, amount, kind, category, description, occurred_on FROM transactions";

impl Database {
    /// Insert a transaction, skipping rows whose import hash already exists
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<TransactionInsertResult> {
        let conn = self.conn()?;

        if let Some(hash) = &tx.import_hash {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM transactions WHERE import_hash = ?",
                    params![hash],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                return Ok(TransactionInsertResult::Duplicate(existing_id));
            }
        }

        conn.execute(
            r#"
            INSERT INTO transactions (owner, amount, kind, category, description, occurred_on, import_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.owner,
                tx.amount.to_string(),
                tx.kind.as_str(),
                tx.category,
                tx.description,
                tx.occurred_on.to_string(),
                tx.import_hash,
            ],
        )?;

        Ok(TransactionInsertResult::Inserted(conn.last_insert_rowid()))
    }

    /// Most recent transactions for an owner, newest first
    pub fn list_transactions(&self, owner: &str, limit: usize) -> Result<Vec<Transaction>> {
        self.query_transactions(
            &TransactionQuery::for_owner(owner)
                .order(SortOrder::Descending)
                .limit(limit),
        )
    }

    /// Transactions matching a store query
    pub fn query_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut conditions = vec!["owner = ?".to_string()];
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(query.owner.clone())];

        if let Some(from) = query.from {
            conditions.push("occurred_on >= ?".to_string());
            values.push(Box::new(from.to_string()));
        }
        if let Some(to) = query.to {
            conditions.push("occurred_on <= ?".to_string());
            values.push(Box::new(to.to_string()));
        }
        if let Some(category) = &query.category {
            conditions.push("category = ?".to_string());
            values.push(Box::new(category.clone()));
        }
        if let Some(kind) = query.kind {
            conditions.push("kind = ?".to_string());
            values.push(Box::new(kind.as_str()));
        }

        let direction = match query.order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };

        let mut sql = format!(
            "{} WHERE {} ORDER BY occurred_on {dir}, id {dir}",
            SELECT_COLUMNS,
            conditions.join(" AND "),
            dir = direction
        );
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), row_to_transaction)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Number of stored transactions for an owner
    pub fn count_transactions(&self, owner: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE owner = ?",
            params![owner],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl TransactionStore for Database {
    fn find_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        self.query_transactions(query)
    }

    fn categories(&self, owner: &str) -> Result<Vec<CategoryInfo>> {
        self.list_categories(owner)
    }
}

fn row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    let amount: String = row.get(2)?;
    let kind: String = row.get(3)?;
    let occurred_on: String = row.get(6)?;

    Ok(Transaction {
        id: row.get(0)?,
        owner: row.get(1)?,
        amount: Decimal::from_str(&amount).map_err(|e| conversion_error(2, e))?,
        kind: TransactionKind::from_str(&kind).map_err(|e| conversion_error(3, e))?,
        category: row.get(4)?,
        description: row.get(5)?,
        occurred_on: NaiveDate::parse_from_str(&occurred_on, "%Y-%m-%d")
            .map_err(|e| conversion_error(6, e))?,
    })
}

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, err.into())
}
