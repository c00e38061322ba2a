//! Transaction store abstraction
//!
//! Services read transactions through [`TransactionStore`]. Implementations are
//! synchronous (the SQLite store blocks on a pooled connection), so async
//! callers go through [`run_query`], which moves the call onto the blocking
//! pool and bounds it with a timeout.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::{CategoryInfo, Transaction, TransactionKind};

/// Sort direction by transaction date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Filter for [`TransactionStore::find_transactions`]
///
/// Every query is scoped to one owner; there is no way to build an unscoped
/// query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    pub owner: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<String>,
    pub kind: Option<TransactionKind>,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl TransactionQuery {
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            from: None,
            to: None,
            category: None,
            kind: None,
            order: SortOrder::Ascending,
            limit: None,
        }
    }

    /// Inclusive date bounds
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn since(mut self, from: NaiveDate) -> Self {
        self.from = Some(from);
        self
    }

    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True if `tx` satisfies every filter (ordering and limit excluded)
    pub fn matches(&self, tx: &Transaction) -> bool {
        tx.owner == self.owner
            && self.from.map_or(true, |from| tx.occurred_on >= from)
            && self.to.map_or(true, |to| tx.occurred_on <= to)
            && self.category.as_deref().map_or(true, |c| tx.category == c)
            && self.kind.map_or(true, |k| tx.kind == k)
    }
}

/// Read side of the transaction store
pub trait TransactionStore: Send + Sync {
    /// Transactions matching `query`, ordered by date then id
    fn find_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>>;

    /// Category metadata (display color) for an owner
    fn categories(&self, _owner: &str) -> Result<Vec<CategoryInfo>> {
        Ok(Vec::new())
    }
}

pub type SharedStore = Arc<dyn TransactionStore>;

/// Run a store operation on the blocking pool, bounded by `timeout`.
///
/// On timeout the blocking call is left to finish on its own and its result
/// is discarded.
pub async fn run_query<T, F>(store: &SharedStore, timeout: Duration, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn TransactionStore) -> Result<T> + Send + 'static,
{
    let store = Arc::clone(store);
    let task = tokio::task::spawn_blocking(move || op(store.as_ref()));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(Error::Task(e.to_string())),
        Err(_) => Err(Error::Timeout(format!(
            "transaction store did not respond within {}ms",
            timeout.as_millis()
        ))),
    }
}

/// In-memory store for tests and demos
#[derive(Debug, Default)]
pub struct MemoryStore {
    transactions: RwLock<Vec<Transaction>>,
    categories: RwLock<Vec<(String, CategoryInfo)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions: RwLock::new(transactions),
            categories: RwLock::new(Vec::new()),
        }
    }

    pub fn insert(&self, tx: Transaction) {
        if let Ok(mut txs) = self.transactions.write() {
            txs.push(tx);
        }
    }

    pub fn add_category(&self, owner: &str, category: CategoryInfo) {
        if let Ok(mut cats) = self.categories.write() {
            cats.push((owner.to_string(), category));
        }
    }
}

impl TransactionStore for MemoryStore {
    fn find_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        let txs = self
            .transactions
            .read()
            .map_err(|_| Error::InvalidData("memory store lock poisoned".into()))?;

        let mut found: Vec<Transaction> =
            txs.iter().filter(|t| query.matches(t)).cloned().collect();
        found.sort_by(|a, b| a.occurred_on.cmp(&b.occurred_on).then(a.id.cmp(&b.id)));
        if query.order == SortOrder::Descending {
            found.reverse();
        }
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    fn categories(&self, owner: &str) -> Result<Vec<CategoryInfo>> {
        let cats = self
            .categories
            .read()
            .map_err(|_| Error::InvalidData("memory store lock poisoned".into()))?;
        Ok(cats
            .iter()
            .filter(|(o, _)| o == owner)
            .map(|(_, c)| c.clone())
            .collect())
    }
}
