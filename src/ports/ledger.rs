use chrono::{DateTime, Utc};

use crate::domain::{LedgerEntry, TransactionKind};

/// Append-only persistence of ledger entries
#[mockall::automock]
#[async_trait::async_trait]
pub trait LedgerStorePort: Send + Sync {
    /// Record a new entry and return it with its assigned identifier
    async fn append(
        &self,
        user_id: u64,
        amount: i64,
        kind: TransactionKind,
        timestamp: DateTime<Utc>,
    ) -> Result<LedgerEntry, Error>;
    /// All entries of a user, in insertion order
    async fn list(&self, user_id: u64) -> Result<Vec<LedgerEntry>, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Concrete adapter errors
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
