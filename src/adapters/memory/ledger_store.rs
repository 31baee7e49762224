use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, Utc};

use super::simulate_latency;
use crate::{
    domain::{LedgerEntry, TransactionKind},
    ports::ledger::{Error, LedgerStorePort},
};

#[derive(Debug, Default)]
struct LedgerTable {
    /// Last identifier handed out, shared by all users
    last_id: u64,
    entries: HashMap<u64, Vec<LedgerEntry>>,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryLedgerStore {
    table: Arc<Mutex<LedgerTable>>,
    latency: Duration,
}

impl MemoryLedgerStore {
    /// Store that waits for `latency` before serving each call
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl LedgerStorePort for MemoryLedgerStore {
    async fn append(
        &self,
        user_id: u64,
        amount: i64,
        kind: TransactionKind,
        timestamp: DateTime<Utc>,
    ) -> Result<LedgerEntry, Error> {
        simulate_latency(self.latency).await;
        let mut table = self.table.lock()?;
        table.last_id += 1;
        let entry = LedgerEntry {
            entry_id: table.last_id,
            user_id,
            amount,
            kind,
            timestamp,
        };
        table.entries.entry(user_id).or_default().push(entry.clone());

        Ok(entry)
    }

    async fn list(&self, user_id: u64) -> Result<Vec<LedgerEntry>, Error> {
        simulate_latency(self.latency).await;
        let entries = self
            .table
            .lock()?
            .entries
            .get(&user_id)
            .cloned()
            .unwrap_or_default();

        Ok(entries)
    }
}
