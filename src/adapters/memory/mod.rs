//! In-process stores backed by mutex-guarded maps
//!
//! Nothing is persisted across restarts. Each store can be given an artificial latency to behave
//! like a remote dependency, which is what makes lost updates observable when callers do not
//! serialize their read-modify-write sequences.

use std::{sync::PoisonError, time::Duration};

use crate::ports::{balance, ledger};

mod balance_store;
mod ledger_store;

pub use balance_store::MemoryBalanceStore;
pub use ledger_store::MemoryLedgerStore;

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we erase the error
/// and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

impl<T> From<PoisonError<T>> for balance::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for ledger::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}
