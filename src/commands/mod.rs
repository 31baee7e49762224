use std::{future::Future, pin::Pin, sync::Arc};

use crate::{
    domain::{Balance, TransactionKind},
    ports::{balance::BalanceStorePort, ledger::LedgerStorePort},
};

pub mod balance;
pub mod charge;
pub mod history;
pub mod section;
pub mod use_points;

use section::SectionRegistry;

type CommandFuture<T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send>>;

/// Point balances and their ledger
///
/// Each operation is exposed as a [`tower::Service`] over its own request type. Cloning is cheap
/// and clones share the same stores and sections.
pub struct PointService<B, L> {
    balances: Arc<B>,
    ledger: Arc<L>,
    sections: Arc<SectionRegistry>,
}

impl<B, L> PointService<B, L> {
    pub fn new(balances: B, ledger: L) -> Self {
        Self {
            balances: Arc::new(balances),
            ledger: Arc::new(ledger),
            sections: Arc::new(SectionRegistry::new()),
        }
    }

    /// Sections currently in use by mutating commands
    pub fn sections(&self) -> &SectionRegistry {
        &self.sections
    }
}

impl<B, L> Clone for PointService<B, L> {
    fn clone(&self) -> Self {
        Self {
            balances: Arc::clone(&self.balances),
            ledger: Arc::clone(&self.ledger),
            sections: Arc::clone(&self.sections),
        }
    }
}

impl<B, L> PointService<B, L>
where
    B: BalanceStorePort,
    L: LedgerStorePort,
{
    /// Read-modify-write of a single user's balance
    ///
    /// The balance is written before the ledger entry. If the ledger append fails after that,
    /// the balance is correct but the entry is missing.
    async fn apply(
        &self,
        user_id: u64,
        amount: i64,
        kind: TransactionKind,
    ) -> Result<Balance, Error> {
        let _section = self.sections.enter(user_id).await;

        let current = self
            .balances
            .get(user_id)
            .await
            .inspect_err(|err| tracing::error!(user_id, %kind, "failed to read balance: {err}"))?
            .unwrap_or_else(|| Balance::empty(user_id));

        let next = match kind {
            TransactionKind::Charge => current.charge(amount),
            TransactionKind::Use => current.use_points(amount),
        }
        .inspect_err(|err| tracing::warn!(user_id, %kind, amount, "rejected: {err}"))?;

        let stored = self
            .balances
            .put(user_id, next.amount)
            .await
            .inspect_err(|err| tracing::error!(user_id, %kind, "failed to write balance: {err}"))?;
        self.ledger
            .append(user_id, amount, kind, stored.updated_at)
            .await
            .inspect_err(|err| {
                tracing::error!(user_id, %kind, amount, "ledger append failed after write: {err}")
            })?;

        tracing::info!(
            user_id,
            %kind,
            amount,
            old_amount = current.amount,
            new_amount = stored.amount,
            "balance updated"
        );
        Ok(stored)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Balance(#[from] crate::domain::BalanceError),

    #[error("balance store error: {0:?}")]
    BalanceStore(#[from] crate::ports::balance::Error),
    #[error("ledger store error: {0:?}")]
    LedgerStore(#[from] crate::ports::ledger::Error),
}

impl Error {
    /// Whether a store could not complete the call
    ///
    /// The outcome of the command is then unknown: the balance should be read again before
    /// assuming that nothing happened.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Error::BalanceStore(_) | Error::LedgerStore(_))
    }
}
