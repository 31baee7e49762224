use std::task::{Context, Poll};

use tower::Service;

use super::{CommandFuture, Error, PointService};
use crate::{
    domain::LedgerEntry,
    ports::{balance::BalanceStorePort, ledger::LedgerStorePort},
};

/// List the ledger entries of a user, oldest first
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryRequest {
    pub user_id: u64,
}

impl<B, L> Service<HistoryRequest> for PointService<B, L>
where
    B: BalanceStorePort + 'static,
    L: LedgerStorePort + 'static,
{
    type Response = Vec<LedgerEntry>;
    type Error = Error;
    type Future = CommandFuture<Vec<LedgerEntry>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: HistoryRequest) -> Self::Future {
        let ledger = self.ledger.clone();
        Box::pin(async move { ledger.list(req.user_id).await.map_err(Error::from) })
    }
}
