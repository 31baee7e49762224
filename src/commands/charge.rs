use std::task::{Context, Poll};

use tower::Service;

use super::{CommandFuture, Error, PointService};
use crate::{
    domain::{Balance, TransactionKind},
    ports::{balance::BalanceStorePort, ledger::LedgerStorePort},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChargeRequest {
    pub user_id: u64,
    /// Number of points to add, must be positive
    pub amount: i64,
}

impl<B, L> Service<ChargeRequest> for PointService<B, L>
where
    B: BalanceStorePort + 'static,
    L: LedgerStorePort + 'static,
{
    type Response = Balance;
    type Error = Error;
    type Future = CommandFuture<Balance>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ChargeRequest) -> Self::Future {
        let service = self.clone();
        Box::pin(async move {
            service
                .apply(req.user_id, req.amount, TransactionKind::Charge)
                .await
        })
    }
}
