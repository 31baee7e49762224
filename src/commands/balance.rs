use std::task::{Context, Poll};

use tower::Service;

use super::{CommandFuture, Error, PointService};
use crate::{
    domain::Balance,
    ports::{balance::BalanceStorePort, ledger::LedgerStorePort},
};

/// Read the current balance of a user
///
/// This does not enter the user's section: the value may be superseded by a concurrent charge or
/// use by the time it is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalanceRequest {
    pub user_id: u64,
}

impl<B, L> Service<BalanceRequest> for PointService<B, L>
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

    fn call(&mut self, req: BalanceRequest) -> Self::Future {
        let balances = self.balances.clone();
        Box::pin(async move {
            let balance = balances
                .get(req.user_id)
                .await?
                .unwrap_or_else(|| Balance::empty(req.user_id));

            Ok(balance)
        })
    }
}
