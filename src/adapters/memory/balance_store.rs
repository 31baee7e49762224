use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::Utc;

use super::simulate_latency;
use crate::{
    domain::Balance,
    ports::balance::{BalanceStorePort, Error},
};

#[derive(Clone, Debug, Default)]
pub struct MemoryBalanceStore {
    balances: Arc<Mutex<HashMap<u64, Balance>>>,
    latency: Duration,
}

impl MemoryBalanceStore {
    /// Store that waits for `latency` before serving each call
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl BalanceStorePort for MemoryBalanceStore {
    async fn get(&self, user_id: u64) -> Result<Option<Balance>, Error> {
        simulate_latency(self.latency).await;
        let balance = self.balances.lock()?.get(&user_id).cloned();

        Ok(balance)
    }

    async fn put(&self, user_id: u64, amount: i64) -> Result<Balance, Error> {
        simulate_latency(self.latency).await;
        let balance = Balance::new(user_id, amount, Utc::now());
        self.balances.lock()?.insert(user_id, balance.clone());

        Ok(balance)
    }
}
