use crate::domain::Balance;

/// Persistence of the latest balance per user
///
/// The store is not transactional: callers that need read-modify-write semantics must serialize
/// access themselves.
#[mockall::automock]
#[async_trait::async_trait]
pub trait BalanceStorePort: Send + Sync {
    /// Latest stored balance, or `None` if the user was never written
    async fn get(&self, user_id: u64) -> Result<Option<Balance>, Error>;
    /// Replace the stored balance and return the persisted value
    async fn put(&self, user_id: u64, amount: i64) -> Result<Balance, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
