use chrono::{DateTime, Utc};

/// Upper bound (exclusive) for a point balance
pub const MAX_AMOUNT: i64 = 1_000_000;

/// Point balance of a user at a given point in time
///
/// A `Balance` is never mutated in place. Charging or using points derives a new value, which
/// then replaces the stored one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Balance {
    /// Identifier of the user owning the points
    pub user_id: u64,
    /// Current amount of points
    ///
    /// Always within `0..MAX_AMOUNT`.
    pub amount: i64,
    /// Time of the last mutation
    pub updated_at: DateTime<Utc>,
}

impl Balance {
    pub fn new(user_id: u64, amount: i64, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            amount,
            updated_at,
        }
    }

    /// Balance of a user that never transacted
    pub fn empty(user_id: u64) -> Self {
        Self::new(user_id, 0, Utc::now())
    }

    /// Derive the balance resulting from adding `amount` points
    pub fn charge(&self, amount: i64) -> Result<Balance, BalanceError> {
        if amount <= 0 {
            return Err(BalanceError::InvalidAmount { amount });
        }

        let new_amount = self
            .amount
            .checked_add(amount)
            .filter(|new_amount| *new_amount < MAX_AMOUNT)
            .ok_or(BalanceError::LimitExceeded {
                amount,
                limit: MAX_AMOUNT,
                remaining: MAX_AMOUNT - self.amount,
            })?;

        Ok(Balance::new(self.user_id, new_amount, Utc::now()))
    }

    /// Derive the balance resulting from spending `amount` points
    pub fn use_points(&self, amount: i64) -> Result<Balance, BalanceError> {
        if amount <= 0 {
            return Err(BalanceError::InvalidAmount { amount });
        }

        let new_amount = self.amount - amount;
        if new_amount < 0 {
            return Err(BalanceError::InsufficientFunds {
                current: self.amount,
                requested: amount,
            });
        }

        Ok(Balance::new(self.user_id, new_amount, Utc::now()))
    }
}

/// Rejected balance transition
///
/// None of these are retried: they describe a request that can never succeed against the
/// current balance.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BalanceError {
    /// Charges and uses must move a strictly positive number of points
    #[error("amount must be greater than zero, got {amount}")]
    InvalidAmount { amount: i64 },

    /// The charge would bring the balance to or above [`MAX_AMOUNT`]
    #[error("charge of {amount} exceeds the maximum balance of {limit}, remaining: {remaining}")]
    LimitExceeded {
        amount: i64,
        limit: i64,
        remaining: i64,
    },

    /// The use would bring the balance below zero
    #[error("insufficient points: current balance is {current}, cannot use {requested}")]
    InsufficientFunds { current: i64, requested: i64 },
}

/// Direction of a ledger entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Charge,
    Use,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Charge => f.write_str("CHARGE"),
            TransactionKind::Use => f.write_str("USE"),
        }
    }
}

/// Record of a single successful charge or use
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Unique, monotonically assigned by the ledger store
    pub entry_id: u64,
    pub user_id: u64,
    /// Number of points moved
    ///
    /// This is always positive, `kind` tells whether points were added or removed.
    pub amount: i64,
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    /// Signed change this entry applied to the balance
    pub fn delta(&self) -> i64 {
        match self.kind {
            TransactionKind::Charge => self.amount,
            TransactionKind::Use => -self.amount,
        }
    }
}
