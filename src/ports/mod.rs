pub mod balance;
pub mod ledger;
