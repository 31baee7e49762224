//! Per-user point balances with an append-only ledger
//!
//! * [`domain`] holds the balance and ledger values along with the rules for charging and using
//!   points.
//! * [`ports`] describes the stores the service depends on, [`adapters`] provides in-memory
//!   implementations of them.
//! * [`commands`] implements the operations as [`tower::Service`]s on [`PointService`]. Charges
//!   and uses of the same user are serialized, different users proceed concurrently.
//! * [`inbound`] exposes the commands over HTTP.

pub mod adapters;
pub mod commands;
pub mod domain;
pub mod inbound;
pub mod ports;

pub use commands::{Error, PointService};
