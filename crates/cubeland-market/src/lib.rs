//! Cubeland marketplace: a scarcity-limited item catalog with coin
//! balances and per-player inventories.
//!
//! The ledger is synchronous and lock-agnostic; the server wraps it in
//! whatever mutual exclusion it needs. See [`MarketLedger`].

mod catalog;
mod error;
mod ledger;

pub use error::MarketError;
pub use ledger::MarketLedger;
