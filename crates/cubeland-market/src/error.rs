//! Marketplace error types.

use cubeland_protocol::{EntryId, Username};
use thiserror::Error;

/// Errors produced by the marketplace ledger.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("catalog entry not found: {0}")]
    NotFound(EntryId),

    #[error("catalog entry sold out: {0}")]
    SoldOut(EntryId),

    #[error("insufficient coins")]
    InsufficientFunds,

    #[error("already owned: {0}")]
    AlreadyOwned(EntryId),

    #[error("unknown player: {0}")]
    UnknownPlayer(Username),
}
