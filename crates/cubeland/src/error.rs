//! Unified error type for the Cubeland server.

use cubeland_market::MarketError;
use cubeland_protocol::{ProtocolError, Username};
use cubeland_transport::TransportError;
use cubeland_world::WorldError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CubelandError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid event).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A world-level error (rooms, presence, invites).
    #[error(transparent)]
    World(#[from] WorldError),

    /// A marketplace error (catalog, balances, scarcity).
    #[error(transparent)]
    Market(#[from] MarketError),

    /// The username is not in the account store.
    #[error("unknown account: {0}")]
    Unauthorized(String),

    /// The username already has a live connection.
    #[error("{0} is already connected")]
    AlreadyConnected(Username),
}

impl CubelandError {
    /// Maps an error to the HTTP-style code carried by
    /// [`ServerEvent::Error`](cubeland_protocol::ServerEvent::Error).
    pub fn code(&self) -> u16 {
        match self {
            Self::Protocol(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Market(MarketError::UnknownPlayer(_)) => 401,
            Self::Market(MarketError::InsufficientFunds) => 402,
            Self::Market(MarketError::NotFound(_)) => 404,
            Self::Market(MarketError::SoldOut(_))
            | Self::Market(MarketError::AlreadyOwned(_)) => 409,
            Self::AlreadyConnected(_) => 409,
            Self::World(WorldError::InviteNotFound(_)) => 404,
            Self::World(WorldError::InviteExpired(_))
            | Self::World(WorldError::HostUnavailable) => 410,
            Self::World(WorldError::PlayerNotFound(_))
            | Self::World(WorldError::RoomNotFound(_)) => 404,
            Self::World(_) | Self::Transport(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use cubeland_protocol::{EntryId, InviteId};

    use super::*;

    #[test]
    fn test_from_world_error() {
        let err = WorldError::HostUnavailable;
        let top: CubelandError = err.into();
        assert!(matches!(top, CubelandError::World(_)));
        assert_eq!(top.code(), 410);
    }

    #[test]
    fn test_from_market_error() {
        let err = MarketError::InsufficientFunds;
        let top: CubelandError = err.into();
        assert!(matches!(top, CubelandError::Market(_)));
        assert_eq!(top.code(), 402);
    }

    #[test]
    fn test_error_codes_follow_http_conventions() {
        assert_eq!(
            CubelandError::Unauthorized("ghost".into()).code(),
            401
        );
        assert_eq!(
            CubelandError::from(MarketError::NotFound(EntryId(1))).code(),
            404
        );
        assert_eq!(
            CubelandError::from(MarketError::SoldOut(EntryId(1))).code(),
            409
        );
        assert_eq!(
            CubelandError::from(WorldError::InviteExpired(InviteId::new(
                "deadbeef"
            )))
            .code(),
            410
        );
    }
}
