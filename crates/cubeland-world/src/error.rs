//! Error types for the world layer.

use cubeland_protocol::{InviteId, RoomId, Username};

/// Errors that can occur during room, presence, or invite operations.
///
/// All of these are recoverable and reported to the single initiating
/// caller; none of them disturb the room's broadcast loop or other
/// players.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The room does not exist (or has already been destroyed).
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// The player is not a member of the room in question.
    #[error("player {0} is not here")]
    PlayerNotFound(Username),

    /// The player is already a member of a room. Assignment treats
    /// this as a no-op at the registry; seeing it escape an actor
    /// means the registry's index broke.
    #[error("player {0} is already a member")]
    AlreadyJoined(Username),

    /// The invite is unknown, already answered by this responder, or
    /// was retracted.
    #[error("invite {0} not found or already handled")]
    InviteNotFound(InviteId),

    /// The invite's answer window has closed.
    #[error("invite {0} has expired")]
    InviteExpired(InviteId),

    /// The invite's host left the room before the response arrived.
    /// Treated like an expired invite: no mutation happens.
    #[error("the invite's host has left the room")]
    HostUnavailable,

    /// The room's command channel is closed — the actor is gone.
    #[error("room {0} is unavailable")]
    RoomUnavailable(RoomId),
}
