//! Party invite lifecycle: time-boxed offers to teleport into the
//! host's home.
//!
//! An invite is `Pending` from creation until its TTL elapses. Each
//! roommate may answer it at most once with effect; accept, decline,
//! and expiry are all terminal *for that responder*. Expiry is passive:
//! validity is checked when a response arrives, never by a background
//! sweep (though [`InviteBook::purge_expired`] exists for memory
//! reclamation).

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use cubeland_protocol::{InviteId, Username};
use rand::Rng;

use crate::WorldError;

/// A pending party invite, scoped to the room it was created in.
#[derive(Debug, Clone)]
pub struct Invite {
    pub id: InviteId,
    /// The player whose home responders teleport into.
    pub host: Username,
    pub created_at: Instant,
    pub expires_at: Instant,
}

/// The pending invites of a single room.
///
/// Lives inside the room actor, so all transitions are serialized with
/// the room's other operations and the host lookup on accept can never
/// race a membership change.
#[derive(Debug, Default)]
pub struct InviteBook {
    pending: HashMap<InviteId, PendingInvite>,
}

#[derive(Debug)]
struct PendingInvite {
    invite: Invite,
    /// Who has already answered. A second answer from the same player
    /// is a no-op.
    responded: HashSet<Username>,
}

impl InviteBook {
    /// Creates an empty invite book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new pending invite for `host`, answerable until
    /// `now + ttl`. Returns a clone to broadcast from.
    pub fn create(&mut self, host: Username, ttl: Duration, now: Instant) -> Invite {
        // Opportunistic reclamation; correctness never depends on it.
        self.purge_expired(now);

        let invite = Invite {
            id: generate_invite_id(),
            host,
            created_at: now,
            expires_at: now + ttl,
        };
        self.pending.insert(
            invite.id.clone(),
            PendingInvite {
                invite: invite.clone(),
                responded: HashSet::new(),
            },
        );
        invite
    }

    /// Registers `responder`'s answer and returns the invite it applies
    /// to. Stale responses are rejected, never silently accepted.
    ///
    /// # Errors
    /// - [`WorldError::InviteNotFound`] — unknown id, or this responder
    ///   already answered
    /// - [`WorldError::InviteExpired`] — the TTL elapsed; the invite is
    ///   dropped
    pub fn respond(
        &mut self,
        id: &InviteId,
        responder: &Username,
        now: Instant,
    ) -> Result<Invite, WorldError> {
        let pending = self
            .pending
            .get_mut(id)
            .ok_or_else(|| WorldError::InviteNotFound(id.clone()))?;

        if now > pending.invite.expires_at {
            self.pending.remove(id);
            return Err(WorldError::InviteExpired(id.clone()));
        }
        if !pending.responded.insert(responder.clone()) {
            return Err(WorldError::InviteNotFound(id.clone()));
        }
        Ok(pending.invite.clone())
    }

    /// Removes an invite outright — used when a response reveals the
    /// host has left the room, which makes the invite permanently
    /// unanswerable.
    pub fn retract(&mut self, id: &InviteId) {
        self.pending.remove(id);
    }

    /// Drops every invite whose TTL has elapsed. Purely for memory
    /// reclamation; `respond` checks expiry on its own.
    pub fn purge_expired(&mut self, now: Instant) {
        self.pending.retain(|_, p| now <= p.invite.expires_at);
    }

    /// Number of invites still held (expired-but-unpurged included).
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if no invites are held.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Generates a random 32-character hex invite id (128 bits), so ids
/// cannot be guessed by players the invite was never broadcast to.
fn generate_invite_id() -> InviteId {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    InviteId::new(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
}
