//! The events that travel over a connection, in both directions.
//!
//! Both enums are internally tagged (`#[serde(tag = "type")]`), so a
//! chat message looks like `{ "type": "Chat", "text": "hi" }` on the
//! wire — easy to dispatch on in a JavaScript client.

use serde::{Deserialize, Serialize};

use crate::{
    CatalogItemView, EntryDraft, EntryId, InviteId, PlayerView, RoomId,
    Username,
};

/// Everything a client can send to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Must be the first event on a connection. The username must
    /// already exist in the account store.
    Connect { username: String },

    /// Announces a clean departure. A dropped connection takes the
    /// same cleanup path without this event.
    Disconnect,

    /// Reports the player's new position. Coordinates outside the map
    /// are clamped, not rejected.
    Move { x: i32, y: i32 },

    /// Says something to the whole room. Truncated server-side.
    Chat { text: String },

    /// The "press E" action: enter or exit the player's own home when
    /// standing close enough to it.
    Interact,

    /// Creates a party invite visible to the player's whole room.
    StartParty,

    /// Accepts or declines a pending party invite.
    RespondParty { invite_id: InviteId, accept: bool },

    /// Asks for the current catalog, newest first.
    ListCatalog,

    /// Buys a catalog entry.
    Purchase { entry_id: EntryId },

    /// Adds a new catalog entry. Privileged: the caller's account must
    /// carry the worker flag.
    AddEntry { draft: EntryDraft },
}

/// Everything the server can push to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Sent to a player right after they join a room: the room id, a
    /// snapshot of every current member (themselves included), and
    /// their own coin balance.
    Welcome {
        room_id: RoomId,
        players: Vec<PlayerView>,
        coins: u64,
    },

    /// A new player appeared in the room. Sent to everyone else.
    PlayerJoined { player: PlayerView },

    /// A roommate moved. Never echoed to the mover — their local
    /// state is already authoritative.
    PlayerMoved { username: Username, x: i32, y: i32 },

    /// A roommate entered or exited their home.
    PlayerHome {
        username: Username,
        inside_home: bool,
    },

    /// A roommate left the room.
    PlayerLeft { username: Username },

    /// A chat line, delivered once to every member including the
    /// speaker. Display lifetime is the client's concern.
    Chat { from: Username, text: String },

    /// A player was teleported (party accept). Sent to the whole room.
    Teleport { username: Username, x: i32, y: i32 },

    /// A party invite, fanned to every member of the host's room.
    PartyInvite { invite_id: InviteId, host: Username },

    /// A responder declined a party invite.
    PartyDeclined {
        invite_id: InviteId,
        responder: Username,
    },

    /// The current catalog, newest first. Sent on request and pushed
    /// to every room when a worker adds an entry.
    Catalog { entries: Vec<CatalogItemView> },

    /// A purchase succeeded; `coins` is the new balance.
    PurchaseOk { entry_id: EntryId, coins: u64 },

    /// A request failed. Reported only to the initiating caller;
    /// `code` follows HTTP conventions (402 insufficient funds,
    /// 404 not found, 409 sold out, 410 expired...).
    Error { code: u16, message: String },
}
