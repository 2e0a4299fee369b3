//! Rooms, presence, and party invites for Cubeland.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! member list, every member's live position, and the room's pending
//! party invites. All mutations and fan-out sends for one room flow
//! through that actor's command channel, which gives per-room FIFO
//! delivery for free; operations on different rooms never contend.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — capacity-bounded assignment, release, and
//!   empty-room destruction, serialized by whoever owns it
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`Presence`] — fan-out of events to a room's subscribers
//! - [`InviteBook`] — time-boxed party invite lifecycle
//! - [`WorldConfig`] — capacity, map bounds, chat limit, invite TTL

mod config;
mod error;
mod invite;
mod player;
mod presence;
mod registry;
mod room;

pub use config::WorldConfig;
pub use error::WorldError;
pub use invite::{Invite, InviteBook};
pub use player::{PlayerState, Roster};
pub use presence::{EventSender, Presence};
pub use registry::RoomRegistry;
pub use room::RoomHandle;
