//! Wire protocol for Cubeland.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Identity and value types** ([`Username`], [`RoomId`], [`Position`],
//!   [`MapBounds`], [`PlayerView`]) — the data that rides inside events.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) — everything that
//!   travels over a connection, in either direction.
//! - **Catalog types** ([`EntryKind`], [`EntryDraft`], [`CatalogItemView`])
//!   — the purchasable-entry shapes shared by the ledger and the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how events are
//!   converted to and from bytes.
//!
//! The protocol layer sits between transport (raw frames) and the world
//! and market layers. It knows nothing about rooms, connections, or
//! coin balances — only about shapes on the wire.

mod catalog;
mod codec;
mod error;
mod event;
mod types;

pub use catalog::{CatalogItemView, EntryDraft, EntryKind, ItemBehavior};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use event::{ClientEvent, ServerEvent};
pub use types::{
    EntryId, InviteId, MapBounds, PlayerView, Position, RoomId, Username,
};
