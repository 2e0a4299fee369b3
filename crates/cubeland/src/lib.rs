//! # Cubeland
//!
//! Real-time multiplayer session server for the Cubeland world: players
//! connect over WebSocket, get a seat in a capacity-limited room, see
//! each other move and chat, throw parties, and buy scarce catalog
//! items.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cubeland::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CubelandError> {
//!     let accounts =
//!         MemoryAccounts::new().with_account("alice", Profile::default());
//!
//!     let server = CubelandServer::<MemoryAccounts, JsonCodec>::builder()
//!         .bind("127.0.0.1:8080")
//!         .build(accounts)
//!         .await?;
//!     server.run().await
//! }
//! ```

mod accounts;
mod error;
mod handler;
mod index;
mod server;

pub use accounts::{AccountSource, MemoryAccounts, Profile};
pub use error::CubelandError;
pub use index::ConnectionIndex;
pub use server::{CubelandServer, CubelandServerBuilder};

/// Common imports for running a Cubeland server.
pub mod prelude {
    pub use cubeland_protocol::{
        CatalogItemView, ClientEvent, EntryDraft, EntryId, EntryKind,
        InviteId, JsonCodec, PlayerView, Position, RoomId, ServerEvent,
        Username,
    };
    pub use cubeland_world::WorldConfig;

    pub use crate::{
        AccountSource, CubelandError, CubelandServer, CubelandServerBuilder,
        MemoryAccounts, Profile,
    };
}
