//! Room actor: an isolated Tokio task that owns one room's members,
//! their live positions, and the room's pending party invites.
//!
//! Every mutation and every fan-out send for a room goes through its
//! actor's command channel. Commands are processed strictly in arrival
//! order, so two successive moves from the same player can never be
//! delivered reordered, and nothing outside the actor ever touches a
//! member's state.

use std::collections::HashMap;
use std::time::Instant;

use cubeland_protocol::{InviteId, Position, RoomId, ServerEvent, Username};
use tokio::sync::{mpsc, oneshot};

use crate::{
    EventSender, InviteBook, PlayerState, Presence, WorldConfig, WorldError,
};

/// Commands sent to a room actor through its channel.
///
/// Operations the caller must observe carry a `oneshot` reply channel;
/// high-rate operations (moves, chat) are fire-and-forget.
pub(crate) enum RoomCommand {
    /// Add a player, send them the room snapshot, announce them to
    /// everyone else.
    Join {
        player: PlayerState,
        coins: u64,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), WorldError>>,
    },

    /// Remove a player and announce the departure. Replies with the
    /// player's final position so the roster can remember it.
    Leave {
        username: Username,
        reply: oneshot::Sender<Result<Position, WorldError>>,
    },

    /// Update a player's position (clamped to map bounds).
    Relocate { username: Username, x: i32, y: i32 },

    /// Say something to the whole room (truncated).
    Chat { username: Username, text: String },

    /// Enter/exit the player's own home if they stand close enough.
    Interact { username: Username },

    /// Create a party invite and announce it to the room.
    CreateInvite {
        host: Username,
        reply: oneshot::Sender<Result<InviteId, WorldError>>,
    },

    /// Answer a party invite.
    RespondInvite {
        invite_id: InviteId,
        responder: Username,
        accept: bool,
        reply: oneshot::Sender<Result<(), WorldError>>,
    },

    /// Read-only membership snapshot.
    Members {
        reply: oneshot::Sender<Vec<Username>>,
    },

    /// Push an event to every member (catalog updates).
    Broadcast { event: ServerEvent },

    /// Shut down the actor. Sent by the registry once the room empties.
    Shutdown,
}

/// Handle to a running room actor. Cheap to clone — it's just an
/// `mpsc::Sender` wrapper.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's unique ID.
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Adds a player to the room. `coins` is the joiner's balance,
    /// included in the welcome snapshot only they receive.
    pub async fn join(
        &self,
        player: PlayerState,
        coins: u64,
        sender: EventSender,
    ) -> Result<(), WorldError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player,
                coins,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))?
    }

    /// Removes a player. The departure broadcast happens before this
    /// returns, so it always precedes any destruction of the room.
    pub async fn leave(&self, username: Username) -> Result<Position, WorldError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                username,
                reply: reply_tx,
            })
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))?
    }

    /// Reports a new position for a player (fire-and-forget).
    pub async fn relocate(
        &self,
        username: Username,
        x: i32,
        y: i32,
    ) -> Result<(), WorldError> {
        self.sender
            .send(RoomCommand::Relocate { username, x, y })
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))
    }

    /// Sends a chat line to the room (fire-and-forget).
    pub async fn chat(
        &self,
        username: Username,
        text: String,
    ) -> Result<(), WorldError> {
        self.sender
            .send(RoomCommand::Chat { username, text })
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))
    }

    /// The "press E" home interaction (fire-and-forget).
    pub async fn interact(&self, username: Username) -> Result<(), WorldError> {
        self.sender
            .send(RoomCommand::Interact { username })
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))
    }

    /// Creates a party invite hosted by `host`.
    pub async fn create_invite(
        &self,
        host: Username,
    ) -> Result<InviteId, WorldError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::CreateInvite {
                host,
                reply: reply_tx,
            })
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))?
    }

    /// Answers a party invite on behalf of `responder`.
    pub async fn respond_invite(
        &self,
        invite_id: InviteId,
        responder: Username,
        accept: bool,
    ) -> Result<(), WorldError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::RespondInvite {
                invite_id,
                responder,
                accept,
                reply: reply_tx,
            })
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))?
    }

    /// Returns the current member list.
    pub async fn members(&self) -> Result<Vec<Username>, WorldError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Members { reply: reply_tx })
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))
    }

    /// Pushes an event to every member of the room.
    pub async fn broadcast(&self, event: ServerEvent) -> Result<(), WorldError> {
        self.sender
            .send(RoomCommand::Broadcast { event })
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), WorldError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| WorldError::RoomUnavailable(self.room_id))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    config: WorldConfig,
    players: HashMap<Username, PlayerState>,
    presence: Presence,
    invites: InviteBook,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player,
                    coins,
                    sender,
                    reply,
                } => {
                    let _ = reply.send(self.handle_join(player, coins, sender));
                }
                RoomCommand::Leave { username, reply } => {
                    let _ = reply.send(self.handle_leave(username));
                }
                RoomCommand::Relocate { username, x, y } => {
                    self.handle_relocate(username, x, y);
                }
                RoomCommand::Chat { username, text } => {
                    self.handle_chat(username, text);
                }
                RoomCommand::Interact { username } => {
                    self.handle_interact(username);
                }
                RoomCommand::CreateInvite { host, reply } => {
                    let _ = reply.send(self.handle_create_invite(host));
                }
                RoomCommand::RespondInvite {
                    invite_id,
                    responder,
                    accept,
                    reply,
                } => {
                    let _ = reply.send(self.handle_respond_invite(
                        invite_id, responder, accept,
                    ));
                }
                RoomCommand::Members { reply } => {
                    let _ = reply.send(self.players.keys().cloned().collect());
                }
                RoomCommand::Broadcast { event } => {
                    self.presence.broadcast(event);
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player: PlayerState,
        coins: u64,
        sender: EventSender,
    ) -> Result<(), WorldError> {
        let username = player.username.clone();
        if self.players.contains_key(&username) {
            // The registry serializes assignment; a duplicate join
            // reaching the actor means its index broke.
            debug_assert!(false, "duplicate join for {username}");
            return Err(WorldError::AlreadyJoined(username));
        }

        let view = player.view();
        self.players.insert(username.clone(), player);
        self.presence.subscribe(username.clone(), sender);

        // Snapshot includes the joiner themselves.
        let snapshot: Vec<_> =
            self.players.values().map(PlayerState::view).collect();
        self.presence.send_to(
            &username,
            ServerEvent::Welcome {
                room_id: self.room_id,
                players: snapshot,
                coins,
            },
        );
        self.presence
            .broadcast_except(&username, ServerEvent::PlayerJoined {
                player: view,
            });

        tracing::info!(
            room_id = %self.room_id,
            player = %username,
            members = self.players.len(),
            "player joined"
        );
        Ok(())
    }

    fn handle_leave(&mut self, username: Username) -> Result<Position, WorldError> {
        let Some(state) = self.players.remove(&username) else {
            debug_assert!(false, "leave for non-member {username}");
            return Err(WorldError::PlayerNotFound(username));
        };
        self.presence.unsubscribe(&username);
        debug_assert_eq!(self.players.len(), self.presence.len());

        self.presence.broadcast(ServerEvent::PlayerLeft {
            username: username.clone(),
        });

        tracing::info!(
            room_id = %self.room_id,
            player = %username,
            members = self.players.len(),
            "player left"
        );
        Ok(state.position)
    }

    fn handle_relocate(&mut self, username: Username, x: i32, y: i32) {
        let Some(state) = self.players.get_mut(&username) else {
            tracing::warn!(
                room_id = %self.room_id,
                player = %username,
                "move from non-member, ignoring"
            );
            return;
        };

        // Out-of-bounds coordinates are corrected, not rejected.
        let position = Position::new(x, y).clamped(self.config.bounds);
        state.position = position;

        // The mover's local state is authoritative; everyone else
        // gets the delta.
        self.presence.broadcast_except(&username, ServerEvent::PlayerMoved {
            username: username.clone(),
            x: position.x,
            y: position.y,
        });
    }

    fn handle_chat(&mut self, username: Username, text: String) {
        if !self.players.contains_key(&username) {
            tracing::warn!(
                room_id = %self.room_id,
                player = %username,
                "chat from non-member, ignoring"
            );
            return;
        }

        let text: String = text.chars().take(self.config.chat_max_chars).collect();
        // Delivered exactly once to every member, speaker included;
        // display lifetime is the client's concern.
        self.presence.broadcast(ServerEvent::Chat {
            from: username,
            text,
        });
    }

    fn handle_interact(&mut self, username: Username) {
        let Some(state) = self.players.get_mut(&username) else {
            return;
        };
        if !state.position.near(state.home, self.config.home_radius) {
            tracing::debug!(
                room_id = %self.room_id,
                player = %username,
                "interact too far from home, ignoring"
            );
            return;
        }

        state.inside_home = !state.inside_home;
        let inside_home = state.inside_home;
        self.presence.broadcast(ServerEvent::PlayerHome {
            username,
            inside_home,
        });
    }

    fn handle_create_invite(
        &mut self,
        host: Username,
    ) -> Result<InviteId, WorldError> {
        if !self.players.contains_key(&host) {
            return Err(WorldError::PlayerNotFound(host));
        }

        let invite =
            self.invites
                .create(host.clone(), self.config.invite_ttl, Instant::now());
        tracing::info!(
            room_id = %self.room_id,
            %host,
            invite_id = %invite.id,
            "party invite created"
        );

        // Invites never cross rooms: only this room hears about it.
        self.presence.broadcast(ServerEvent::PartyInvite {
            invite_id: invite.id.clone(),
            host,
        });
        Ok(invite.id)
    }

    fn handle_respond_invite(
        &mut self,
        invite_id: InviteId,
        responder: Username,
        accept: bool,
    ) -> Result<(), WorldError> {
        if !self.players.contains_key(&responder) {
            return Err(WorldError::PlayerNotFound(responder));
        }

        // Stale invites are rejected here, at response time.
        let invite = self.invites.respond(&invite_id, &responder, Instant::now())?;

        if !accept {
            self.presence.broadcast(ServerEvent::PartyDeclined {
                invite_id,
                responder,
            });
            return Ok(());
        }

        // The host may have left since the invite went out. Without a
        // host there is no home to teleport into: the invite is dead.
        let Some(host_state) = self.players.get(&invite.host) else {
            self.invites.retract(&invite_id);
            return Err(WorldError::HostUnavailable);
        };
        let home = host_state.home;

        let responder_state = self
            .players
            .get_mut(&responder)
            .expect("membership checked above");
        responder_state.position = home;

        self.presence.broadcast(ServerEvent::Teleport {
            username: responder,
            x: home.x,
            y: home.y,
        });
        Ok(())
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// `channel_size` bounds the command channel — if a room falls behind,
/// senders wait instead of queueing without limit.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: WorldConfig,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room_id,
        config,
        players: HashMap::new(),
        presence: Presence::new(),
        invites: InviteBook::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
