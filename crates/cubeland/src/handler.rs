//! Per-connection handler: connect, event routing, cleanup.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Receive Connect → look up the account → bind the connection
//!   2. Register the ledger account, assign a room (Welcome goes out)
//!   3. Loop: receive client events → dispatch to world or market
//!   4. On exit (clean or not): release the room, unbind the connection

use std::sync::Arc;
use std::time::Duration;

use cubeland_protocol::{ClientEvent, Codec, RoomId, ServerEvent, Username};
use cubeland_transport::{Connection, ConnectionId, WebSocketConnection};
use cubeland_world::{EventSender, RoomHandle};
use tokio::sync::mpsc;

use crate::accounts::AccountSource;
use crate::server::ServerState;
use crate::CubelandError;

/// How long a fresh connection gets to send its Connect event.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Drop guard that releases a player's room seat and connection
/// binding when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since
/// `Drop` is synchronous, we spawn a fire-and-forget task for the
/// async locks.
struct PlayerGuard<A: AccountSource, C: Codec> {
    conn_id: ConnectionId,
    username: Username,
    state: Arc<ServerState<A, C>>,
}

impl<A: AccountSource, C: Codec> Drop for PlayerGuard<A, C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let username = self.username.clone();
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.index.lock().await.detach(conn_id);
            let mut registry = state.registry.lock().await;
            if let Err(e) = registry.release(&username).await {
                tracing::debug!(
                    player = %username, error = %e, "release on disconnect"
                );
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<A, C>>,
) -> Result<(), CubelandError>
where
    A: AccountSource,
    C: Codec + Clone,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // --- Step 1: Connect ---
    let username = match establish(&conn, &state).await {
        Ok(username) => username,
        Err(e) => {
            // The caller never made it in; tell them why and hang up.
            send_direct(&conn, &state.codec, error_event(&e)).await;
            let _ = conn.close().await;
            return Err(e);
        }
    };
    // Cleanup is armed from here on, even if assignment fails below.
    let _guard = PlayerGuard {
        conn_id,
        username: username.clone(),
        state: Arc::clone(&state),
    };

    tracing::info!(%conn_id, player = %username, "player connected");

    // --- Step 2: Ledger account and room seat ---
    let profile = state.accounts.profile(username.as_str()).await?;
    let coins = {
        let mut market = state.market.lock().await;
        market.register_account(username.clone(), profile.coins, profile.worker);
        market.balance(&username)?
    };

    // All outbound traffic for this player funnels through one
    // channel, so room broadcasts and direct replies stay ordered.
    let (tx, rx) = mpsc::unbounded_channel();
    spawn_outbound_pump(conn.clone(), state.codec.clone(), rx);

    let (room_id, room) = {
        let mut registry = state.registry.lock().await;
        registry
            .assign(username.clone(), &profile.color, coins, tx.clone())
            .await?
    };

    // --- Step 3: Event loop ---
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(player = %username, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(player = %username, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(
                    player = %username, error = %e, "failed to decode event"
                );
                report(&tx, CubelandError::Protocol(e));
                continue;
            }
        };

        if matches!(event, ClientEvent::Disconnect) {
            tracing::info!(player = %username, "client disconnected");
            break;
        }

        dispatch(&state, &username, room_id, &room, &tx, event).await;
    }

    // _guard drops here → room release and index detach fire.
    Ok(())
}

/// Receives the Connect event, resolves the account, and binds the
/// connection to the username.
async fn establish<A, C>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<A, C>>,
) -> Result<Username, CubelandError>
where
    A: AccountSource,
    C: Codec,
{
    let data = match tokio::time::timeout(CONNECT_TIMEOUT, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(cubeland_protocol::ProtocolError::InvalidEvent(
                "connection closed before Connect".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(cubeland_protocol::ProtocolError::InvalidEvent(
                "Connect timed out".into(),
            )
            .into());
        }
    };

    let event: ClientEvent = state.codec.decode(&data)?;
    let ClientEvent::Connect { username } = event else {
        return Err(cubeland_protocol::ProtocolError::InvalidEvent(
            "first event must be Connect".into(),
        )
        .into());
    };

    // Unknown accounts are rejected before anything is allocated.
    state.accounts.profile(&username).await?;

    let username = Username::new(username);
    state
        .index
        .lock()
        .await
        .attach(conn.id(), username.clone())?;
    Ok(username)
}

/// Routes one in-room client event to the world or market layer.
///
/// Failures are reported to this caller only, as `Error` events; the
/// room's other members never see them.
async fn dispatch<A, C>(
    state: &Arc<ServerState<A, C>>,
    username: &Username,
    room_id: RoomId,
    room: &RoomHandle,
    tx: &EventSender,
    event: ClientEvent,
) where
    A: AccountSource,
    C: Codec,
{
    let result: Result<(), CubelandError> = match event {
        ClientEvent::Connect { .. } => {
            Err(cubeland_protocol::ProtocolError::InvalidEvent(
                "already connected".into(),
            )
            .into())
        }

        ClientEvent::Move { x, y } => {
            room.relocate(username.clone(), x, y).await.map_err(Into::into)
        }

        ClientEvent::Chat { text } => {
            room.chat(username.clone(), text).await.map_err(Into::into)
        }

        ClientEvent::Interact => {
            room.interact(username.clone()).await.map_err(Into::into)
        }

        ClientEvent::StartParty => room
            .create_invite(username.clone())
            .await
            .map(|_| ())
            .map_err(Into::into),

        ClientEvent::RespondParty { invite_id, accept } => room
            .respond_invite(invite_id, username.clone(), accept)
            .await
            .map_err(Into::into),

        ClientEvent::ListCatalog => {
            let entries = state.market.lock().await.list();
            let _ = tx.send(ServerEvent::Catalog { entries });
            Ok(())
        }

        ClientEvent::Purchase { entry_id } => {
            let bought = state
                .market
                .lock()
                .await
                .purchase(username, entry_id, room_id);
            match bought {
                Ok(coins) => {
                    let _ = tx.send(ServerEvent::PurchaseOk { entry_id, coins });
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        }

        ClientEvent::AddEntry { draft } => {
            add_entry(state, username, draft).await
        }

        // Handled by the caller before dispatch.
        ClientEvent::Disconnect => Ok(()),
    };

    if let Err(e) = result {
        tracing::debug!(player = %username, error = %e, "event failed");
        report(tx, e);
    }
}

/// Adds a catalog entry (workers only) and pushes the refreshed
/// catalog to every room.
async fn add_entry<A, C>(
    state: &Arc<ServerState<A, C>>,
    username: &Username,
    draft: cubeland_protocol::EntryDraft,
) -> Result<(), CubelandError>
where
    A: AccountSource,
    C: Codec,
{
    let entries = {
        let mut market = state.market.lock().await;
        if !market.is_worker(username)? {
            return Err(CubelandError::Unauthorized(username.to_string()));
        }
        market.add_entry(draft);
        market.list()
    };

    // Lock only to collect handles, drop before the broadcasts.
    let handles = state.registry.lock().await.room_handles();
    for handle in handles {
        if let Err(e) = handle
            .broadcast(ServerEvent::Catalog {
                entries: entries.clone(),
            })
            .await
        {
            tracing::debug!(error = %e, "catalog push to room failed");
        }
    }
    Ok(())
}

/// Forwards events from a player's outbound channel to their socket.
///
/// Runs until the channel closes (the player was released from their
/// room) or a send fails (the socket is gone).
fn spawn_outbound_pump<C: Codec + Clone>(
    conn: WebSocketConnection,
    codec: C,
    mut rx: mpsc::UnboundedReceiver<ServerEvent>,
) {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let bytes = match codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode event");
                    continue;
                }
            };
            if let Err(e) = conn.send(&bytes).await {
                tracing::debug!(error = %e, "outbound send failed");
                break;
            }
        }
        let _ = conn.close().await;
    });
}

/// Queues an `Error` event for the caller.
fn report(tx: &EventSender, e: CubelandError) {
    let _ = tx.send(error_event(&e));
}

fn error_event(e: &CubelandError) -> ServerEvent {
    ServerEvent::Error {
        code: e.code(),
        message: e.to_string(),
    }
}

/// Sends one event straight to a socket, bypassing the pump. Used
/// before the player has an outbound channel.
async fn send_direct(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    event: ServerEvent,
) {
    if let Ok(bytes) = codec.encode(&event) {
        let _ = conn.send(&bytes).await;
    }
}
