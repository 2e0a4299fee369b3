//! Connection-to-player index.
//!
//! The transport hands out [`ConnectionId`]s; the world speaks
//! [`Username`]s. This index is the bridge, and it is also where the
//! one-connection-per-account rule is enforced: a username can be
//! attached to at most one live connection at a time.

use std::collections::HashMap;

use cubeland_protocol::Username;
use cubeland_transport::ConnectionId;

use crate::CubelandError;

/// Bidirectional map between live connections and player identities.
#[derive(Debug, Default)]
pub struct ConnectionIndex {
    by_conn: HashMap<ConnectionId, Username>,
    by_name: HashMap<Username, ConnectionId>,
}

impl ConnectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a connection to a username.
    ///
    /// # Errors
    /// Returns [`CubelandError::AlreadyConnected`] if the username is
    /// already bound to a live connection.
    pub fn attach(
        &mut self,
        conn_id: ConnectionId,
        username: Username,
    ) -> Result<(), CubelandError> {
        if self.by_name.contains_key(&username) {
            return Err(CubelandError::AlreadyConnected(username));
        }
        self.by_conn.insert(conn_id, username.clone());
        self.by_name.insert(username, conn_id);
        Ok(())
    }

    /// Unbinds a connection, returning the username it carried.
    pub fn detach(&mut self, conn_id: ConnectionId) -> Option<Username> {
        let username = self.by_conn.remove(&conn_id)?;
        self.by_name.remove(&username);
        Some(username)
    }

    /// Returns the username bound to a connection, if any.
    pub fn username_of(&self, conn_id: ConnectionId) -> Option<&Username> {
        self.by_conn.get(&conn_id)
    }

    pub fn len(&self) -> usize {
        self.by_conn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_conn.is_empty()
    }
}
