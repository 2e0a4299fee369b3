//! Account lookup hook.
//!
//! Identity lives outside this server: the web frontend registers
//! users and owns the password flow. By the time a websocket arrives,
//! the client holds a username the server only needs to look up. The
//! [`AccountSource`] trait is that lookup — a database in production,
//! [`MemoryAccounts`] in development and tests.

use std::collections::HashMap;

use crate::CubelandError;

/// What the account store knows about a player at connect time.
#[derive(Debug, Clone)]
pub struct Profile {
    /// Starting coin balance for a first-time connection. The ledger
    /// keeps the live balance afterwards.
    pub coins: u64,
    /// Cosmetic color/skin reference.
    pub color: String,
    /// Workers may add catalog entries.
    pub worker: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            coins: 100,
            color: "#ff99cc".to_string(),
            worker: false,
        }
    }
}

/// Resolves a username to its account profile.
///
/// `Send + Sync + 'static` because one source is shared across every
/// connection handler task for the life of the server.
pub trait AccountSource: Send + Sync + 'static {
    /// Looks up the profile for `username`.
    ///
    /// # Errors
    /// Returns [`CubelandError::Unauthorized`] when the username is not
    /// registered.
    fn profile(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Profile, CubelandError>> + Send;
}

/// An in-memory [`AccountSource`] for development and tests.
#[derive(Debug, Default)]
pub struct MemoryAccounts {
    profiles: HashMap<String, Profile>,
}

impl MemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account, replacing any previous profile for the name.
    pub fn with_account(mut self, username: &str, profile: Profile) -> Self {
        self.profiles.insert(username.to_string(), profile);
        self
    }
}

impl AccountSource for MemoryAccounts {
    async fn profile(&self, username: &str) -> Result<Profile, CubelandError> {
        self.profiles
            .get(username)
            .cloned()
            .ok_or_else(|| CubelandError::Unauthorized(username.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_accounts_resolves_registered_names() {
        let accounts = MemoryAccounts::new().with_account(
            "alice",
            Profile {
                coins: 250,
                color: "#00ff00".into(),
                worker: true,
            },
        );

        let profile = accounts.profile("alice").await.unwrap();
        assert_eq!(profile.coins, 250);
        assert!(profile.worker);
    }

    #[tokio::test]
    async fn test_memory_accounts_rejects_unknown_names() {
        let accounts = MemoryAccounts::new();
        let result = accounts.profile("ghost").await;
        assert!(matches!(result, Err(CubelandError::Unauthorized(_))));
    }
}
