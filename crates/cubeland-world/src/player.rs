//! Per-player state and the roster that keeps it alive across rooms.

use std::collections::HashMap;

use cubeland_protocol::{PlayerView, Position, Username};

use crate::WorldConfig;

/// A player's live, in-room state. Owned by exactly one room actor at
/// a time.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub username: Username,
    pub position: Position,
    /// Cosmetic color/skin reference, handed in by the account store.
    pub color: String,
    /// Fixed home coordinate. Assigned once, never reassigned.
    pub home: Position,
    pub inside_home: bool,
}

impl PlayerState {
    /// The publicly visible projection sent to roommates.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            username: self.username.clone(),
            x: self.position.x,
            y: self.position.y,
            color: self.color.clone(),
            home: self.home,
            inside_home: self.inside_home,
        }
    }
}

/// What the roster remembers about a player between room memberships.
#[derive(Debug, Clone)]
struct RosterEntry {
    color: String,
    home: Position,
    position: Position,
}

/// Process-lifetime player records.
///
/// Room actors own a player's state only while the player is a member;
/// the roster carries the home coordinate and last position across
/// disconnects so a returning player picks up where they left off.
/// Homes are assigned here, exactly once per player.
#[derive(Debug, Default)]
pub struct Roster {
    entries: HashMap<Username, RosterEntry>,
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces the live state for a player entering a room.
    ///
    /// First sight of a username creates the record: the player spawns
    /// at the configured spawn point and their home is placed at the
    /// fixed offset from it. Later check-ins reuse the stored home and
    /// position but take the (possibly updated) cosmetic from the
    /// account store.
    pub fn checkin(
        &mut self,
        username: &Username,
        color: &str,
        config: &WorldConfig,
    ) -> PlayerState {
        let entry = self
            .entries
            .entry(username.clone())
            .or_insert_with(|| RosterEntry {
                color: color.to_owned(),
                home: Position::new(
                    config.spawn.x + config.home_offset.0,
                    config.spawn.y + config.home_offset.1,
                ),
                position: config.spawn,
            });
        entry.color = color.to_owned();

        PlayerState {
            username: username.clone(),
            position: entry.position,
            color: entry.color.clone(),
            home: entry.home,
            // Always re-enter the world outside; the home is private
            // and entering it is an explicit interaction.
            inside_home: false,
        }
    }

    /// Records a player's final position as they leave a room.
    pub fn checkout(&mut self, username: &Username, position: Position) {
        if let Some(entry) = self.entries.get_mut(username) {
            entry.position = position;
        }
    }

    /// Returns a player's home coordinate, if they have ever connected.
    pub fn home_of(&self, username: &Username) -> Option<Position> {
        self.entries.get(username).map(|e| e.home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> Username {
        Username::new(n)
    }

    #[test]
    fn test_checkin_assigns_home_at_spawn_offset() {
        let config = WorldConfig::default();
        let mut roster = Roster::new();

        let state = roster.checkin(&name("alice"), "#ff99cc", &config);

        assert_eq!(state.position, Position::new(50, 50));
        assert_eq!(state.home, Position::new(90, 90));
        assert!(!state.inside_home);
    }

    #[test]
    fn test_home_is_never_reassigned() {
        let config = WorldConfig::default();
        let mut roster = Roster::new();

        let first = roster.checkin(&name("alice"), "#ff99cc", &config);
        roster.checkout(&name("alice"), Position::new(400, 300));
        let second = roster.checkin(&name("alice"), "#00ff00", &config);

        assert_eq!(second.home, first.home);
        // Position persists, cosmetic follows the account store.
        assert_eq!(second.position, Position::new(400, 300));
        assert_eq!(second.color, "#00ff00");
    }

    #[test]
    fn test_checkout_of_unknown_player_is_a_noop() {
        let mut roster = Roster::new();
        roster.checkout(&name("ghost"), Position::new(1, 1));
        assert!(roster.home_of(&name("ghost")).is_none());
    }
}
