//! World configuration: the handful of constants that shape every room.

use std::time::Duration;

use cubeland_protocol::{MapBounds, Position};

/// Settings shared by every room the registry creates.
///
/// Defaults match the live game; tests override individual fields
/// (a zero invite TTL makes every invite expire instantly, for
/// example) instead of sleeping through real timeouts.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Maximum members per room. Assignment never exceeds this.
    pub room_capacity: usize,

    /// Extents of the shared map; positions are clamped into these.
    pub bounds: MapBounds,

    /// Chat text is truncated to this many characters before fan-out.
    pub chat_max_chars: usize,

    /// How long a party invite stays answerable.
    pub invite_ttl: Duration,

    /// How close (per axis) a player must stand to their home to
    /// enter or exit it.
    pub home_radius: i32,

    /// Where new players appear.
    pub spawn: Position,

    /// Offset from the spawn point at which a new player's home is
    /// placed, exactly once, on first sight.
    pub home_offset: (i32, i32),
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            room_capacity: 10,
            bounds: MapBounds::default(),
            chat_max_chars: 300,
            invite_ttl: Duration::from_secs(10),
            home_radius: 24,
            spawn: Position::new(50, 50),
            home_offset: (40, 40),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_game_constants() {
        let config = WorldConfig::default();
        assert_eq!(config.room_capacity, 10);
        assert_eq!(config.chat_max_chars, 300);
        assert_eq!(config.invite_ttl, Duration::from_secs(10));
        assert_eq!(config.home_radius, 24);
        assert_eq!(config.bounds.max_x, 800);
        assert_eq!(config.bounds.max_y, 560);
    }
}
