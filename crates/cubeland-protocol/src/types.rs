//! Identity newtypes and the shared value types that ride inside events.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player's unique identity: their username.
///
/// The account store guarantees uniqueness; the core treats the name as
/// an opaque key. `#[serde(transparent)]` makes it serialize as a plain
/// JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Creates a username from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Username {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// A unique identifier for a room.
///
/// Rooms are created on demand as players connect and destroyed the
/// moment they empty, so ids are never reused within a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// A unique identifier for a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E-{}", self.0)
    }
}

/// A unique identifier for a party invite: a random 32-hex-char token.
///
/// Random rather than sequential so a responder can't guess ids of
/// invites that were never broadcast to them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteId(String);

impl InviteId {
    /// Wraps an already-generated token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InviteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A 2D map coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a position at the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this position clamped into the given map bounds.
    ///
    /// Movement is corrected, never rejected: a client that reports a
    /// coordinate outside the map lands on the nearest edge.
    pub fn clamped(self, bounds: MapBounds) -> Self {
        Self {
            x: self.x.clamp(0, bounds.max_x),
            y: self.y.clamp(0, bounds.max_y),
        }
    }

    /// Returns `true` if `other` is within `radius` on both axes.
    ///
    /// Chebyshev proximity, matching the square interaction zone around
    /// a home.
    pub fn near(self, other: Position, radius: i32) -> bool {
        (self.x - other.x).abs() < radius && (self.y - other.y).abs() < radius
    }
}

/// The extents of the shared map. Coordinates are valid in
/// `0..=max_x` × `0..=max_y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapBounds {
    pub max_x: i32,
    pub max_y: i32,
}

impl Default for MapBounds {
    fn default() -> Self {
        Self {
            max_x: 800,
            max_y: 560,
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerView
// ---------------------------------------------------------------------------

/// A player's publicly visible state, as sent to roommates.
///
/// This is what a room snapshot and the per-player deltas are built
/// from. Coin balances are deliberately absent — only the owner sees
/// their own balance, in [`ServerEvent::Welcome`](crate::ServerEvent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub username: Username,
    pub x: i32,
    pub y: i32,
    /// Cosmetic color/skin reference.
    pub color: String,
    /// The player's fixed home coordinate.
    pub home: Position,
    pub inside_home: bool,
}

// =========================================================================
// Tests
// =========================================================================
