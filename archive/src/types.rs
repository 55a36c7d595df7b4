//! Records retrieved from the external games archive.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Side of the board a player occupied in one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

/// One finished game exactly as retrieved from the archive.
///
/// Immutable once stored: a finished game's data never changes. Identity is
/// the provider's `uuid`, carried verbatim — never re-derived or hashed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Globally unique, stable identifier assigned by the provider.
    pub uuid: String,
    /// Owning username, lowercased.
    pub username: String,
    /// Calendar year of the game's completion timestamp (UTC).
    pub year: i32,
    /// Calendar month (1-12) of the game's completion timestamp (UTC).
    pub month: u32,
    /// Completion timestamp, unix seconds.
    pub end_time: i64,
    pub white: String,
    pub black: String,
    /// Full PGN payload (tags + movetext), opaque to the storage tiers.
    pub pgn: String,
    /// Provider time class, e.g. "blitz", "rapid".
    pub time_class: String,
    /// Result from the owning player's perspective, e.g. "win", "resigned".
    pub result: String,
    /// Which side the owning player occupied.
    pub player_color: Color,
}

impl GameRecord {
    /// Build a record, lowercasing the username and deriving year/month from
    /// the completion timestamp.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        uuid: impl Into<String>,
        username: &str,
        end_time: i64,
        white: impl Into<String>,
        black: impl Into<String>,
        pgn: impl Into<String>,
        time_class: impl Into<String>,
        result: impl Into<String>,
        player_color: Color,
    ) -> Self {
        let (year, month) = year_month_of(end_time);
        Self {
            uuid: uuid.into(),
            username: normalize_username(username),
            year,
            month,
            end_time,
            white: white.into(),
            black: black.into(),
            pgn: pgn.into(),
            time_class: time_class.into(),
            result: result.into(),
            player_color,
        }
    }
}

/// Snapshot of a player's public profile metadata.
///
/// Freshness-sensitive: display name, avatar, and country can all change
/// between analyses, so this is only ever cached ephemerally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Lowercased username, the cache key.
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub country: Option<String>,
    pub title: Option<String>,
    /// Account creation, unix seconds.
    pub joined: Option<i64>,
    pub last_online: Option<i64>,
}

/// One entry in a player's archive listing: a month that has games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMonth {
    pub year: i32,
    pub month: u32,
}

/// Lowercase a username for use as a cache key.
///
/// Mandatory everywhere a username keys a cache entry, so differently-cased
/// requests for the same player collide onto the same entries.
pub fn normalize_username(username: &str) -> String {
    username.to_lowercase()
}

/// Derive `(year, month)` from a unix-seconds completion timestamp, UTC.
pub fn year_month_of(end_time: i64) -> (i32, u32) {
    let dt = DateTime::<Utc>::from_timestamp(end_time, 0).unwrap_or_default();
    (dt.year(), dt.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_of_known_timestamp() {
        // 2024-03-15T12:00:00Z
        let (year, month) = year_month_of(1_710_504_000);
        assert_eq!(year, 2024);
        assert_eq!(month, 3);
    }

    #[test]
    fn test_new_lowercases_username() {
        let g = GameRecord::new(
            "uuid-1",
            "MagnusFan",
            1_710_504_000,
            "MagnusFan",
            "someone",
            "1. e4 e5",
            "blitz",
            "win",
            Color::White,
        );
        assert_eq!(g.username, "magnusfan");
        assert_eq!(g.year, 2024);
        assert_eq!(g.month, 3);
    }

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("Alice"), "alice");
        assert_eq!(normalize_username("alice"), "alice");
    }

    #[test]
    fn test_color_opposite() {
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(Color::Black.opposite(), Color::White);
    }
}
