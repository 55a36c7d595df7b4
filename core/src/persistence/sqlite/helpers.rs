//! Shared encode/decode helpers for SQLite ↔ domain type conversions.

use archive::Color;

/// Encode a [`Color`] to the string used in the SQLite CHECK constraint.
pub fn encode_color(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

/// Decode a SQLite color column back into a [`Color`].
pub fn decode_color(s: &str) -> Color {
    match s {
        "black" => Color::Black,
        _ => Color::White,
    }
}
