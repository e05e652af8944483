//! Color parsing for style configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// An RGBA color.
///
/// Parses from hex strings (`#rrggbb`, `#rrggbbaa`) and the small set of
/// named colors used by map styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Parse a color string.
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        let trimmed = s.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return Self::parse_hex(hex, s);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "white" => Ok(Self::WHITE),
            "black" => Ok(Self::BLACK),
            "grey" | "gray" => Ok(Self::rgb(128, 128, 128)),
            "lightgrey" | "lightgray" => Ok(Self::rgb(211, 211, 211)),
            "red" => Ok(Self::rgb(255, 0, 0)),
            "darkred" => Ok(Self::rgb(139, 0, 0)),
            "green" => Ok(Self::rgb(0, 128, 0)),
            "darkgreen" => Ok(Self::rgb(0, 100, 0)),
            "blue" => Ok(Self::rgb(0, 0, 255)),
            "lightblue" => Ok(Self::rgb(173, 216, 230)),
            "tan" => Ok(Self::rgb(210, 180, 140)),
            "none" | "transparent" => Ok(Self::rgba(0, 0, 0, 0)),
            _ => Err(ColorParseError::Unknown(s.to_string())),
        }
    }

    fn parse_hex(hex: &str, original: &str) -> Result<Self, ColorParseError> {
        let byte = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| ColorParseError::Unknown(original.to_string()))
        };
        match hex.len() {
            6 => Ok(Self::rgb(byte(0..2)?, byte(2..4)?, byte(4..6)?)),
            8 => Ok(Self::rgba(byte(0..2)?, byte(2..4)?, byte(4..6)?, byte(6..8)?)),
            _ => Err(ColorParseError::Unknown(original.to_string())),
        }
    }

    /// RGBA byte array for pixel operations.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Same color with its alpha scaled by `factor` (clamped to [0, 1]).
    pub fn scaled_alpha(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[derive(Debug, Error)]
pub enum ColorParseError {
    #[error("unknown color: {0:?}; expected '#rrggbb', '#rrggbbaa' or a named color")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Color::parse("#ff6b6b").unwrap(), Color::rgb(255, 107, 107));
        assert_eq!(
            Color::parse("#00000080").unwrap(),
            Color::rgba(0, 0, 0, 128)
        );
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#zzzzzz").is_err());
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Color::parse("white").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("Black").unwrap(), Color::BLACK);
        assert_eq!(Color::parse("lightblue").unwrap(), Color::rgb(173, 216, 230));
        assert!(Color::parse("chartreuse-ish").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        let c = Color::rgb(255, 107, 107);
        assert_eq!(Color::parse(&c.to_string()).unwrap(), c);
    }

    #[test]
    fn test_scaled_alpha() {
        let c = Color::WHITE.scaled_alpha(0.7);
        assert_eq!(c.a, 179);
        assert_eq!(c.r, 255);
    }
}
