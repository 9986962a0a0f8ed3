use serde::{Deserialize, Serialize};
use std::fmt;

/// 8-bit RGB color, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a `0xRRGGBB` literal.
    pub const fn from_u32(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    pub fn parse_hex(value: &str) -> RenderResult<Self> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RenderError::InvalidColor(value.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_u32)
            .map_err(|_| RenderError::InvalidColor(value.to_string()))
    }

    /// Channels scaled to `0.0..=1.0`, the form PDF and GPU backends expect.
    pub fn unit(&self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = RenderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::parse_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// Position in the logical coordinate space of a drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `angle` radians on a circle of `radius` around `self`.
    /// Angles grow clockwise because the y axis points down.
    pub fn polar(&self, radius: f64, angle: f64) -> Point {
        Point::new(self.x + radius * angle.cos(), self.y + radius * angle.sin())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCap {
    Butt,
    Round,
}

/// Horizontal anchoring of a text run relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// A text run handed to a drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub content: String,
    pub position: Point,
    pub size: f64,
    pub color: Rgb,
    pub anchor: TextAnchor,
    pub bold: bool,
}

/// Common error type for rendering and encoding.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("score {0} is outside 0..=100")]
    ScoreOutOfRange(i64),
    #[error("invalid color: {0}")]
    InvalidColor(String),
    #[error("encoding failure: {0}")]
    Encoding(String),
    #[error("unknown output format: {0}")]
    UnknownFormat(String),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Immediate-mode 2D drawing capability the chart widgets render through.
///
/// Angles are radians measured clockwise from 3 o'clock; coordinates are
/// logical units with the origin at the top-left corner.
pub trait DrawingSurface {
    fn fill_background(&mut self, color: Rgb);
    fn fill_sector(&mut self, center: Point, radius: f64, start: f64, end: f64, color: Rgb);
    fn stroke_sector(
        &mut self,
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        width: f64,
        color: Rgb,
    );
    #[allow(clippy::too_many_arguments)]
    fn stroke_arc(
        &mut self,
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        width: f64,
        color: Rgb,
        cap: LineCap,
    );
    fn fill_disk(&mut self, center: Point, radius: f64, color: Rgb);
    fn draw_text(&mut self, run: TextRun);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_parses_and_prints_hex() {
        let color = Rgb::parse_hex("#EF4444").unwrap();
        assert_eq!(color, Rgb::new(0xEF, 0x44, 0x44));
        assert_eq!(color.to_string(), "#EF4444");
        assert_eq!(Rgb::from_u32(0x3B82F6), Rgb::new(59, 130, 246));
    }

    #[test]
    fn rgb_rejects_malformed_hex() {
        assert!(Rgb::parse_hex("#12345").is_err());
        assert!(Rgb::parse_hex("#GG0000").is_err());
    }

    #[test]
    fn rgb_serializes_as_string() {
        let json = serde_json::to_string(&Rgb::from_u32(0x10B981)).unwrap();
        assert_eq!(json, "\"#10B981\"");
        let back: Rgb = serde_json::from_str("\"#10b981\"").unwrap();
        assert_eq!(back, Rgb::from_u32(0x10B981));
    }
}
