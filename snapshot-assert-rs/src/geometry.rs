//! Colors and rectangles shared by the diff, composite and error types.

use crate::error::{SnapshotError, SnapshotResult};
use std::fmt;

/// An RGBA color with 8-bit, non-premultiplied components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SnapshotColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SnapshotColor {
    /// Fully transparent black, the color of untouched diff pixels.
    pub const TRANSPARENT: SnapshotColor = SnapshotColor::from_rgba8(0, 0, 0, 0);

    /// Opaque green, the default highlight for differing pixels.
    pub const DIFF_GREEN: SnapshotColor = SnapshotColor::from_rgba8(0, 255, 0, 255);

    /// Create a color from 8-bit RGBA components.
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS color string such as `#ff00ff`, `red` or `rgba(0, 0, 255, 0.5)`.
    pub fn parse(s: &str) -> SnapshotResult<Self> {
        let parsed = csscolorparser::parse(s)
            .map_err(|e| SnapshotError::ColorParse(format!("{}: {}", s, e)))?;
        let [r, g, b, a] = parsed.to_rgba8();
        Ok(Self::from_rgba8(r, g, b, a))
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for SnapshotColor {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::from_rgba8(r, g, b, a)
    }
}

impl From<image::Rgba<u8>> for SnapshotColor {
    fn from(px: image::Rgba<u8>) -> Self {
        px.0.into()
    }
}

/// An integer rectangle spanning `[x0, x1) × [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Rect {
    /// Rectangle anchored at the origin with the given size.
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    pub const fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub const fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})-({},{})", self.x0, self.y0, self.x1, self.y1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        let color = SnapshotColor::parse("#ff0080").unwrap();
        assert_eq!(color, SnapshotColor::from_rgba8(255, 0, 128, 255));
    }

    #[test]
    fn test_parse_named_color() {
        assert_eq!(
            SnapshotColor::parse("blue").unwrap(),
            SnapshotColor::from_rgba8(0, 0, 255, 255)
        );
    }

    #[test]
    fn test_parse_invalid_color() {
        let err = SnapshotColor::parse("not-a-color").unwrap_err();
        assert!(matches!(err, SnapshotError::ColorParse(_)));
        assert!(err.to_string().contains("not-a-color"));
    }

    #[test]
    fn test_rect_display() {
        assert_eq!(Rect::from_size(10, 20).to_string(), "(0,0)-(10,20)");
    }

    #[test]
    fn test_rect_size() {
        let rect = Rect::from_size(7, 3);
        assert_eq!(rect.width(), 7);
        assert_eq!(rect.height(), 3);
    }
}
