//! Display colors for tracks.
//!
//! New tracks get the first palette color not already in use, so
//! neighboring cells stay visually distinct. Once the palette is exhausted
//! the suggestion falls back to a deterministic hue derived from the number
//! of colors in use.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An sRGB display color with a human-readable name (tracks are named
/// after their color in the GUI and console).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackColor {
    /// 8-bit sRGB components.
    pub rgb: [u8; 3],
    /// Palette name, or `"hue-N"` for generated colors.
    pub name: String,
}

/// Named palette, in suggestion order.
const PALETTE: &[([u8; 3], &str)] = &[
    ([0xff, 0x00, 0x00], "red"),
    ([0x00, 0x00, 0xff], "blue"),
    ([0x00, 0x55, 0x00], "green"),
    ([0x8f, 0x97, 0x79], "artichoke"),
    ([0xa5, 0x2a, 0x2a], "auburn"),
    ([0xe0, 0x21, 0x8a], "pink"),
    ([0x7c, 0x0a, 0x02], "barn red"),
    ([0x0d, 0x98, 0xba], "blue green"),
    ([0xcd, 0x7f, 0x32], "bronze"),
    ([0x4b, 0x36, 0x21], "cafe noir"),
    ([0x06, 0x2a, 0x78], "catalina blue"),
    ([0xb8, 0x73, 0x33], "copper"),
    ([0x28, 0x58, 0x9c], "cyan cobalt blue"),
    ([0xff, 0x8c, 0x00], "dark orange"),
    ([0x94, 0x00, 0xd3], "dark violet"),
    ([0x61, 0x40, 0x51], "eggplant"),
    ([0xcc, 0x66, 0x66], "fuzzy wuzzy"),
    ([0x7f, 0xff, 0x00], "chartreuse"),
    ([0xd2, 0x69, 0x1e], "chocolate"),
    ([0x00, 0xff, 0xff], "cyan"),
    ([0xbd, 0xb7, 0x6b], "dark khaki"),
    ([0x99, 0x32, 0xcc], "dark orchid"),
    ([0x8f, 0xbc, 0x8f], "dark sea green"),
    ([0xff, 0x00, 0xff], "magenta"),
    ([0xff, 0xd7, 0x00], "gold"),
    ([0x22, 0x8b, 0x22], "forest green"),
    ([0xda, 0xa5, 0x20], "goldenrod"),
    ([0x4b, 0x00, 0x82], "indigo"),
    ([0x00, 0x80, 0x80], "teal"),
    ([0xd2, 0xb4, 0x8c], "tan"),
    ([0x19, 0x19, 0x70], "midnight blue"),
];

impl TrackColor {
    /// First palette color not present in `used`; past the palette, a
    /// deterministic generated hue.
    #[must_use]
    pub fn suggest(used: &[Self]) -> Self {
        for (rgb, name) in PALETTE {
            if !used.iter().any(|c| c.rgb == *rgb) {
                return Self {
                    rgb: *rgb,
                    name: (*name).to_owned(),
                };
            }
        }
        Self::generated(used.len())
    }

    /// Deterministic fallback hue for suggestion index `n`: walks the hue
    /// circle in golden-angle steps at full saturation.
    #[must_use]
    pub fn generated(n: usize) -> Self {
        let hue = (n as f64 * 137.508) % 360.0;
        Self {
            rgb: hue_to_rgb(hue),
            name: format!("hue-{n}"),
        }
    }
}

impl fmt::Display for TrackColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (#{:02x}{:02x}{:02x})",
            self.name, self.rgb[0], self.rgb[1], self.rgb[2]
        )
    }
}

/// Fully saturated, full-value HSV hue to sRGB.
fn hue_to_rgb(hue: f64) -> [u8; 3] {
    let h = (hue / 60.0).rem_euclid(6.0);
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    [
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    ]
}
