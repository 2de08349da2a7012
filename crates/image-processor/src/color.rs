//! Hex color parsing and label color schemes.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Fallback RGB used when a hex string cannot be parsed.
const FALLBACK_RGB: [u8; 3] = [255, 255, 255];

/// Convert a `#RGB` or `#RRGGBB` string plus an opacity in `[0, 1]` to RGBA.
///
/// The alpha channel is `round(clamp(opacity, 0, 1) * 255)`. Any other
/// length, or a non-hex digit, yields white with the requested alpha.
pub fn hex_to_rgba(hex: &str, opacity: f32) -> Rgba<u8> {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    let [r, g, b] = parse_hex_rgb(hex).unwrap_or(FALLBACK_RGB);
    Rgba([r, g, b, alpha])
}

fn parse_hex_rgb(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.trim().trim_start_matches('#');
    if !digits.is_ascii() {
        return None;
    }
    match digits.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, ch) in rgb.iter_mut().zip(digits.chars()) {
                let v = ch.to_digit(16)? as u8;
                *slot = v * 17;
            }
            Some(rgb)
        }
        6 => {
            let mut rgb = [0u8; 3];
            for (i, slot) in rgb.iter_mut().enumerate() {
                *slot = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16).ok()?;
            }
            Some(rgb)
        }
        _ => None,
    }
}

/// Text/background pairing for a label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    #[default]
    WhiteOnBlack,
    BlackOnWhite,
}

impl ColorScheme {
    pub fn text_hex(self) -> &'static str {
        match self {
            Self::WhiteOnBlack => "#FFFFFF",
            Self::BlackOnWhite => "#000000",
        }
    }

    pub fn background_hex(self) -> &'static str {
        match self {
            Self::WhiteOnBlack => "#000000",
            Self::BlackOnWhite => "#FFFFFF",
        }
    }

    /// Outline color; always the background color of the scheme.
    pub fn stroke_hex(self) -> &'static str {
        self.background_hex()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WhiteOnBlack => "white_on_black",
            Self::BlackOnWhite => "black_on_white",
        }
    }
}

impl std::str::FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white_on_black" => Ok(Self::WhiteOnBlack),
            "black_on_white" => Ok(Self::BlackOnWhite),
            other => Err(format!(
                "unknown color scheme '{other}' (expected white_on_black or black_on_white)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hex_expands_digits() {
        assert_eq!(hex_to_rgba("#FFF", 1.0), Rgba([255, 255, 255, 255]));
        assert_eq!(hex_to_rgba("#1a2", 1.0), Rgba([0x11, 0xaa, 0x22, 255]));
    }

    #[test]
    fn long_hex_with_zero_opacity() {
        assert_eq!(hex_to_rgba("#000000", 0.0), Rgba([0, 0, 0, 0]));
        assert_eq!(hex_to_rgba("  #10Ff80 ", 1.0), Rgba([0x10, 0xff, 0x80, 255]));
    }

    #[test]
    fn malformed_hex_falls_back_to_white() {
        assert_eq!(hex_to_rgba("#12", 0.5), Rgba([255, 255, 255, 128]));
        assert_eq!(hex_to_rgba("#GGGGGG", 1.0), Rgba([255, 255, 255, 255]));
        assert_eq!(hex_to_rgba("", 0.0), Rgba([255, 255, 255, 0]));
        assert_eq!(hex_to_rgba("#ééé", 1.0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn opacity_is_clamped() {
        assert_eq!(hex_to_rgba("#000", 3.0)[3], 255);
        assert_eq!(hex_to_rgba("#000", -1.0)[3], 0);
        assert_eq!(hex_to_rgba("#000", 100.0 / 255.0)[3], 100);
    }

    #[test]
    fn schemes_pair_text_with_opposite_background() {
        let s = ColorScheme::WhiteOnBlack;
        assert_eq!(hex_to_rgba(s.text_hex(), 1.0), Rgba([255, 255, 255, 255]));
        assert_eq!(hex_to_rgba(s.stroke_hex(), 1.0), Rgba([0, 0, 0, 255]));
        let s = ColorScheme::BlackOnWhite;
        assert_eq!(hex_to_rgba(s.background_hex(), 1.0), Rgba([255, 255, 255, 255]));
        assert_eq!("black_on_white".parse::<ColorScheme>().unwrap(), s);
        assert!("purple".parse::<ColorScheme>().is_err());
    }
}
