//! Label box placement relative to the image edges.

use serde::{Deserialize, Serialize};

/// Reference corner (or centre) a label box is positioned against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl Anchor {
    /// Parse an anchor name; anything unrecognized means [`Anchor::Center`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "top_left" => Self::TopLeft,
            "top_right" => Self::TopRight,
            "bottom_left" => Self::BottomLeft,
            "bottom_right" => Self::BottomRight,
            _ => Self::Center,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top_left",
            Self::TopRight => "top_right",
            Self::BottomLeft => "bottom_left",
            Self::BottomRight => "bottom_right",
            Self::Center => "center",
        }
    }
}

/// Top-left corner of a `box_w` × `box_h` box anchored inside an image.
///
/// No clamping is applied: large offsets or boxes may land partly or
/// entirely off the image. The centred position floors towards negative
/// infinity when the box is larger than the image.
pub fn resolve_position(
    image_w: u32,
    image_h: u32,
    box_w: u32,
    box_h: u32,
    anchor: Anchor,
    edge_offset: u32,
) -> (i32, i32) {
    let (iw, ih, bw, bh, off) = (
        i64::from(image_w),
        i64::from(image_h),
        i64::from(box_w),
        i64::from(box_h),
        i64::from(edge_offset),
    );
    let (x, y) = match anchor {
        Anchor::TopLeft => (off, off),
        Anchor::TopRight => (iw - bw - off, off),
        Anchor::BottomLeft => (off, ih - bh - off),
        Anchor::BottomRight => (iw - bw - off, ih - bh - off),
        Anchor::Center => ((iw - bw).div_euclid(2), (ih - bh).div_euclid(2)),
    };
    (saturate(x), saturate(y))
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
