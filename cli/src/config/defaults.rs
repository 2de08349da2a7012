//! Accepted ranges for numeric parameters.

use std::collections::HashMap;
use std::sync::LazyLock;

type RangeTuple = (&'static str, u32, u32, &'static str);

const RANGES: &[RangeTuple] = &[
    ("columns", 0, 100, "Grid columns (0 = automatic)"),
    ("grid_padding", 0, 500, "Gap between grid cells in pixels"),
    ("font_size", 6, 256, "Label font size in pixels"),
    ("edge_offset", 0, 4096, "Distance from the anchored edge in pixels"),
    ("padding", 0, 256, "Space between text and box edge in pixels"),
    ("corner_radius", 0, 128, "Box corner radius in pixels"),
    ("stroke_width", 0, 20, "Text outline width in pixels"),
    ("background_opacity", 0, 255, "Box opacity (0 = transparent)"),
];

/// Inclusive range for one parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamRange {
    pub key: &'static str,
    pub min: u32,
    pub max: u32,
    pub description: &'static str,
}

/// Parameter ranges indexed by key.
pub static PARAM_RANGES: LazyLock<HashMap<&'static str, ParamRange>> = LazyLock::new(|| {
    RANGES
        .iter()
        .map(|&(key, min, max, description)| {
            (
                key,
                ParamRange {
                    key,
                    min,
                    max,
                    description,
                },
            )
        })
        .collect()
});
