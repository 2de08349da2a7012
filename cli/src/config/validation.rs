//! Parameter range validation.

use image_processor::{FontRequest, GridSpec, LabelStyle};

use super::defaults::PARAM_RANGES;

/// Validate a numeric parameter. Returns `Ok(())` if valid, or an error message.
pub fn validate_param(key: &str, value: u32) -> Result<(), String> {
    let range = PARAM_RANGES
        .get(key)
        .ok_or_else(|| format!("unknown parameter: {key}"))?;
    if value < range.min || value > range.max {
        return Err(format!(
            "{} ({}) must be between {} and {} (got {value})",
            range.key, range.description, range.min, range.max
        ));
    }
    Ok(())
}

pub fn validate_grid(spec: &GridSpec) -> Result<(), String> {
    validate_param("columns", spec.columns)?;
    validate_param("grid_padding", spec.padding)
}

pub fn validate_label(style: &LabelStyle, font: &FontRequest) -> Result<(), String> {
    validate_param("font_size", font.size)?;
    validate_param("edge_offset", style.edge_offset)?;
    validate_param("padding", style.padding)?;
    validate_param("corner_radius", style.corner_radius)?;
    validate_param("stroke_width", style.stroke_width)?;
    validate_param("background_opacity", u32::from(style.background_opacity))
}
