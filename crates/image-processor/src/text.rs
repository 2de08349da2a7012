//! Text measurement and multi-line drawing.
//!
//! Lines are split on `\n` and stacked at the font's line height plus
//! [`LINE_SPACING`]. Alignment shifts each line inside the block, whose
//! width is the widest line's advance. Measurement and rasterization share
//! one glyph layout, so the measured bounds are exactly where ink lands.

use ab_glyph::{Font, GlyphId, ScaleFont, point};
use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;
use serde::{Deserialize, Serialize};

use crate::compose::blend_coverage;
use crate::font::{BUILTIN_GLYPH_SIZE, ResolvedFont};

/// Extra pixels between consecutive lines.
pub const LINE_SPACING: i32 = 4;

/// Horizontal alignment of lines within a multi-line block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Shift of a `line_width` line inside a `block_width` block.
    fn offset(self, block_width: i32, line_width: i32) -> i32 {
        match self {
            Self::Left => 0,
            Self::Center => (block_width - line_width) / 2,
            Self::Right => block_width - line_width,
        }
    }
}

impl std::str::FromStr for TextAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(format!(
                "unknown text alignment '{other}' (expected left, center or right)"
            )),
        }
    }
}

/// Tight text extent relative to the drawing origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextBounds {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    fn union(self, other: TextBounds) -> TextBounds {
        TextBounds {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// Colors and outline for drawing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPaint {
    pub fill: Rgba<u8>,
    pub stroke_width: u32,
    pub stroke: Rgba<u8>,
}

/// A glyph positioned relative to the block's drawing origin.
#[derive(Debug, Clone, Copy)]
struct PlacedGlyph {
    ch: char,
    x: f32,
    /// Top of the glyph's line.
    y: f32,
}

/// Distance between consecutive line tops.
pub fn line_pitch(font: &ResolvedFont) -> i32 {
    match font {
        ResolvedFont::Outline { font, scale, .. } => {
            let scaled = font.as_scaled(*scale);
            (scaled.ascent() - scaled.descent()).ceil() as i32 + LINE_SPACING
        }
        ResolvedFont::Builtin => BUILTIN_GLYPH_SIZE as i32 + LINE_SPACING,
    }
}

/// Pen positions of every character in `line`, plus the line's advance.
///
/// Kerning between a pair is applied before the second glyph is placed.
fn line_pens(font: &ResolvedFont, line: &str) -> (Vec<(char, f32)>, f32) {
    match font {
        ResolvedFont::Outline { font, scale, .. } => {
            let scaled = font.as_scaled(*scale);
            let mut pens = Vec::with_capacity(line.len());
            let mut caret = 0.0f32;
            let mut prev: Option<GlyphId> = None;
            for ch in line.chars() {
                let id = scaled.glyph_id(ch);
                if let Some(prev) = prev {
                    caret += scaled.kern(prev, id);
                }
                pens.push((ch, caret));
                caret += scaled.h_advance(id);
                prev = Some(id);
            }
            (pens, caret)
        }
        ResolvedFont::Builtin => {
            let cell = BUILTIN_GLYPH_SIZE as f32;
            let pens: Vec<(char, f32)> = line
                .chars()
                .enumerate()
                .map(|(i, ch)| (ch, i as f32 * cell))
                .collect();
            let advance = pens.len() as f32 * cell;
            (pens, advance)
        }
    }
}

/// Advance width of a single line in pixels.
pub fn line_width(font: &ResolvedFont, line: &str) -> i32 {
    line_pens(font, line).1.ceil() as i32
}

/// Position every glyph of `text` for `align`.
fn layout(font: &ResolvedFont, text: &str, align: TextAlign) -> Vec<PlacedGlyph> {
    let pitch = line_pitch(font);
    let lines: Vec<(Vec<(char, f32)>, i32)> = text
        .split('\n')
        .map(|line| {
            let (pens, advance) = line_pens(font, line);
            (pens, advance.ceil() as i32)
        })
        .collect();
    let block_width = lines.iter().map(|(_, w)| *w).max().unwrap_or(0);

    lines
        .into_iter()
        .enumerate()
        .flat_map(|(i, (pens, width))| {
            let shift = align.offset(block_width, width) as f32;
            let top = (i as i32 * pitch) as f32;
            pens.into_iter().map(move |(ch, x)| PlacedGlyph {
                ch,
                x: x + shift,
                y: top,
            })
        })
        .collect()
}

type Measure = fn(&ResolvedFont, &str, TextAlign) -> Option<TextBounds>;

/// Measure `text` laid out with `align`, preferring tight ink bounds.
///
/// Falls back to an advance-width approximation (origin at zero, height
/// from the nominal font size) when no glyph leaves ink, e.g. for blank text.
pub fn measure_text(font: &ResolvedFont, text: &str, align: TextAlign) -> TextBounds {
    let providers: [Measure; 2] = [ink_bounds, approximate_bounds];
    providers
        .iter()
        .find_map(|measure| measure(font, text, align))
        .unwrap_or_default()
}

/// Union of the pixel bounds of every inked glyph.
pub fn ink_bounds(font: &ResolvedFont, text: &str, align: TextAlign) -> Option<TextBounds> {
    glyph_bounds(font, &layout(font, text, align))
}

fn glyph_bounds(font: &ResolvedFont, placed: &[PlacedGlyph]) -> Option<TextBounds> {
    let mut bounds: Option<TextBounds> = None;
    let mut add = |b: TextBounds| bounds = Some(bounds.map_or(b, |acc| acc.union(b)));

    match font {
        ResolvedFont::Outline { font, scale, .. } => {
            let scaled = font.as_scaled(*scale);
            for glyph in placed {
                let positioned = scaled
                    .glyph_id(glyph.ch)
                    .with_scale_and_position(*scale, point(glyph.x, glyph.y + scaled.ascent()));
                if let Some(outlined) = font.outline_glyph(positioned) {
                    let px = outlined.px_bounds();
                    add(TextBounds {
                        left: px.min.x.floor() as i32,
                        top: px.min.y.floor() as i32,
                        right: px.max.x.ceil() as i32,
                        bottom: px.max.y.ceil() as i32,
                    });
                }
            }
        }
        ResolvedFont::Builtin => {
            for glyph in placed {
                let (gx, gy) = (glyph.x as i32, glyph.y as i32);
                for (x, y) in builtin_pixels(glyph.ch) {
                    add(TextBounds {
                        left: gx + x,
                        top: gy + y,
                        right: gx + x + 1,
                        bottom: gy + y + 1,
                    });
                }
            }
        }
    }

    bounds
}

/// Width from line advances, height from the nominal size.
pub fn approximate_bounds(font: &ResolvedFont, text: &str, _align: TextAlign) -> Option<TextBounds> {
    let lines: Vec<&str> = text.split('\n').collect();
    let width = lines.iter().map(|l| line_width(font, l)).max().unwrap_or(0);
    let height = font.nominal_size() as i32 + (lines.len() as i32 - 1) * line_pitch(font);
    Some(TextBounds {
        left: 0,
        top: 0,
        right: width,
        bottom: height,
    })
}

fn builtin_glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Set pixels of a built-in glyph, relative to its cell.
fn builtin_pixels(ch: char) -> impl Iterator<Item = (i32, i32)> {
    let rows = builtin_glyph(ch);
    (0..8i32).flat_map(move |y| {
        (0..8i32)
            .filter(move |&x| (rows[y as usize] >> x) & 1 == 1)
            .map(move |x| (x, y))
    })
}

/// Coverage masks of a laid-out text block.
///
/// `left`/`top` place the masks' top-left pixel relative to the drawing
/// origin. The stroke mask is the fill mask dilated by the stroke width.
#[derive(Debug, Clone)]
pub struct TextLayer {
    pub left: i32,
    pub top: i32,
    pub fill: GrayImage,
    pub stroke: Option<GrayImage>,
}

impl TextLayer {
    /// Rasterize `text` once. Returns `None` when nothing leaves ink.
    pub fn rasterize(font: &ResolvedFont, text: &str, align: TextAlign, stroke_width: u32) -> Option<Self> {
        let placed = layout(font, text, align);
        let ink = glyph_bounds(font, &placed)?;

        let radius = u8::try_from(stroke_width).unwrap_or(u8::MAX);
        let margin = i32::from(radius);
        let (left, top) = (ink.left - margin, ink.top - margin);
        let width = (ink.width() + 2 * margin) as u32;
        let height = (ink.height() + 2 * margin) as u32;
        let mut fill = GrayImage::new(width, height);

        let mut cover = |x: i32, y: i32, value: u8| {
            let (mx, my) = (x - left, y - top);
            if mx >= 0 && my >= 0 && (mx as u32) < width && (my as u32) < height {
                let px = fill.get_pixel_mut(mx as u32, my as u32);
                px.0[0] = px.0[0].max(value);
            }
        };

        match font {
            ResolvedFont::Outline { font, scale, .. } => {
                let scaled = font.as_scaled(*scale);
                for glyph in &placed {
                    let positioned = scaled
                        .glyph_id(glyph.ch)
                        .with_scale_and_position(*scale, point(glyph.x, glyph.y + scaled.ascent()));
                    if let Some(outlined) = font.outline_glyph(positioned) {
                        let min = outlined.px_bounds().min;
                        let (x0, y0) = (min.x.floor() as i32, min.y.floor() as i32);
                        outlined.draw(|gx, gy, c| {
                            let value = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
                            cover(x0 + gx as i32, y0 + gy as i32, value);
                        });
                    }
                }
            }
            ResolvedFont::Builtin => {
                for glyph in &placed {
                    let (gx, gy) = (glyph.x as i32, glyph.y as i32);
                    for (x, y) in builtin_pixels(glyph.ch) {
                        cover(gx + x, gy + y, u8::MAX);
                    }
                }
            }
        }

        let stroke = (radius > 0).then(|| dilate(&fill, Norm::L2, radius));
        Some(Self {
            left,
            top,
            fill,
            stroke,
        })
    }

    /// Blend the stroke, then the fill, onto `img` with the origin at (`x`, `y`).
    pub fn paint(&self, img: &mut RgbaImage, x: i32, y: i32, paint: TextPaint) {
        if let Some(stroke) = &self.stroke {
            self.blend_mask(img, x, y, stroke, paint.stroke);
        }
        self.blend_mask(img, x, y, &self.fill, paint.fill);
    }

    fn blend_mask(&self, img: &mut RgbaImage, x: i32, y: i32, mask: &GrayImage, color: Rgba<u8>) {
        let (w, h) = (i64::from(img.width()), i64::from(img.height()));
        let (ox, oy) = (i64::from(x) + i64::from(self.left), i64::from(y) + i64::from(self.top));
        for (mx, my, &Luma([coverage])) in mask.enumerate_pixels() {
            if coverage == 0 {
                continue;
            }
            let (px, py) = (ox + i64::from(mx), oy + i64::from(my));
            if px < 0 || py < 0 || px >= w || py >= h {
                continue;
            }
            let dst = img.get_pixel_mut(px as u32, py as u32);
            *dst = blend_coverage(*dst, color, coverage);
        }
    }
}

/// Draw `text` with its block's origin at (`x`, `y`).
///
/// The outline, when `stroke_width > 0`, is painted first; the fill is
/// drawn on top.
pub fn draw_multiline_text(
    img: &mut RgbaImage,
    font: &ResolvedFont,
    x: i32,
    y: i32,
    text: &str,
    align: TextAlign,
    paint: TextPaint,
) {
    if let Some(layer) = TextLayer::rasterize(font, text, align, paint.stroke_width) {
        layer.paint(img, x, y, paint);
    }
}
