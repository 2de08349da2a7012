//! Text labels with a translucent rounded background, drawn on every frame.
//!
//! Measure the text, size the box from the measured extent plus padding,
//! anchor it, then fill a rounded rectangle and draw the (optionally
//! stroked) text centred in it on a transparent overlay. The overlay is
//! composited onto every frame.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::batch::ImageBatch;
use crate::color::{ColorScheme, hex_to_rgba};
use crate::compose::{alpha_composite, fill_rounded_rect};
use crate::font::{FontFamily, FontResolver, ResolvedFont};
use crate::placement::{Anchor, resolve_position};
use crate::text::{TextAlign, TextBounds, TextPaint, draw_multiline_text, measure_text};

/// Font family and pixel size for a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontRequest {
    pub family: FontFamily,
    pub size: u32,
}

impl Default for FontRequest {
    fn default() -> Self {
        Self {
            family: FontFamily::default(),
            size: 30,
        }
    }
}

/// Label text and appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub text: String,
    pub alignment: TextAlign,
    #[serde(alias = "placement")]
    pub anchor: Anchor,
    pub edge_offset: u32,
    pub color_scheme: ColorScheme,
    pub padding: u32,
    pub corner_radius: u32,
    pub stroke_width: u32,
    pub background_opacity: u8,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            text: "YOUR TEXT".into(),
            alignment: TextAlign::Left,
            anchor: Anchor::TopLeft,
            edge_offset: 25,
            color_scheme: ColorScheme::WhiteOnBlack,
            padding: 18,
            corner_radius: 15,
            stroke_width: 1,
            background_opacity: 0,
        }
    }
}

/// Background box geometry for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl TextBox {
    /// Size the box around `bounds` and anchor it inside the image.
    pub fn layout(image_w: u32, image_h: u32, bounds: &TextBounds, style: &LabelStyle) -> Self {
        let pad = i64::from(style.padding) * 2;
        let width = (i64::from(bounds.width()) + pad).clamp(0, i64::from(u32::MAX)) as u32;
        let height = (i64::from(bounds.height()) + pad).clamp(0, i64::from(u32::MAX)) as u32;
        let (x, y) = resolve_position(image_w, image_h, width, height, style.anchor, style.edge_offset);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Corner radius clamped to half the smaller side.
    pub fn radius(&self, requested: u32) -> u32 {
        requested.min(self.width.min(self.height) / 2)
    }

    /// Drawing origin that centres text of `bounds` in this box.
    pub fn text_origin(&self, bounds: &TextBounds) -> (i32, i32) {
        let center_x = f64::from(self.x) + f64::from(self.width) / 2.0;
        let center_y = f64::from(self.y) + f64::from(self.height) / 2.0;
        let tx = center_x - f64::from(bounds.width()) / 2.0 - f64::from(bounds.left);
        let ty = center_y - f64::from(bounds.height()) / 2.0 - f64::from(bounds.top);
        (tx.trunc() as i32, ty.trunc() as i32)
    }
}

/// Draws one label style with one resolved font.
#[derive(Debug)]
pub struct LabelRenderer {
    font: ResolvedFont,
    style: LabelStyle,
}

impl LabelRenderer {
    pub fn new(font: ResolvedFont, style: LabelStyle) -> Self {
        Self { font, style }
    }

    /// Resolve `request` through `resolver` and build a renderer.
    pub fn resolve(resolver: &FontResolver, request: &FontRequest, style: LabelStyle) -> Self {
        let font = resolver.resolve(request.family.as_str(), request.size);
        Self::new(font, style)
    }

    pub fn font(&self) -> &ResolvedFont {
        &self.font
    }

    pub fn style(&self) -> &LabelStyle {
        &self.style
    }

    fn bounds(&self) -> TextBounds {
        measure_text(&self.font, &self.style.text, self.style.alignment)
    }

    /// Box geometry the label would occupy on a `width` × `height` frame.
    pub fn text_box(&self, width: u32, height: u32) -> TextBox {
        TextBox::layout(width, height, &self.bounds(), &self.style)
    }

    /// Transparent `width` × `height` layer holding the box and its text.
    ///
    /// Compositing this layer over a frame gives the same result as drawing
    /// the box and then the text onto the frame, since "over" is associative.
    pub fn overlay(&self, width: u32, height: u32) -> RgbaImage {
        let style = &self.style;
        let scheme = style.color_scheme;
        let bounds = self.bounds();
        let text_box = TextBox::layout(width, height, &bounds, style);

        let mut overlay = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        let background = hex_to_rgba(
            scheme.background_hex(),
            f32::from(style.background_opacity) / 255.0,
        );
        fill_rounded_rect(
            &mut overlay,
            text_box.x,
            text_box.y,
            text_box.width,
            text_box.height,
            text_box.radius(style.corner_radius),
            background,
        );

        let (tx, ty) = text_box.text_origin(&bounds);
        let paint = TextPaint {
            fill: hex_to_rgba(scheme.text_hex(), 1.0),
            stroke_width: style.stroke_width,
            stroke: hex_to_rgba(scheme.stroke_hex(), 1.0),
        };
        draw_multiline_text(&mut overlay, &self.font, tx, ty, &style.text, style.alignment, paint);
        overlay
    }

    /// Draw the label onto a single RGBA frame.
    pub fn render_frame(&self, frame: &RgbaImage) -> RgbaImage {
        let (width, height) = frame.dimensions();
        let mut out = frame.clone();
        alpha_composite(&mut out, &self.overlay(width, height));
        out
    }

    /// Label every frame of `batch`, keeping order, size and channel count.
    ///
    /// Frames share one size, so the overlay is built once and composited
    /// onto each frame.
    pub fn render(&self, batch: &ImageBatch) -> ImageBatch {
        debug!(
            frames = batch.len(),
            width = batch.width(),
            height = batch.height(),
            builtin_font = self.font.is_builtin(),
            "Rendering text labels"
        );
        if batch.is_empty() {
            return batch.clone();
        }

        let overlay = self.overlay(batch.width(), batch.height());
        let frames: Vec<RgbaImage> = batch
            .rgba_frames()
            .map(|mut frame| {
                alpha_composite(&mut frame, &overlay);
                frame
            })
            .collect();

        match ImageBatch::from_rgba_frames(&frames, batch.height(), batch.width(), batch.channels()) {
            Ok(out) => out,
            Err(e) => {
                warn!("Labelled frames could not be reassembled, returning input: {e}");
                batch.clone()
            }
        }
    }
}

/// Resolve the font and label every frame of `batch`.
pub fn render_labels(
    batch: &ImageBatch,
    style: &LabelStyle,
    font: &FontRequest,
    resolver: &FontResolver,
) -> ImageBatch {
    LabelRenderer::resolve(resolver, font, style.clone()).render(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tests::fixture_font;

    fn black_batch(len: usize, height: u32, width: u32) -> ImageBatch {
        ImageBatch::zeros(len, height, width, 3)
    }

    fn builtin(style: LabelStyle) -> LabelRenderer {
        LabelRenderer::new(ResolvedFont::Builtin, style)
    }

    fn visible_style() -> LabelStyle {
        LabelStyle {
            text: "Hello".into(),
            color_scheme: ColorScheme::BlackOnWhite,
            background_opacity: 255,
            edge_offset: 10,
            padding: 6,
            corner_radius: 4,
            stroke_width: 0,
            ..LabelStyle::default()
        }
    }

    #[test]
    fn defaults_match_host_defaults() {
        let style = LabelStyle::default();
        assert_eq!(style.text, "YOUR TEXT");
        assert_eq!(style.anchor, Anchor::TopLeft);
        assert_eq!((style.edge_offset, style.padding, style.corner_radius), (25, 18, 15));
        assert_eq!((style.stroke_width, style.background_opacity), (1, 0));
        let font = FontRequest::default();
        assert_eq!((font.family, font.size), (FontFamily::GoogleSansCodeBold, 30));
    }

    #[test]
    fn box_size_is_text_plus_twice_padding() {
        let bounds = TextBounds {
            left: 1,
            top: 3,
            right: 41,
            bottom: 15,
        };
        let style = LabelStyle {
            padding: 5,
            anchor: Anchor::BottomRight,
            edge_offset: 10,
            ..LabelStyle::default()
        };
        let tb = TextBox::layout(200, 100, &bounds, &style);
        assert_eq!((tb.width, tb.height), (50, 22));
        assert_eq!((tb.x, tb.y), (140, 68));
    }

    #[test]
    fn text_origin_centres_measured_extent() {
        let tb = TextBox {
            x: 10,
            y: 20,
            width: 50,
            height: 30,
        };
        let bounds = TextBounds {
            left: 2,
            top: 4,
            right: 32,
            bottom: 14,
        };
        // centre (35, 35) - half extent (15, 5) - offsets (2, 4)
        assert_eq!(tb.text_origin(&bounds), (18, 26));
    }

    #[test]
    fn radius_never_exceeds_half_the_short_side() {
        let tb = TextBox {
            x: 0,
            y: 0,
            width: 40,
            height: 10,
        };
        assert_eq!(tb.radius(15), 5);
        assert_eq!(tb.radius(3), 3);
    }

    #[test]
    fn three_frames_keep_size_and_show_box() {
        let batch = black_batch(3, 80, 120);
        let renderer = builtin(visible_style());
        let out = renderer.render(&batch);

        assert_eq!(out.len(), 3);
        assert_eq!((out.height(), out.width(), out.channels()), (80, 120, 3));

        let tb = renderer.text_box(120, 80);
        assert_eq!((tb.x, tb.y), (10, 10));
        for i in 0..3 {
            let frame = out.to_rgba8(i).unwrap();
            let inside = (tb.x as u32..tb.x as u32 + tb.width)
                .flat_map(|x| (tb.y as u32..tb.y as u32 + tb.height).map(move |y| (x, y)))
                .any(|(x, y)| frame.get_pixel(x, y)[0] > 0);
            assert!(inside, "frame {i} has no visible box");
            // Far corner is untouched.
            assert_eq!(frame.get_pixel(119, 79), &Rgba([0, 0, 0, 255]));
        }
    }

    #[test]
    fn transparent_background_only_draws_text() {
        let batch = black_batch(1, 60, 100);
        let style = LabelStyle {
            background_opacity: 0,
            ..visible_style()
        };
        let renderer = builtin(style);
        let out = renderer.render(&batch).to_rgba8(0).unwrap();
        // Black text on a black frame with no background leaves it black.
        assert!(out.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn white_text_is_drawn_in_the_box() {
        let batch = black_batch(1, 60, 100);
        let style = LabelStyle {
            text: "Hi\nthere".into(),
            color_scheme: ColorScheme::WhiteOnBlack,
            background_opacity: 128,
            alignment: TextAlign::Center,
            anchor: Anchor::Center,
            stroke_width: 1,
            ..LabelStyle::default()
        };
        let renderer = builtin(style);
        let out = renderer.render(&batch).to_rgba8(0).unwrap();
        assert!(out.pixels().any(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn offset_beyond_image_is_not_an_error() {
        let batch = black_batch(2, 20, 20);
        let style = LabelStyle {
            edge_offset: 4096,
            anchor: Anchor::BottomRight,
            ..visible_style()
        };
        let out = builtin(style).render(&batch);
        assert_eq!(out.len(), 2);
        assert_eq!((out.height(), out.width()), (20, 20));
    }

    #[test]
    fn rgba_input_keeps_four_channels() {
        let batch = ImageBatch::zeros(1, 30, 30, 4);
        let out = builtin(visible_style()).render(&batch);
        assert_eq!(out.channels(), 4);
    }

    #[test]
    fn empty_batch_renders_nothing() {
        let batch = black_batch(0, 30, 30);
        let out = builtin(visible_style()).render(&batch);
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_fonts_still_render() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FontResolver::new(Default::default(), dir.path().join("fonts"))
            .with_user_dirs(Vec::new());
        let out = render_labels(
            &black_batch(1, 64, 64),
            &visible_style(),
            &FontRequest {
                family: FontFamily::FunnelSans,
                size: 24,
            },
            &resolver,
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn kerned_text_is_centred_in_its_box() {
        let padding = 10;
        let style = LabelStyle {
            text: "AVAVAVAV To Ty Wa".into(),
            color_scheme: ColorScheme::BlackOnWhite,
            background_opacity: 255,
            edge_offset: 20,
            padding,
            corner_radius: 0,
            stroke_width: 0,
            ..LabelStyle::default()
        };
        let renderer = LabelRenderer::new(fixture_font(60), style);
        let frame = renderer.render(&black_batch(1, 140, 900)).to_rgba8(0).unwrap();
        let tb = renderer.text_box(900, 140);

        let (x0, y0) = (tb.x as u32, tb.y as u32);
        let (x1, y1) = (x0 + tb.width - 1, y0 + tb.height - 1);
        assert!(x1 < 900 && y1 < 140);
        let ink: Vec<(u32, u32)> = (x0..=x1)
            .flat_map(|x| (y0..=y1).map(move |y| (x, y)))
            .filter(|&(x, y)| frame.get_pixel(x, y).0[..3].iter().any(|&c| c < 255))
            .collect();
        let min_x = ink.iter().map(|p| p.0).min().unwrap();
        let max_x = ink.iter().map(|p| p.0).max().unwrap();
        let min_y = ink.iter().map(|p| p.1).min().unwrap();
        let max_y = ink.iter().map(|p| p.1).max().unwrap();

        let expected = padding..=padding + 1;
        assert!(expected.contains(&(min_x - x0)), "left gap {}", min_x - x0);
        assert!(expected.contains(&(x1 - max_x)), "right gap {}", x1 - max_x);
        assert!(expected.contains(&(min_y - y0)), "top gap {}", min_y - y0);
        assert!(expected.contains(&(y1 - max_y)), "bottom gap {}", y1 - max_y);
    }

    #[test]
    fn stroked_outline_label_renders_every_frame() {
        let style = LabelStyle {
            text: "Stroke\nwidth".into(),
            stroke_width: 20,
            background_opacity: 96,
            ..LabelStyle::default()
        };
        let renderer = LabelRenderer::new(fixture_font(128), style);
        let out = renderer.render(&black_batch(2, 512, 2048));
        assert_eq!(out.len(), 2);
        let first = out.to_rgba8(0).unwrap();
        assert_eq!(first, out.to_rgba8(1).unwrap());
        assert!(first.pixels().any(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn style_deserializes_with_defaults_and_placement_alias() {
        let style: LabelStyle =
            serde_json::from_str(r#"{"text": "A", "placement": "bottom_left", "background_opacity": 200}"#)
                .unwrap();
        assert_eq!(style.text, "A");
        assert_eq!(style.anchor, Anchor::BottomLeft);
        assert_eq!(style.background_opacity, 200);
        assert_eq!(style.padding, 18);
    }
}
