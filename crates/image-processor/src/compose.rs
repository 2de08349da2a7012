//! Overlay drawing and alpha compositing.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

/// Fill the inclusive rectangle `[x, x + w] × [y, y + h]` with rounded corners.
///
/// `radius` is clamped to half the smaller side. Pixels are written, not
/// blended, so this is meant for drawing onto a transparent overlay.
pub fn fill_rounded_rect(
    img: &mut RgbaImage,
    x: i32,
    y: i32,
    w: u32,
    h: u32,
    radius: u32,
    color: Rgba<u8>,
) {
    let r = radius.min(w.min(h) / 2);
    let ri = r as i32;

    // Horizontal band (full width) and vertical band (full height).
    draw_filled_rect_mut(img, Rect::at(x, y + ri).of_size(w + 1, h + 1 - 2 * r), color);
    draw_filled_rect_mut(img, Rect::at(x + ri, y).of_size(w + 1 - 2 * r, h + 1), color);

    if r > 0 {
        let (right, bottom) = (x + w as i32 - ri, y + h as i32 - ri);
        for center in [(x + ri, y + ri), (right, y + ri), (x + ri, bottom), (right, bottom)] {
            draw_filled_circle_mut(img, center, ri, color);
        }
    }
}

/// Composite `overlay` over `base` (Porter-Duff "over"); both must be the same size.
pub fn alpha_composite(base: &mut RgbaImage, overlay: &RgbaImage) {
    for (dst, src) in base.pixels_mut().zip(overlay.pixels()) {
        *dst = over(*dst, *src);
    }
}

/// Blend `color` over `dst` at `coverage` (0 leaves `dst`, 255 is full strength).
pub fn blend_coverage(dst: Rgba<u8>, color: Rgba<u8>, coverage: u8) -> Rgba<u8> {
    let alpha = (u16::from(color[3]) * u16::from(coverage) + 127) / 255;
    let mut src = color;
    src[3] = alpha as u8;
    over(dst, src)
}

fn over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = f32::from(src[3]) / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    if sa >= 1.0 {
        return src;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let channel = |s: u8, d: u8| {
        let v = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}
