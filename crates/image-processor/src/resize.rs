//! Bilinear resizing for image batches.
//!
//! Sample centres sit at half-pixel offsets (no corner alignment), so a
//! destination pixel `d` reads source coordinate `(d + 0.5) * in / out - 0.5`,
//! clamped at zero, with the far neighbour clamped to the last row/column.

use tracing::debug;

use crate::batch::ImageBatch;

/// Source taps for one destination coordinate.
#[derive(Debug, Clone, Copy)]
struct Tap {
    lo: usize,
    hi: usize,
    weight: f32,
}

fn taps(src_len: u32, dst_len: u32) -> Vec<Tap> {
    let scale = src_len as f32 / dst_len as f32;
    let last = src_len.saturating_sub(1) as usize;
    (0..dst_len)
        .map(|d| {
            let src = ((d as f32 + 0.5) * scale - 0.5).max(0.0);
            let lo = (src.floor() as usize).min(last);
            let hi = (lo + 1).min(last);
            Tap {
                lo,
                hi,
                weight: src - lo as f32,
            }
        })
        .collect()
}

/// Resize every frame of `batch` to `height` × `width`, keeping its channels.
///
/// Returns the batch unchanged when it already has the target size.
pub fn resize_bilinear(batch: &ImageBatch, height: u32, width: u32) -> ImageBatch {
    let (src_h, src_w) = (batch.height(), batch.width());
    let channels = batch.channels();

    if (src_h, src_w) == (height, width) {
        debug!(height, width, "Batch already at target size, skipping resize");
        return batch.clone();
    }

    let mut out = ImageBatch::zeros(batch.len(), height, width, channels);
    if src_h == 0 || src_w == 0 || height == 0 || width == 0 {
        return out;
    }

    debug!(
        frames = batch.len(),
        src_h,
        src_w,
        height,
        width,
        "Resizing batch (bilinear)"
    );

    let rows = taps(src_h, height);
    let cols = taps(src_w, width);
    let src_stride = src_w as usize * channels;
    let dst_frame = out.frame_len();

    for (src, dst) in batch
        .frames()
        .zip(out.samples_mut().chunks_exact_mut(dst_frame))
    {
        for (y, ty) in rows.iter().enumerate() {
            let top = &src[ty.lo * src_stride..(ty.lo + 1) * src_stride];
            let bottom = &src[ty.hi * src_stride..(ty.hi + 1) * src_stride];
            for (x, tx) in cols.iter().enumerate() {
                let out_px = (y * width as usize + x) * channels;
                for c in 0..channels {
                    let (l, r) = (tx.lo * channels + c, tx.hi * channels + c);
                    let upper = top[l] + (top[r] - top[l]) * tx.weight;
                    let lower = bottom[l] + (bottom[r] - bottom[l]) * tx.weight;
                    dst[out_px + c] = upper + (lower - upper) * ty.weight;
                }
            }
        }
    }

    out
}
