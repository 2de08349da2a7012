//! Grid composition: arrange image batches into one padded mosaic.
//!
//! Batches are normalized to the first batch's frame size, concatenated in
//! order, then copied row-major into a zero-filled canvas.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::batch::ImageBatch;
use crate::resize::resize_bilinear;

/// Side length of the placeholder returned when there is nothing to lay out.
pub const PLACEHOLDER_SIZE: u32 = 512;

/// Channel count of the placeholder when no reference batch exists.
pub const PLACEHOLDER_CHANNELS: usize = 3;

/// Grid parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    /// Fixed column count; `0` picks `ceil(sqrt(n))`.
    pub columns: u32,
    /// Gap between cells in pixels.
    pub padding: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            columns: 2,
            padding: 2,
        }
    }
}

/// Computed grid geometry for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub padding: u32,
}

impl GridLayout {
    /// Lay out `count` cells of `cell_width` × `cell_height`.
    ///
    /// `cols` is never zero, so an empty batch yields one column and no rows.
    pub fn compute(count: usize, spec: GridSpec, cell_width: u32, cell_height: u32) -> Self {
        let count = count as u32;
        let cols = if spec.columns > 0 {
            spec.columns
        } else {
            (f64::from(count).sqrt().ceil() as u32).max(1)
        };
        let rows = count.div_ceil(cols);
        Self {
            rows,
            cols,
            cell_width,
            cell_height,
            padding: spec.padding,
        }
    }

    /// Canvas width: `cols·w + (cols−1)·padding`.
    pub fn canvas_width(&self) -> u32 {
        self.cols * self.cell_width + self.cols.saturating_sub(1) * self.padding
    }

    /// Canvas height: `rows·h + (rows−1)·padding`.
    pub fn canvas_height(&self) -> u32 {
        self.rows * self.cell_height + self.rows.saturating_sub(1) * self.padding
    }

    /// Top-left corner of cell `index` in row-major order.
    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        let (row, col) = (index / self.cols, index % self.cols);
        (
            col * (self.cell_width + self.padding),
            row * (self.cell_height + self.padding),
        )
    }
}

/// Resize and concatenate `batches` into one batch.
///
/// The first present batch sets the reference frame size and channel count.
/// Absent entries are skipped. Returns a single black placeholder when
/// nothing remains: reference-sized if a reference exists, otherwise
/// 512×512×3.
pub fn normalize_batches<'a, I>(batches: I) -> ImageBatch
where
    I: IntoIterator<Item = Option<&'a ImageBatch>>,
{
    let mut present = batches.into_iter().flatten();

    let Some(first) = present.next() else {
        debug!("No image batches supplied, returning placeholder");
        return placeholder(None);
    };
    let (height, width, channels) = (first.height(), first.width(), first.channels());
    if height == 0 || width == 0 {
        debug!(height, width, "Reference frame is empty, returning placeholder");
        return placeholder(None);
    }

    let mut combined = ImageBatch::zeros(0, height, width, channels);
    for batch in std::iter::once(first).chain(present) {
        let adapted = batch.with_channels(channels);
        let resized = resize_bilinear(&adapted, height, width);
        // Shape and channels both match the reference by construction.
        if combined.extend_from(&resized).is_err() {
            debug!("Skipping batch that could not be normalized");
        }
    }

    if combined.is_empty() {
        return placeholder(Some((height, width, channels)));
    }
    combined
}

fn placeholder(reference: Option<(u32, u32, usize)>) -> ImageBatch {
    let (h, w, c) = reference.unwrap_or((PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, PLACEHOLDER_CHANNELS));
    ImageBatch::zeros(1, h, w, c)
}

/// Copy every frame of `batch` into its cell on a black canvas.
///
/// Trailing unfilled cells stay black. The result is a batch of one.
pub fn place_cells(batch: &ImageBatch, layout: &GridLayout) -> ImageBatch {
    let channels = batch.channels();
    let canvas_w = layout.canvas_width();
    let canvas_h = layout.canvas_height();
    let mut canvas = ImageBatch::zeros(1, canvas_h, canvas_w, channels);

    let row_len = layout.cell_width as usize * channels;
    let canvas_stride = canvas_w as usize * channels;
    let samples = canvas.samples_mut();

    for (idx, frame) in batch.frames().enumerate() {
        let (x0, y0) = layout.cell_origin(idx);
        for (y, src_row) in frame.chunks_exact(row_len).enumerate() {
            let start = (y0 as usize + y) * canvas_stride + x0 as usize * channels;
            samples[start..start + row_len].copy_from_slice(src_row);
        }
    }

    canvas
}

/// Compose `batches` into a single grid image.
pub fn compose_grid<'a, I>(batches: I, spec: GridSpec) -> ImageBatch
where
    I: IntoIterator<Item = Option<&'a ImageBatch>>,
{
    let images = normalize_batches(batches);
    let layout = GridLayout::compute(images.len(), spec, images.width(), images.height());

    info!(
        images = images.len(),
        rows = layout.rows,
        cols = layout.cols,
        width = layout.canvas_width(),
        height = layout.canvas_height(),
        "Composing image grid"
    );

    place_cells(&images, &layout)
}
