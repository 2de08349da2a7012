//! Image composition utilities: grid mosaics and text labels.
//!
//! Provides batch normalization (bilinear resize), padded grid layout,
//! font resolution with a built-in fallback, and labelling of every frame
//! in a batch with a translucent rounded text box.

pub mod batch;
pub mod color;
pub mod compose;
pub mod font;
pub mod grid;
pub mod label;
pub mod placement;
pub mod resize;
pub mod text;

// Re-exports for convenience
pub use batch::ImageBatch;
pub use color::{ColorScheme, hex_to_rgba};
pub use font::{FontCatalog, FontFamily, FontResolver, ResolvedFont};
pub use grid::{GridLayout, GridSpec, compose_grid, normalize_batches};
pub use label::{FontRequest, LabelRenderer, LabelStyle, TextBox, render_labels};
pub use placement::{Anchor, resolve_position};
pub use resize::resize_bilinear;
pub use text::{TextAlign, TextBounds, TextLayer, measure_text};

/// Errors raised when building an [`ImageBatch`] from caller data.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Frame size mismatch: expected {expected:?} (h, w), got {actual:?}")]
    ShapeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Unsupported channel count: {0} (expected 1-4)")]
    UnsupportedChannels(usize),

    #[error("Sample count mismatch: expected {expected}, got {actual}")]
    SampleCount { expected: usize, actual: usize },

    #[error("Frame index {index} out of range for batch of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
