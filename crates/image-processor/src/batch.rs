//! Image batches: ordered, same-shaped frames stored as `f32` samples.
//!
//! Samples are laid out batch-major, then row, column and channel
//! (BHWC), with values in `[0, 1]`. Frames convert to and from 8-bit
//! `image` buffers by scaling with 255, rounding and clamping.

use image::{DynamicImage, GrayAlphaImage, GrayImage, Rgba, RgbaImage, RgbImage};

use crate::BatchError;

/// An ordered batch of images sharing height, width and channel count.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBatch {
    len: usize,
    height: u32,
    width: u32,
    channels: usize,
    data: Vec<f32>,
}

/// Convert a `[0, 1]` sample to an 8-bit value.
pub fn sample_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Convert an 8-bit value to a `[0, 1]` sample.
pub fn u8_to_sample(v: u8) -> f32 {
    f32::from(v) / 255.0
}

fn check_channels(channels: usize) -> Result<(), BatchError> {
    if (1..=4).contains(&channels) {
        Ok(())
    } else {
        Err(BatchError::UnsupportedChannels(channels))
    }
}

impl ImageBatch {
    /// Build a batch from raw BHWC samples.
    pub fn from_samples(
        len: usize,
        height: u32,
        width: u32,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self, BatchError> {
        check_channels(channels)?;
        let expected = len * height as usize * width as usize * channels;
        if data.len() != expected {
            return Err(BatchError::SampleCount {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            len,
            height,
            width,
            channels,
            data,
        })
    }

    /// A batch of `len` black frames.
    pub fn zeros(len: usize, height: u32, width: u32, channels: usize) -> Self {
        let channels = channels.clamp(1, 4);
        Self {
            len,
            height,
            width,
            channels,
            data: vec![0.0; len * height as usize * width as usize * channels],
        }
    }

    /// Build a batch from decoded images.
    ///
    /// The channel count is taken from the first image's color type
    /// (grey, grey+alpha, RGB or RGBA); every image must share its size.
    pub fn from_images(images: &[DynamicImage]) -> Result<Self, BatchError> {
        let Some(first) = images.first() else {
            return Ok(Self::zeros(0, 0, 0, 3));
        };
        let (width, height) = (first.width(), first.height());
        let channels = usize::from(first.color().channel_count()).clamp(1, 4);

        let mut data = Vec::with_capacity(images.len() * width as usize * height as usize * channels);
        for img in images {
            if (img.height(), img.width()) != (height, width) {
                return Err(BatchError::ShapeMismatch {
                    expected: (height, width),
                    actual: (img.height(), img.width()),
                });
            }
            match channels {
                1 => data.extend(img.to_luma8().into_raw().into_iter().map(u8_to_sample)),
                2 => data.extend(img.to_luma_alpha8().into_raw().into_iter().map(u8_to_sample)),
                3 => data.extend(img.to_rgb8().into_raw().into_iter().map(u8_to_sample)),
                _ => data.extend(img.to_rgba8().into_raw().into_iter().map(u8_to_sample)),
            }
        }

        Self::from_samples(images.len(), height, width, channels, data)
    }

    /// Build a batch of RGBA frames, narrowing each to `channels`.
    ///
    /// Used to return rendered frames in the caller's original format.
    pub fn from_rgba_frames(
        frames: &[RgbaImage],
        height: u32,
        width: u32,
        channels: usize,
    ) -> Result<Self, BatchError> {
        check_channels(channels)?;
        let mut data = Vec::with_capacity(frames.len() * height as usize * width as usize * channels);
        for frame in frames {
            if frame.dimensions() != (width, height) {
                return Err(BatchError::ShapeMismatch {
                    expected: (height, width),
                    actual: (frame.height(), frame.width()),
                });
            }
            for px in frame.pixels() {
                push_pixel(&mut data, px.0.map(u8_to_sample), channels);
            }
        }
        Self::from_samples(frames.len(), height, width, channels, data)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of samples in one frame.
    pub fn frame_len(&self) -> usize {
        self.height as usize * self.width as usize * self.channels
    }

    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Samples of frame `index`.
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        if index >= self.len {
            return None;
        }
        let n = self.frame_len();
        Some(&self.data[index * n..(index + 1) * n])
    }

    /// Iterate over the frames in order.
    pub fn frames(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.len).filter_map(move |i| self.frame(i))
    }

    /// Sample at (`index`, `y`, `x`, `c`).
    pub fn sample(&self, index: usize, y: u32, x: u32, c: usize) -> Option<f32> {
        if y >= self.height || x >= self.width || c >= self.channels {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * self.channels + c;
        self.frame(index).map(|f| f[offset])
    }

    /// Append the frames of `other`, which must share this batch's shape.
    pub fn extend_from(&mut self, other: &ImageBatch) -> Result<(), BatchError> {
        if (other.height, other.width) != (self.height, self.width) {
            return Err(BatchError::ShapeMismatch {
                expected: (self.height, self.width),
                actual: (other.height, other.width),
            });
        }
        if other.channels != self.channels {
            return Err(BatchError::UnsupportedChannels(other.channels));
        }
        self.data.extend_from_slice(&other.data);
        self.len += other.len;
        Ok(())
    }

    /// Convert every frame to `channels` channels.
    ///
    /// Grey is replicated into RGB, alpha is dropped or added as opaque,
    /// and RGB collapses to grey with Rec. 601 luma weights.
    pub fn with_channels(&self, channels: usize) -> Self {
        let channels = channels.clamp(1, 4);
        if channels == self.channels {
            return self.clone();
        }
        let pixels = self.len * self.height as usize * self.width as usize;
        let mut data = Vec::with_capacity(pixels * channels);
        for px in self.data.chunks_exact(self.channels) {
            push_pixel(&mut data, expand_pixel(px), channels);
        }
        Self {
            len: self.len,
            height: self.height,
            width: self.width,
            channels,
            data,
        }
    }

    /// Convert frame `index` to an 8-bit RGBA image.
    pub fn to_rgba8(&self, index: usize) -> Result<RgbaImage, BatchError> {
        let frame = self.frame(index).ok_or(BatchError::IndexOutOfRange {
            index,
            len: self.len,
        })?;
        Ok(self.frame_to_rgba(frame))
    }

    /// Iterate over the frames as 8-bit RGBA images.
    pub fn rgba_frames(&self) -> impl Iterator<Item = RgbaImage> + '_ {
        self.frames().map(|frame| self.frame_to_rgba(frame))
    }

    fn frame_to_rgba(&self, frame: &[f32]) -> RgbaImage {
        let (w, c) = (self.width as usize, self.channels);
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let i = (y as usize * w + x as usize) * c;
            Rgba(expand_pixel(&frame[i..i + c]).map(sample_to_u8))
        })
    }

    /// Convert frame `index` to a `DynamicImage` matching the channel count.
    pub fn to_dynamic(&self, index: usize) -> Result<DynamicImage, BatchError> {
        let frame = self.frame(index).ok_or(BatchError::IndexOutOfRange {
            index,
            len: self.len,
        })?;
        let raw: Vec<u8> = frame.iter().copied().map(sample_to_u8).collect();
        let size_err = BatchError::SampleCount {
            expected: self.frame_len(),
            actual: frame.len(),
        };
        let (w, h) = (self.width, self.height);
        let img = match self.channels {
            1 => GrayImage::from_raw(w, h, raw).map(DynamicImage::ImageLuma8),
            2 => GrayAlphaImage::from_raw(w, h, raw).map(DynamicImage::ImageLumaA8),
            3 => RgbImage::from_raw(w, h, raw).map(DynamicImage::ImageRgb8),
            _ => RgbaImage::from_raw(w, h, raw).map(DynamicImage::ImageRgba8),
        };
        img.ok_or(size_err)
    }
}

fn luma(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Widen a 1–4 channel pixel to RGBA.
fn expand_pixel(px: &[f32]) -> [f32; 4] {
    match *px {
        [v] => [v, v, v, 1.0],
        [v, a] => [v, v, v, a],
        [r, g, b] => [r, g, b, 1.0],
        [r, g, b, a, ..] => [r, g, b, a],
        [] => [0.0, 0.0, 0.0, 1.0],
    }
}

/// Narrow an RGBA pixel to `channels` samples.
fn push_pixel(data: &mut Vec<f32>, [r, g, b, a]: [f32; 4], channels: usize) {
    match channels {
        1 => data.push(luma(r, g, b)),
        2 => data.extend([luma(r, g, b), a]),
        3 => data.extend([r, g, b]),
        _ => data.extend([r, g, b, a]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_batch(len: usize, height: u32, width: u32, channels: usize) -> ImageBatch {
        let n = len * height as usize * width as usize * channels;
        let data = (0..n).map(|i| (i % 256) as f32 / 255.0).collect();
        ImageBatch::from_samples(len, height, width, channels, data).unwrap()
    }

    #[test]
    fn sample_conversion_rounds_and_clamps() {
        assert_eq!(sample_to_u8(0.0), 0);
        assert_eq!(sample_to_u8(1.0), 255);
        assert_eq!(sample_to_u8(0.5), 128);
        assert_eq!(sample_to_u8(-0.3), 0);
        assert_eq!(sample_to_u8(7.0), 255);
        for v in [0u8, 1, 77, 128, 254, 255] {
            assert_eq!(sample_to_u8(u8_to_sample(v)), v);
        }
    }

    #[test]
    fn from_samples_rejects_wrong_length() {
        let err = ImageBatch::from_samples(1, 2, 2, 3, vec![0.0; 11]).unwrap_err();
        assert!(matches!(
            err,
            BatchError::SampleCount {
                expected: 12,
                actual: 11
            }
        ));
    }

    #[test]
    fn from_samples_rejects_unsupported_channels() {
        let err = ImageBatch::from_samples(1, 1, 1, 5, vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, BatchError::UnsupportedChannels(5)));
    }

    #[test]
    fn frame_slices_are_contiguous() {
        let batch = gradient_batch(3, 2, 2, 3);
        assert_eq!(batch.frame_len(), 12);
        assert_eq!(batch.frame(1).unwrap()[0], batch.samples()[12]);
        assert!(batch.frame(3).is_none());
        assert_eq!(batch.frames().count(), 3);
    }

    #[test]
    fn extend_from_requires_same_shape() {
        let mut a = ImageBatch::zeros(1, 4, 4, 3);
        let b = ImageBatch::zeros(2, 4, 4, 3);
        a.extend_from(&b).unwrap();
        assert_eq!(a.len(), 3);

        let c = ImageBatch::zeros(1, 5, 4, 3);
        assert!(a.extend_from(&c).is_err());
    }

    #[test]
    fn rgba_round_trip_keeps_pixels() {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(0, 0, Rgba([10, 20, 30, 255]));
        img.put_pixel(2, 1, Rgba([200, 100, 50, 255]));
        let batch =
            ImageBatch::from_images(&[DynamicImage::ImageRgba8(img.clone())]).unwrap();
        assert_eq!(batch.channels(), 4);
        assert_eq!(batch.to_rgba8(0).unwrap(), img);
    }

    #[test]
    fn grey_frames_widen_to_rgba() {
        let batch = ImageBatch::from_samples(1, 1, 2, 1, vec![0.0, 1.0]).unwrap();
        let rgba = batch.to_rgba8(0).unwrap();
        assert_eq!(rgba.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(rgba.get_pixel(1, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn with_channels_replicates_grey_into_rgb() {
        let batch = ImageBatch::from_samples(1, 1, 1, 1, vec![0.25]).unwrap();
        let rgb = batch.with_channels(3);
        assert_eq!(rgb.channels(), 3);
        assert_eq!(rgb.samples(), &[0.25, 0.25, 0.25]);

        let rgba = rgb.with_channels(4);
        assert_eq!(rgba.samples(), &[0.25, 0.25, 0.25, 1.0]);
    }

    #[test]
    fn from_images_rejects_mixed_sizes() {
        let a = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let b = DynamicImage::ImageRgb8(RgbImage::new(4, 5));
        let err = ImageBatch::from_images(&[a, b]).unwrap_err();
        assert!(matches!(err, BatchError::ShapeMismatch { .. }));
    }

    #[test]
    fn to_dynamic_matches_channel_count() {
        let batch = gradient_batch(1, 2, 3, 3);
        let img = batch.to_dynamic(0).unwrap();
        assert_eq!(img.color(), image::ColorType::Rgb8);
        assert_eq!((img.width(), img.height()), (3, 2));
    }
}
