//! Reading image batches from disk and writing results.

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::{DynamicImage, ImageFormat};
use image_processor::ImageBatch;

/// Image files in `dir`, sorted by file name.
fn image_files_in(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && ImageFormat::from_path(path).is_ok())
        .collect();
    files.sort();
    Ok(files)
}

/// Expand `path` into image files: itself, or the images inside a directory.
fn expand(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_dir() {
        image_files_in(path)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

fn open(path: &Path) -> anyhow::Result<DynamicImage> {
    image::open(path).with_context(|| format!("failed to decode image {}", path.display()))
}

/// Load one batch from a file or a directory of same-sized images.
pub fn load_batch(path: &Path) -> anyhow::Result<ImageBatch> {
    load_frames(std::slice::from_ref(&path.to_path_buf()))
}

/// Load every image behind `paths` (files or directories) as one batch.
pub fn load_frames(paths: &[PathBuf]) -> anyhow::Result<ImageBatch> {
    let mut images = Vec::new();
    for path in paths {
        for file in expand(path)? {
            images.push(open(&file)?);
        }
    }
    tracing::debug!(frames = images.len(), "Loaded images");
    ImageBatch::from_images(&images)
        .with_context(|| format!("images in {paths:?} do not form a batch"))
}

/// Write `batch` to `output`.
///
/// A single frame goes to `output` itself; several frames go into `output`
/// as a directory, named `label_0000.png`, `label_0001.png`, ...
pub fn save_batch(batch: &ImageBatch, output: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let targets: Vec<PathBuf> = if batch.len() == 1 {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        vec![output.to_path_buf()]
    } else {
        std::fs::create_dir_all(output)
            .with_context(|| format!("failed to create {}", output.display()))?;
        (0..batch.len())
            .map(|i| output.join(format!("label_{i:04}.png")))
            .collect()
    };

    for (i, target) in targets.iter().enumerate() {
        let img = batch.to_dynamic(i)?;
        img.save_with_format(target, ImageFormat::Png)
            .with_context(|| format!("failed to write {}", target.display()))?;
        tracing::info!(path = %target.display(), "Wrote image");
    }
    Ok(targets)
}
