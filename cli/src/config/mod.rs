//! Configuration: environment overrides, label presets and range validation.

pub mod defaults;
pub mod validation;

use std::path::{Path, PathBuf};

use anyhow::Context;
use image_processor::font::DEFAULT_FONTS_DIR;
use image_processor::{FontCatalog, FontFamily, FontRequest, FontResolver, LabelStyle};
use serde::{Deserialize, Serialize};

pub use validation::{validate_grid, validate_label, validate_param};

/// Runtime configuration populated from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fonts_dir: PathBuf,
    pub default_font: FontFamily,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fonts_dir: PathBuf::from(DEFAULT_FONTS_DIR),
            default_font: FontFamily::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, ignoring empty or unknown values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("GRIDLABEL_FONTS_DIR").filter(|v| !v.is_empty()) {
            config.fonts_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup("GRIDLABEL_DEFAULT_FONT").filter(|v| !v.is_empty()) {
            match name.parse::<FontFamily>() {
                Ok(family) => config.default_font = family,
                Err(e) => tracing::warn!("Ignoring GRIDLABEL_DEFAULT_FONT: {e}"),
            }
        }

        config
    }

    pub fn font_resolver(&self) -> FontResolver {
        FontResolver::new(FontCatalog::default(), &self.fonts_dir)
    }
}

/// Label preset file contents: font plus style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelPreset {
    pub font: Option<FontRequest>,
    #[serde(flatten)]
    pub style: LabelStyle,
}

impl LabelPreset {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read style preset {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid style preset {}", path.display()))
    }
}

/// Load .env from multiple candidate paths.
pub fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::debug!("No .env file found, using system environment variables");
}
