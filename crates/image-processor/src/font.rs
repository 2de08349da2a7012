//! Font resolution: map a family name and size to a loadable font.
//!
//! Candidates are tried strictly in order (bundled files, well-known system
//! paths, then user font directories). The first file that parses wins. If
//! none do, the built-in 8×8 bitmap font is used, so resolution never fails.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Pixel size of the built-in bitmap font. It does not scale.
pub const BUILTIN_GLYPH_SIZE: u32 = 8;

/// Default local fonts directory, relative to the working directory.
pub const DEFAULT_FONTS_DIR: &str = "fonts";

/// Monospace file looked up in user font directories for every family.
pub const USER_FALLBACK_FILE: &str = "DejaVuSansMono.ttf";

/// Named font styles offered to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    #[serde(rename = "Arial")]
    Arial,
    #[serde(rename = "Arial Bold")]
    ArialBold,
    #[serde(rename = "Monospace")]
    Monospace,
    #[serde(rename = "Funnel Sans")]
    FunnelSans,
    #[serde(rename = "Funnel Sans Bold")]
    FunnelSansBold,
    #[serde(rename = "Google Sans Code")]
    GoogleSansCode,
    #[default]
    #[serde(rename = "Google Sans Code Bold")]
    GoogleSansCodeBold,
}

impl FontFamily {
    pub const ALL: [FontFamily; 7] = [
        Self::Arial,
        Self::ArialBold,
        Self::Monospace,
        Self::FunnelSans,
        Self::FunnelSansBold,
        Self::GoogleSansCode,
        Self::GoogleSansCodeBold,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arial => "Arial",
            Self::ArialBold => "Arial Bold",
            Self::Monospace => "Monospace",
            Self::FunnelSans => "Funnel Sans",
            Self::FunnelSansBold => "Funnel Sans Bold",
            Self::GoogleSansCode => "Google Sans Code",
            Self::GoogleSansCodeBold => "Google Sans Code Bold",
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown font family '{s}'"))
    }
}

/// Family → candidate tables, injected into [`FontResolver`].
#[derive(Debug, Clone)]
pub struct FontCatalog {
    /// Bundled filenames per family, canonical first.
    pub bundled: HashMap<String, Vec<String>>,
    /// Absolute system font paths per family.
    pub system: HashMap<String, Vec<PathBuf>>,
    /// File looked up in user font directories.
    pub user_fallback: String,
}

const BUNDLED_FONTS: &[(&str, &[&str])] = &[
    (
        "Funnel Sans",
        &["Funnel_Sans/static/FunnelSans-Regular.ttf", "FunnelSans-Regular.ttf"],
    ),
    (
        "Funnel Sans Bold",
        &["Funnel_Sans/static/FunnelSans-Bold.ttf", "FunnelSans-Bold.ttf"],
    ),
    (
        "Google Sans Code",
        &[
            "Google_Sans_Code/static/GoogleSansCode-Regular.ttf",
            "GoogleSansCode-Regular.ttf",
        ],
    ),
    (
        "Google Sans Code Bold",
        &[
            "Google_Sans_Code/static/GoogleSansCode-Bold.ttf",
            "GoogleSansCode-Bold.ttf",
        ],
    ),
    ("Arial", &["arial.ttf", "Arial.ttf"]),
    ("Arial Bold", &["arialbd.ttf", "Arialbd.ttf", "Arial Bold.ttf"]),
    ("Monospace", &["consola.ttf", "Consola.ttf", "DejaVuSansMono.ttf"]),
];

const SYSTEM_FONTS: &[(&str, &[&str])] = &[
    (
        "Arial",
        &[
            "C:\\Windows\\Fonts\\arial.ttf",
            "/Library/Fonts/Arial.ttf",
            "/usr/share/fonts/truetype/msttcorefonts/Arial.ttf",
        ],
    ),
    (
        "Arial Bold",
        &[
            "C:\\Windows\\Fonts\\arialbd.ttf",
            "/Library/Fonts/Arial Bold.ttf",
            "/usr/share/fonts/truetype/msttcorefonts/Arial_Bold.ttf",
        ],
    ),
    (
        "Monospace",
        &[
            "C:\\Windows\\Fonts\\consola.ttf",
            "/Library/Fonts/Menlo.ttc",
            "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
        ],
    ),
];

impl Default for FontCatalog {
    fn default() -> Self {
        Self {
            bundled: BUNDLED_FONTS
                .iter()
                .map(|(family, files)| {
                    (family.to_string(), files.iter().map(|f| f.to_string()).collect())
                })
                .collect(),
            system: SYSTEM_FONTS
                .iter()
                .map(|(family, paths)| {
                    (family.to_string(), paths.iter().map(PathBuf::from).collect())
                })
                .collect(),
            user_fallback: USER_FALLBACK_FILE.to_string(),
        }
    }
}

/// A font ready for measuring and drawing.
pub enum ResolvedFont {
    /// A TrueType/OpenType font scaled to the requested size.
    Outline {
        font: FontVec,
        scale: PxScale,
        size: u32,
        source: PathBuf,
    },
    /// Built-in fixed-size bitmap font.
    Builtin,
}

impl fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outline { size, source, .. } => f
                .debug_struct("Outline")
                .field("size", size)
                .field("source", source)
                .finish(),
            Self::Builtin => f.write_str("Builtin"),
        }
    }
}

impl ResolvedFont {
    /// Parse `data` as a font at `size` pixels per em.
    pub fn from_bytes(data: Vec<u8>, size: u32, source: PathBuf) -> Option<Self> {
        let font = FontVec::try_from_vec(data).ok()?;
        let size = size.max(1);
        let scale = font
            .pt_to_px_scale(size as f32)
            .unwrap_or_else(|| PxScale::from(size as f32));
        Some(Self::Outline {
            font,
            scale,
            size,
            source,
        })
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin)
    }

    /// Requested size in pixels (fixed for the built-in font).
    pub fn nominal_size(&self) -> u32 {
        match self {
            Self::Outline { size, .. } => *size,
            Self::Builtin => BUILTIN_GLYPH_SIZE,
        }
    }

    /// File the font was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        match self {
            Self::Outline { source, .. } => Some(source),
            Self::Builtin => None,
        }
    }
}

/// Resolves font requests against a [`FontCatalog`].
#[derive(Debug, Clone)]
pub struct FontResolver {
    catalog: FontCatalog,
    fonts_dir: PathBuf,
    user_dirs: Vec<PathBuf>,
}

impl Default for FontResolver {
    fn default() -> Self {
        Self::new(FontCatalog::default(), DEFAULT_FONTS_DIR)
    }
}

impl FontResolver {
    /// Create a resolver using `fonts_dir` for bundled files.
    ///
    /// On Unix-like systems other than macOS, `~/.fonts` and
    /// `~/.local/share/fonts` are searched last.
    pub fn new(catalog: FontCatalog, fonts_dir: impl Into<PathBuf>) -> Self {
        let user_dirs = if cfg!(all(unix, not(target_os = "macos"))) {
            dirs::home_dir()
                .map(|home| vec![home.join(".fonts"), home.join(".local").join("share").join("fonts")])
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        Self {
            catalog,
            fonts_dir: fonts_dir.into(),
            user_dirs,
        }
    }

    /// Replace the user font directories searched last.
    pub fn with_user_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.user_dirs = dirs;
        self
    }

    pub fn fonts_dir(&self) -> &Path {
        &self.fonts_dir
    }

    /// Ordered candidate paths for `family`.
    pub fn candidates(&self, family: &str) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(files) = self.catalog.bundled.get(family) {
            for file in files {
                paths.push(PathBuf::from(file));
                paths.push(self.fonts_dir.join(file));
            }
        }
        if let Some(system) = self.catalog.system.get(family) {
            paths.extend(system.iter().cloned());
        }
        paths.extend(
            self.user_dirs
                .iter()
                .map(|dir| dir.join(&self.catalog.user_fallback)),
        );

        paths
    }

    /// Load the first usable candidate for `family` at `size`.
    ///
    /// Falls back to [`ResolvedFont::Builtin`] when every candidate is
    /// missing, unreadable or not a font.
    pub fn resolve(&self, family: &str, size: u32) -> ResolvedFont {
        let found = self
            .candidates(family)
            .into_iter()
            .find_map(|path| load_candidate(&path, size));

        match found {
            Some(font) => {
                info!(family, size, path = ?font.source(), "Font resolved");
                font
            }
            None => {
                warn!(family, size, "No usable font file found, using built-in bitmap font");
                ResolvedFont::Builtin
            }
        }
    }
}

fn load_candidate(path: &Path, size: u32) -> Option<ResolvedFont> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            debug!(path = %path.display(), "Font candidate unreadable: {e}");
            return None;
        }
    };
    let font = ResolvedFont::from_bytes(data, size, path.to_path_buf());
    if font.is_none() {
        debug!(path = %path.display(), "Font candidate is not a valid TTF/OTF file");
    }
    font
}
