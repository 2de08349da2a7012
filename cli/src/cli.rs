//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use image_processor::{Anchor, ColorScheme, FontFamily, TextAlign};

#[derive(Debug, Parser)]
#[command(name = "gridlabel")]
#[command(about = "Compose image grids and draw text labels onto images")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Arrange image batches into one padded grid
    Grid(GridArgs),

    /// Draw a text label onto every image of a batch
    #[command(after_help = FONT_HELP)]
    Label(LabelArgs),
}

const FONT_HELP: &str = "\
Fonts are looked up in GRIDLABEL_FONTS_DIR (default ./fonts), then in the
system font directories, then as DejaVuSansMono.ttf in ~/.fonts and
~/.local/share/fonts. When none of them loads, labels fall back to a built-in
8x8 bitmap font that ignores --font-size.";

#[derive(Debug, Args)]
pub struct GridArgs {
    /// Number of columns (0 = roughly square)
    #[arg(short, long, default_value_t = 2)]
    pub columns: u32,

    /// Gap between images in pixels
    #[arg(short, long, default_value_t = 2)]
    pub padding: u32,

    /// Output PNG path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Batches: an image file, or a directory of same-sized images
    pub inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct LabelArgs {
    /// Label text (use \n for line breaks)
    #[arg(short, long)]
    pub text: Option<String>,

    /// JSON preset with font and style fields
    #[arg(long)]
    pub style: Option<PathBuf>,

    /// Font family, resolved from GRIDLABEL_FONTS_DIR and system fonts
    #[arg(long, value_parser = parse_font_family)]
    pub font: Option<FontFamily>,

    /// Font size in pixels (outline fonts only)
    #[arg(long)]
    pub font_size: Option<u32>,

    #[arg(long, value_parser = parse_align)]
    pub align: Option<TextAlign>,

    /// top_left, top_right, bottom_left, bottom_right or center
    #[arg(long, value_parser = parse_anchor)]
    pub placement: Option<Anchor>,

    #[arg(long)]
    pub edge_offset: Option<u32>,

    #[arg(long, value_parser = parse_scheme)]
    pub color_scheme: Option<ColorScheme>,

    #[arg(long)]
    pub padding: Option<u32>,

    #[arg(long)]
    pub corner_radius: Option<u32>,

    #[arg(long)]
    pub stroke_width: Option<u32>,

    #[arg(long)]
    pub background_opacity: Option<u8>,

    /// Output file (one image) or directory (several images)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Image files or directories forming one batch
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

fn parse_font_family(s: &str) -> Result<FontFamily, String> {
    s.parse()
}

fn parse_align(s: &str) -> Result<TextAlign, String> {
    s.parse()
}

fn parse_scheme(s: &str) -> Result<ColorScheme, String> {
    s.parse()
}

fn parse_anchor(s: &str) -> Result<Anchor, String> {
    Ok(Anchor::from_name(s))
}
