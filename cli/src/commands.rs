//! Subcommand handlers.

use std::path::PathBuf;

use anyhow::{Context, bail};
use image_processor::{FontRequest, GridSpec, LabelRenderer, LabelStyle, compose_grid};
use tracing::{info, warn};

use crate::cli::{GridArgs, LabelArgs};
use crate::config::{AppConfig, LabelPreset, validate_grid, validate_label};
use crate::io::{load_batch, load_frames, save_batch};

pub fn run_grid(args: &GridArgs) -> anyhow::Result<Vec<PathBuf>> {
    let spec = GridSpec {
        columns: args.columns,
        padding: args.padding,
    };
    validate_grid(&spec).map_err(anyhow::Error::msg)?;

    let batches = args
        .inputs
        .iter()
        .map(|path| load_batch(path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    info!(batches = batches.len(), "Loaded grid inputs");

    let grid = compose_grid(batches.iter().map(Some), spec);
    save_batch(&grid, &args.output)
}

/// Merge the preset file (if any), then command-line overrides, onto defaults.
pub fn label_settings(args: &LabelArgs, config: &AppConfig) -> anyhow::Result<(LabelStyle, FontRequest)> {
    let preset = match &args.style {
        Some(path) => LabelPreset::from_file(path)?,
        None => LabelPreset::default(),
    };
    let mut style = preset.style;
    let mut font = preset.font.unwrap_or(FontRequest {
        family: config.default_font,
        ..FontRequest::default()
    });

    if let Some(text) = &args.text {
        style.text = text.replace("\\n", "\n");
    }
    if let Some(family) = args.font {
        font.family = family;
    }
    if let Some(size) = args.font_size {
        font.size = size;
    }
    if let Some(align) = args.align {
        style.alignment = align;
    }
    if let Some(anchor) = args.placement {
        style.anchor = anchor;
    }
    if let Some(offset) = args.edge_offset {
        style.edge_offset = offset;
    }
    if let Some(scheme) = args.color_scheme {
        style.color_scheme = scheme;
    }
    if let Some(padding) = args.padding {
        style.padding = padding;
    }
    if let Some(radius) = args.corner_radius {
        style.corner_radius = radius;
    }
    if let Some(stroke) = args.stroke_width {
        style.stroke_width = stroke;
    }
    if let Some(opacity) = args.background_opacity {
        style.background_opacity = opacity;
    }

    validate_label(&style, &font).map_err(anyhow::Error::msg)?;
    Ok((style, font))
}

pub fn run_label(args: &LabelArgs, config: &AppConfig) -> anyhow::Result<Vec<PathBuf>> {
    let (style, font) = label_settings(args, config)?;

    let batch = load_frames(&args.inputs)?;
    if batch.is_empty() {
        bail!("no images found in {:?}", args.inputs);
    }

    let renderer = LabelRenderer::resolve(&config.font_resolver(), &font, style);
    info!(
        frames = batch.len(),
        font = %font.family,
        builtin = renderer.font().is_builtin(),
        "Labelling images"
    );
    if renderer.font().is_builtin() {
        warn!(
            fonts_dir = %config.fonts_dir.display(),
            "No usable font for {}; using the built-in 8x8 bitmap font. \
             Put font files in GRIDLABEL_FONTS_DIR for sized text",
            font.family
        );
    }

    let labelled = renderer.render(&batch);
    save_batch(&labelled, &args.output).context("failed to save labelled images")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use image::{Rgb, RgbImage};
    use image_processor::{Anchor, ColorScheme, FontFamily};

    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn write_png(path: &Path, width: u32, height: u32, value: u8) {
        RgbImage::from_pixel(width, height, Rgb([value, value, value]))
            .save(path)
            .unwrap();
    }

    fn label_args(argv: &[&str]) -> LabelArgs {
        let mut full = vec!["gridlabel", "label"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Label(args) => args,
            Command::Grid(_) => panic!("expected label command"),
        }
    }

    fn missing_fonts_config(dir: &Path) -> AppConfig {
        AppConfig {
            fonts_dir: dir.join("no-fonts"),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_grid_two_by_two() {
        let dir = tempfile::tempdir().unwrap();
        let inputs: Vec<PathBuf> = (0..4)
            .map(|i| {
                let path = dir.path().join(format!("{i}.png"));
                write_png(&path, 10, 8, 255);
                path
            })
            .collect();
        let output = dir.path().join("grid.png");
        let args = GridArgs {
            columns: 2,
            padding: 2,
            output: output.clone(),
            inputs,
        };

        assert_eq!(run_grid(&args).unwrap(), vec![output.clone()]);
        let grid = image::open(&output).unwrap().to_rgb8();
        assert_eq!(grid.dimensions(), (22, 18));
        assert_eq!(grid.get_pixel(0, 0).0, [255, 255, 255]);
        // Padding column between the first two cells.
        assert_eq!(grid.get_pixel(10, 0).0, [0, 0, 0]);
        assert_eq!(grid.get_pixel(12, 10).0, [255, 255, 255]);
    }

    #[test]
    fn test_grid_without_inputs_writes_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("empty.png");
        let args = GridArgs {
            columns: 0,
            padding: 2,
            output: output.clone(),
            inputs: Vec::new(),
        };

        run_grid(&args).unwrap();
        let img = image::open(&output).unwrap();
        assert_eq!((img.width(), img.height()), (512, 512));
    }

    #[test]
    fn test_grid_rejects_out_of_range_padding() {
        let dir = tempfile::tempdir().unwrap();
        let args = GridArgs {
            columns: 2,
            padding: 10_000,
            output: dir.path().join("grid.png"),
            inputs: Vec::new(),
        };
        assert!(run_grid(&args).is_err());
    }

    #[test]
    fn test_settings_layering() {
        let dir = tempfile::tempdir().unwrap();
        let preset = dir.path().join("preset.json");
        std::fs::write(
            &preset,
            r#"{"font": {"family": "Arial Bold", "size": 40}, "text": "from preset", "placement": "bottom_left", "padding": 4}"#,
        )
        .unwrap();
        let preset_arg = preset.to_string_lossy().into_owned();

        let args = label_args(&[
            "--style",
            &preset_arg,
            "--text",
            "line one\\nline two",
            "--color-scheme",
            "black_on_white",
            "-o",
            "out.png",
            "in.png",
        ]);
        let (style, font) = label_settings(&args, &AppConfig::default()).unwrap();

        assert_eq!(style.text, "line one\nline two");
        assert_eq!(style.anchor, Anchor::BottomLeft);
        assert_eq!(style.padding, 4);
        assert_eq!(style.color_scheme, ColorScheme::BlackOnWhite);
        assert_eq!((font.family, font.size), (FontFamily::ArialBold, 40));
    }

    #[test]
    fn test_settings_use_configured_default_font() {
        let args = label_args(&["-o", "out.png", "in.png"]);
        let config = AppConfig {
            default_font: FontFamily::Monospace,
            ..AppConfig::default()
        };
        let (style, font) = label_settings(&args, &config).unwrap();
        assert_eq!(font.family, FontFamily::Monospace);
        assert_eq!(font.size, 30);
        assert_eq!(style, LabelStyle::default());
    }

    #[test]
    fn test_settings_reject_out_of_range_font_size() {
        let args = label_args(&["--font-size", "1000", "-o", "out.png", "in.png"]);
        assert!(label_settings(&args, &AppConfig::default()).is_err());
    }

    #[test]
    fn test_label_writes_one_file_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let frames = dir.path().join("frames");
        std::fs::create_dir(&frames).unwrap();
        for i in 0..3 {
            write_png(&frames.join(format!("f{i}.png")), 200, 120, 0);
        }
        let out = dir.path().join("out");
        let frames_arg = frames.to_string_lossy().into_owned();
        let out_arg = out.to_string_lossy().into_owned();

        let args = label_args(&[
            "--text",
            "Hi",
            "--color-scheme",
            "black_on_white",
            "--background-opacity",
            "255",
            "--edge-offset",
            "2",
            "-o",
            &out_arg,
            &frames_arg,
        ]);
        let written = run_label(&args, &missing_fonts_config(dir.path())).unwrap();

        assert_eq!(written.len(), 3);
        for path in &written {
            let img = image::open(path).unwrap().to_rgb8();
            assert_eq!(img.dimensions(), (200, 120));
            // Left padding strip of the opaque white box at the top-left.
            assert_eq!(img.get_pixel(8, 24).0, [255, 255, 255]);
            assert_eq!(img.get_pixel(199, 119).0, [0, 0, 0]);
        }
    }

    #[test]
    fn test_label_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty");
        std::fs::create_dir(&empty).unwrap();
        let empty_arg = empty.to_string_lossy().into_owned();
        let out_arg = dir.path().join("out.png").to_string_lossy().into_owned();

        let args = label_args(&["-o", &out_arg, &empty_arg]);
        assert!(run_label(&args, &missing_fonts_config(dir.path())).is_err());
    }
}
