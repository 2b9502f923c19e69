//! stripesvg: convert a raster image into halftone stripe line art.
//!
//! Reads an image file, samples it in square blocks, draws darker blocks
//! with more parallel strokes, merges neighbouring strokes, and writes
//! the result as SVG. Optionally renders a PNG preview and prints
//! per-stage diagnostics.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin stripesvg -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! SVG goes to stdout unless `--output` is given; logs and diagnostics go
//! to stderr. `RUST_LOG` controls log verbosity.

#![allow(clippy::print_stderr)]

mod logger;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use stripesvg_export::{ExportError, StrokeElement, SvgMetadata, SvgStyle};
use stripesvg_pipeline::{
    AspectPolicy, ColorMode, Direction, ProcessOptions, StripeConfig, StripeError, TargetSize,
};

/// Convert a raster image into halftone stripe SVG line art.
///
/// Darker areas receive more parallel strokes; adjacent strokes on the
/// same row (or column) are merged into longer runs.
#[derive(Parser)]
#[command(name = "stripesvg", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Write SVG output to file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Edge length of a sampling block in pixels.
    #[arg(long, default_value_t = StripeConfig::DEFAULT_BLOCK_SIZE, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    block_size: u32,

    /// Strokes drawn in a fully black block.
    #[arg(long, default_value_t = StripeConfig::DEFAULT_MAX_LINES, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    max_lines: u32,

    /// Distance in pixels between strokes inside a block.
    #[arg(long, default_value_t = StripeConfig::DEFAULT_LINE_SPACING, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    line_spacing: u32,

    /// Largest gap in pixels bridged when merging strokes.
    #[arg(long, default_value_t = StripeConfig::DEFAULT_MERGE_THRESHOLD)]
    merge_threshold: u32,

    /// Stroke orientation.
    #[arg(long, value_enum, default_value_t = Stripes::Horizontal)]
    direction: Stripes,

    /// Draw strokes in each block's average colour instead of black.
    #[arg(long)]
    color: bool,

    /// Emit all strokes as a single compound path (monochrome only).
    #[arg(long)]
    combine: bool,

    /// Fixed pixel width/height on the SVG root instead of a responsive
    /// canvas.
    #[arg(long)]
    absolute_size: bool,

    /// Resize the image to this width before converting.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    width: Option<u32>,

    /// Resize the image to this height before converting.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    height: Option<u32>,

    /// How `--width`/`--height` respect the source aspect ratio.
    ///
    /// Defaults to fit-width when `--width` is given, otherwise
    /// fit-height.
    #[arg(long, value_enum)]
    aspect: Option<Aspect>,

    /// SVG stroke width in user units.
    #[arg(long, default_value_t = SvgStyle::DEFAULT_STROKE_WIDTH)]
    stroke_width: f64,

    /// Write each stroke as a `<line>` element instead of `<path>`.
    #[arg(long)]
    line_elements: bool,

    /// Also render a PNG preview to this path.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Full stripe config as a JSON string.
    ///
    /// When provided, the individual conversion flags (block size, max
    /// lines, line spacing, merge threshold, direction, colour, combine,
    /// absolute size) are ignored. Missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Print per-stage diagnostics as JSON to stderr.
    #[arg(long)]
    diagnostics: bool,

    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(short, long)]
    verbose: bool,
}

/// Stroke orientation selection.
#[derive(Clone, Copy, ValueEnum)]
enum Stripes {
    /// Strokes run along rows.
    Horizontal,
    /// Strokes run along columns.
    Vertical,
}

/// Aspect policy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Aspect {
    /// Use width and height exactly as given.
    Free,
    /// Keep the width, derive the height.
    FitWidth,
    /// Keep the height, derive the width.
    FitHeight,
}

/// Errors surfaced to the user before exiting with failure.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid --config-json: {0}")]
    ConfigJson(#[source] serde_json::Error),

    #[error("{0}")]
    Usage(&'static str),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write to stdout: {0}")]
    Stdout(#[source] std::io::Error),

    #[error(transparent)]
    Convert(#[from] StripeError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("cannot serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Build a [`StripeConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual conversion flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<StripeConfig, CliError> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(CliError::ConfigJson);
    }

    Ok(StripeConfig {
        block_size: cli.block_size,
        max_lines: cli.max_lines,
        line_spacing: cli.line_spacing,
        merge_threshold: cli.merge_threshold,
        direction: match cli.direction {
            Stripes::Horizontal => Direction::Horizontal,
            Stripes::Vertical => Direction::Vertical,
        },
        color_mode: if cli.color {
            ColorMode::Color
        } else {
            ColorMode::Monochrome
        },
        combine_into_single_path: cli.combine,
        absolute_size: cli.absolute_size,
    })
}

/// Build the optional resize target from `--width`, `--height`, and
/// `--aspect`. The dimension a fit policy derives may be omitted.
fn target_from_cli(cli: &Cli) -> Result<Option<TargetSize>, CliError> {
    let aspect = match (cli.aspect, cli.width, cli.height) {
        (None, None, None) => return Ok(None),
        (Some(Aspect::Free), _, _) => AspectPolicy::Free,
        (Some(Aspect::FitWidth), _, _) | (None, Some(_), _) => AspectPolicy::FitWidth,
        (Some(Aspect::FitHeight), _, _) | (None, None, Some(_)) => AspectPolicy::FitHeight,
    };

    let (width, height) = match aspect {
        AspectPolicy::Free => match (cli.width, cli.height) {
            (Some(width), Some(height)) => (width, height),
            _ => {
                return Err(CliError::Usage(
                    "--aspect free needs both --width and --height",
                ));
            }
        },
        AspectPolicy::FitWidth => (
            cli.width
                .ok_or(CliError::Usage("--aspect fit-width needs --width"))?,
            cli.height.unwrap_or(0),
        ),
        AspectPolicy::FitHeight => (
            cli.width.unwrap_or(0),
            cli.height
                .ok_or(CliError::Usage("--aspect fit-height needs --height"))?,
        ),
    };

    Ok(Some(TargetSize {
        width,
        height,
        aspect,
    }))
}

fn style_from_cli(cli: &Cli) -> Result<SvgStyle, CliError> {
    if !cli.stroke_width.is_finite() || cli.stroke_width <= 0.0 {
        return Err(CliError::Usage("--stroke-width must be a positive number"));
    }
    Ok(SvgStyle {
        stroke_width: cli.stroke_width,
        element: if cli.line_elements {
            StrokeElement::Line
        } else {
            StrokeElement::Path
        },
    })
}

/// One-line human-readable summary of the settings, for `<desc>`.
fn describe(config: &StripeConfig) -> String {
    format!(
        "block size {}, max lines {}, line spacing {}, merge threshold {}, {} stripes, {}",
        config.block_size,
        config.max_lines,
        config.line_spacing,
        config.merge_threshold,
        config.direction.to_string().to_lowercase(),
        match config.color_mode {
            ColorMode::Monochrome => "monochrome",
            ColorMode::Color => "colour",
        },
    )
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let options = ProcessOptions {
        config: config_from_cli(cli)?,
        target: target_from_cli(cli)?,
    };
    let style = style_from_cli(cli)?;

    let image_bytes = std::fs::read(&cli.image_path).map_err(|source| CliError::Read {
        path: cli.image_path.clone(),
        source,
    })?;
    tracing::info!(
        image = %cli.image_path.display(),
        bytes = image_bytes.len(),
        "converting"
    );
    tracing::debug!(config = ?options.config, target = ?options.target, "options");

    let (document, diagnostics) =
        stripesvg_pipeline::process_with_diagnostics(&image_bytes, &options)?;
    tracing::info!(
        width = document.dimensions.width,
        height = document.dimensions.height,
        strokes = document.stroke_count(),
        paths = document.paths.len(),
        "converted"
    );

    if cli.diagnostics {
        eprintln!("{}", serde_json::to_string_pretty(&diagnostics)?);
    } else {
        tracing::debug!("\n{}", diagnostics.report());
    }

    let config_json = serde_json::to_string(&options.config)?;
    let description = describe(&options.config);
    let metadata = SvgMetadata {
        title: cli.image_path.file_stem().and_then(|s| s.to_str()),
        description: Some(&description),
        config_json: Some(&config_json),
    };
    let svg = stripesvg_export::to_svg(&document, &metadata, &style);

    match cli.output {
        Some(ref path) => {
            std::fs::write(path, &svg).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            tracing::info!(path = %path.display(), bytes = svg.len(), "SVG written");
        }
        None => {
            std::io::stdout()
                .lock()
                .write_all(svg.as_bytes())
                .map_err(CliError::Stdout)?;
        }
    }

    if let Some(ref path) = cli.preview {
        let png = stripesvg_export::to_png_preview(&document, &style)?;
        std::fs::write(path, &png).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = png.len(), "preview written");
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
