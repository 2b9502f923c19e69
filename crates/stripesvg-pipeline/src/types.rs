//! Shared types for the stripesvg conversion pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resize::TargetSize;

/// Re-export `GrayImage` so downstream crates can build pixel grids
/// without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can build colour pixel
/// grids without depending on `image` directly.
pub use image::RgbImage;

/// A point on the integer pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: u32,
    /// Vertical position (pixels from top edge).
    pub y: u32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Axis along which the drawn strokes run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Strokes run left to right; each stroke sits on a fixed row.
    #[default]
    Horizontal,
    /// Strokes run top to bottom; each stroke sits on a fixed column.
    Vertical,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => f.write_str("Horizontal"),
            Self::Vertical => f.write_str("Vertical"),
        }
    }
}

/// Whether strokes are drawn in black or in each block's average colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    /// Every stroke is black.
    #[default]
    Monochrome,
    /// Every stroke takes the average colour of the block it came from.
    Color,
}

/// Stroke colour of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrokeColor {
    /// The fixed monochrome stroke.
    Black,
    /// An RGB colour, rendered as `#rrggbb`.
    Rgb([u8; 3]),
}

impl fmt::Display for StrokeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => f.write_str("black"),
            Self::Rgb([r, g, b]) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

/// A decoded pixel grid, the input of [`crate::convert`].
///
/// Origin at top-left, row-major. The grid kind only decides how a block
/// mean is taken; the stroke colour follows [`ColorMode`]. An RGB grid in
/// monochrome still strokes black, and a gray grid in colour mode yields
/// gray stroke colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelGrid {
    /// Single-channel brightness values.
    Gray(GrayImage),
    /// Three-channel RGB values.
    Rgb(RgbImage),
}

impl PixelGrid {
    /// Grid dimensions in pixels.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        let (width, height) = match self {
            Self::Gray(img) => img.dimensions(),
            Self::Rgb(img) => img.dimensions(),
        };
        Dimensions { width, height }
    }
}

/// A rectangle of the pixel grid, clipped to the grid bounds.
///
/// Covers `[x, x + width) × [y, y + height)`. Blocks on the right and
/// bottom edges may be narrower than the configured block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width after clipping.
    pub width: u32,
    /// Height after clipping.
    pub height: u32,
}

impl Block {
    /// Number of pixels covered by the block.
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// The `[start, end)` span across the stripes: the axis stroke
    /// coordinates walk along.
    #[must_use]
    pub const fn span_across(&self, direction: Direction) -> (u32, u32) {
        match direction {
            Direction::Horizontal => (self.y, self.y + self.height),
            Direction::Vertical => (self.x, self.x + self.width),
        }
    }

    /// The `[start, end)` span along the stripes: the extent of each stroke.
    #[must_use]
    pub const fn span_along(&self, direction: Direction) -> (u32, u32) {
        match direction {
            Direction::Horizontal => (self.x, self.x + self.width),
            Direction::Vertical => (self.y, self.y + self.height),
        }
    }
}

/// Per-block sampling result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSample {
    /// The sampled block.
    pub block: Block,
    /// Number of strokes the block contributes, `0..=max_lines`.
    pub density: u32,
    /// Stroke colour for the block.
    pub color: StrokeColor,
}

/// A stroke on a fixed coordinate, before or after merging.
///
/// `coord` is a row for horizontal stripes and a column for vertical
/// stripes; `[start, end)` is the extent along the stripe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Fixed perpendicular position.
    pub coord: u32,
    /// Start of the extent (inclusive).
    pub start: u32,
    /// End of the extent (exclusive).
    pub end: u32,
    /// Stroke colour.
    pub color: StrokeColor,
}

impl Segment {
    /// Create a new segment.
    #[must_use]
    pub const fn new(coord: u32, start: u32, end: u32, color: StrokeColor) -> Self {
        Self {
            coord,
            start,
            end,
            color,
        }
    }
}

/// A straight stroke from one grid point to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawCommand {
    /// Move-to point.
    pub from: Point,
    /// Line-to point.
    pub to: Point,
}

/// A stroked path: one or more straight sub-paths sharing a colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokePath {
    /// Colour of every sub-path.
    pub color: StrokeColor,
    /// Sub-paths, in emission order.
    pub commands: Vec<DrawCommand>,
}

/// How the document root declares its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CanvasSizing {
    /// Scales to its container: `width="100%"`, `height="auto"`.
    #[default]
    Responsive,
    /// Literal pixel width and height, for a standalone file.
    Absolute,
}

/// The vector output of a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripeDocument {
    /// Canvas size in pixels (the source grid size).
    pub dimensions: Dimensions,
    /// How the canvas size is declared.
    pub sizing: CanvasSizing,
    /// Stroked paths in emission order.
    pub paths: Vec<StrokePath>,
}

impl StripeDocument {
    /// Returns `true` if the document draws nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(|p| p.commands.is_empty())
    }

    /// Iterate over every draw command with its colour.
    pub fn commands(&self) -> impl Iterator<Item = (StrokeColor, &DrawCommand)> {
        self.paths
            .iter()
            .flat_map(|p| p.commands.iter().map(move |c| (p.color, c)))
    }

    /// Total number of straight strokes across all paths.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.paths.iter().map(|p| p.commands.len()).sum()
    }
}

/// Configuration for the stripe conversion.
///
/// Deserializing fills any missing field from [`StripeConfig::default`],
/// so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeConfig {
    /// Edge length of a sampling block in pixels. Must be at least 1.
    pub block_size: u32,

    /// Strokes drawn for a fully black block. Must be at least 1.
    pub max_lines: u32,

    /// Distance between consecutive strokes inside a block. Must be at
    /// least 1.
    pub line_spacing: u32,

    /// Largest gap in pixels between two strokes on the same coordinate
    /// that still joins them into one run.
    pub merge_threshold: u32,

    /// Axis the strokes run along.
    pub direction: Direction,

    /// Black strokes or per-block colour.
    pub color_mode: ColorMode,

    /// Concatenate every stroke into one compound path. Only honoured
    /// for monochrome output.
    pub combine_into_single_path: bool,

    /// Declare a literal pixel size instead of a responsive one.
    pub absolute_size: bool,
}

impl StripeConfig {
    /// Default block edge length.
    pub const DEFAULT_BLOCK_SIZE: u32 = 12;
    /// Default strokes per fully black block.
    pub const DEFAULT_MAX_LINES: u32 = 5;
    /// Default distance between strokes inside a block.
    pub const DEFAULT_LINE_SPACING: u32 = 1;
    /// Default merge gap.
    pub const DEFAULT_MERGE_THRESHOLD: u32 = 1;

    /// Check the numeric invariants the conversion relies on.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::InvalidConfig`] if `block_size`,
    /// `max_lines` or `line_spacing` is zero.
    pub fn validate(&self) -> Result<(), StripeError> {
        if self.block_size == 0 {
            return Err(StripeError::InvalidConfig(
                "block_size must be at least 1".to_string(),
            ));
        }
        if self.max_lines == 0 {
            return Err(StripeError::InvalidConfig(
                "max_lines must be at least 1".to_string(),
            ));
        }
        if self.line_spacing == 0 {
            return Err(StripeError::InvalidConfig(
                "line_spacing must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Canvas sizing selected by `absolute_size`.
    #[must_use]
    pub const fn sizing(&self) -> CanvasSizing {
        if self.absolute_size {
            CanvasSizing::Absolute
        } else {
            CanvasSizing::Responsive
        }
    }
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            block_size: Self::DEFAULT_BLOCK_SIZE,
            max_lines: Self::DEFAULT_MAX_LINES,
            line_spacing: Self::DEFAULT_LINE_SPACING,
            merge_threshold: Self::DEFAULT_MERGE_THRESHOLD,
            direction: Direction::default(),
            color_mode: ColorMode::default(),
            combine_into_single_path: false,
            absolute_size: false,
        }
    }
}

/// Options for the full bytes-to-document pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessOptions {
    /// Conversion parameters.
    pub config: StripeConfig,
    /// Output size; `None` converts at the decoded size.
    pub target: Option<TargetSize>,
}

/// Errors that can occur while converting an image.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// The input bytes could not be decoded as an image.
    #[error("unreadable image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A requested or supplied size has a zero dimension.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width after rounding.
        width: u32,
        /// Height after rounding.
        height: u32,
    },

    /// Conversion configuration is invalid.
    #[error("invalid stripe configuration: {0}")]
    InvalidConfig(String),

    /// Resampling to the target size failed.
    #[error("resize failed: {0}")]
    Resize(String),
}
