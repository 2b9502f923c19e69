//! stripesvg-pipeline: Pure image-to-stripe conversion (sans-IO).
//!
//! Converts a raster image into halftone-like stripe line art through:
//! decode -> resize -> block sampling -> segment generation ->
//! merging and emission.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and pixel grids and returns a [`StripeDocument`]: a list
//! of straight draw commands. Turning that into SVG markup lives in
//! `stripesvg-export`.

pub mod decode;
pub mod diagnostics;
pub mod generate;
pub mod merge;
pub mod resize;
pub mod sample;
pub mod types;

pub use diagnostics::{ConversionDiagnostics, convert_with_diagnostics};
pub use generate::SegmentBuckets;
pub use resize::{AspectPolicy, TargetSize};
pub use types::{
    Block, BlockSample, CanvasSizing, ColorMode, Dimensions, Direction, DrawCommand, GrayImage,
    PixelGrid, Point, ProcessOptions, RgbImage, Segment, StripeConfig, StripeDocument,
    StripeError, StrokeColor, StrokePath,
};

/// Convert a decoded pixel grid into a stripe document.
///
/// # Steps
///
/// 1. Block sampling: mean brightness (and colour) per block, mapped to
///    a stroke density.
/// 2. Segment generation: `density` strokes per block, bucketed by the
///    row (horizontal) or column (vertical) they sit on.
/// 3. Merging: same-coordinate strokes within `merge_threshold` of each
///    other (and of the same colour) join into runs, emitted as draw
///    commands.
///
/// The conversion is pure and deterministic: identical inputs give
/// identical documents.
///
/// # Errors
///
/// Returns [`StripeError::InvalidConfig`] if the configuration fails
/// [`StripeConfig::validate`].
/// Returns [`StripeError::InvalidDimensions`] if the grid is empty.
pub fn convert(grid: &PixelGrid, config: &StripeConfig) -> Result<StripeDocument, StripeError> {
    convert_with_diagnostics(grid, config).map(|(document, _)| document)
}

/// Run the full pipeline from encoded image bytes.
///
/// Decodes the bytes (PNG, JPEG, BMP, WebP) with EXIF orientation
/// applied, builds the pixel grid for the configured colour mode,
/// resizes it when a target size is given, and converts it.
///
/// # Errors
///
/// Returns [`StripeError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`StripeError::ImageDecode`] if the image cannot be decoded.
/// Returns [`StripeError::InvalidDimensions`] if the target size
/// resolves to a zero dimension.
/// Returns [`StripeError::InvalidConfig`] if the configuration is invalid.
pub fn process(
    image_bytes: &[u8],
    options: &ProcessOptions,
) -> Result<StripeDocument, StripeError> {
    process_with_diagnostics(image_bytes, options).map(|(document, _)| document)
}

/// Like [`process`] but also returns the conversion diagnostics.
///
/// # Errors
///
/// Same as [`process`].
pub fn process_with_diagnostics(
    image_bytes: &[u8],
    options: &ProcessOptions,
) -> Result<(StripeDocument, ConversionDiagnostics), StripeError> {
    // Reject a bad config before paying for decode and resize.
    options.config.validate()?;

    // 1. Decode with orientation applied.
    let image = decode::decode(image_bytes)?;

    // 2. Pixel grid for the colour mode.
    let grid = decode::to_grid(&image, options.config.color_mode);

    // 3. Optional resize.
    let grid = match options.target {
        Some(ref target) => resize::resize(&grid, target)?,
        None => grid,
    };

    // 4. Stripe conversion.
    convert_with_diagnostics(&grid, &options.config)
}
