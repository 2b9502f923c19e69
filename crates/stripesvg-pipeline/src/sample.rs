//! Block sampling: average brightness (and colour) per block, and the
//! stroke density derived from it.

use crate::types::{Block, BlockSample, ColorMode, PixelGrid, StrokeColor};

/// ITU-R BT.601 luma weights, as used for colour luminance.
const LUMA_WEIGHTS: [f64; 3] = [0.2989, 0.5870, 0.1140];

/// Split the grid into `block_size` blocks and sample each one.
///
/// Blocks are visited row by row, left to right. Blocks on the right and
/// bottom edges are clipped to the grid, never padded; zero-area blocks
/// are skipped. Each sample carries its block, so the result doubles as
/// the mapping from block coordinate to sample.
///
/// The stroke colour follows `color_mode`, not the grid kind: monochrome
/// always yields black strokes, even for an RGB grid. A `block_size` of
/// zero yields no samples; [`StripeConfig::validate`](crate::StripeConfig::validate)
/// rejects it before a pipeline run gets here.
#[must_use]
pub fn sample(
    grid: &PixelGrid,
    block_size: u32,
    max_lines: u32,
    color_mode: ColorMode,
) -> Vec<BlockSample> {
    if block_size == 0 {
        return Vec::new();
    }
    let dims = grid.dimensions();
    let step = block_size as usize;

    let mut samples = Vec::new();
    for y in (0..dims.height).step_by(step) {
        for x in (0..dims.width).step_by(step) {
            let block = Block {
                x,
                y,
                width: block_size.min(dims.width - x),
                height: block_size.min(dims.height - y),
            };
            if block.area() == 0 {
                continue;
            }
            samples.push(sample_block(grid, block, max_lines, color_mode));
        }
    }
    samples
}

/// Mean pixel value of one block, before any colour decision.
enum BlockMean {
    Gray(f64),
    Rgb([f64; 3]),
}

/// Sample a single (already clipped, non-empty) block.
fn sample_block(
    grid: &PixelGrid,
    block: Block,
    max_lines: u32,
    color_mode: ColorMode,
) -> BlockSample {
    let (luminance, color) = match (color_mode, block_mean(grid, block)) {
        (ColorMode::Monochrome, BlockMean::Gray(value)) => (value, StrokeColor::Black),
        (ColorMode::Monochrome, BlockMean::Rgb(means)) => {
            (weighted_luma(means), StrokeColor::Black)
        }
        (ColorMode::Color, mean) => {
            let means = match mean {
                BlockMean::Gray(value) => [value; 3],
                BlockMean::Rgb(means) => means,
            };
            let rgb = means.map(truncate_to_u8);
            (luminance_of(rgb).trunc(), StrokeColor::Rgb(rgb))
        }
    };

    BlockSample {
        block,
        density: density(luminance, max_lines),
        color,
    }
}

fn block_mean(grid: &PixelGrid, block: Block) -> BlockMean {
    match grid {
        PixelGrid::Gray(img) => {
            let total: u64 = block_pixels(block)
                .map(|(x, y)| u64::from(img.get_pixel(x, y).0[0]))
                .sum();
            BlockMean::Gray(mean(total, block.area()))
        }
        PixelGrid::Rgb(img) => {
            let mut totals = [0_u64; 3];
            for (x, y) in block_pixels(block) {
                let px = img.get_pixel(x, y).0;
                for (total, channel) in totals.iter_mut().zip(px) {
                    *total += u64::from(channel);
                }
            }
            BlockMean::Rgb(totals.map(|t| mean(t, block.area())))
        }
    }
}

/// Stroke count for a block of the given mean luminance:
/// `floor(((255 - luminance) / 255) * max_lines)`, clamped to
/// `0..=max_lines`.
///
/// White yields 0 strokes, black yields `max_lines`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn density(luminance: f64, max_lines: u32) -> u32 {
    let darkness = (255.0 - luminance) / 255.0;
    let lines = (darkness * f64::from(max_lines)).floor();
    lines.clamp(0.0, f64::from(max_lines)) as u32
}

/// Weighted luminance of an RGB triple.
#[must_use]
pub fn luminance_of(rgb: [u8; 3]) -> f64 {
    weighted_luma(rgb.map(f64::from))
}

fn weighted_luma(channels: [f64; 3]) -> f64 {
    channels
        .iter()
        .zip(LUMA_WEIGHTS)
        .map(|(channel, weight)| channel * weight)
        .sum()
}

fn block_pixels(block: Block) -> impl Iterator<Item = (u32, u32)> {
    (block.y..block.y + block.height)
        .flat_map(move |y| (block.x..block.x + block.width).map(move |x| (x, y)))
}

#[allow(clippy::cast_precision_loss)]
fn mean(total: u64, count: u64) -> f64 {
    total as f64 / count as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncate_to_u8(value: f64) -> u8 {
    value.trunc().clamp(0.0, 255.0) as u8
}
