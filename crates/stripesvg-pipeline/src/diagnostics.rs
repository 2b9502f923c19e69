//! Conversion diagnostics: timing and counts for each stage.
//!
//! Every call to [`convert`](crate::convert) runs through
//! [`convert_with_diagnostics`]; callers that want the numbers (the CLI's
//! `--diagnostics` flag) keep them, everyone else drops them.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::types::{PixelGrid, StripeConfig, StripeDocument, StripeError};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionDiagnostics {
    /// Stage 1: block sampling.
    pub sample: StageDiagnostics,
    /// Stage 2: segment generation.
    pub generate: StageDiagnostics,
    /// Stage 3: merging and emission.
    pub merge: StageDiagnostics,
    /// Total wall-clock duration of the conversion (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: ConversionSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Block sampling metrics.
    Sample {
        /// Number of non-empty blocks sampled.
        block_count: usize,
        /// Blocks that contribute no strokes.
        blank_block_count: usize,
        /// Mean density over all blocks.
        mean_density: f64,
    },
    /// Segment generation metrics.
    Generate {
        /// Distinct stroke coordinates.
        bucket_count: usize,
        /// Raw strokes before merging.
        raw_segment_count: usize,
    },
    /// Merge and emission metrics.
    Merge {
        /// Strokes after merging.
        merged_segment_count: usize,
        /// Path elements emitted.
        path_count: usize,
        /// Ratio of merged to raw strokes (lower means more merging).
        merge_ratio: f64,
    },
}

/// High-level summary counts for the conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionSummary {
    /// Grid width in pixels.
    pub image_width: u32,
    /// Grid height in pixels.
    pub image_height: u32,
    /// Number of blocks sampled.
    pub block_count: usize,
    /// Raw strokes before merging.
    pub raw_segment_count: usize,
    /// Strokes in the output document.
    pub stroke_count: usize,
    /// Path elements in the output document.
    pub path_count: usize,
}

/// Run the conversion and collect per-stage diagnostics.
///
/// # Errors
///
/// Returns [`StripeError::InvalidConfig`] if the configuration fails
/// [`StripeConfig::validate`], and [`StripeError::InvalidDimensions`] if
/// the grid has a zero dimension.
pub fn convert_with_diagnostics(
    grid: &PixelGrid,
    config: &StripeConfig,
) -> Result<(StripeDocument, ConversionDiagnostics), StripeError> {
    config.validate()?;
    let dimensions = grid.dimensions();
    if dimensions.width == 0 || dimensions.height == 0 {
        return Err(StripeError::InvalidDimensions {
            width: dimensions.width,
            height: dimensions.height,
        });
    }

    let total_start = Instant::now();

    // 1. Block sampling.
    let start = Instant::now();
    let samples = crate::sample::sample(
        grid,
        config.block_size,
        config.max_lines,
        config.color_mode,
    );
    let blank_block_count = samples.iter().filter(|s| s.density == 0).count();
    let density_total: u64 = samples.iter().map(|s| u64::from(s.density)).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean_density = if samples.is_empty() {
        0.0
    } else {
        density_total as f64 / samples.len() as f64
    };
    let sample = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Sample {
            block_count: samples.len(),
            blank_block_count,
            mean_density,
        },
    };
    tracing::debug!(blocks = samples.len(), mean_density, "sampled blocks");

    // 2. Segment generation.
    let start = Instant::now();
    let buckets = crate::generate::generate(&samples, config.line_spacing, config.direction);
    let raw_segment_count: usize = buckets.values().map(Vec::len).sum();
    let generate = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Generate {
            bucket_count: buckets.len(),
            raw_segment_count,
        },
    };
    tracing::debug!(
        buckets = buckets.len(),
        raw_segments = raw_segment_count,
        direction = %config.direction,
        "generated segments"
    );

    // 3. Merge and emit.
    let start = Instant::now();
    let document = crate::merge::merge_and_emit(&buckets, config, dimensions);
    let stroke_count = document.stroke_count();
    #[allow(clippy::cast_precision_loss)]
    let merge_ratio = if raw_segment_count == 0 {
        0.0
    } else {
        stroke_count as f64 / raw_segment_count as f64
    };
    let merge = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Merge {
            merged_segment_count: stroke_count,
            path_count: document.paths.len(),
            merge_ratio,
        },
    };
    tracing::debug!(
        strokes = stroke_count,
        paths = document.paths.len(),
        "merged segments"
    );

    let diagnostics = ConversionDiagnostics {
        sample,
        generate,
        merge,
        total_duration: total_start.elapsed(),
        summary: ConversionSummary {
            image_width: dimensions.width,
            image_height: dimensions.height,
            block_count: samples.len(),
            raw_segment_count,
            stroke_count,
            path_count: document.paths.len(),
        },
    };
    Ok((document, diagnostics))
}

impl ConversionDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Conversion Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} blocks)",
            self.summary.image_width, self.summary.image_height, self.summary.block_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Sample", &self.sample),
            ("Generate", &self.generate),
            ("Merge", &self.merge),
        ];
        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Raw strokes: {}  |  Output strokes: {}  |  Paths: {}",
            self.summary.raw_segment_count, self.summary.stroke_count, self.summary.path_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Sample {
            block_count,
            blank_block_count,
            mean_density,
        } => format!("{block_count} blocks, {blank_block_count} blank, mean density {mean_density:.2}"),
        StageMetrics::Generate {
            bucket_count,
            raw_segment_count,
        } => format!("{raw_segment_count} strokes on {bucket_count} coordinates"),
        StageMetrics::Merge {
            merged_segment_count,
            path_count,
            merge_ratio,
        } => format!(
            "{merged_segment_count} strokes in {path_count} paths (ratio {merge_ratio:.2})"
        ),
    }
}
