//! Segment merging and emission.
//!
//! Each coordinate bucket is sorted and swept once, joining strokes whose
//! gap is within the merge threshold into maximal runs. The runs are then
//! emitted as draw commands: one compound path when every stroke is
//! black and combining was requested, otherwise one path per run (a path
//! carries a single stroke colour, so colour output is never combined).

use crate::generate::SegmentBuckets;
use crate::types::{
    ColorMode, Dimensions, Direction, DrawCommand, Point, Segment, StripeConfig, StripeDocument,
    StrokeColor, StrokePath,
};

/// Merge the strokes of one coordinate bucket into maximal runs.
///
/// Segments are stably sorted by `(start, end)`, so equal extents keep
/// their block scan order. The sweep extends the open run while the next
/// segment starts no more than `merge_threshold` pixels past the run's
/// end and has the same colour; otherwise the run is closed and a new
/// one opened. Monochrome segments are all [`StrokeColor::Black`], so the
/// colour test only separates runs in colour mode.
///
/// The result is sorted by `start` and merging it again returns it
/// unchanged.
#[must_use]
pub fn merge_segments(bucket: &[Segment], merge_threshold: u32) -> Vec<Segment> {
    let mut sorted = bucket.to_vec();
    sorted.sort_by_key(|s| (s.start, s.end));

    let mut merged: Vec<Segment> = Vec::with_capacity(sorted.len());
    for segment in sorted {
        match merged.last_mut() {
            Some(run)
                if segment.start <= run.end.saturating_add(merge_threshold)
                    && segment.color == run.color =>
            {
                run.end = run.end.max(segment.end);
            }
            _ => merged.push(segment),
        }
    }
    merged
}

/// Map a segment to its straight stroke.
///
/// Horizontal: `M start coord L end coord`.
/// Vertical: `M coord start L coord end`.
#[must_use]
pub const fn draw_command(segment: &Segment, direction: Direction) -> DrawCommand {
    match direction {
        Direction::Horizontal => DrawCommand {
            from: Point::new(segment.start, segment.coord),
            to: Point::new(segment.end, segment.coord),
        },
        Direction::Vertical => DrawCommand {
            from: Point::new(segment.coord, segment.start),
            to: Point::new(segment.coord, segment.end),
        },
    }
}

/// Merge every bucket and build the output document.
///
/// Buckets are visited in ascending coordinate order and runs within a
/// bucket in ascending `start` order, so strokes come out top-to-bottom
/// (or left-to-right) and the output is deterministic.
#[must_use]
pub fn merge_and_emit(
    buckets: &SegmentBuckets,
    config: &StripeConfig,
    dimensions: Dimensions,
) -> StripeDocument {
    let combine =
        config.combine_into_single_path && config.color_mode == ColorMode::Monochrome;
    if config.combine_into_single_path && !combine {
        tracing::warn!("combine_into_single_path ignored: colour strokes need one path each");
    }

    let runs = buckets
        .values()
        .flat_map(|bucket| merge_segments(bucket, config.merge_threshold));

    let paths = if combine {
        let commands: Vec<DrawCommand> = runs
            .map(|run| draw_command(&run, config.direction))
            .collect();
        if commands.is_empty() {
            Vec::new()
        } else {
            vec![StrokePath {
                color: StrokeColor::Black,
                commands,
            }]
        }
    } else {
        runs.map(|run| StrokePath {
            color: run.color,
            commands: vec![draw_command(&run, config.direction)],
        })
        .collect()
    };

    StripeDocument {
        dimensions,
        sizing: config.sizing(),
        paths,
    }
}
