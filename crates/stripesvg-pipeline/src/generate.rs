//! Segment generation: turn each block's density into strokes, bucketed
//! by the coordinate they sit on.

use std::collections::BTreeMap;

use crate::types::{BlockSample, Direction, Segment};

/// Raw segments keyed by their fixed coordinate, iterated in ascending
/// coordinate order. Within a bucket, segments keep block scan order.
pub type SegmentBuckets = BTreeMap<u32, Vec<Segment>>;

/// Generate the raw strokes for every sampled block.
///
/// Block `b` with density `d` contributes strokes at
/// `coord = start + i * line_spacing` for `i` in `0..d`, where `start`
/// is the block's first row (horizontal) or column (vertical). Generation
/// stops at the first coordinate that falls outside the block's own span,
/// so a thin edge block hosts fewer strokes than its density. Each stroke
/// spans the block's extent along the stripe direction.
///
/// Strokes from different blocks on the same coordinate share a bucket,
/// which is what lets the merger join neighbouring blocks' strokes.
#[must_use]
pub fn generate(
    samples: &[BlockSample],
    line_spacing: u32,
    direction: Direction,
) -> SegmentBuckets {
    let mut buckets = SegmentBuckets::new();

    for sample in samples {
        let (across_start, across_end) = sample.block.span_across(direction);
        let (along_start, along_end) = sample.block.span_along(direction);

        for i in 0..sample.density {
            let Some(coord) = i
                .checked_mul(line_spacing)
                .and_then(|offset| offset.checked_add(across_start))
            else {
                break;
            };
            if coord >= across_end {
                break;
            }
            buckets
                .entry(coord)
                .or_default()
                .push(Segment::new(coord, along_start, along_end, sample.color));
        }
    }

    buckets
}
