//! Consolidation of sparse frame numbers into contiguous ranges.
//!
//! The output for any input multiset is sorted ascending, pairwise
//! non-overlapping, maximal, and covers exactly the distinct input frames.

use crate::models::FrameRange;

/// Collapse frame numbers into the minimal list of contiguous ranges.
///
/// # Examples
/// ```
/// use reelcheck_core::models::FrameRange;
/// use reelcheck_core::ranges::consolidate;
///
/// let ranges = consolidate(&[5, 6, 7, 10, 11, 15, 15]);
/// assert_eq!(
///     ranges,
///     vec![FrameRange::new(5, 7), FrameRange::new(10, 11), FrameRange::single(15)]
/// );
/// ```
pub fn consolidate(frames: &[u64]) -> Vec<FrameRange> {
    let mut sorted = frames.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    let mut current = FrameRange::single(first);

    for frame in iter {
        if frame == current.end + 1 {
            current.end = frame;
        } else {
            ranges.push(current);
            current = FrameRange::single(frame);
        }
    }
    ranges.push(current);

    ranges
}

/// Consolidated ranges split by an optional total-frame ceiling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundedRanges {
    /// Ranges starting at or below the ceiling.
    pub kept: Vec<FrameRange>,
    /// Ranges whose start exceeds the ceiling.
    pub excluded: Vec<FrameRange>,
}

/// Consolidate, then drop every range whose `start` exceeds `ceiling`.
///
/// The check applies to each range independently. With no ceiling, all
/// ranges are kept.
pub fn consolidate_bounded(frames: &[u64], ceiling: Option<u64>) -> BoundedRanges {
    let ranges = consolidate(frames);

    match ceiling {
        None => BoundedRanges {
            kept: ranges,
            excluded: Vec::new(),
        },
        Some(limit) => {
            let (kept, excluded) = ranges.into_iter().partition(|r| r.start <= limit);
            BoundedRanges { kept, excluded }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn covered(ranges: &[FrameRange]) -> BTreeSet<u64> {
        ranges.iter().flat_map(|r| r.start..=r.end).collect()
    }

    fn assert_well_formed(input: &[u64], ranges: &[FrameRange]) {
        let expected: BTreeSet<u64> = input.iter().copied().collect();
        assert_eq!(covered(ranges), expected);

        for range in ranges {
            assert!(range.start <= range.end);
            // Maximal: neighbours outside the range are not in the input
            if range.start > 0 {
                assert!(!expected.contains(&(range.start - 1)));
            }
            assert!(!expected.contains(&(range.end + 1)));
        }
        for pair in ranges.windows(2) {
            assert!(pair[0].end + 1 < pair[1].start);
        }
    }

    #[test]
    fn spec_example() {
        let input = [5, 6, 7, 10, 11, 15, 15];
        let ranges = consolidate(&input);
        assert_eq!(
            ranges,
            vec![
                FrameRange::new(5, 7),
                FrameRange::new(10, 11),
                FrameRange::single(15)
            ]
        );
        assert_well_formed(&input, &ranges);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(consolidate(&[]).is_empty());
    }

    #[test]
    fn single_value() {
        assert_eq!(consolidate(&[42]), vec![FrameRange::single(42)]);
    }

    #[test]
    fn unsorted_with_duplicates() {
        let input = [10, 3, 2, 1, 10, 2, 0, 12];
        let ranges = consolidate(&input);
        assert_eq!(
            ranges,
            vec![
                FrameRange::new(0, 3),
                FrameRange::single(10),
                FrameRange::single(12)
            ]
        );
        assert_well_formed(&input, &ranges);
    }

    #[test]
    fn pseudo_random_inputs_are_well_formed() {
        // Deterministic LCG so the test stays reproducible
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..200 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let len = (seed >> 58) as usize;
            let input: Vec<u64> = (0..len)
                .map(|i| {
                    let v = seed.rotate_left(i as u32 * 7);
                    v % 64
                })
                .collect();
            let ranges = consolidate(&input);
            assert_well_formed(&input, &ranges);
        }
    }

    #[test]
    fn ceiling_applies_to_every_range() {
        let bounded = consolidate_bounded(&[1, 2, 3, 50, 51, 100, 200], Some(60));
        assert_eq!(
            bounded.kept,
            vec![FrameRange::new(1, 3), FrameRange::new(50, 51)]
        );
        assert_eq!(
            bounded.excluded,
            vec![FrameRange::single(100), FrameRange::single(200)]
        );
    }

    #[test]
    fn range_straddling_ceiling_is_kept() {
        let bounded = consolidate_bounded(&[59, 60, 61, 62], Some(60));
        assert_eq!(bounded.kept, vec![FrameRange::new(59, 62)]);
        assert!(bounded.excluded.is_empty());
    }

    #[test]
    fn no_ceiling_keeps_everything() {
        let bounded = consolidate_bounded(&[1, 1_000_000], None);
        assert_eq!(bounded.kept.len(), 2);
        assert!(bounded.excluded.is_empty());
    }
}
