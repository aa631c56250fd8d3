// ABOUTME: Range compaction for changed spreadsheet rows
// ABOUTME: Groups row numbers into sorted, disjoint, non-adjacent inclusive ranges

use std::fmt;

/// An inclusive span of spreadsheet row numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RowRange {
    pub start: u32,
    pub end: u32,
}

impl RowRange {
    /// Create a range covering a single row.
    pub fn single(row: u32) -> Self {
        Self {
            start: row,
            end: row,
        }
    }

    /// Number of rows covered by the range.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// A range always covers at least one row.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Render the range as an A1 rectangle, e.g. `A5:K9`.
    pub fn to_a1(&self, first_column: &str, last_column: &str) -> String {
        format!(
            "{}{}:{}{}",
            first_column, self.start, last_column, self.end
        )
    }

    /// Iterate over the rows in the range, in ascending order.
    pub fn rows(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Group row numbers into the minimal set of contiguous ranges.
///
/// Input may be unsorted and may contain duplicates. The output is sorted
/// ascending, no two ranges overlap or touch, and expanding every range gives
/// back exactly the distinct input values. Empty input yields no ranges.
///
/// # Examples
///
/// ```
/// # use problem_sync::ranges::{compact_ranges, RowRange};
/// let ranges = compact_ranges(&[5, 1, 2, 9, 3]);
/// assert_eq!(
///     ranges,
///     vec![
///         RowRange { start: 1, end: 3 },
///         RowRange { start: 5, end: 5 },
///         RowRange { start: 9, end: 9 },
///     ]
/// );
/// ```
pub fn compact_ranges(rows: &[u32]) -> Vec<RowRange> {
    let mut sorted = rows.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    let mut current = RowRange::single(first);

    for row in iter {
        if current.end.checked_add(1) == Some(row) {
            current.end = row;
        } else {
            ranges.push(current);
            current = RowRange::single(row);
        }
    }

    ranges.push(current);
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(ranges: &[RowRange]) -> Vec<u32> {
        ranges.iter().flat_map(|r| r.rows()).collect()
    }

    #[test]
    fn test_compact_ranges_unsorted_input() {
        let ranges = compact_ranges(&[5, 1, 2, 9, 3]);
        assert_eq!(
            ranges,
            vec![
                RowRange { start: 1, end: 3 },
                RowRange { start: 5, end: 5 },
                RowRange { start: 9, end: 9 },
            ]
        );
    }

    #[test]
    fn test_compact_ranges_empty_input() {
        assert!(compact_ranges(&[]).is_empty());
    }

    #[test]
    fn test_compact_ranges_single_value() {
        assert_eq!(compact_ranges(&[42]), vec![RowRange::single(42)]);
    }

    #[test]
    fn test_compact_ranges_duplicates_collapse() {
        let ranges = compact_ranges(&[4, 4, 3, 3, 5, 5, 5]);
        assert_eq!(ranges, vec![RowRange { start: 3, end: 5 }]);
    }

    #[test]
    fn test_compact_ranges_invariants() {
        let inputs: Vec<Vec<u32>> = vec![
            vec![2, 4, 6, 8],
            vec![10, 9, 8, 7, 1],
            vec![100, 3, 3, 101, 2, 50, 51, 52, 99],
            vec![1, 2, 3, 4, 5, 6, 7],
            vec![u32::MAX, u32::MAX - 1, 1],
        ];

        for input in inputs {
            let ranges = compact_ranges(&input);

            for r in &ranges {
                assert!(r.start <= r.end, "inverted range {} for {:?}", r, input);
            }
            for pair in ranges.windows(2) {
                // Sorted, disjoint and not adjacent.
                assert!(
                    pair[0].end + 1 < pair[1].start,
                    "{} and {} should have been merged for {:?}",
                    pair[0],
                    pair[1],
                    input
                );
            }

            let mut distinct = input.clone();
            distinct.sort_unstable();
            distinct.dedup();
            assert_eq!(expand(&ranges), distinct);
        }
    }

    #[test]
    fn test_to_a1() {
        assert_eq!(RowRange { start: 5, end: 9 }.to_a1("A", "K"), "A5:K9");
        assert_eq!(RowRange::single(7).to_a1("A", "K"), "A7:K7");
    }

    #[test]
    fn test_len_and_rows() {
        let range = RowRange { start: 3, end: 6 };
        assert_eq!(range.len(), 4);
        assert_eq!(range.rows().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
        assert_eq!(RowRange::single(9).len(), 1);
    }
}
