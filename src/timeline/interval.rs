// Interval arithmetic shared by timeline post-processing, track building,
// and transcript remapping. All times are seconds on the global axis unless
// a caller says otherwise.

/// Length of the overlap between `[a_start, a_end)` and `[b_start, b_end)`,
/// zero when the intervals are disjoint.
pub fn overlap_len(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> f64 {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    (end - start).max(0.0)
}

/// Whether two intervals share a nonzero span.
pub fn overlaps(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> bool {
    overlap_len(a_start, a_end, b_start, b_end) > 0.0
}

/// Intersection of two intervals, `None` when empty or degenerate.
pub fn intersect(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> Option<(f64, f64)> {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    if end > start {
        Some((start, end))
    } else {
        None
    }
}

/// Clip a value into `[lo, hi]`.
pub fn clip(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Sort items by `(start, end)` given a key accessor. NaN times never occur
/// in canonical timelines; ties fall back to Equal.
pub fn sort_by_time<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> (f64, f64),
{
    items.sort_by(|a, b| {
        let (a_start, a_end) = key(a);
        let (b_start, b_end) = key(b);
        a_start
            .partial_cmp(&b_start)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a_end.partial_cmp(&b_end).unwrap_or(std::cmp::Ordering::Equal))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_len() {
        assert_eq!(overlap_len(0.0, 2.0, 1.0, 3.0), 1.0);
        assert_eq!(overlap_len(0.0, 1.0, 2.0, 3.0), 0.0);
        assert_eq!(overlap_len(0.0, 1.0, 1.0, 2.0), 0.0);
    }

    #[test]
    fn test_intersect() {
        assert_eq!(intersect(0.0, 5.0, 3.0, 7.0), Some((3.0, 5.0)));
        assert_eq!(intersect(0.0, 1.0, 1.0, 2.0), None);
        assert_eq!(intersect(2.0, 2.0, 0.0, 5.0), None);
    }

    #[test]
    fn test_sort_by_time() {
        let mut spans = vec![(3.0, 4.0), (0.0, 2.0), (0.0, 1.0)];
        sort_by_time(&mut spans, |s| (s.0, s.1));
        assert_eq!(spans, vec![(0.0, 1.0), (0.0, 2.0), (3.0, 4.0)]);
    }
}
