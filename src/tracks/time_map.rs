// Bidirectional compact/global time mapping.
//
// Compact time is a per-speaker axis with every gap removed: the speaker's
// turns concatenated back to back starting at zero. Each map entry records
// one turn's correspondence between the two axes.

use serde::{Deserialize, Serialize};

/// One compact/global interval correspondence.
///
/// `compact_end > compact_start` always holds; `global_end >= global_start`.
/// Entries of a map are contiguous and increasing in compact time and
/// strictly ordered (not necessarily contiguous) in global time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeMapEntry {
    pub compact_start: f64,
    pub compact_end: f64,
    pub global_start: f64,
    pub global_end: f64,
}

impl TimeMapEntry {
    pub fn compact_duration(&self) -> f64 {
        self.compact_end - self.compact_start
    }

    pub fn global_duration(&self) -> f64 {
        self.global_end - self.global_start
    }

    /// Linearly rescale a compact instant inside this entry onto the global
    /// axis.
    pub fn compact_to_global(&self, t: f64) -> f64 {
        let ratio = (t - self.compact_start) / self.compact_duration();
        self.global_start + ratio * self.global_duration()
    }

    /// Inverse of [`compact_to_global`]. A zero-length global span maps
    /// everything onto `compact_start`.
    pub fn global_to_compact(&self, t: f64) -> f64 {
        let span = self.global_duration();
        if span <= 0.0 {
            return self.compact_start;
        }
        let ratio = (t - self.global_start) / span;
        self.compact_start + ratio * self.compact_duration()
    }

    /// Whether `[start, end]` lies entirely inside this entry's global span.
    pub fn contains_global(&self, start: f64, end: f64) -> bool {
        start >= self.global_start && end <= self.global_end
    }
}

/// Ordered list of compact/global correspondences for one speaker.
pub type TimeMap = Vec<TimeMapEntry>;

/// Map a global-time interval into compact time.
///
/// Returns `None` when no single entry contains the interval; the caller
/// must then fall back to slicing the full, non-compact audio.
pub fn global_to_compact(start: f64, end: f64, map: &[TimeMapEntry]) -> Option<(f64, f64)> {
    map.iter().find(|e| e.contains_global(start, end)).map(|e| {
        (e.global_to_compact(start), e.global_to_compact(end))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(cs: f64, ce: f64, gs: f64, ge: f64) -> TimeMapEntry {
        TimeMapEntry {
            compact_start: cs,
            compact_end: ce,
            global_start: gs,
            global_end: ge,
        }
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let map = vec![entry(0.0, 5.0, 10.0, 15.0), entry(5.0, 8.0, 20.0, 23.0)];
        let (cs, ce) = global_to_compact(20.5, 22.5, &map).unwrap();
        let e = &map[1];
        assert!((e.compact_to_global(cs) - 20.5).abs() < 1e-6);
        assert!((e.compact_to_global(ce) - 22.5).abs() < 1e-6);
    }

    #[test]
    fn test_lookup_miss_is_none() {
        let map = vec![entry(0.0, 5.0, 10.0, 15.0), entry(5.0, 8.0, 20.0, 23.0)];
        // Falls into the gap between the two global spans
        assert!(global_to_compact(16.0, 18.0, &map).is_none());
        // Straddles an entry boundary
        assert!(global_to_compact(14.0, 21.0, &map).is_none());
    }

    #[test]
    fn test_empty_map() {
        assert!(global_to_compact(0.0, 1.0, &[]).is_none());
    }

    #[test]
    fn test_rescale_is_linear() {
        let e = entry(0.0, 2.0, 10.0, 14.0);
        // Midpoint maps to midpoint under the ratio rule
        assert!((e.compact_to_global(1.0) - 12.0).abs() < 1e-12);
        assert!((e.global_to_compact(12.0) - 1.0).abs() < 1e-12);
    }
}
