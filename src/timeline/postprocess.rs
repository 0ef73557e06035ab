//! Diarization post-processing - gap merging, short-turn absorption, padding
//!
//! Cleans raw diarization turns into the canonical per-speaker timeline the
//! rest of the subsystem works from.

use log::debug;
use serde::{Deserialize, Serialize};

use super::types::{sort_timeline, SpeakerTurn, Timeline};

/// Configuration for diarization post-processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostprocessConfig {
    /// Same-speaker turns separated by a gap at most this long are merged
    pub merge_gap_ms: f64,
    /// Turns shorter than this are absorbed into the preceding turn
    pub min_duration_ms: f64,
    /// Outward padding applied to every surviving turn
    pub pad_ms: f64,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            merge_gap_ms: 250.0,
            min_duration_ms: 400.0,
            pad_ms: 50.0,
        }
    }
}

/// Clean raw diarization turns into a canonical timeline.
///
/// Sorts by `(start, end)`, merges same-speaker turns across small gaps
/// (merged confidence is the min of the two), absorbs sub-minimum turns into
/// the preceding turn's end time, then pads every boundary outward. Padding
/// may re-introduce adjacency but does not re-trigger merging.
pub fn postprocess(turns: Vec<SpeakerTurn>, config: &PostprocessConfig) -> Timeline {
    if turns.is_empty() {
        return Vec::new();
    }

    let merge_gap = config.merge_gap_ms / 1000.0;
    let min_duration = config.min_duration_ms / 1000.0;
    let pad = config.pad_ms / 1000.0;

    let mut timeline: Timeline = turns.into_iter().filter(|t| t.end > t.start).collect();
    sort_timeline(&mut timeline);

    // Merge same-speaker turns whose gap is within merge_gap. Confidence of
    // the merged turn is the min of the two (conservative).
    let mut merged: Timeline = Vec::with_capacity(timeline.len());
    for turn in timeline {
        match merged.last_mut() {
            Some(last) if last.speaker_id == turn.speaker_id && turn.start - last.end <= merge_gap => {
                last.end = last.end.max(turn.end);
                last.confidence = last.confidence.min(turn.confidence);
            }
            _ => merged.push(turn),
        }
    }

    // Absorb short turns into the immediately preceding turn. A short turn
    // with no predecessor cannot be absorbed and is kept as-is.
    let mut absorbed: Timeline = Vec::with_capacity(merged.len());
    for turn in merged {
        if turn.duration() < min_duration {
            if let Some(prev) = absorbed.last_mut() {
                debug!(
                    "Absorbing short turn [{:.3}, {:.3}] ({}) into preceding turn",
                    turn.start, turn.end, turn.speaker_id
                );
                prev.end = prev.end.max(turn.end);
                continue;
            }
        }
        absorbed.push(turn);
    }

    // Outward padding, clamped at zero. Order is preserved.
    for turn in &mut absorbed {
        turn.start = (turn.start - pad).max(0.0);
        turn.end += pad;
    }

    absorbed
}
