// Canonical speaker-turn records.
//
// Raw diarization output carries no ordering or gap guarantees; the
// postprocessor turns it into a canonical `Timeline` which is frozen before
// track building.

use serde::{Deserialize, Serialize};

use super::interval::sort_by_time;

/// Speaker id used when the subsystem degrades to a single speaker.
pub const FALLBACK_SPEAKER_ID: &str = "speaker_0";

/// Confidence assigned to fallback turns (collaborator unavailable or
/// diarization returned nothing).
pub const FALLBACK_CONFIDENCE: f32 = 0.3;

/// A single contiguous interval attributed to one speaker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerTurn {
    /// Start time in seconds (global timeline)
    #[serde(alias = "start_time")]
    pub start: f64,
    /// End time in seconds (global timeline)
    #[serde(alias = "end_time")]
    pub end: f64,
    /// Speaker ID (e.g., "speaker_0", "speaker_1")
    pub speaker_id: String,
    /// Confidence score for the speaker assignment (0.0 to 1.0)
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

impl SpeakerTurn {
    pub fn new(start: f64, end: f64, speaker_id: impl Into<String>, confidence: f32) -> Self {
        Self {
            start,
            end,
            speaker_id: speaker_id.into(),
            confidence,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered sequence of turns, sorted by `(start, end)`.
pub type Timeline = Vec<SpeakerTurn>;

/// Sort a timeline into canonical `(start, end)` order.
pub fn sort_timeline(timeline: &mut Timeline) {
    sort_by_time(timeline, |t| (t.start, t.end));
}

/// Degraded timeline: one speaker covering the whole recording at fixed low
/// confidence. Used when diarization is unavailable or returned no turns.
pub fn single_speaker_fallback(duration: f64) -> Timeline {
    if duration <= 0.0 {
        return Vec::new();
    }
    vec![SpeakerTurn::new(
        0.0,
        duration,
        FALLBACK_SPEAKER_ID,
        FALLBACK_CONFIDENCE,
    )]
}
