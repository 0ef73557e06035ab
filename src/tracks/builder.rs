// Compact track builder
// Concatenates each speaker's turns into one gap-free audio buffer and
// records the compact/global correspondence for every appended chunk.
// Overlapped chunks can be routed through the target-speaker enhancer.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::audio::{sample_slice, samples_duration};
use crate::enhance::TargetSpeakerEnhancer;
use crate::timeline::interval::overlaps;
use crate::timeline::{single_speaker_fallback, SpeakerTurn};

use super::time_map::{TimeMap, TimeMapEntry};

/// One speaker's compact track: gap-free audio plus its time map.
#[derive(Debug, Clone)]
pub struct SpeakerTrack {
    pub speaker_id: String,
    /// Compact audio, the speaker's turns concatenated back to back
    pub samples: Vec<f32>,
    pub time_map: TimeMap,
    /// Fraction of this speaker's kept duration that overlaps other speakers
    pub overlap_ratio: f64,
}

impl SpeakerTrack {
    pub fn compact_duration(&self) -> f64 {
        self.time_map.last().map_or(0.0, |e| e.compact_end)
    }
}

/// Result of a track-building run.
#[derive(Debug, Clone)]
pub struct TrackBuildResult {
    pub tracks: Vec<SpeakerTrack>,
    /// True when at most one speaker survived; the caller should bypass
    /// multi-speaker processing.
    pub single_speaker: bool,
}

/// Build one compact track per speaker from a canonical timeline.
///
/// An empty timeline degrades to a single fallback speaker covering the
/// whole input. Speakers contributing zero usable audio are omitted.
/// Enhancement of overlapped chunks is best-effort; any failure falls back
/// to the raw chunk.
pub fn build_tracks(
    timeline: &[SpeakerTurn],
    audio: &[f32],
    sample_rate: u32,
    enhancer: Option<&TargetSpeakerEnhancer<'_>>,
) -> TrackBuildResult {
    if audio.is_empty() {
        return TrackBuildResult {
            tracks: Vec::new(),
            single_speaker: true,
        };
    }

    let fallback;
    let timeline = if timeline.is_empty() {
        warn!("Empty timeline, degrading to a single fallback speaker");
        fallback = single_speaker_fallback(samples_duration(audio.len(), sample_rate));
        &fallback[..]
    } else {
        timeline
    };

    // Group per speaker, keeping first-seen order so output is stable.
    let mut order: Vec<&str> = Vec::new();
    let mut by_speaker: HashMap<&str, Vec<&SpeakerTurn>> = HashMap::new();
    for turn in timeline {
        let id = turn.speaker_id.as_str();
        if !by_speaker.contains_key(id) {
            order.push(id);
        }
        by_speaker.entry(id).or_default().push(turn);
    }

    let mut tracks = Vec::with_capacity(order.len());
    for speaker_id in order {
        let turns = &by_speaker[speaker_id];
        let mut samples: Vec<f32> = Vec::new();
        let mut time_map: TimeMap = Vec::new();
        let mut cursor = 0.0f64;
        let mut overlapped_duration = 0.0f64;

        for turn in turns {
            let chunk = sample_slice(audio, sample_rate, turn.start, turn.end);
            if chunk.is_empty() {
                debug!(
                    "Skipping degenerate chunk [{:.3}, {:.3}] for {}",
                    turn.start, turn.end, speaker_id
                );
                continue;
            }

            // Clamping may have trimmed the turn; keep compact and global
            // durations equal by deriving the global span from the slice.
            let global_start = turn.start.max(0.0);
            let duration = samples_duration(chunk.len(), sample_rate);
            let global_end = global_start + duration;

            let overlapped = timeline
                .iter()
                .filter(|other| other.speaker_id != speaker_id)
                .any(|other| overlaps(turn.start, turn.end, other.start, other.end));

            let chunk = if overlapped {
                overlapped_duration += duration;
                match enhancer {
                    Some(enh) => match enh.enhance(chunk, sample_rate, speaker_id) {
                        Ok(enhanced) => enhanced,
                        Err(e) => {
                            warn!(
                                "Enhancement failed for {} [{:.2}, {:.2}], using raw chunk: {}",
                                speaker_id, turn.start, turn.end, e
                            );
                            chunk.to_vec()
                        }
                    },
                    None => chunk.to_vec(),
                }
            } else {
                chunk.to_vec()
            };

            samples.extend_from_slice(&chunk);
            time_map.push(TimeMapEntry {
                compact_start: cursor,
                compact_end: cursor + duration,
                global_start,
                global_end,
            });
            cursor += duration;
        }

        if samples.is_empty() {
            debug!("Speaker {} contributed no usable audio, omitting", speaker_id);
            continue;
        }

        let total = cursor;
        let overlap_ratio = if total > 0.0 {
            overlapped_duration / total
        } else {
            0.0
        };

        tracks.push(SpeakerTrack {
            speaker_id: speaker_id.to_string(),
            samples,
            time_map,
            overlap_ratio,
        });
    }

    let single_speaker = tracks.len() <= 1;
    info!(
        "Built {} compact track(s){}",
        tracks.len(),
        if single_speaker { " (single-speaker mode)" } else { "" }
    );

    TrackBuildResult {
        tracks,
        single_speaker,
    }
}
