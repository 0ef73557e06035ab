// Segment binder
// Assigns a speaker to each external transcript segment by maximal temporal
// overlap with the refined timeline, and picks one stable reference-audio
// clip per speaker for downstream voice cloning.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, warn};

use crate::timeline::interval::overlap_len;
use crate::timeline::SpeakerTurn;

use super::types::TranscriptSegment;

/// Bind global-time transcript segments to the timeline's speakers.
///
/// Each segment takes the `speaker_id` and `confidence` of the turn it
/// overlaps most. A segment overlapping no turn at all falls back to the
/// first turn; full-coverage timelines make that a rare degenerate case.
pub fn bind_segments(timeline: &[SpeakerTurn], segments: &mut [TranscriptSegment]) {
    if timeline.is_empty() || segments.is_empty() {
        return;
    }

    for segment in segments.iter_mut() {
        let best = timeline
            .iter()
            .map(|turn| {
                (
                    turn,
                    overlap_len(segment.start, segment.end, turn.start, turn.end),
                )
            })
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let turn = match best {
            Some((turn, overlap)) if overlap > 0.0 => turn,
            _ => {
                warn!(
                    "Segment [{:.2}, {:.2}] overlaps no turn, binding to first turn",
                    segment.start, segment.end
                );
                &timeline[0]
            }
        };

        segment.speaker_id = Some(turn.speaker_id.clone());
        segment.confidence = Some(turn.confidence);
    }
}

/// Select one stable reference-audio path per speaker: the longest bound
/// segment whose audio artifact exists on disk.
pub fn select_reference_audio(segments: &[TranscriptSegment]) -> HashMap<String, String> {
    let mut selected: HashMap<String, (f64, String)> = HashMap::new();

    for segment in segments {
        let (speaker_id, path) = match (&segment.speaker_id, &segment.reference_audio_path) {
            (Some(s), Some(p)) => (s, p),
            _ => continue,
        };
        if !Path::new(path).exists() {
            debug!("Reference candidate {} missing on disk, skipping", path);
            continue;
        }
        let duration = segment.duration();
        match selected.get(speaker_id) {
            Some((best, _)) if *best >= duration => {}
            _ => {
                selected.insert(speaker_id.clone(), (duration, path.clone()));
            }
        }
    }

    selected
        .into_iter()
        .map(|(speaker, (_, path))| (speaker, path))
        .collect()
}

/// Overwrite every segment's reference path with its speaker's stable pick.
pub fn apply_reference_audio(
    segments: &mut [TranscriptSegment],
    references: &HashMap<String, String>,
) {
    for segment in segments.iter_mut() {
        if let Some(path) = segment
            .speaker_id
            .as_ref()
            .and_then(|s| references.get(s))
        {
            segment.reference_audio_path = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::SpeakerTurn;
    use std::fs;

    fn timeline() -> Vec<SpeakerTurn> {
        vec![
            SpeakerTurn::new(0.0, 5.0, "speaker_0", 0.9),
            SpeakerTurn::new(5.0, 10.0, "speaker_1", 0.8),
        ]
    }

    #[test]
    fn test_bind_by_max_overlap() {
        let mut segments = vec![
            TranscriptSegment::new(1.0, 3.0, "first"),
            // 2s in speaker_0, 3s in speaker_1
            TranscriptSegment::new(3.0, 8.0, "straddles"),
        ];
        bind_segments(&timeline(), &mut segments);
        assert_eq!(segments[0].speaker_id.as_deref(), Some("speaker_0"));
        assert_eq!(segments[0].confidence, Some(0.9));
        assert_eq!(segments[1].speaker_id.as_deref(), Some("speaker_1"));
    }

    #[test]
    fn test_bind_fallback_to_first_turn() {
        let mut segments = vec![TranscriptSegment::new(50.0, 51.0, "orphan")];
        bind_segments(&timeline(), &mut segments);
        assert_eq!(segments[0].speaker_id.as_deref(), Some("speaker_0"));
    }

    #[test]
    fn test_bind_empty_inputs() {
        let mut none: Vec<TranscriptSegment> = Vec::new();
        bind_segments(&timeline(), &mut none);
        let mut segments = vec![TranscriptSegment::new(0.0, 1.0, "x")];
        bind_segments(&[], &mut segments);
        assert!(segments[0].speaker_id.is_none());
    }

    #[test]
    fn test_reference_audio_longest_existing() {
        let dir = tempfile::tempdir().unwrap();
        let long_clip = dir.path().join("long.wav");
        let short_clip = dir.path().join("short.wav");
        fs::write(&long_clip, b"x").unwrap();
        fs::write(&short_clip, b"x").unwrap();

        let mut long_seg = TranscriptSegment::new(0.0, 4.0, "long");
        long_seg.speaker_id = Some("speaker_0".into());
        long_seg.reference_audio_path = Some(long_clip.to_string_lossy().into_owned());

        let mut short_seg = TranscriptSegment::new(5.0, 6.0, "short");
        short_seg.speaker_id = Some("speaker_0".into());
        short_seg.reference_audio_path = Some(short_clip.to_string_lossy().into_owned());

        // Longest candidate of all, but its artifact does not exist
        let mut missing_seg = TranscriptSegment::new(6.0, 20.0, "missing");
        missing_seg.speaker_id = Some("speaker_0".into());
        missing_seg.reference_audio_path =
            Some(dir.path().join("gone.wav").to_string_lossy().into_owned());

        let mut segments = vec![short_seg, long_seg, missing_seg];
        let references = select_reference_audio(&segments);
        assert_eq!(
            references.get("speaker_0").map(String::as_str),
            Some(long_clip.to_string_lossy().as_ref())
        );

        apply_reference_audio(&mut segments, &references);
        for segment in &segments {
            assert_eq!(
                segment.reference_audio_path.as_deref(),
                Some(long_clip.to_string_lossy().as_ref())
            );
        }
    }
}
