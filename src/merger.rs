// Similarity-based segment merger
// Speakers with very little total speech are usually diarization
// fragmentation, not real participants. Their turns are relabeled to the
// closest long speaker by voice embedding similarity.

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::audio::sample_slice;
use crate::embedding::{cosine_similarity, mean_embedding, EmbeddingExtractor};
use crate::timeline::{sort_timeline, Timeline};

/// Configuration for similarity-based merging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergerConfig {
    /// Speakers with less total speech than this are merge candidates
    pub short_threshold_s: f64,
    /// Advisory similarity threshold (0.0 to 1.0). Logged when the best
    /// match falls below it; reassignment still takes the best match.
    pub similarity_threshold: f32,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            short_threshold_s: 5.0,
            similarity_threshold: 0.6,
        }
    }
}

/// Reassign short-speaker turns to the best-matching long speaker.
///
/// Partitions speakers into "short" and "long" by total spoken duration. One
/// representative embedding is built per long speaker from up to
/// `max(3, n/2)` of its longest turns; each short turn is then relabeled to
/// the long speaker with the highest cosine similarity. A turn keeps its
/// original label only when no candidate embedding exists or its own
/// extraction fails.
pub fn merge_short_segments(
    timeline: Timeline,
    audio: &[f32],
    sample_rate: u32,
    extractor: &dyn EmbeddingExtractor,
    config: &MergerConfig,
) -> Timeline {
    if timeline.is_empty() {
        return timeline;
    }

    let mut totals: HashMap<&str, f64> = HashMap::new();
    for turn in &timeline {
        *totals.entry(turn.speaker_id.as_str()).or_insert(0.0) += turn.duration();
    }

    let short: Vec<String> = totals
        .iter()
        .filter(|(_, d)| **d < config.short_threshold_s)
        .map(|(s, _)| s.to_string())
        .collect();
    let long: Vec<String> = totals
        .iter()
        .filter(|(_, d)| **d >= config.short_threshold_s)
        .map(|(s, _)| s.to_string())
        .collect();

    if short.is_empty() || long.is_empty() {
        debug!(
            "Nothing to merge: {} short / {} long speakers",
            short.len(),
            long.len()
        );
        return timeline;
    }

    info!(
        "Merging {} fragmentary speaker(s) into {} long speaker(s)",
        short.len(),
        long.len()
    );

    // One representative embedding per long speaker, averaged over its
    // longest turns. Speakers whose every extraction fails contribute no
    // candidate.
    let mut candidates: Vec<(String, Vec<f32>)> = Vec::new();
    for speaker in &long {
        let mut turns: Vec<_> = timeline
            .iter()
            .filter(|t| &t.speaker_id == speaker)
            .collect();
        turns.sort_by(|a, b| {
            b.duration()
                .partial_cmp(&a.duration())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        // Up to max(3, n/2) of the longest turns feed the representative
        let take = (turns.len() / 2).max(3).min(turns.len());

        let mut embeddings = Vec::new();
        for turn in turns.iter().take(take) {
            let clip = sample_slice(audio, sample_rate, turn.start, turn.end);
            match extractor.embed(clip, sample_rate) {
                Ok(e) => embeddings.push(e),
                Err(err) => {
                    warn!(
                        "Embedding failed for {} turn [{:.2}, {:.2}]: {}",
                        speaker, turn.start, turn.end, err
                    );
                }
            }
        }

        match mean_embedding(&embeddings) {
            Some(embedding) => candidates.push((speaker.clone(), embedding)),
            None => warn!("No usable embedding for speaker {}, excluded from matching", speaker),
        }
    }

    if candidates.is_empty() {
        warn!("No candidate embeddings at all, keeping timeline unchanged");
        return timeline;
    }

    let mut merged = timeline;
    for turn in &mut merged {
        if !short.contains(&turn.speaker_id) {
            continue;
        }

        let clip = sample_slice(audio, sample_rate, turn.start, turn.end);
        let embedding = match extractor.embed(clip, sample_rate) {
            Ok(e) => e,
            Err(err) => {
                warn!(
                    "Embedding failed for short turn [{:.2}, {:.2}], keeping label {}: {}",
                    turn.start, turn.end, turn.speaker_id, err
                );
                continue;
            }
        };

        let mut best: Option<(&str, f32)> = None;
        for (speaker, candidate) in &candidates {
            let similarity = cosine_similarity(&embedding, candidate);
            if best.map_or(true, |(_, s)| similarity > s) {
                best = Some((speaker.as_str(), similarity));
            }
        }

        if let Some((speaker, similarity)) = best {
            if similarity < config.similarity_threshold {
                debug!(
                    "Best match for [{:.2}, {:.2}] is {} at {:.2}, below threshold {:.2}; reassigning anyway",
                    turn.start, turn.end, speaker, similarity, config.similarity_threshold
                );
            }
            debug!(
                "Relabeling turn [{:.2}, {:.2}] {} -> {} (similarity {:.2})",
                turn.start, turn.end, turn.speaker_id, speaker, similarity
            );
            turn.speaker_id = speaker.to_string();
        }
    }

    sort_timeline(&mut merged);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::SpeakerTurn;
    use anyhow::anyhow;
    use std::collections::HashSet;

    /// Extractor returning a fixed embedding per clip length bucket, so the
    /// tests can steer which speaker a short turn matches.
    struct FixtureExtractor {
        fail: bool,
    }

    impl EmbeddingExtractor for FixtureExtractor {
        fn embed(&self, samples: &[f32], _sample_rate: u32) -> anyhow::Result<Vec<f32>> {
            if self.fail {
                return Err(anyhow!("model unavailable"));
            }
            // First sample value encodes the voice identity in the fixtures
            let v = samples.first().copied().unwrap_or(0.0);
            Ok(vec![v, 1.0 - v.abs()])
        }
    }

    fn audio_with_voices(sample_rate: u32) -> Vec<f32> {
        // 0-10s reads 1.0 (voice A), 10-20s reads -1.0 (voice B)
        let mut audio = vec![1.0f32; 10 * sample_rate as usize];
        audio.extend(vec![-1.0f32; 10 * sample_rate as usize]);
        audio
    }

    fn distinct_speakers(timeline: &Timeline) -> HashSet<String> {
        timeline.iter().map(|t| t.speaker_id.clone()).collect()
    }

    #[test]
    fn test_short_speaker_relabeled_to_best_match() {
        let sr = 100;
        let audio = audio_with_voices(sr);
        let timeline = vec![
            SpeakerTurn::new(0.0, 8.0, "speaker_0", 0.9),
            SpeakerTurn::new(10.0, 18.0, "speaker_1", 0.9),
            // Fragment in the voice-A region
            SpeakerTurn::new(8.0, 9.0, "speaker_2", 0.5),
        ];
        let extractor = FixtureExtractor { fail: false };
        let merged = merge_short_segments(timeline, &audio, sr, &extractor, &MergerConfig::default());

        let fragment = merged.iter().find(|t| t.start == 8.0).unwrap();
        assert_eq!(fragment.speaker_id, "speaker_0");
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_never_increases_speaker_count() {
        let sr = 100;
        let audio = audio_with_voices(sr);
        let timeline = vec![
            SpeakerTurn::new(0.0, 8.0, "speaker_0", 0.9),
            SpeakerTurn::new(10.0, 18.0, "speaker_1", 0.9),
            SpeakerTurn::new(8.0, 9.0, "speaker_2", 0.5),
            SpeakerTurn::new(18.0, 19.0, "speaker_3", 0.5),
        ];
        let before = distinct_speakers(&timeline);
        let extractor = FixtureExtractor { fail: false };
        let merged = merge_short_segments(timeline, &audio, sr, &extractor, &MergerConfig::default());
        let after = distinct_speakers(&merged);
        assert!(after.len() <= before.len());
        assert!(after.is_subset(&before));
    }

    #[test]
    fn test_unchanged_when_all_speakers_long() {
        let sr = 100;
        let audio = audio_with_voices(sr);
        let timeline = vec![
            SpeakerTurn::new(0.0, 8.0, "speaker_0", 0.9),
            SpeakerTurn::new(10.0, 18.0, "speaker_1", 0.9),
        ];
        let extractor = FixtureExtractor { fail: false };
        let merged =
            merge_short_segments(timeline.clone(), &audio, sr, &extractor, &MergerConfig::default());
        assert_eq!(merged.len(), timeline.len());
        assert_eq!(distinct_speakers(&merged), distinct_speakers(&timeline));
    }

    #[test]
    fn test_unchanged_when_all_speakers_short() {
        let sr = 100;
        let audio = audio_with_voices(sr);
        let timeline = vec![
            SpeakerTurn::new(0.0, 1.0, "speaker_0", 0.9),
            SpeakerTurn::new(2.0, 3.0, "speaker_1", 0.9),
        ];
        let extractor = FixtureExtractor { fail: false };
        let merged = merge_short_segments(timeline.clone(), &audio, sr, &extractor, &MergerConfig::default());
        assert_eq!(distinct_speakers(&merged), distinct_speakers(&timeline));
    }

    #[test]
    fn test_extraction_failure_keeps_labels() {
        let sr = 100;
        let audio = audio_with_voices(sr);
        let timeline = vec![
            SpeakerTurn::new(0.0, 8.0, "speaker_0", 0.9),
            SpeakerTurn::new(8.0, 9.0, "speaker_2", 0.5),
        ];
        let extractor = FixtureExtractor { fail: true };
        let merged = merge_short_segments(timeline.clone(), &audio, sr, &extractor, &MergerConfig::default());
        assert_eq!(distinct_speakers(&merged), distinct_speakers(&timeline));
    }

    #[test]
    fn test_empty_timeline() {
        let extractor = FixtureExtractor { fail: false };
        let merged =
            merge_short_segments(Vec::new(), &[], 16000, &extractor, &MergerConfig::default());
        assert!(merged.is_empty());
    }
}
