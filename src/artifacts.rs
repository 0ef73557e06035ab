// File artifacts
// Persisted outputs consumed by later pipeline stages: per-speaker compact
// WAV + time-map JSON, the refined timeline, and a manifest for
// global-to-compact lookups without re-deriving the maps.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use log::info;
use serde::Serialize;
use serde_json::json;

use crate::timeline::SpeakerTurn;
use crate::tracks::{SpeakerTrack, TimeMap};

/// Paths of one speaker's persisted artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct SpeakerArtifacts {
    pub speaker_id: String,
    pub audio_path: String,
    pub mapping_path: String,
}

fn sanitize_id(speaker_id: &str) -> String {
    speaker_id.replace(['/', '\\', ':', ' '], "_")
}

/// Write each speaker's compact track (16-bit PCM WAV) and time map under a
/// per-speaker directory keyed by `speaker_id`.
pub fn write_speaker_tracks(
    tracks: &[SpeakerTrack],
    sample_rate: u32,
    output_dir: &Path,
) -> Result<Vec<SpeakerArtifacts>> {
    let mut artifacts = Vec::with_capacity(tracks.len());

    for track in tracks {
        let speaker_dir = output_dir.join(sanitize_id(&track.speaker_id));
        if !speaker_dir.exists() {
            std::fs::create_dir_all(&speaker_dir)?;
        }

        let audio_path = speaker_dir.join("compact.wav");
        write_wav(&track.samples, sample_rate, &audio_path)?;

        let mapping_path = speaker_dir.join("time_map.json");
        let mapping_json = serde_json::to_string_pretty(&track.time_map)?;
        std::fs::write(&mapping_path, mapping_json)?;

        info!(
            "Wrote compact track for {} ({} samples, {} map entries)",
            track.speaker_id,
            track.samples.len(),
            track.time_map.len()
        );

        artifacts.push(SpeakerArtifacts {
            speaker_id: track.speaker_id.clone(),
            audio_path: audio_path.to_string_lossy().into_owned(),
            mapping_path: mapping_path.to_string_lossy().into_owned(),
        });
    }

    Ok(artifacts)
}

/// Write the refined timeline as a flat JSON array (diagnostic/intermediate).
pub fn write_refined_timeline(timeline: &[SpeakerTurn], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(timeline)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[derive(Serialize)]
struct ManifestEntry<'a> {
    audio_path: &'a str,
    mapping: &'a TimeMap,
}

/// Write the manifest mapping `speaker_id -> {audio_path, mapping}` so later
/// stages can do global-to-compact lookups without re-deriving the maps.
pub fn write_manifest(
    tracks: &[SpeakerTrack],
    artifacts: &[SpeakerArtifacts],
    path: &Path,
) -> Result<PathBuf> {
    let mut speakers = serde_json::Map::new();
    for (track, artifact) in tracks.iter().zip(artifacts.iter()) {
        speakers.insert(
            track.speaker_id.clone(),
            serde_json::to_value(ManifestEntry {
                audio_path: &artifact.audio_path,
                mapping: &track.time_map,
            })?,
        );
    }

    let manifest = json!({
        "version": "1.0",
        "created_at": Utc::now().to_rfc3339(),
        "speakers": speakers,
    });

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(&manifest)?)?;
    Ok(path.to_path_buf())
}

fn write_wav(samples: &[f32], sample_rate: u32, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample((sample * 32767.0).clamp(-32768.0, 32767.0) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}
