// Target speaker enhancement
// Suppresses non-target speaker energy in overlapped chunks with a soft
// spectral gain driven by short-time embedding similarity against a cached
// per-speaker reference. Best-effort: callers fall back to the raw chunk on
// any failure.

pub mod spectral;

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::embedding::{cosine_similarity, normalize, EmbeddingExtractor};
use spectral::{istft, stft, HOP_LENGTH};

/// Configuration for target-speaker enhancement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancerConfig {
    /// Spacing of similarity scores along the chunk
    pub hop_ms: f64,
    /// Audio window fed to the embedding extractor per score
    pub score_window_ms: f64,
    /// Moving-average width applied to the score sequence
    pub smoothing_ms: f64,
    /// Steepness of the similarity-to-gain sigmoid
    pub temperature: f32,
    /// Similarity mapped to a gain of 0.5
    pub similarity_threshold: f32,
    /// Gain floor, in dB, so the signal is never fully suppressed
    pub min_gain_db: f32,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            hop_ms: 50.0,
            score_window_ms: 400.0,
            smoothing_ms: 150.0,
            temperature: 8.0,
            similarity_threshold: 0.5,
            min_gain_db: -18.0,
        }
    }
}

/// Diagnostics of the most recent enhancement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MaskStats {
    pub mask_mean: f32,
    pub mask_std: f32,
}

/// Applies a per-frame spectral gain that favors one target speaker.
///
/// The reference embedding for each speaker is derived once, from the center
/// 1-3 seconds of that speaker's first-seen chunk, and cached for the rest
/// of the run (fetch-or-initialize under a lock; written at most once per
/// speaker).
pub struct TargetSpeakerEnhancer<'a> {
    extractor: &'a dyn EmbeddingExtractor,
    config: EnhancerConfig,
    references: Mutex<HashMap<String, Vec<f32>>>,
    last_stats: Mutex<Option<MaskStats>>,
}

impl<'a> TargetSpeakerEnhancer<'a> {
    pub fn new(extractor: &'a dyn EmbeddingExtractor, config: EnhancerConfig) -> Self {
        Self {
            extractor,
            config,
            references: Mutex::new(HashMap::new()),
            last_stats: Mutex::new(None),
        }
    }

    /// Mask statistics of the latest `enhance` call.
    pub fn last_stats(&self) -> Option<MaskStats> {
        *self.last_stats.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enhance one overlapped chunk. Output length always equals input
    /// length.
    pub fn enhance(&self, chunk: &[f32], sample_rate: u32, speaker_id: &str) -> Result<Vec<f32>> {
        if chunk.is_empty() {
            return Ok(Vec::new());
        }

        let reference = self.reference_for(speaker_id, chunk, sample_rate)?;

        let scores = self.hop_scores(chunk, sample_rate, &reference);
        let smoothed = moving_average(&scores, self.smoothing_hops());

        let mut spec = stft(chunk)?;
        let num_frames = spec.num_frames();
        let floor = 10f32.powf(self.config.min_gain_db / 20.0);
        let hop_s = self.config.hop_ms / 1000.0;

        // One scalar gain per frame, interpolated from the hop-score axis and
        // applied across all frequency bins.
        let mut gains = Vec::with_capacity(num_frames);
        for frame_idx in 0..num_frames {
            let t = (frame_idx * HOP_LENGTH) as f64 / sample_rate as f64;
            let gain = interpolate(&smoothed, t / hop_s).max(floor);
            for k in 0..spec.magnitudes.shape()[1] {
                spec.magnitudes[[frame_idx, k]] *= gain;
            }
            gains.push(gain);
        }

        let out = istft(&spec, chunk.len())?;

        let mean = gains.iter().sum::<f32>() / gains.len() as f32;
        let var = gains.iter().map(|g| (g - mean) * (g - mean)).sum::<f32>() / gains.len() as f32;
        *self.last_stats.lock().unwrap_or_else(|e| e.into_inner()) = Some(MaskStats {
            mask_mean: mean,
            mask_std: var.sqrt(),
        });

        Ok(out)
    }

    /// Fetch the cached reference embedding for a speaker, deriving it from
    /// the center 1-3 seconds of this chunk on first sight.
    fn reference_for(
        &self,
        speaker_id: &str,
        chunk: &[f32],
        sample_rate: u32,
    ) -> Result<Vec<f32>> {
        let mut references = self
            .references
            .lock()
            .map_err(|_| anyhow!("reference cache poisoned"))?;

        if let Some(reference) = references.get(speaker_id) {
            return Ok(reference.clone());
        }

        let duration = chunk.len() as f64 / sample_rate as f64;
        let target = duration.min(3.0).max(1.0).min(duration);
        let target_samples = ((target * sample_rate as f64) as usize).min(chunk.len()).max(1);
        let offset = (chunk.len() - target_samples) / 2;
        let center = &chunk[offset..offset + target_samples];

        let mut reference = self.extractor.embed(center, sample_rate)?;
        normalize(&mut reference);
        debug!(
            "Cached reference embedding for {} from {:.2}s of audio",
            speaker_id, target
        );
        references.insert(speaker_id.to_string(), reference.clone());
        Ok(reference)
    }

    /// Similarity-derived gain in (0,1) every `hop_ms` along the chunk.
    fn hop_scores(&self, chunk: &[f32], sample_rate: u32, reference: &[f32]) -> Vec<f32> {
        let sr = sample_rate as f64;
        let hop = ((self.config.hop_ms / 1000.0 * sr) as usize).max(1);
        let win = ((self.config.score_window_ms / 1000.0 * sr) as usize).max(hop);

        let mut scores = Vec::new();
        let mut pos = 0usize;
        let mut last_similarity = 1.0f32;
        while pos < chunk.len() {
            let clip = &chunk[pos..(pos + win).min(chunk.len())];
            let similarity = match self.extractor.embed(clip, sample_rate) {
                Ok(embedding) => {
                    let s = cosine_similarity(&embedding, reference);
                    last_similarity = s;
                    s
                }
                // Per-hop failures carry the previous score forward
                Err(e) => {
                    debug!("Hop embedding failed at sample {}: {}", pos, e);
                    last_similarity
                }
            };
            scores.push(sigmoid(
                self.config.temperature * (similarity - self.config.similarity_threshold),
            ));
            pos += hop;
        }

        if scores.is_empty() {
            scores.push(1.0);
        }
        scores
    }

    fn smoothing_hops(&self) -> usize {
        ((self.config.smoothing_ms / self.config.hop_ms).round() as usize).max(1)
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Moving average with a window clamped at the sequence edges.
fn moving_average(values: &[f32], width: usize) -> Vec<f32> {
    let half = width / 2;
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(values.len());
            values[start..end].iter().sum::<f32>() / (end - start) as f32
        })
        .collect()
}

/// Piecewise-linear interpolation over a score sequence, clamped at both
/// ends.
fn interpolate(values: &[f32], position: f64) -> f32 {
    if values.is_empty() {
        return 1.0;
    }
    if position <= 0.0 {
        return values[0];
    }
    let last = values.len() - 1;
    if position >= last as f64 {
        return values[last];
    }
    let lo = position.floor() as usize;
    let frac = (position - lo as f64) as f32;
    values[lo] * (1.0 - frac) + values[lo + 1] * frac
}
