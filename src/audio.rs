// Sample-domain helpers shared by the merger, track builder, and enhancer.

/// Slice `[start, end)` seconds out of a sample buffer, clamped to the valid
/// range. Degenerate requests yield an empty slice.
pub fn sample_slice(audio: &[f32], sample_rate: u32, start: f64, end: f64) -> &[f32] {
    let len = audio.len();
    let sr = sample_rate as f64;
    let s = ((start.max(0.0) * sr) as usize).min(len);
    let e = ((end.max(0.0) * sr) as usize).min(len);
    if e <= s {
        &[]
    } else {
        &audio[s..e]
    }
}

/// Duration in seconds of a sample buffer.
pub fn samples_duration(len: usize, sample_rate: u32) -> f64 {
    len as f64 / sample_rate as f64
}
