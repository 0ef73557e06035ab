// Spectral operations for target-speaker enhancement
// Forward/inverse STFT on top of realfft, magnitude/phase split so gains can
// be applied to magnitude while the original phase is kept.

use anyhow::Result;
use ndarray::Array2;
use realfft::num_complex::Complex32;
use realfft::RealFftPlanner;
use std::f32::consts::PI;

pub const N_FFT: usize = 512;
pub const HOP_LENGTH: usize = 128;

/// Generate Hann window
pub fn hann_window(window_length: usize) -> Vec<f32> {
    (0..window_length)
        .map(|i| 0.5 - 0.5 * ((2.0 * PI * i as f32) / window_length as f32).cos())
        .collect()
}

/// Time-frequency representation: `(frames, bins)` magnitude and phase.
pub struct Spectrogram {
    pub magnitudes: Array2<f32>,
    pub phases: Array2<f32>,
}

impl Spectrogram {
    pub fn num_frames(&self) -> usize {
        self.magnitudes.shape()[0]
    }
}

/// Short-time Fourier transform. The input is zero-padded at the tail so the
/// last samples are always covered by a frame.
pub fn stft(samples: &[f32]) -> Result<Spectrogram> {
    let mut planner = RealFftPlanner::<f32>::new();
    let r2c = planner.plan_fft_forward(N_FFT);

    let hann = hann_window(N_FFT);
    let freq_bins = N_FFT / 2 + 1;

    let mut padded = samples.to_vec();
    padded.extend(vec![0.0f32; N_FFT]);
    let num_frames = (padded.len() - N_FFT) / HOP_LENGTH + 1;

    let mut magnitudes = Array2::<f32>::zeros((num_frames, freq_bins));
    let mut phases = Array2::<f32>::zeros((num_frames, freq_bins));

    let mut indata = r2c.make_input_vec();
    let mut spectrum = r2c.make_output_vec();

    for frame_idx in 0..num_frames {
        let start = frame_idx * HOP_LENGTH;
        for i in 0..N_FFT {
            indata[i] = padded[start + i] * hann[i];
        }
        r2c.process(&mut indata, &mut spectrum)?;
        for k in 0..freq_bins {
            magnitudes[[frame_idx, k]] = spectrum[k].norm();
            phases[[frame_idx, k]] = spectrum[k].arg();
        }
    }

    Ok(Spectrogram { magnitudes, phases })
}

/// Inverse STFT by windowed overlap-add, truncated or zero-padded to exactly
/// `out_len` samples.
pub fn istft(spec: &Spectrogram, out_len: usize) -> Result<Vec<f32>> {
    let num_frames = spec.num_frames();
    let freq_bins = N_FFT / 2 + 1;

    let mut planner = RealFftPlanner::<f32>::new();
    let c2r = planner.plan_fft_inverse(N_FFT);
    let hann = hann_window(N_FFT);

    let padded_len = if num_frames == 0 {
        0
    } else {
        (num_frames - 1) * HOP_LENGTH + N_FFT
    };
    let mut out = vec![0.0f32; padded_len];
    let mut window_sum = vec![0.0f32; padded_len];

    let mut spectrum = c2r.make_input_vec();
    let mut frame = c2r.make_output_vec();

    for frame_idx in 0..num_frames {
        for k in 0..freq_bins {
            spectrum[k] = Complex32::from_polar(
                spec.magnitudes[[frame_idx, k]],
                spec.phases[[frame_idx, k]],
            );
        }
        // realfft requires purely real DC and Nyquist bins
        spectrum[0].im = 0.0;
        spectrum[freq_bins - 1].im = 0.0;

        c2r.process(&mut spectrum, &mut frame)?;

        let start = frame_idx * HOP_LENGTH;
        for i in 0..N_FFT {
            // realfft's inverse is unnormalized
            let sample = frame[i] / N_FFT as f32;
            out[start + i] += sample * hann[i];
            window_sum[start + i] += hann[i] * hann[i];
        }
    }

    for (sample, wsum) in out.iter_mut().zip(window_sum.iter()) {
        if *wsum > 1e-8 {
            *sample /= *wsum;
        }
    }

    out.resize(out_len, 0.0);
    Ok(out)
}
