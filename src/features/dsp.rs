//! Signal-processing primitives for feature extraction.
//!
//! STFT framing with a Hann window, mel filterbank, DCT-II, and the scalar
//! spectral summaries (centroid, rolloff, bandwidth, zero-crossing rate,
//! chroma, spectral contrast). Everything here is a pure function of its
//! input; all log/divide operations are epsilon-guarded so silent input
//! yields finite values.

use ndarray::{Array1, Array2, Axis};
use rustfft::{num_complex::Complex, FftPlanner};

/// Floor for logarithms and divisions on spectral energy.
const ENERGY_FLOOR: f32 = 1e-10;

/// Hann window of length `n`.
pub fn hann_window(n: usize) -> Array1<f32> {
    use std::f32::consts::PI;
    Array1::from_shape_fn(n, |i| {
        0.5 * (1.0 - (2.0 * PI * i as f32 / n as f32).cos())
    })
}

/// Short-time magnitude spectrogram.
///
/// Frames of `n_fft` samples spaced `hop` apart, Hann-windowed, no centering.
/// Returns `(n_frames, n_fft / 2 + 1)` magnitudes. The caller guarantees
/// `samples.len() >= n_fft`.
pub fn stft_magnitudes(samples: &[f32], n_fft: usize, hop: usize) -> Array2<f32> {
    let n_bins = n_fft / 2 + 1;
    let n_frames = if samples.len() < n_fft {
        0
    } else {
        (samples.len() - n_fft) / hop + 1
    };

    let window = hann_window(n_fft);
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);

    let mut magnitudes = Array2::zeros((n_frames, n_bins));
    let mut scratch = vec![Complex::new(0.0f32, 0.0); n_fft];

    for (frame_idx, mut row) in magnitudes.axis_iter_mut(Axis(0)).enumerate() {
        let start = frame_idx * hop;
        for (i, slot) in scratch.iter_mut().enumerate() {
            *slot = Complex::new(samples[start + i] * window[i], 0.0);
        }
        fft.process(&mut scratch);
        for (bin, out) in row.iter_mut().enumerate() {
            *out = scratch[bin].norm();
        }
    }

    magnitudes
}

/// Center frequency of each STFT bin in Hz.
pub fn bin_frequencies(n_fft: usize, sample_rate: u32) -> Array1<f32> {
    let n_bins = n_fft / 2 + 1;
    Array1::from_shape_fn(n_bins, |i| {
        i as f32 * sample_rate as f32 / n_fft as f32
    })
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank, `(n_mels, n_fft / 2 + 1)`.
pub fn mel_filterbank(n_mels: usize, n_fft: usize, sample_rate: u32) -> Array2<f32> {
    let n_bins = n_fft / 2 + 1;
    let f_max = sample_rate as f32 / 2.0;
    let mel_max = hz_to_mel(f_max);

    // n_mels + 2 equally spaced points on the mel scale.
    let mel_points: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
        .collect();

    let freqs = bin_frequencies(n_fft, sample_rate);
    let mut bank = Array2::zeros((n_mels, n_bins));

    for m in 0..n_mels {
        let (lo, center, hi) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
        for (bin, &f) in freqs.iter().enumerate() {
            let weight = if f > lo && f < center {
                (f - lo) / (center - lo).max(ENERGY_FLOOR)
            } else if f >= center && f < hi {
                (hi - f) / (hi - center).max(ENERGY_FLOOR)
            } else {
                0.0
            };
            bank[[m, bin]] = weight;
        }
    }

    bank
}

/// DCT-II basis matrix `(n_out, n_in)` with orthonormal scaling.
pub fn dct_ii_basis(n_out: usize, n_in: usize) -> Array2<f32> {
    use std::f32::consts::PI;
    let scale0 = (1.0 / n_in as f32).sqrt();
    let scale = (2.0 / n_in as f32).sqrt();
    Array2::from_shape_fn((n_out, n_in), |(k, n)| {
        let s = if k == 0 { scale0 } else { scale };
        s * (PI * (n as f32 + 0.5) * k as f32 / n_in as f32).cos()
    })
}

/// MFCC matrix `(n_mfcc, n_frames)` from mono PCM.
///
/// Log mel power spectrogram followed by a DCT-II along the mel axis.
pub fn mfcc(
    samples: &[f32],
    sample_rate: u32,
    n_mfcc: usize,
    n_mels: usize,
    n_fft: usize,
    hop: usize,
) -> Array2<f32> {
    let magnitudes = stft_magnitudes(samples, n_fft, hop);
    let power = magnitudes.mapv(|m| m * m);

    // (n_mels, n_frames) log mel power.
    let bank = mel_filterbank(n_mels, n_fft, sample_rate);
    let mel_power = bank.dot(&power.t());
    let log_mel = mel_power.mapv(|p| (p + ENERGY_FLOOR).ln());

    dct_ii_basis(n_mfcc, n_mels).dot(&log_mel)
}

/// Per-frame spectral centroid in Hz.
pub fn spectral_centroid(magnitudes: &Array2<f32>, freqs: &Array1<f32>) -> Array1<f32> {
    Array1::from_iter(magnitudes.axis_iter(Axis(0)).map(|frame| {
        let total: f32 = frame.sum();
        let weighted: f32 = frame
            .iter()
            .zip(freqs.iter())
            .map(|(&m, &f)| m * f)
            .sum();
        weighted / (total + ENERGY_FLOOR)
    }))
}

/// Per-frame spectral rolloff: lowest frequency below which `percent` of the
/// spectral energy is contained.
pub fn spectral_rolloff(
    magnitudes: &Array2<f32>,
    freqs: &Array1<f32>,
    percent: f32,
) -> Array1<f32> {
    Array1::from_iter(magnitudes.axis_iter(Axis(0)).map(|frame| {
        let threshold = percent * frame.sum();
        let mut cumulative = 0.0f32;
        for (bin, &m) in frame.iter().enumerate() {
            cumulative += m;
            if cumulative >= threshold {
                return freqs[bin];
            }
        }
        freqs[freqs.len() - 1]
    }))
}

/// Per-frame spectral bandwidth: magnitude-weighted standard deviation of
/// frequency around the centroid.
pub fn spectral_bandwidth(
    magnitudes: &Array2<f32>,
    freqs: &Array1<f32>,
    centroids: &Array1<f32>,
) -> Array1<f32> {
    Array1::from_iter(
        magnitudes
            .axis_iter(Axis(0))
            .zip(centroids.iter())
            .map(|(frame, &centroid)| {
                let total: f32 = frame.sum();
                let variance: f32 = frame
                    .iter()
                    .zip(freqs.iter())
                    .map(|(&m, &f)| m * (f - centroid).powi(2))
                    .sum();
                (variance / (total + ENERGY_FLOOR)).sqrt()
            }),
    )
}

/// Per-frame zero-crossing rate (fraction of adjacent sample pairs that
/// change sign), framed like the STFT.
pub fn zero_crossing_rate(samples: &[f32], frame_len: usize, hop: usize) -> Array1<f32> {
    let n_frames = if samples.len() < frame_len {
        0
    } else {
        (samples.len() - frame_len) / hop + 1
    };

    Array1::from_shape_fn(n_frames, |i| {
        let frame = &samples[i * hop..i * hop + frame_len];
        let crossings = frame
            .windows(2)
            .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
            .count();
        crossings as f32 / (frame_len - 1) as f32
    })
}

/// Mean chroma vector (12 pitch classes) over all frames.
///
/// Each bin's energy is folded onto its pitch class; frames are max-
/// normalized before averaging so loud frames do not dominate.
pub fn chroma_mean(magnitudes: &Array2<f32>, freqs: &Array1<f32>) -> Array1<f32> {
    let n_frames = magnitudes.nrows();
    let mut mean = Array1::zeros(12);
    if n_frames == 0 {
        return mean;
    }

    // Pitch class per bin; bins below the audible floor map to None.
    let classes: Vec<Option<usize>> = freqs
        .iter()
        .map(|&f| {
            if f < 20.0 {
                None
            } else {
                let midi = 69.0 + 12.0 * (f / 440.0).log2();
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                Some((midi.round() as i64).rem_euclid(12) as usize)
            }
        })
        .collect();

    for frame in magnitudes.axis_iter(Axis(0)) {
        let mut chroma = [0.0f32; 12];
        for (bin, &m) in frame.iter().enumerate() {
            if let Some(class) = classes[bin] {
                chroma[class] += m * m;
            }
        }
        let max = chroma.iter().copied().fold(0.0f32, f32::max);
        for (c, &v) in mean.iter_mut().zip(chroma.iter()) {
            *c += v / (max + ENERGY_FLOOR);
        }
    }

    mean.mapv_into(|v| v / n_frames as f32)
}

/// Mean spectral contrast over all frames for 7 octave bands.
///
/// Per band and frame: contrast = ln(peak energy) − ln(valley energy), where
/// peak/valley are the top/bottom 20% of sorted bin energies in the band.
pub fn spectral_contrast_mean(
    magnitudes: &Array2<f32>,
    freqs: &Array1<f32>,
    sample_rate: u32,
) -> Array1<f32> {
    let n_frames = magnitudes.nrows();
    let mut mean = Array1::zeros(7);
    if n_frames == 0 {
        return mean;
    }

    // Octave band edges: [0, 200), [200, 400), ... [6400, nyquist].
    let nyquist = sample_rate as f32 / 2.0;
    let mut edges = vec![0.0f32];
    for k in 0..6 {
        edges.push(200.0 * 2.0f32.powi(k));
    }
    edges.push(nyquist);

    let band_bins: Vec<Vec<usize>> = edges
        .windows(2)
        .map(|edge| {
            freqs
                .iter()
                .enumerate()
                .filter(|(_, &f)| f >= edge[0] && (f < edge[1] || edge[1] >= nyquist))
                .map(|(bin, _)| bin)
                .collect()
        })
        .collect();

    for frame in magnitudes.axis_iter(Axis(0)) {
        for (band, bins) in band_bins.iter().enumerate() {
            if bins.is_empty() {
                continue;
            }
            let mut energies: Vec<f32> = bins.iter().map(|&b| frame[b] * frame[b]).collect();
            energies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            let quantile = (energies.len() / 5).max(1);
            let valley: f32 =
                energies[..quantile].iter().sum::<f32>() / quantile as f32;
            let peak: f32 = energies[energies.len() - quantile..].iter().sum::<f32>()
                / quantile as f32;

            mean[band] += (peak + ENERGY_FLOOR).ln() - (valley + ENERGY_FLOOR).ln();
        }
    }

    mean.mapv_into(|v| v / n_frames as f32)
}

/// Mean of a 1-D array, 0.0 when empty.
pub fn mean(values: &Array1<f32>) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.sum() / values.len() as f32
    }
}

/// Population standard deviation of a 1-D array, 0.0 when empty.
pub fn std_dev(values: &Array1<f32>) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mu = mean(values);
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f32>() / values.len() as f32;
    variance.sqrt()
}
