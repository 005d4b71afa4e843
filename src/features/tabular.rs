//! Tabular feature strategy: one fixed-length statistic vector per clip.
//!
//! Field order is part of the model contract and must not change:
//!
//! | offset | len | field                     |
//! |--------|-----|---------------------------|
//! | 0      | 40  | MFCC per-coefficient mean |
//! | 40     | 40  | MFCC per-coefficient std  |
//! | 80     | 1   | spectral centroid mean    |
//! | 81     | 1   | spectral centroid std     |
//! | 82     | 1   | spectral rolloff mean     |
//! | 83     | 1   | spectral bandwidth mean   |
//! | 84     | 1   | zero-crossing rate mean   |
//! | 85     | 12  | chroma means              |
//! | 97     | 7   | spectral contrast means   |

use ndarray::{Array1, Axis};

use super::dsp;
use crate::config::defaults::{
    HOP_LENGTH, N_FFT, N_MELS, ROLLOFF_PERCENT, TABULAR_FEATURE_LEN, TABULAR_N_MFCC,
};
use crate::types::{FeatureTensor, PcmBuffer};

/// Compute the `(1, 104)` tabular statistic vector.
pub fn extract(pcm: &PcmBuffer) -> FeatureTensor {
    let samples = &pcm.samples;
    let sr = pcm.sample_rate;

    let coeffs = dsp::mfcc(samples, sr, TABULAR_N_MFCC, N_MELS, N_FFT, HOP_LENGTH);

    let magnitudes = dsp::stft_magnitudes(samples, N_FFT, HOP_LENGTH);
    let freqs = dsp::bin_frequencies(N_FFT, sr);

    let centroids = dsp::spectral_centroid(&magnitudes, &freqs);
    let rolloffs = dsp::spectral_rolloff(&magnitudes, &freqs, ROLLOFF_PERCENT);
    let bandwidths = dsp::spectral_bandwidth(&magnitudes, &freqs, &centroids);
    let zcr = dsp::zero_crossing_rate(samples, N_FFT, HOP_LENGTH);
    let chroma = dsp::chroma_mean(&magnitudes, &freqs);
    let contrast = dsp::spectral_contrast_mean(&magnitudes, &freqs, sr);

    let mut features: Vec<f32> = Vec::with_capacity(TABULAR_FEATURE_LEN);

    for row in coeffs.axis_iter(Axis(0)) {
        features.push(row.mean().unwrap_or(0.0));
    }
    for row in coeffs.axis_iter(Axis(0)) {
        features.push(row.std(0.0));
    }
    features.push(dsp::mean(&centroids));
    features.push(dsp::std_dev(&centroids));
    features.push(dsp::mean(&rolloffs));
    features.push(dsp::mean(&bandwidths));
    features.push(dsp::mean(&zcr));
    features.extend(chroma.iter());
    features.extend(contrast.iter());

    debug_assert_eq!(features.len(), TABULAR_FEATURE_LEN);

    let data = Array1::from_vec(features)
        .into_shape((1, TABULAR_FEATURE_LEN))
        .unwrap_or_else(|_| unreachable!("vector length is TABULAR_FEATURE_LEN by construction"))
        .into_dyn();

    FeatureTensor::new(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone_buffer(freq: f32, sr: u32, seconds: f64) -> PcmBuffer {
        let n = (seconds * f64::from(sr)) as usize;
        let samples = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sr as f32).sin())
            .collect();
        PcmBuffer::new(samples, sr)
    }

    #[test]
    fn test_tabular_shape() {
        let pcm = tone_buffer(440.0, 8000, 1.0);
        let tensor = extract(&pcm);
        assert_eq!(tensor.shape(), &[1, TABULAR_FEATURE_LEN]);
    }

    #[test]
    fn test_tabular_finite_for_silence() {
        let pcm = PcmBuffer::new(vec![0.0; 24_000], 8000);
        let tensor = extract(&pcm);
        assert!(tensor.is_finite());
    }

    #[test]
    fn test_tabular_deterministic() {
        let pcm = tone_buffer(440.0, 8000, 1.0);
        let a = extract(&pcm);
        let b = extract(&pcm);
        assert_eq!(a.data(), b.data());
    }
}
