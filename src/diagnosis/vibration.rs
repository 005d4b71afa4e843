//! Vibration Synthesizer: presentation-only time series for client charts.
//!
//! Preferred path derives each point from the magnitude-dominant frequency
//! bin of an STFT frame. The closed-form fallback (sine plus bounded jitter)
//! never fails — it is the last line of defense against returning an empty
//! series. Nothing here feeds the health decision.

use rand::Rng;

use crate::config::defaults::VIBRATION_FRAME_SIZE;
use crate::features::dsp;
use crate::types::{AnalysisMode, PcmBuffer, VibrationPoint};

/// Synthesize the vibration series for a mode: 100 points for quick,
/// 300 for deep, on either path.
pub fn synthesize(pcm: Option<&PcmBuffer>, mode: AnalysisMode) -> Vec<VibrationPoint> {
    let num_points = mode.vibration_points();

    if let Some(pcm) = pcm {
        if let Some(points) = spectral_series(pcm, num_points) {
            return points;
        }
    }

    fallback_series(num_points)
}

/// Dominant-frequency series from real spectral data.
///
/// Returns `None` when the buffer is too short for even one STFT frame —
/// the caller falls back rather than erroring.
fn spectral_series(pcm: &PcmBuffer, num_points: usize) -> Option<Vec<VibrationPoint>> {
    if pcm.len() < VIBRATION_FRAME_SIZE || num_points == 0 {
        return None;
    }

    let hop = VIBRATION_FRAME_SIZE / 2;
    let magnitudes = dsp::stft_magnitudes(&pcm.samples, VIBRATION_FRAME_SIZE, hop);
    let n_frames = magnitudes.nrows();
    if n_frames == 0 {
        return None;
    }

    let freqs = dsp::bin_frequencies(VIBRATION_FRAME_SIZE, pcm.sample_rate);
    let frame_duration = hop as f64 / f64::from(pcm.sample_rate);

    // Normalize amplitudes against the global peak so the chart is scaled
    // to [0, 1] regardless of recording level.
    let global_peak = magnitudes.iter().copied().fold(0.0f32, f32::max).max(1e-10);

    let points = (0..num_points)
        .map(|i| {
            // Evenly spaced frame selection across the whole clip.
            let frame_idx = i * (n_frames - 1) / (num_points - 1).max(1);
            let frame = magnitudes.row(frame_idx);

            let (peak_bin, &peak_mag) = frame
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                .unwrap_or((0, &0.0));

            VibrationPoint {
                time: frame_idx as f64 * frame_duration,
                amplitude: f64::from(peak_mag / global_peak),
                frequency: f64::from(freqs[peak_bin]),
            }
        })
        .collect();

    Some(points)
}

/// Deterministic-shape closed-form series with small bounded jitter.
fn fallback_series(num_points: usize) -> Vec<VibrationPoint> {
    let mut rng = rand::thread_rng();

    (0..num_points)
        .map(|i| {
            let i = i as f64;
            VibrationPoint {
                time: (i * 0.01 * 10_000.0).round() / 10_000.0,
                amplitude: (i * 0.1).sin() + rng.gen::<f64>() * 0.3,
                frequency: 50.0 + (i * 0.05).sin() * 40.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone_buffer(freq: f32, sr: u32, n: usize) -> PcmBuffer {
        let samples = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sr as f32).sin())
            .collect();
        PcmBuffer::new(samples, sr)
    }

    #[test]
    fn test_point_budget_spectral_path() {
        let pcm = tone_buffer(440.0, 8000, 24_000);
        assert_eq!(synthesize(Some(&pcm), AnalysisMode::Quick).len(), 100);
        assert_eq!(synthesize(Some(&pcm), AnalysisMode::Deep).len(), 300);
    }

    #[test]
    fn test_point_budget_fallback_path() {
        assert_eq!(synthesize(None, AnalysisMode::Quick).len(), 100);
        assert_eq!(synthesize(None, AnalysisMode::Deep).len(), 300);
    }

    #[test]
    fn test_short_buffer_falls_back() {
        // Too short for one STFT frame; must still emit the full budget.
        let pcm = PcmBuffer::new(vec![0.1; 16], 8000);
        assert_eq!(synthesize(Some(&pcm), AnalysisMode::Quick).len(), 100);
    }

    #[test]
    fn test_spectral_path_tracks_dominant_tone() {
        let pcm = tone_buffer(1000.0, 8000, 24_000);
        let points = synthesize(Some(&pcm), AnalysisMode::Quick);
        // Every frame of a pure tone should land near 1 kHz.
        for p in &points {
            assert!((p.frequency - 1000.0).abs() < 50.0, "freq {}", p.frequency);
        }
    }

    #[test]
    fn test_fallback_values_bounded() {
        let points = fallback_series(300);
        for p in &points {
            assert!(p.amplitude >= -1.0 && p.amplitude <= 1.3);
            assert!(p.frequency >= 10.0 && p.frequency <= 90.0);
            assert!(p.time >= 0.0);
        }
    }

    #[test]
    fn test_spectral_amplitudes_normalized() {
        let pcm = tone_buffer(440.0, 8000, 24_000);
        let points = synthesize(Some(&pcm), AnalysisMode::Deep);
        for p in &points {
            assert!(p.amplitude >= 0.0 && p.amplitude <= 1.0 + 1e-9);
        }
    }
}
