//! Image feature strategy: a z-scored 128×128 MFCC "image" for
//! convolutional models.
//!
//! The MFCC matrix is normalized over all elements (`(x − mean) / (std + ε)`)
//! and area-average resized to a fixed square grid, then given a trailing
//! channel dimension and a leading batch dimension of size 1.

use ndarray::{Array2, ArrayD, Axis, IxDyn};

use super::dsp;
use crate::config::defaults::{HOP_LENGTH, IMAGE_SIZE, N_FFT, N_MELS, NORM_EPSILON};
use crate::types::{FeatureTensor, PcmBuffer};

/// Compute the `(1, 128, 128, 1)` normalized MFCC image.
pub fn extract(pcm: &PcmBuffer) -> FeatureTensor {
    let coeffs = dsp::mfcc(
        &pcm.samples,
        pcm.sample_rate,
        IMAGE_SIZE,
        N_MELS,
        N_FFT,
        HOP_LENGTH,
    );

    let normalized = z_score(&coeffs);
    let resized = resize_area(&normalized, IMAGE_SIZE, IMAGE_SIZE);

    // (N, N) -> (1, N, N, 1): leading batch, trailing channel.
    let mut data = ArrayD::zeros(IxDyn(&[1, IMAGE_SIZE, IMAGE_SIZE, 1]));
    for ((r, c), &v) in resized.indexed_iter() {
        data[[0, r, c, 0]] = v;
    }

    FeatureTensor::new(data)
}

/// Z-score normalize over every element. The ε term keeps silent or
/// constant input finite.
fn z_score(matrix: &Array2<f32>) -> Array2<f32> {
    let mean = matrix.mean().unwrap_or(0.0);
    let std = matrix.std(0.0);
    matrix.mapv(|v| (v - mean) / (std + NORM_EPSILON))
}

/// Area-averaging resize (the equivalent of OpenCV's INTER_AREA), applied
/// separably: rows first, then columns. Each output cell is the average of
/// the input span it covers, with fractional edge pixels weighted by
/// coverage. Exact for downscaling; degrades to linear box sampling when
/// upscaling.
fn resize_area(input: &Array2<f32>, out_rows: usize, out_cols: usize) -> Array2<f32> {
    let rows_resized = resample_axis(input, out_rows, Axis(0));
    resample_axis(&rows_resized, out_cols, Axis(1))
}

/// Resample one axis to `out_len` by area averaging.
fn resample_axis(input: &Array2<f32>, out_len: usize, axis: Axis) -> Array2<f32> {
    let in_len = input.len_of(axis);
    let other_len = input.len_of(if axis == Axis(0) { Axis(1) } else { Axis(0) });

    let shape = if axis == Axis(0) {
        (out_len, other_len)
    } else {
        (other_len, out_len)
    };
    let mut output = Array2::zeros(shape);

    if in_len == 0 {
        return output;
    }

    let scale = in_len as f64 / out_len as f64;

    for out_idx in 0..out_len {
        let span_start = out_idx as f64 * scale;
        let span_end = span_start + scale;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let first = span_start.floor() as usize;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let last = (span_end.ceil() as usize).min(in_len);

        for other in 0..other_len {
            let mut acc = 0.0f64;
            for in_idx in first..last {
                // Fractional coverage of this input cell by the output span.
                let cell_start = in_idx as f64;
                let cell_end = cell_start + 1.0;
                let overlap = span_end.min(cell_end) - span_start.max(cell_start);
                if overlap <= 0.0 {
                    continue;
                }
                let v = if axis == Axis(0) {
                    input[[in_idx, other]]
                } else {
                    input[[other, in_idx]]
                };
                acc += f64::from(v) * overlap;
            }
            let averaged = (acc / scale) as f32;
            if axis == Axis(0) {
                output[[out_idx, other]] = averaged;
            } else {
                output[[other, out_idx]] = averaged;
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_shape() {
        let pcm = PcmBuffer::new(vec![0.1; 24_000], 8000);
        let tensor = extract(&pcm);
        assert_eq!(tensor.shape(), &[1, IMAGE_SIZE, IMAGE_SIZE, 1]);
    }

    #[test]
    fn test_image_finite_for_silence() {
        let pcm = PcmBuffer::new(vec![0.0; 24_000], 8000);
        let tensor = extract(&pcm);
        assert!(tensor.is_finite());
    }

    #[test]
    fn test_z_score_of_constant_matrix_is_zero() {
        let matrix = Array2::from_elem((4, 4), 3.0f32);
        let normed = z_score(&matrix);
        assert!(normed.iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn test_resize_downscale_preserves_mean() {
        let input = Array2::from_shape_fn((8, 8), |(r, c)| (r * 8 + c) as f32);
        let resized = resize_area(&input, 4, 4);
        assert_eq!(resized.shape(), &[4, 4]);
        let in_mean = input.mean().unwrap();
        let out_mean = resized.mean().unwrap();
        assert!((in_mean - out_mean).abs() < 1e-3);
    }

    #[test]
    fn test_resize_identity() {
        let input = Array2::from_shape_fn((5, 7), |(r, c)| (r * 7 + c) as f32);
        let resized = resize_area(&input, 5, 7);
        for ((r, c), &v) in input.indexed_iter() {
            assert!((resized[[r, c]] - v).abs() < 1e-4);
        }
    }

    #[test]
    fn test_resize_upscale_exact_length() {
        let input = Array2::from_shape_fn((3, 3), |(r, c)| (r + c) as f32);
        let resized = resize_area(&input, 9, 9);
        assert_eq!(resized.shape(), &[9, 9]);
        assert!(resized.iter().all(|v| v.is_finite()));
    }
}
