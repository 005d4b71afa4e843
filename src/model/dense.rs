//! Dense-network model adapter.
//!
//! Loads a small fully connected classifier from a JSON weight file and
//! evaluates it with ndarray. The file format:
//!
//! ```json
//! {
//!   "input_shape": [1, 104],
//!   "layers": [
//!     { "weights": [[...], ...], "bias": [...], "activation": "relu" },
//!     { "weights": [[...], ...], "bias": [...], "activation": "softmax" }
//!   ]
//! }
//! ```
//!
//! `weights` is row-major `(in_dim, out_dim)`. Consistency is checked once
//! at load; a malformed file is a fatal startup error.

use ndarray::{Array1, Array2};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use super::{check_input_shape, Predictor};
use crate::error::{AnalysisError, ModelLoadError};
use crate::types::FeatureTensor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Activation {
    Linear,
    Relu,
    Softmax,
}

#[derive(Debug, Deserialize)]
struct LayerSpec {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
    activation: Activation,
}

#[derive(Debug, Deserialize)]
struct ModelSpec {
    input_shape: Vec<usize>,
    layers: Vec<LayerSpec>,
}

struct Layer {
    weights: Array2<f32>,
    bias: Array1<f32>,
    activation: Activation,
}

/// Fully connected classifier evaluated on the CPU.
pub struct DenseModel {
    input_shape: Vec<usize>,
    layers: Vec<Layer>,
    output_len: usize,
}

impl DenseModel {
    /// Load and validate a weight file. Any inconsistency is fatal.
    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let spec: ModelSpec =
            serde_json::from_str(&contents).map_err(|source| ModelLoadError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        let model = Self::from_spec(spec)?;

        info!(
            path = %path.display(),
            input_shape = ?model.input_shape,
            classes = model.output_len,
            layers = model.layers.len(),
            "Model loaded"
        );

        Ok(model)
    }

    fn from_spec(spec: ModelSpec) -> Result<Self, ModelLoadError> {
        if spec.layers.is_empty() {
            return Err(ModelLoadError::Inconsistent(
                "model has no layers".to_string(),
            ));
        }
        if spec.input_shape.is_empty() || spec.input_shape[0] != 1 {
            return Err(ModelLoadError::Inconsistent(format!(
                "input_shape must start with a batch dimension of 1, got {:?}",
                spec.input_shape
            )));
        }

        let flat_input: usize = spec.input_shape.iter().product();
        let mut expected_in = flat_input;
        let mut layers = Vec::with_capacity(spec.layers.len());

        for (idx, layer) in spec.layers.into_iter().enumerate() {
            let in_dim = layer.weights.len();
            if in_dim != expected_in {
                return Err(ModelLoadError::Inconsistent(format!(
                    "layer {idx}: expected {expected_in} input rows, got {in_dim}"
                )));
            }
            let out_dim = layer.weights.first().map_or(0, Vec::len);
            if out_dim == 0 {
                return Err(ModelLoadError::Inconsistent(format!(
                    "layer {idx}: empty weight matrix"
                )));
            }
            if layer.weights.iter().any(|row| row.len() != out_dim) {
                return Err(ModelLoadError::Inconsistent(format!(
                    "layer {idx}: ragged weight rows"
                )));
            }
            if layer.bias.len() != out_dim {
                return Err(ModelLoadError::Inconsistent(format!(
                    "layer {idx}: bias length {} != output dim {out_dim}",
                    layer.bias.len()
                )));
            }

            let flat: Vec<f32> = layer.weights.into_iter().flatten().collect();
            let weights = Array2::from_shape_vec((in_dim, out_dim), flat).map_err(|e| {
                ModelLoadError::Inconsistent(format!("layer {idx}: {e}"))
            })?;

            layers.push(Layer {
                weights,
                bias: Array1::from_vec(layer.bias),
                activation: layer.activation,
            });
            expected_in = out_dim;
        }

        Ok(Self {
            input_shape: spec.input_shape,
            output_len: expected_in,
            layers,
        })
    }
}

fn softmax(x: &mut Array1<f32>) {
    // Shift by the max for numerical stability.
    let max = x.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    x.mapv_inplace(|v| (v - max).exp());
    let sum = x.sum();
    if sum > 0.0 {
        x.mapv_inplace(|v| v / sum);
    }
}

impl Predictor for DenseModel {
    fn expected_input_shape(&self) -> &[usize] {
        &self.input_shape
    }

    fn output_len(&self) -> usize {
        self.output_len
    }

    fn predict(&self, features: &FeatureTensor) -> Result<Vec<f32>, AnalysisError> {
        check_input_shape(&self.input_shape, features)?;

        let flat = features.as_flat_slice().ok_or_else(|| {
            AnalysisError::FeatureExtraction(
                "feature tensor is not contiguous in memory".to_string(),
            )
        })?;

        let mut x = Array1::from_vec(flat.to_vec());
        for layer in &self.layers {
            let mut out = x.dot(&layer.weights) + &layer.bias;
            match layer.activation {
                Activation::Linear => {}
                Activation::Relu => out.mapv_inplace(|v| v.max(0.0)),
                Activation::Softmax => softmax(&mut out),
            }
            x = out;
        }

        Ok(x.to_vec())
    }
}
