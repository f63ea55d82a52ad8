//! Trained binary classifier.

use crate::errors::AppError;
use serde::{Deserialize, Serialize};

/// Anything that turns a scaled feature row into a churn score.
pub trait Predictor: Send + Sync {
    /// Width of the feature row the predictor accepts.
    fn input_dim(&self) -> usize;

    /// Raw model output for one row.
    fn predict(&self, features: &[f64]) -> Result<f64, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
        }
    }
}

/// Fully connected layer. `kernel` is `[inputs][units]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    pub fn inputs(&self) -> usize {
        self.kernel.len()
    }

    pub fn units(&self) -> usize {
        self.bias.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut out = self.bias.clone();
        for (x, row) in input.iter().zip(&self.kernel) {
            for (acc, w) in out.iter_mut().zip(row) {
                *acc += x * w;
            }
        }
        out.into_iter().map(|z| self.activation.apply(z)).collect()
    }
}

/// Feed-forward network of dense layers with a single output unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseNetwork {
    pub layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, AppError> {
        let network = Self { layers };
        network.validate()?;
        Ok(network)
    }

    /// Checks that layer shapes chain and end in one unit.
    pub fn validate(&self) -> Result<(), AppError> {
        let Some(last) = self.layers.last() else {
            return Err(AppError::Artifact("model has no layers".to_string()));
        };

        for (i, layer) in self.layers.iter().enumerate() {
            if layer.inputs() == 0 || layer.units() == 0 {
                return Err(AppError::Artifact(format!("layer {} is empty", i)));
            }
            if let Some(row) = layer.kernel.iter().find(|r| r.len() != layer.units()) {
                return Err(AppError::Artifact(format!(
                    "layer {} kernel row has {} weights, bias has {}",
                    i,
                    row.len(),
                    layer.units()
                )));
            }
            if layer
                .kernel
                .iter()
                .flatten()
                .chain(&layer.bias)
                .any(|w| !w.is_finite())
            {
                return Err(AppError::Artifact(format!(
                    "layer {} has non-finite weights",
                    i
                )));
            }
            if i > 0 && self.layers[i - 1].units() != layer.inputs() {
                return Err(AppError::Artifact(format!(
                    "layer {} expects {} inputs but layer {} produces {}",
                    i,
                    layer.inputs(),
                    i - 1,
                    self.layers[i - 1].units()
                )));
            }
        }

        if last.units() != 1 {
            return Err(AppError::Artifact(format!(
                "output layer must have 1 unit, has {}",
                last.units()
            )));
        }
        Ok(())
    }
}

impl Predictor for DenseNetwork {
    fn input_dim(&self) -> usize {
        self.layers.first().map(DenseLayer::inputs).unwrap_or(0)
    }

    fn predict(&self, features: &[f64]) -> Result<f64, AppError> {
        if features.len() != self.input_dim() {
            return Err(AppError::SchemaMismatch(format!(
                "model expects {} features, got {}",
                self.input_dim(),
                features.len()
            )));
        }

        let output = self
            .layers
            .iter()
            .fold(features.to_vec(), |activations, layer| layer.forward(&activations));

        output
            .first()
            .copied()
            .ok_or_else(|| AppError::InternalError("model produced no output".to_string()))
    }
}
