//! Per-column standardization fitted at training time.

use crate::errors::AppError;
use serde::{Deserialize, Serialize};

/// Fitted affine transform: `(x - mean) / scale`, column by column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    /// Column names seen at fit time, when the scaler was fitted on a named table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names_in: Option<Vec<String>>,
}

impl StandardScaler {
    pub fn new(
        mean: Vec<f64>,
        scale: Vec<f64>,
        feature_names_in: Option<Vec<String>>,
    ) -> Result<Self, AppError> {
        let scaler = Self {
            mean,
            scale,
            feature_names_in,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Pass-through scaler of width `n` (mean 0, scale 1).
    pub fn identity(n: usize) -> Self {
        Self {
            mean: vec![0.0; n],
            scale: vec![1.0; n],
            feature_names_in: None,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.mean.is_empty() {
            return Err(AppError::Artifact("scaler has no columns".to_string()));
        }
        if self.mean.len() != self.scale.len() {
            return Err(AppError::Artifact(format!(
                "scaler mean has {} columns but scale has {}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if let Some(names) = &self.feature_names_in {
            if names.len() != self.mean.len() {
                return Err(AppError::Artifact(format!(
                    "scaler lists {} feature names for {} columns",
                    names.len(),
                    self.mean.len()
                )));
            }
        }
        if let Some(i) = self.mean.iter().position(|m| !m.is_finite()) {
            return Err(AppError::Artifact(format!(
                "scaler mean for column {} is not finite",
                i
            )));
        }
        if let Some(i) = self
            .scale
            .iter()
            .position(|s| !s.is_finite() || *s == 0.0)
        {
            return Err(AppError::Artifact(format!(
                "scaler scale for column {} must be finite and non-zero",
                i
            )));
        }
        Ok(())
    }

    /// Number of columns the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardizes one row.
    ///
    /// A row whose width differs from the fitted width is an integration
    /// error and fails with [`AppError::SchemaMismatch`].
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, AppError> {
        if row.len() != self.n_features() {
            return Err(AppError::SchemaMismatch(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                row.len()
            )));
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }
}
