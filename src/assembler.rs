//! Inference request assembly.
//!
//! Turns a [`CustomerRecord`] into the exact feature row the model was trained
//! on and runs it through the scaler and the model:
//!
//! 1. Validate numeric ranges.
//! 2. Label-encode `Gender`.
//! 3. One-hot expand `Geography`.
//! 4. Concatenate scalar columns, then indicator columns.
//! 5. Standardize with the fitted scaler.
//! 6. Predict and label against the 0.5 threshold.
//!
//! Column order is checked once when the context is built. When the scaler
//! carries no column names only the width can be checked, and a reordered
//! schema goes unnoticed.

use crate::encoders::{CategoricalEncoder, LabelEncoder, OneHotEncoder};
use crate::errors::{AppError, ResultExt};
use crate::model::Predictor;
use crate::models::{CustomerRecord, FeatureVector, PredictionResult};
use crate::scaler::StandardScaler;

/// Scalar columns, in training order. Geography indicators follow them.
pub const BASE_COLUMNS: [&str; 9] = [
    "CreditScore",
    "Gender",
    "Age",
    "Tenure",
    "Balance",
    "NumOfProducts",
    "HasCrCard",
    "IsActiveMember",
    "EstimatedSalary",
];

/// Fitted artifacts plus the column layout derived from them.
///
/// Built once at startup and shared read-only.
pub struct InferenceContext {
    gender: LabelEncoder,
    geography: OneHotEncoder,
    scaler: StandardScaler,
    model: Box<dyn Predictor>,
    columns: Vec<String>,
}

impl std::fmt::Debug for InferenceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceContext")
            .field("columns", &self.columns)
            .field("model_input_dim", &self.model.input_dim())
            .finish()
    }
}

impl InferenceContext {
    /// Validates that the artifacts agree on the feature layout.
    pub fn new(
        gender: LabelEncoder,
        geography: OneHotEncoder,
        scaler: StandardScaler,
        model: Box<dyn Predictor>,
    ) -> Result<Self, AppError> {
        gender.validate()?;
        geography.validate()?;
        scaler.validate()?;

        let columns: Vec<String> = BASE_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(geography.feature_names_out())
            .collect();

        if scaler.n_features() != columns.len() {
            return Err(AppError::SchemaMismatch(format!(
                "scaler was fitted on {} columns, assembler produces {}",
                scaler.n_features(),
                columns.len()
            )));
        }

        if let Some(fitted) = &scaler.feature_names_in {
            if let Some((i, (want, got))) = fitted
                .iter()
                .zip(&columns)
                .enumerate()
                .find(|(_, (want, got))| want != got)
            {
                return Err(AppError::SchemaMismatch(format!(
                    "column {} is '{}' but the scaler was fitted with '{}'",
                    i, got, want
                )));
            }
        }

        if model.input_dim() != columns.len() {
            return Err(AppError::SchemaMismatch(format!(
                "model expects {} inputs, assembler produces {}",
                model.input_dim(),
                columns.len()
            )));
        }

        tracing::info!(
            "Inference context ready: {} columns ({} geography categories, {} gender classes)",
            columns.len(),
            geography.width(),
            gender.categories().len()
        );

        Ok(Self {
            gender,
            geography,
            scaler,
            model,
            columns,
        })
    }

    /// Assembled column names, in model input order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn gender_encoder(&self) -> &LabelEncoder {
        &self.gender
    }

    pub fn geography_encoder(&self) -> &OneHotEncoder {
        &self.geography
    }

    /// Builds the unscaled feature row for `record`.
    pub fn assemble(&self, record: &CustomerRecord) -> Result<FeatureVector, AppError> {
        record.validate()?;

        let gender_code = self.gender.encode(&record.gender)?;
        let geography = self.geography.one_hot(&record.geography)?;

        let mut values = Vec::with_capacity(self.columns.len());
        values.extend([
            f64::from(record.credit_score),
            gender_code as f64,
            f64::from(record.age),
            f64::from(record.tenure),
            record.balance,
            f64::from(record.num_of_products),
            f64::from(record.has_cr_card),
            f64::from(record.is_active_member),
            record.estimated_salary,
        ]);
        values.extend(geography);

        Ok(FeatureVector {
            columns: self.columns.clone(),
            values,
        })
    }

    /// Assembles and scales `record`, returning both rows.
    pub fn prepare(
        &self,
        record: &CustomerRecord,
    ) -> Result<(FeatureVector, Vec<f64>), AppError> {
        let raw = self.assemble(record)?;
        let scaled = self
            .scaler
            .transform(&raw.values)
            .context("scaling assembled features")?;
        Ok((raw, scaled))
    }

    /// Runs the full path for one record.
    pub fn predict(&self, record: &CustomerRecord) -> Result<PredictionResult, AppError> {
        let (_, scaled) = self.prepare(record)?;
        let raw = self
            .model
            .predict(&scaled)
            .with_context(|| format!("running churn model on {} features", scaled.len()))?;
        let result = PredictionResult::from_probability(raw)?;

        tracing::debug!(
            "Predicted churn probability {:.4} (will_churn={})",
            result.probability,
            result.will_churn
        );
        Ok(result)
    }

    /// Scores each record independently; one bad record does not stop the rest.
    pub fn predict_batch(
        &self,
        records: &[CustomerRecord],
    ) -> Vec<Result<PredictionResult, AppError>> {
        let results: Vec<_> = records.iter().map(|r| self.predict(r)).collect();
        let failures = results.iter().filter(|r| r.is_err()).count();
        if failures > 0 {
            tracing::warn!("{} of {} record(s) could not be scored", failures, records.len());
        }
        results
    }
}
