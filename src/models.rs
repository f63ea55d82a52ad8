use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Decision threshold on the churn probability. Churn iff strictly above.
pub const CHURN_THRESHOLD: f64 = 0.5;

pub const LIKELY_TO_CHURN: &str = "The customer is likely to churn.";
pub const NOT_LIKELY_TO_CHURN: &str = "The customer is not likely to churn.";

// ============ Request Models ============

/// One customer as submitted through the form or the JSON API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerRecord {
    /// Credit score, 0-1000.
    pub credit_score: u32,
    /// Country, one of the fitted geography categories.
    pub geography: String,
    /// One of the fitted gender classes.
    pub gender: String,
    /// Age in years, 18-92.
    pub age: u32,
    /// Years as a customer, 0-10.
    pub tenure: u32,
    /// Account balance.
    pub balance: f64,
    /// Products held, 1-4.
    pub num_of_products: u32,
    /// 0 or 1.
    pub has_cr_card: u8,
    /// 0 or 1.
    pub is_active_member: u8,
    /// Estimated yearly salary.
    pub estimated_salary: f64,
}

impl Default for CustomerRecord {
    /// Initial values of the input form.
    fn default() -> Self {
        Self {
            credit_score: 600,
            geography: String::new(),
            gender: String::new(),
            age: 30,
            tenure: 3,
            balance: 0.0,
            num_of_products: 1,
            has_cr_card: 0,
            is_active_member: 0,
            estimated_salary: 0.0,
        }
    }
}

impl CustomerRecord {
    /// Checks the numeric fields against the ranges the form allows.
    ///
    /// Categorical fields are checked by the encoders.
    pub fn validate(&self) -> Result<(), AppError> {
        check_range("CreditScore", self.credit_score, 0, 1000)?;
        check_range("Age", self.age, 18, 92)?;
        check_range("Tenure", self.tenure, 0, 10)?;
        check_range("NumOfProducts", self.num_of_products, 1, 4)?;
        check_flag("HasCrCard", self.has_cr_card)?;
        check_flag("IsActiveMember", self.is_active_member)?;
        check_amount("Balance", self.balance)?;
        check_amount("EstimatedSalary", self.estimated_salary)?;
        Ok(())
    }
}

fn check_range(field: &str, value: u32, min: u32, max: u32) -> Result<(), AppError> {
    if value < min || value > max {
        return Err(AppError::BadRequest(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        )));
    }
    Ok(())
}

fn check_flag(field: &str, value: u8) -> Result<(), AppError> {
    if value > 1 {
        return Err(AppError::BadRequest(format!(
            "{} must be 0 or 1, got {}",
            field, value
        )));
    }
    Ok(())
}

fn check_amount(field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::BadRequest(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(())
}

/// A JSON document holding either one record or an array of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CustomerRecords {
    Many(Vec<CustomerRecord>),
    One(CustomerRecord),
}

impl CustomerRecords {
    pub fn into_vec(self) -> Vec<CustomerRecord> {
        match self {
            CustomerRecords::Many(records) => records,
            CustomerRecords::One(record) => vec![record],
        }
    }
}

/// Parses a record file for batch scoring.
pub fn parse_records(json: &str) -> Result<Vec<CustomerRecord>, serde_json::Error> {
    serde_json::from_str::<CustomerRecords>(json).map(CustomerRecords::into_vec)
}

// ============ Inference Models ============

/// Assembled model input in training-time column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub columns: Vec<String>,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named column.
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }
}

/// Churn probability and the label derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub probability: f64,
    pub will_churn: bool,
}

impl PredictionResult {
    /// Labels a model output.
    ///
    /// Output is clamped into [0, 1]; a non-finite output is an error.
    pub fn from_probability(raw: f64) -> Result<Self, AppError> {
        if !raw.is_finite() {
            return Err(AppError::InternalError(format!(
                "model returned non-finite output {}",
                raw
            )));
        }
        let probability = raw.clamp(0.0, 1.0);
        Ok(Self {
            probability,
            will_churn: probability > CHURN_THRESHOLD,
        })
    }

    pub fn label(&self) -> &'static str {
        if self.will_churn {
            "churn"
        } else {
            "no_churn"
        }
    }

    pub fn message(&self) -> &'static str {
        if self.will_churn {
            LIKELY_TO_CHURN
        } else {
            NOT_LIKELY_TO_CHURN
        }
    }

    /// Probability as displayed to users, two decimals.
    pub fn display_probability(&self) -> String {
        format!("{:.2}", self.probability)
    }
}

// ============ API Response Models ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub probability: f64,
    pub will_churn: bool,
    pub label: String,
    pub message: String,
    pub predicted_at: DateTime<Utc>,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            probability: result.probability,
            will_churn: result.will_churn,
            label: result.label().to_string(),
            message: result.message().to_string(),
            predicted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesResponse {
    pub columns: Vec<String>,
    pub raw: Vec<f64>,
    pub scaled: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub columns: Vec<String>,
    pub gender_classes: Vec<String>,
    pub geography_categories: Vec<String>,
    pub threshold: f64,
    pub artifacts_dir: String,
    pub artifacts: Vec<ArtifactFingerprint>,
}

/// SHA-256 of an artifact file as loaded at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactFingerprint {
    pub name: String,
    pub path: String,
    pub sha256: String,
}
