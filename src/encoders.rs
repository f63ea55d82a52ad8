//! Fitted categorical encoders.
//!
//! Both encoder kinds expose the same two capabilities through
//! [`CategoricalEncoder`]: the ordered category set they were fitted on, and
//! the integer code of a category within that set.

use crate::errors::AppError;
use serde::{Deserialize, Serialize};

/// A categorical encoder fitted on a fixed, ordered category set.
pub trait CategoricalEncoder {
    /// Input column this encoder was fitted on (e.g. `Gender`).
    fn field(&self) -> &str;

    /// Fitted categories, in code order.
    fn categories(&self) -> &[String];

    /// Integer code of `category`.
    ///
    /// Fails with [`AppError::UnknownCategory`] when the category was not seen
    /// at fit time.
    fn encode(&self, category: &str) -> Result<usize, AppError> {
        self.categories()
            .iter()
            .position(|c| c == category)
            .ok_or_else(|| AppError::UnknownCategory {
                field: self.field().to_string(),
                value: category.to_string(),
            })
    }
}

/// Maps each class to its index in the sorted class list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    #[serde(default = "default_label_field")]
    pub field: String,
    pub classes: Vec<String>,
}

fn default_label_field() -> String {
    "Gender".to_string()
}

impl LabelEncoder {
    /// Builds an encoder from fitted classes.
    ///
    /// Classes must be non-empty, unique and sorted, which is how they are
    /// stored after fitting.
    pub fn new(field: impl Into<String>, classes: Vec<String>) -> Result<Self, AppError> {
        let encoder = Self {
            field: field.into(),
            classes,
        };
        encoder.validate()?;
        Ok(encoder)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.classes.is_empty() {
            return Err(AppError::Artifact(format!(
                "label encoder for {} has no classes",
                self.field
            )));
        }
        if self.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AppError::Artifact(format!(
                "label encoder classes for {} must be sorted and unique: {:?}",
                self.field, self.classes
            )));
        }
        Ok(())
    }
}

impl CategoricalEncoder for LabelEncoder {
    fn field(&self) -> &str {
        &self.field
    }

    fn categories(&self) -> &[String] {
        &self.classes
    }

    fn encode(&self, category: &str) -> Result<usize, AppError> {
        // classes are sorted, see validate()
        self.classes
            .binary_search_by(|c| c.as_str().cmp(category))
            .map_err(|_| AppError::UnknownCategory {
                field: self.field.clone(),
                value: category.to_string(),
            })
    }
}

/// What a one-hot encoder does with a category it was not fitted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    /// Reject the value.
    #[default]
    Error,
    /// Emit an all-zero indicator segment.
    Ignore,
}

/// Expands a single categorical column into one indicator column per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    #[serde(default = "default_onehot_field")]
    pub feature: String,
    pub categories: Vec<String>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

fn default_onehot_field() -> String {
    "Geography".to_string()
}

impl OneHotEncoder {
    pub fn new(
        feature: impl Into<String>,
        categories: Vec<String>,
        handle_unknown: HandleUnknown,
    ) -> Result<Self, AppError> {
        let encoder = Self {
            feature: feature.into(),
            categories,
            handle_unknown,
        };
        encoder.validate()?;
        Ok(encoder)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.categories.is_empty() {
            return Err(AppError::Artifact(format!(
                "one-hot encoder for {} has no categories",
                self.feature
            )));
        }
        for (i, category) in self.categories.iter().enumerate() {
            if self.categories[..i].contains(category) {
                return Err(AppError::Artifact(format!(
                    "one-hot encoder for {} lists '{}' twice",
                    self.feature, category
                )));
            }
        }
        Ok(())
    }

    /// Number of indicator columns produced.
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Output column names, `<feature>_<category>` in category order.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}_{}", self.feature, c))
            .collect()
    }

    /// Indicator vector for `category`: exactly one 1.0 for a fitted category.
    ///
    /// Unknown categories are rejected, or become all zeros when the encoder
    /// was fitted with [`HandleUnknown::Ignore`].
    pub fn one_hot(&self, category: &str) -> Result<Vec<f64>, AppError> {
        let mut indicators = vec![0.0; self.width()];
        match self.encode(category) {
            Ok(code) => indicators[code] = 1.0,
            Err(_) if self.handle_unknown == HandleUnknown::Ignore => {
                tracing::debug!(
                    "Unknown {} '{}' encoded as all zeros",
                    self.feature,
                    category
                );
            }
            Err(e) => return Err(e),
        }
        Ok(indicators)
    }
}

impl CategoricalEncoder for OneHotEncoder {
    fn field(&self) -> &str {
        &self.feature
    }

    fn categories(&self) -> &[String] {
        &self.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn geography() -> OneHotEncoder {
        OneHotEncoder::new(
            "Geography",
            strings(&["France", "Germany", "Spain"]),
            HandleUnknown::Error,
        )
        .unwrap()
    }

    #[test]
    fn test_label_encoder_codes_are_indices() {
        let encoder = LabelEncoder::new("Gender", strings(&["Female", "Male"])).unwrap();

        assert_eq!(encoder.encode("Female").unwrap(), 0);
        assert_eq!(encoder.encode("Male").unwrap(), 1);
    }

    #[test]
    fn test_label_encoder_rejects_unknown() {
        let encoder = LabelEncoder::new("Gender", strings(&["Female", "Male"])).unwrap();

        assert_eq!(
            encoder.encode("male"),
            Err(AppError::UnknownCategory {
                field: "Gender".to_string(),
                value: "male".to_string(),
            })
        );
    }

    #[test]
    fn test_label_encoder_requires_sorted_classes() {
        assert!(LabelEncoder::new("Gender", strings(&["Male", "Female"])).is_err());
        assert!(LabelEncoder::new("Gender", strings(&["Male", "Male"])).is_err());
        assert!(LabelEncoder::new("Gender", vec![]).is_err());
    }

    #[test]
    fn test_one_hot_feature_names() {
        assert_eq!(
            geography().feature_names_out(),
            strings(&["Geography_France", "Geography_Germany", "Geography_Spain"])
        );
    }

    #[test]
    fn test_one_hot_sets_single_column() {
        let encoder = geography();

        assert_eq!(encoder.one_hot("France").unwrap(), vec![1.0, 0.0, 0.0]);
        assert_eq!(encoder.one_hot("Spain").unwrap(), vec![0.0, 0.0, 1.0]);
        assert_eq!(encoder.encode("Germany").unwrap(), 1);
    }

    #[test]
    fn test_one_hot_unknown_handling() {
        let strict = geography();
        assert!(matches!(
            strict.one_hot("Italy"),
            Err(AppError::UnknownCategory { .. })
        ));

        let lenient = OneHotEncoder {
            handle_unknown: HandleUnknown::Ignore,
            ..geography()
        };
        assert_eq!(lenient.one_hot("Italy").unwrap(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_one_hot_rejects_duplicates() {
        assert!(OneHotEncoder::new(
            "Geography",
            strings(&["France", "France"]),
            HandleUnknown::Error
        )
        .is_err());
    }

    #[test]
    fn test_deserialize_defaults() {
        let encoder: OneHotEncoder =
            serde_json::from_str(r#"{"categories": ["France", "Spain"]}"#).unwrap();

        assert_eq!(encoder.feature, "Geography");
        assert_eq!(encoder.handle_unknown, HandleUnknown::Error);
    }
}
