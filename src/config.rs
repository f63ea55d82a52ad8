use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default file names inside `ARTIFACTS_DIR`.
pub const MODEL_FILE: &str = "model.json";
pub const GENDER_ENCODER_FILE: &str = "label_encoder_gender.json";
pub const GEOGRAPHY_ENCODER_FILE: &str = "onehot_encoder_geo.json";
pub const SCALER_FILE: &str = "scaler.json";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub artifacts_dir: PathBuf,
    pub model_path: PathBuf,
    pub gender_encoder_path: PathBuf,
    pub geography_encoder_path: PathBuf,
    pub scaler_path: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let artifacts_dir = PathBuf::from(non_blank_var("ARTIFACTS_DIR")?.unwrap_or_else(|| {
            "artifacts".to_string()
        }));

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8501".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            model_path: artifact_path("MODEL_PATH", &artifacts_dir, MODEL_FILE)?,
            gender_encoder_path: artifact_path(
                "GENDER_ENCODER_PATH",
                &artifacts_dir,
                GENDER_ENCODER_FILE,
            )?,
            geography_encoder_path: artifact_path(
                "GEOGRAPHY_ENCODER_PATH",
                &artifacts_dir,
                GEOGRAPHY_ENCODER_FILE,
            )?,
            scaler_path: artifact_path("SCALER_PATH", &artifacts_dir, SCALER_FILE)?,
            artifacts_dir,
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Artifacts dir: {}", config.artifacts_dir.display());
        tracing::debug!("Model: {}", config.model_path.display());
        tracing::debug!("Gender encoder: {}", config.gender_encoder_path.display());
        tracing::debug!(
            "Geography encoder: {}",
            config.geography_encoder_path.display()
        );
        tracing::debug!("Scaler: {}", config.scaler_path.display());
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Configuration rooted at `dir` with the default file names.
    pub fn with_artifacts_dir(dir: impl Into<PathBuf>, port: u16) -> Self {
        let artifacts_dir = dir.into();
        Self {
            port,
            model_path: artifacts_dir.join(MODEL_FILE),
            gender_encoder_path: artifacts_dir.join(GENDER_ENCODER_FILE),
            geography_encoder_path: artifacts_dir.join(GEOGRAPHY_ENCODER_FILE),
            scaler_path: artifacts_dir.join(SCALER_FILE),
            artifacts_dir,
        }
    }
}

/// Reads an optional variable, rejecting values that are set but blank.
fn non_blank_var(name: &str) -> anyhow::Result<Option<String>> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => anyhow::bail!("{} cannot be empty", name),
        Ok(value) => Ok(Some(value)),
        Err(_) => Ok(None),
    }
}

fn artifact_path(var: &str, dir: &Path, default_file: &str) -> anyhow::Result<PathBuf> {
    Ok(non_blank_var(var)?
        .map(PathBuf::from)
        .unwrap_or_else(|| dir.join(default_file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_artifacts_dir_uses_default_names() {
        let config = Config::with_artifacts_dir("/srv/churn", 9000);

        assert_eq!(config.port, 9000);
        assert_eq!(config.model_path, PathBuf::from("/srv/churn/model.json"));
        assert_eq!(
            config.gender_encoder_path,
            PathBuf::from("/srv/churn/label_encoder_gender.json")
        );
        assert_eq!(
            config.geography_encoder_path,
            PathBuf::from("/srv/churn/onehot_encoder_geo.json")
        );
        assert_eq!(config.scaler_path, PathBuf::from("/srv/churn/scaler.json"));
    }

    #[test]
    fn test_artifact_path_falls_back_to_dir() {
        let path = artifact_path(
            "CHURN_TEST_UNSET_ARTIFACT_PATH",
            Path::new("artifacts"),
            SCALER_FILE,
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("artifacts/scaler.json"));
    }
}
