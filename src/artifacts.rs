use anyhow::Context;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::assembler::InferenceContext;
use crate::config::Config;
use crate::encoders::{LabelEncoder, OneHotEncoder};
use crate::model::DenseNetwork;
use crate::models::ArtifactFingerprint;
use crate::scaler::StandardScaler;

/// Everything read from disk at startup.
#[derive(Debug)]
pub struct LoadedArtifacts {
    pub context: InferenceContext,
    pub fingerprints: Vec<ArtifactFingerprint>,
}

/// Loads the four artifacts named by `config` and builds the inference context.
///
/// Any missing, malformed or mutually inconsistent artifact aborts with an
/// error naming the file.
pub fn load(config: &Config) -> anyhow::Result<LoadedArtifacts> {
    let mut fingerprints = Vec::with_capacity(4);

    let model: DenseNetwork = read_artifact("model", &config.model_path, &mut fingerprints)?;
    model
        .validate()
        .with_context(|| format!("invalid model in {}", config.model_path.display()))?;

    let gender: LabelEncoder = read_artifact(
        "gender_encoder",
        &config.gender_encoder_path,
        &mut fingerprints,
    )?;
    gender.validate().with_context(|| {
        format!(
            "invalid gender encoder in {}",
            config.gender_encoder_path.display()
        )
    })?;

    let geography: OneHotEncoder = read_artifact(
        "geography_encoder",
        &config.geography_encoder_path,
        &mut fingerprints,
    )?;
    geography.validate().with_context(|| {
        format!(
            "invalid geography encoder in {}",
            config.geography_encoder_path.display()
        )
    })?;

    let scaler: StandardScaler = read_artifact("scaler", &config.scaler_path, &mut fingerprints)?;
    scaler
        .validate()
        .with_context(|| format!("invalid scaler in {}", config.scaler_path.display()))?;

    let context = InferenceContext::new(gender, geography, scaler, Box::new(model))
        .context("artifacts disagree on the feature layout")?;

    Ok(LoadedArtifacts {
        context,
        fingerprints,
    })
}

/// Reads and parses one JSON artifact, recording its fingerprint.
fn read_artifact<T: DeserializeOwned>(
    name: &str,
    path: &Path,
    fingerprints: &mut Vec<ArtifactFingerprint>,
) -> anyhow::Result<T> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read {} artifact {}", name, path.display()))?;

    let value = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse {} artifact {}", name, path.display()))?;

    let sha256 = fingerprint(&bytes);
    tracing::info!("Loaded {} from {} (sha256 {})", name, path.display(), sha256);

    fingerprints.push(ArtifactFingerprint {
        name: name.to_string(),
        path: path.display().to_string(),
        sha256,
    });

    Ok(value)
}

/// Hex-encoded SHA-256 of artifact bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
