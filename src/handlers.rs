use crate::assembler::InferenceContext;
use crate::config::Config;
use crate::encoders::CategoricalEncoder;
use crate::errors::AppError;
use crate::models::*;
use crate::ui;
use axum::{
    extract::{FromRequest, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// JSON body extractor that rejects with [`AppError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Form body extractor that rejects with [`AppError`].
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct AppForm<T>(pub T);

/// Shared application state injected into handlers.
#[derive(Debug)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Fitted encoders, scaler and model.
    pub context: InferenceContext,
    /// Fingerprints of the artifacts `context` was built from.
    pub fingerprints: Vec<ArtifactFingerprint>,
}

/// Routes that run the inference path.
pub fn prediction_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(form_page))
        .route("/predict", post(predict_form))
        .route("/api/v1/predict", post(predict_json))
        .route("/api/v1/features", post(features_json))
        .route("/api/v1/schema", get(schema))
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "churn-predict-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /
///
/// Renders the empty form with the first fitted category of each select chosen.
pub async fn form_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let context = &state.context;
    let record = CustomerRecord {
        geography: first_category(context.geography_encoder()),
        gender: first_category(context.gender_encoder()),
        ..CustomerRecord::default()
    };

    Html(ui::render_page(context, &record, None))
}

/// POST /predict
///
/// Form submission: predicts and re-renders the form with the result panel.
pub async fn predict_form(
    State(state): State<Arc<AppState>>,
    AppForm(record): AppForm<CustomerRecord>,
) -> Result<Html<String>, AppError> {
    tracing::info!(
        "POST /predict - geography={} gender={}",
        record.geography,
        record.gender
    );

    let result = state.context.predict(&record)?;

    Ok(Html(ui::render_page(&state.context, &record, Some(&result))))
}

/// POST /api/v1/predict
///
/// JSON variant of the form submission.
pub async fn predict_json(
    State(state): State<Arc<AppState>>,
    AppJson(record): AppJson<CustomerRecord>,
) -> Result<Json<PredictionResponse>, AppError> {
    tracing::info!("POST /api/v1/predict - record: {:?}", record);

    let result = state.context.predict(&record)?;
    let response = PredictionResponse::from(result);

    tracing::info!(
        "Prediction {}: probability={:.4} label={}",
        response.request_id,
        response.probability,
        response.label
    );

    Ok(Json(response))
}

/// POST /api/v1/features
///
/// Returns the assembled row before and after scaling, for checking the
/// column layout against the training pipeline.
pub async fn features_json(
    State(state): State<Arc<AppState>>,
    AppJson(record): AppJson<CustomerRecord>,
) -> Result<Json<FeaturesResponse>, AppError> {
    tracing::debug!("POST /api/v1/features - record: {:?}", record);

    let (raw, scaled) = state.context.prepare(&record)?;

    Ok(Json(FeaturesResponse {
        columns: raw.columns,
        raw: raw.values,
        scaled,
    }))
}

/// GET /api/v1/schema
pub async fn schema(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    let context = &state.context;

    Json(SchemaResponse {
        columns: context.columns().to_vec(),
        gender_classes: context.gender_encoder().categories().to_vec(),
        geography_categories: context.geography_encoder().categories().to_vec(),
        threshold: CHURN_THRESHOLD,
        artifacts_dir: state.config.artifacts_dir.display().to_string(),
        artifacts: state.fingerprints.clone(),
    })
}

fn first_category(encoder: &impl CategoricalEncoder) -> String {
    encoder.categories().first().cloned().unwrap_or_default()
}
