//! Customer Churn Prediction Library
//!
//! This library loads the fitted preprocessing artifacts and the trained
//! classifier, assembles model input rows from customer records, and serves
//! the prediction form and JSON API.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Inference logic.
//! - `artifacts`: Artifact loading and fingerprinting.
//! - `assembler`: Feature row assembly and prediction.
//! - `config`: Configuration management.
//! - `encoders`: Fitted categorical encoders.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `model`: Trained classifier.
//! - `models`: Request, result and response models.
//! - `scaler`: Fitted feature scaler.
//! - `ui`: Server-rendered form.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

pub mod api;
pub mod core;

pub mod artifacts;
pub mod assembler;
pub mod config;
pub mod encoders;
pub mod errors;
pub mod handlers;
pub mod model;
pub mod models;
pub mod scaler;
pub mod ui;

/// Request size limit. Records are a handful of fields.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Full application router without rate limiting.
pub fn app(state: Arc<handlers::AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(handlers::prediction_routes().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
