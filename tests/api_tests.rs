/// HTTP tests against the application router
/// Runs requests through the router in-process with the shipped artifacts
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use churn_predict_api::artifacts;
use churn_predict_api::config::Config;
use churn_predict_api::handlers::AppState;
use churn_predict_api::models::{FeaturesResponse, PredictionResponse, SchemaResponse};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

/// Helper function to build the app over `artifacts/`
fn create_test_app() -> Router {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("artifacts");
    let config = Config::with_artifacts_dir(dir, 8501);
    let loaded = artifacts::load(&config).expect("shipped artifacts load");

    churn_predict_api::app(Arc::new(AppState {
        config,
        context: loaded.context,
        fingerprints: loaded.fingerprints,
    }))
}

fn scenario_json() -> Value {
    json!({
        "CreditScore": 600,
        "Geography": "France",
        "Gender": "Female",
        "Age": 30,
        "Tenure": 3,
        "Balance": 0.0,
        "NumOfProducts": 1,
        "HasCrCard": 0,
        "IsActiveMember": 0,
        "EstimatedSalary": 0.0
    })
}

fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_health() {
    let response = create_test_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_form_page_lists_fitted_categories() {
    let response = create_test_app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    for option in ["France", "Germany", "Spain", "Female", "Male"] {
        assert!(html.contains(&format!("<option value=\"{}\"", option)));
    }
    assert!(html.contains("name=\"Age\""));
    assert!(html.contains("value=\"600\""));
    assert!(!html.contains("Prediction Results"));
}

#[tokio::test]
async fn test_form_submission_renders_result() {
    let form = "CreditScore=600&Geography=Germany&Gender=Male&Age=45&Tenure=3\
                &Balance=1200.50&NumOfProducts=2&HasCrCard=1&IsActiveMember=0\
                &EstimatedSalary=50000";
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();

    let response = create_test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Prediction Results"));
    assert!(html.contains("Churn Probability"));
    assert!(html.contains("likely to churn."));
    assert!(html.contains("<option value=\"Germany\" selected>"));
}

#[tokio::test]
async fn test_predict_json() {
    let response = create_test_app()
        .oneshot(json_request("/api/v1/predict", &scenario_json()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: PredictionResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!((0.0..=1.0).contains(&body.probability));
    assert_eq!(body.will_churn, body.probability > 0.5);
    assert_eq!(body.label, if body.will_churn { "churn" } else { "no_churn" });
}

#[tokio::test]
async fn test_features_json_layout() {
    let response = create_test_app()
        .oneshot(json_request("/api/v1/features", &scenario_json()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: FeaturesResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.columns.len(), 12);
    assert_eq!(body.raw.len(), 12);
    assert_eq!(body.scaled.len(), 12);
    assert_eq!(body.raw[..3], [600.0, 0.0, 30.0]);
    assert_eq!(body.raw[9..], [1.0, 0.0, 0.0]);
}

#[tokio::test]
async fn test_unknown_category_is_bad_request() {
    let mut record = scenario_json();
    record["Geography"] = json!("Italy");

    let response = create_test_app()
        .oneshot(json_request("/api/v1/predict", &record))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "Unknown Geography category: 'Italy'");
}

#[tokio::test]
async fn test_out_of_range_age_is_bad_request() {
    let mut record = scenario_json();
    record["Age"] = json!(120);

    let response = create_test_app()
        .oneshot(json_request("/api/v1/predict", &record))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_negative_credit_score_is_json_bad_request() {
    let mut record = scenario_json();
    record["CreditScore"] = json!(-5);

    let response = create_test_app()
        .oneshot(json_request("/api/v1/predict", &record))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("CreditScore"));
}

#[tokio::test]
async fn test_missing_field_is_json_bad_request() {
    let mut record = scenario_json();
    record.as_object_mut().unwrap().remove("CreditScore");

    let response = create_test_app()
        .oneshot(json_request("/api/v1/features", &record))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("missing field `CreditScore`"));
}

#[tokio::test]
async fn test_fractional_integer_field_is_json_bad_request() {
    let mut record = scenario_json();
    record["Age"] = json!(30.5);

    let response = create_test_app()
        .oneshot(json_request("/api/v1/predict", &record))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_form_is_json_bad_request() {
    let form = "CreditScore=-1&Geography=France&Gender=Female&Age=30&Tenure=3\
                &Balance=0&NumOfProducts=1&HasCrCard=0&IsActiveMember=0\
                &EstimatedSalary=0";
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();

    let response = create_test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_schema_reports_columns_and_fingerprints() {
    let response = create_test_app()
        .oneshot(Request::get("/api/v1/schema").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: SchemaResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.columns[0], "CreditScore");
    assert_eq!(body.columns[11], "Geography_Spain");
    assert_eq!(body.gender_classes, vec!["Female", "Male"]);
    assert_eq!(body.threshold, 0.5);
    assert!(body.artifacts_dir.ends_with("artifacts"));
    assert_eq!(body.artifacts.len(), 4);
}
