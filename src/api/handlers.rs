//! API handlers

use std::time::Instant;

use axum::{extract::State, Json};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::model::Prediction;
use crate::preprocess::ImageData;

/// Health check with system status
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instance: state.instance.clone(),
        model_loaded: state.is_trained(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub instance: String,
    pub model_loaded: bool,
}

/// Classify a drawn digit.
///
/// The body is parsed by hand so that malformed payloads produce the
/// `{"error": ...}` envelope with HTTP 200 rather than a framework 4xx.
pub async fn predict(State(state): State<AppState>, body: Bytes) -> Json<PredictResponse> {
    let start = Instant::now();

    let response = match run_predict(&state, &body) {
        Ok(prediction) => {
            tracing::debug!(
                digit = prediction.prediction,
                confidence = prediction.confidence,
                took_us = start.elapsed().as_micros() as u64,
                "prediction served"
            );
            PredictResponse::Success(prediction)
        }
        Err(err) => {
            tracing::warn!(error = %err, "predict request rejected");
            PredictResponse::Failure {
                error: err.to_string(),
            }
        }
    };

    Json(response)
}

fn run_predict(state: &AppState, body: &[u8]) -> crate::Result<Prediction> {
    let request: PredictRequest = serde_json::from_slice(body)?;
    let input = request.image_data.into_input()?;
    state.classifier.predict(&input)
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(rename = "imageData")]
    pub image_data: ImageData,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Success(Prediction),
    Failure { error: String },
}
