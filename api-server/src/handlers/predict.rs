//! Prediction handlers
//!
//! Schema validation chạy trên async task; encoding + classifier chạy trong
//! `spawn_blocking` vì lần gọi đầu có thể phải đọc artifact từ disk.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use churn_core::{BatchPredictionResponse, CustomerRecord, PredictionResponse};
use uuid::Uuid;
use validator::Validate;

use crate::models::{BatchPayload, CustomerPayload};
use crate::{AppResult, AppState};

/// Predict churn for a single customer
pub async fn single(
    State(state): State<AppState>,
    payload: Result<Json<CustomerPayload>, JsonRejection>,
) -> AppResult<Json<PredictionResponse>> {
    let request_id = Uuid::new_v4();
    let Json(payload) = payload?;
    payload.validate()?;

    let record = CustomerRecord::from(payload);
    let engine = state.engine.clone();
    let response = tokio::task::spawn_blocking(move || engine.predict_single(&record)).await??;

    tracing::info!(
        %request_id,
        prediction = response.prediction,
        label = %response.prediction_label,
        "Prediction served"
    );

    Ok(Json(response))
}

/// Predict churn for a batch; results keep request order
pub async fn batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchPayload>, JsonRejection>,
) -> AppResult<Json<BatchPredictionResponse>> {
    let request_id = Uuid::new_v4();
    let Json(payload) = payload?;
    payload.validate()?;

    let records = payload.into_records();
    let count = records.len();
    let engine = state.engine.clone();
    let response = tokio::task::spawn_blocking(move || engine.predict_batch(&records)).await??;

    tracing::info!(%request_id, count, "Batch prediction served");

    Ok(Json(response))
}
