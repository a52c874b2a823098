use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::extractors::cron::CronAuth;
use crate::error::AppError;
use crate::state::AppState;

pub async fn run_reminders(
    State(state): State<Arc<AppState>>,
    _cron: CronAuth,
) -> Result<impl IntoResponse, AppError> {
    let report = state.notification_service.reminder_sweep().await?;
    Ok(Json(report))
}

pub async fn run_low_inventory(
    State(state): State<Arc<AppState>>,
    _cron: CronAuth,
) -> Result<impl IntoResponse, AppError> {
    let report = state.notification_service.low_inventory_sweep().await?;
    Ok(Json(report))
}

pub async fn run_voucher_delivery(
    State(state): State<Arc<AppState>>,
    _cron: CronAuth,
) -> Result<impl IntoResponse, AppError> {
    let report = state.notification_service.voucher_delivery_sweep().await?;
    Ok(Json(report))
}

pub async fn run_voucher_expiry(
    State(state): State<Arc<AppState>>,
    _cron: CronAuth,
) -> Result<impl IntoResponse, AppError> {
    let report = state.notification_service.voucher_expiry_sweep().await?;
    Ok(Json(report))
}
