use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dtos::{
    requests::{PurchaseVoucherRequest, RedeemVoucherRequest, ValidateVoucherRequest},
    responses::{VoucherConfirmationResponse, VoucherPurchasedResponse, VoucherValidationResponse},
};
use crate::api::extractors::admin::AdminAuth;
use crate::domain::models::voucher::NewVoucherParams;
use crate::error::AppError;
use crate::state::AppState;

// Public surface

pub async fn purchase_voucher(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PurchaseVoucherRequest>,
) -> Result<impl IntoResponse, AppError> {
    let purchase = state
        .voucher_service
        .purchase(NewVoucherParams {
            amount_cents: payload.amount_cents,
            purchaser_name: payload.purchaser_name,
            purchaser_email: payload.purchaser_email,
            recipient_name: payload.recipient_name,
            recipient_email: payload.recipient_email,
            personal_message: payload.personal_message,
            scheduled_delivery: payload.scheduled_delivery,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(VoucherPurchasedResponse {
            voucher: purchase.voucher,
            payment_session_url: purchase.payment_session_url,
        }),
    ))
}

/// Payment-callback endpoint. Safe to retry; repeats are a no-op.
pub async fn confirm_voucher(
    State(state): State<Arc<AppState>>,
    Path(voucher_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.voucher_service.confirm_purchase(&voucher_id).await?;
    Ok(Json(VoucherConfirmationResponse {
        success: outcome.success,
        delivery_sent: outcome.delivery_sent,
    }))
}

pub async fn validate_voucher(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ValidateVoucherRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = match state.voucher_service.validate(&payload.code).await? {
        Ok(voucher) => VoucherValidationResponse {
            valid: true,
            balance_cents: Some(voucher.current_balance_cents),
            expiry_date: Some(voucher.expiry_date),
            reason: None,
        },
        Err(problem) => VoucherValidationResponse {
            valid: false,
            balance_cents: None,
            expiry_date: None,
            reason: Some(problem.reason()),
        },
    };
    Ok(Json(response))
}

pub async fn redeem_voucher(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RedeemVoucherRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .voucher_service
        .redeem(&payload.code, payload.amount_cents, &payload.booking_id)
        .await?;
    Ok(Json(outcome))
}

// Admin surface

pub async fn list_vouchers(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, AppError> {
    let vouchers = state.voucher_repo.list().await?;
    Ok(Json(vouchers))
}

pub async fn get_voucher(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(voucher_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let voucher = state
        .voucher_repo
        .find_by_id(&voucher_id)
        .await?
        .ok_or(AppError::NotFound("Voucher not found".into()))?;
    Ok(Json(voucher))
}
