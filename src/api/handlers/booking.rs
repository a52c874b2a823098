use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::{
    requests::CreateBookingRequest,
    responses::{BookingCreatedResponse, BookingDetailResponse},
};
use crate::api::extractors::admin::AdminAuth;
use crate::domain::services::booking_service::CreateBookingInput;
use crate::error::AppError;
use crate::state::AppState;

// Public surface

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = state
        .booking_service
        .create(
            &event_id,
            CreateBookingInput {
                customer_name: payload.customer_name,
                customer_email: payload.customer_email,
                customer_phone: payload.customer_phone,
                quantity: payload.quantity,
                voucher_code: payload.voucher_code,
                form_answers: payload.form_answers,
            },
        )
        .await?;

    let tickets = state.booking_repo.list_tickets(&receipt.booking.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingCreatedResponse {
            booking: receipt.booking,
            tickets,
            voucher_applied_cents: receipt.voucher_applied_cents,
            payment_session_url: receipt.payment_session_url,
        }),
    ))
}

/// Payment-callback endpoint. Safe to retry; repeats are a no-op.
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.confirmation_service.confirm(&booking_id).await?;
    Ok(Json(outcome))
}

// Admin surface

#[derive(Deserialize)]
pub struct BookingListQuery {
    pub event_id: Option<String>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Query(query): Query<BookingListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = match query.event_id {
        Some(event_id) => state.booking_repo.list_by_event(&event_id).await?,
        None => state.booking_repo.list().await?,
    };
    Ok(Json(bookings))
}

pub async fn list_event_bookings(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_by_event(&event_id).await?;
    Ok(Json(bookings))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_repo
        .find_by_id(&booking_id)
        .await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    let tickets = state.booking_repo.list_tickets(&booking.id).await?;
    let form_responses = state.booking_repo.list_form_responses(&booking.id).await?;

    Ok(Json(BookingDetailResponse {
        booking,
        tickets,
        form_responses,
    }))
}

/// Admin cancellation: fails the booking, voids its tickets and restores
/// event inventory.
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let cancelled = state.booking_repo.cancel(&booking_id).await?;
    info!("Booking cancelled: {}", cancelled.booking_code);
    Ok(Json(cancelled))
}
