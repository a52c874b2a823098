use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dtos::responses::CustomerDetailResponse;
use crate::api::extractors::admin::AdminAuth;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, AppError> {
    let customers = state.customer_repo.list().await?;
    Ok(Json(customers))
}

pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(customer_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let customer = state
        .customer_repo
        .find_by_id(&customer_id)
        .await?
        .ok_or(AppError::NotFound("Customer not found".into()))?;

    let bookings = state.booking_repo.list_by_customer(&customer.id).await?;

    Ok(Json(CustomerDetailResponse { customer, bookings }))
}
