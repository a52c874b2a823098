use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::{
    requests::{CreateEventRequest, ReplaceFormFieldsRequest, UpdateEventRequest},
    responses::EventDetailResponse,
};
use crate::api::extractors::admin::AdminAuth;
use crate::domain::models::event::{Event, EventFormField, NewEventParams};
use crate::error::AppError;
use crate::state::AppState;

const EVENT_STATUSES: [&str; 4] = ["DRAFT", "ACTIVE", "SOLDOUT", "CANCELLED"];

fn validate_status(status: &str) -> Result<(), AppError> {
    if EVENT_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Invalid event status: {}", status)))
    }
}

// Public surface

pub async fn list_public_events(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let events = state.event_repo.list_public(Utc::now()).await?;
    Ok(Json(events))
}

pub async fn get_public_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    // Draft and cancelled events are invisible to the public catalogue.
    if event.status != "ACTIVE" && event.status != "SOLDOUT" {
        return Err(AppError::NotFound("Event not found".into()));
    }

    let form_fields = state.event_repo.list_form_fields(&event.id).await?;
    Ok(Json(EventDetailResponse { event, form_fields }))
}

// Admin surface

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.capacity < 1 {
        return Err(AppError::Validation("Capacity must be at least 1".into()));
    }
    if payload.price_cents < 0 {
        return Err(AppError::Validation("Price must not be negative".into()));
    }
    let status = payload.status.unwrap_or_else(|| "DRAFT".to_string());
    validate_status(&status)?;

    let event = Event::new(NewEventParams {
        title: payload.title,
        category: payload.category,
        description: payload.description.unwrap_or_default(),
        location: payload.location,
        starts_at: payload.starts_at,
        duration_min: payload.duration_min,
        price_cents: payload.price_cents,
        capacity: payload.capacity,
        status,
    });

    let created = state.event_repo.create(&event).await?;
    info!("Event created: {} ({})", created.title, created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, AppError> {
    let events = state.event_repo.list().await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    let form_fields = state.event_repo.list_form_fields(&event.id).await?;
    Ok(Json(EventDetailResponse { event, form_fields }))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(event_id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if let Some(title) = payload.title {
        event.title = title;
    }
    if let Some(category) = payload.category {
        event.category = category;
    }
    if let Some(description) = payload.description {
        event.description = description;
    }
    if let Some(location) = payload.location {
        event.location = location;
    }
    if let Some(starts_at) = payload.starts_at {
        event.starts_at = starts_at;
    }
    if let Some(duration_min) = payload.duration_min {
        event.duration_min = duration_min;
    }
    if let Some(price_cents) = payload.price_cents {
        if price_cents < 0 {
            return Err(AppError::Validation("Price must not be negative".into()));
        }
        event.price_cents = price_cents;
    }
    if let Some(capacity) = payload.capacity {
        if capacity < 1 {
            return Err(AppError::Validation("Capacity must be at least 1".into()));
        }
        // A capacity change shifts availability by the same delta, clamped
        // so existing bookings are never invalidated.
        let delta = capacity - event.capacity;
        event.available_tickets = (event.available_tickets + delta).clamp(0, capacity);
        event.capacity = capacity;
    }
    if let Some(status) = payload.status {
        validate_status(&status)?;
        event.status = status;
    }

    let updated = state.event_repo.update(&event).await?;
    info!("Event updated: {}", updated.id);
    Ok(Json(updated))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.count_by_event(&event_id).await?;
    if bookings > 0 {
        return Err(AppError::Conflict("Event has bookings and cannot be deleted".into()));
    }

    state.event_repo.delete(&event_id).await?;
    info!("Event deleted: {}", event_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_form_fields(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    let fields = state.event_repo.list_form_fields(&event_id).await?;
    Ok(Json(fields))
}

pub async fn replace_form_fields(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(event_id): Path<String>,
    Json(payload): Json<ReplaceFormFieldsRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let fields: Vec<EventFormField> = payload
        .fields
        .into_iter()
        .map(|f| EventFormField::new(event_id.clone(), f.label, f.field_type, f.required, f.options, f.sort_order))
        .collect();

    let saved = state.event_repo.replace_form_fields(&event_id, &fields).await?;
    Ok(Json(saved))
}
