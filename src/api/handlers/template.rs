use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dtos::{
    requests::{CreateTemplateRequest, MailLogQuery, PreviewTemplateRequest, UpdateTemplateRequest},
    responses::TemplatePreviewResponse,
};
use crate::api::extractors::admin::AdminAuth;
use crate::domain::models::communication::EmailTemplate;
use crate::domain::services::communication_service;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_template(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Json(payload): Json<CreateTemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Template name is required".into()));
    }

    let template = EmailTemplate::new(payload.name, payload.subject, payload.body_html, payload.variables);
    let created = state.communication_repo.create_template(&template).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
) -> Result<impl IntoResponse, AppError> {
    let templates = state.communication_repo.list_templates().await?;
    Ok(Json(templates))
}

pub async fn get_template(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(template_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let template = state
        .communication_repo
        .get_template(&template_id)
        .await?
        .ok_or(AppError::NotFound("Template not found".into()))?;
    Ok(Json(template))
}

pub async fn update_template(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(template_id): Path<String>,
    Json(payload): Json<UpdateTemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut template = state
        .communication_repo
        .get_template(&template_id)
        .await?
        .ok_or(AppError::NotFound("Template not found".into()))?;

    if let Some(subject) = payload.subject {
        template.subject = subject;
    }
    if let Some(body_html) = payload.body_html {
        template.body_html = body_html;
    }
    if let Some(variables) = payload.variables {
        template.variables = variables;
    }
    if let Some(is_active) = payload.is_active {
        template.is_active = is_active;
    }
    template.updated_at = Utc::now();

    let updated = state.communication_repo.update_template(&template).await?;
    Ok(Json(updated))
}

pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(template_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.communication_repo.delete_template(&template_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Renders a stored template against a caller-supplied context without
/// sending anything.
pub async fn preview_template(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(template_id): Path<String>,
    Json(payload): Json<PreviewTemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let template = state
        .communication_repo
        .get_template(&template_id)
        .await?
        .ok_or(AppError::NotFound("Template not found".into()))?;

    let (subject, body_html) = communication_service::render(
        &template.name,
        &template.subject,
        &template.body_html,
        &payload.context,
    )?;

    Ok(Json(TemplatePreviewResponse { subject, body_html }))
}

pub async fn list_mail_logs(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Query(query): Query<MailLogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let logs = state.communication_repo.list_logs(query.recipient.as_deref()).await?;
    Ok(Json(logs))
}
