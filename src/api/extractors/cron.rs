use crate::api::extractors::admin::bearer_token;
use crate::state::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use std::sync::Arc;

/// Shared-secret guard for the scheduler endpoints.
pub struct CronAuth;

impl<S> FromRequestParts<S> for CronAuth
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let token = bearer_token(parts).ok_or(StatusCode::UNAUTHORIZED)?;
        if token != app_state.config.cron_secret {
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(CronAuth)
    }
}
