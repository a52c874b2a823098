use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

use crate::api::handlers::{booking, cron, customer, event, health, template, voucher};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Public catalogue and booking flow
        .route("/api/v1/events", get(event::list_public_events))
        .route("/api/v1/events/{event_id}", get(event::get_public_event))
        .route("/api/v1/events/{event_id}/book", post(booking::create_booking))
        .route("/api/v1/bookings/{booking_id}/confirm", post(booking::confirm_booking))

        // Public voucher flow
        .route("/api/v1/vouchers", post(voucher::purchase_voucher))
        .route("/api/v1/vouchers/{voucher_id}/confirm", post(voucher::confirm_voucher))
        .route("/api/v1/vouchers/validate", post(voucher::validate_voucher))
        .route("/api/v1/vouchers/redeem", post(voucher::redeem_voucher))

        // Admin - events
        .route("/api/v1/admin/events", post(event::create_event).get(event::list_events))
        .route(
            "/api/v1/admin/events/{event_id}",
            get(event::get_event).put(event::update_event).delete(event::delete_event),
        )
        .route(
            "/api/v1/admin/events/{event_id}/form-fields",
            get(event::list_form_fields).put(event::replace_form_fields),
        )

        // Admin - bookings and customers
        .route("/api/v1/admin/events/{event_id}/bookings", get(booking::list_event_bookings))
        .route("/api/v1/admin/bookings", get(booking::list_bookings))
        .route("/api/v1/admin/bookings/{booking_id}", get(booking::get_booking))
        .route("/api/v1/admin/bookings/{booking_id}/cancel", post(booking::cancel_booking))
        .route("/api/v1/admin/customers", get(customer::list_customers))
        .route("/api/v1/admin/customers/{customer_id}", get(customer::get_customer))

        // Admin - vouchers
        .route("/api/v1/admin/vouchers", get(voucher::list_vouchers))
        .route("/api/v1/admin/vouchers/{voucher_id}", get(voucher::get_voucher))

        // Admin - templates and mail ledger
        .route(
            "/api/v1/admin/templates",
            get(template::list_templates).post(template::create_template),
        )
        .route(
            "/api/v1/admin/templates/{template_id}",
            get(template::get_template).put(template::update_template).delete(template::delete_template),
        )
        .route("/api/v1/admin/templates/{template_id}/preview", post(template::preview_template))
        .route("/api/v1/admin/mail-logs", get(template::list_mail_logs))

        // Scheduler
        .route("/api/v1/cron/reminders", post(cron::run_reminders))
        .route("/api/v1/cron/low-inventory", post(cron::run_low_inventory))
        .route("/api/v1/cron/voucher-delivery", post(cron::run_voucher_delivery))
        .route("/api/v1/cron/voucher-expiry", post(cron::run_voucher_expiry))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                }),
        )
        .with_state(state)
}
