mod common;

use axum::http::StatusCode;
use common::{book_tickets, create_active_event, parse_body, TestApp};
use serde_json::json;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_confirmation_completes_booking_and_sends_email() {
    let app = TestApp::new().await;
    let event_id = create_active_event(&app, "Opening Night", 4500, 10).await;
    let booking = book_tickets(&app, &event_id, "ada@test.local", 2).await;
    let booking_id = booking["booking"]["id"].as_str().unwrap();
    let booking_code = booking["booking"]["booking_code"].as_str().unwrap();

    let res = app.public_post(&format!("/api/v1/bookings/{}/confirm", booking_id), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);
    let outcome = parse_body(res).await;
    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["email_sent"], true);
    assert_eq!(outcome["calendar_updated"], true);

    let detail = parse_body(app.admin_get(&format!("/api/v1/admin/bookings/{}", booking_id)).await).await;
    assert_eq!(detail["booking"]["payment_status"], "COMPLETED");
    assert_eq!(detail["booking"]["confirmation_sent"], true);

    // Confirmation email carries the calendar attachment and the code.
    let sent = app.email.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "ada@test.local");
    assert_eq!(sent[0].attachment_name.as_deref(), Some("event.ics"));
    assert!(sent[0].body.contains(booking_code));
    drop(sent);

    assert_eq!(app.calendar.creates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_double_confirmation_sends_one_email_and_counts_once() {
    let app = TestApp::new().await;
    let event_id = create_active_event(&app, "Repeat Webhook", 4500, 10).await;
    let booking = book_tickets(&app, &event_id, "ada@test.local", 1).await;
    let booking_id = booking["booking"]["id"].as_str().unwrap();

    app.public_post(&format!("/api/v1/bookings/{}/confirm", booking_id), json!({})).await;
    let second = parse_body(
        app.public_post(&format!("/api/v1/bookings/{}/confirm", booking_id), json!({})).await,
    )
    .await;
    assert_eq!(second["success"], true);
    assert_eq!(second["email_sent"], false);

    assert_eq!(app.email.sent_count(), 1);

    // Customer aggregates were applied exactly once.
    let customers = parse_body(app.admin_get("/api/v1/admin/customers").await).await;
    assert_eq!(customers[0]["total_bookings"], 1);
    assert_eq!(customers[0]["total_spent_cents"], 4500);
}

#[tokio::test]
async fn test_mail_ledger_suppresses_duplicate_context() {
    let app = TestApp::new().await;
    let event_id = create_active_event(&app, "Ledger Night", 4500, 10).await;
    let booking = book_tickets(&app, &event_id, "ada@test.local", 1).await;
    let booking_id = booking["booking"]["id"].as_str().unwrap();

    app.public_post(&format!("/api/v1/bookings/{}/confirm", booking_id), json!({})).await;
    assert_eq!(app.email.sent_count(), 1);

    // Force the flag off so the send path runs again with the same context.
    sqlx::query("UPDATE bookings SET confirmation_sent = 0 WHERE id = ?")
        .bind(booking_id)
        .execute(&app.pool)
        .await
        .unwrap();

    app.public_post(&format!("/api/v1/bookings/{}/confirm", booking_id), json!({})).await;

    // The ledger recognised the identical (recipient, template, context) triple.
    assert_eq!(app.email.sent_count(), 1);
    let logs = parse_body(app.admin_get("/api/v1/admin/mail-logs?recipient=ada@test.local").await).await;
    let statuses: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["status"].as_str().unwrap())
        .collect();
    assert!(statuses.contains(&"SENT"));
    assert!(statuses.contains(&"SKIPPED_DUPLICATE"));
}

#[tokio::test]
async fn test_email_failure_is_soft_and_retryable() {
    let app = TestApp::new().await;
    let event_id = create_active_event(&app, "Flaky Mail", 4500, 10).await;
    let booking = book_tickets(&app, &event_id, "ada@test.local", 1).await;
    let booking_id = booking["booking"]["id"].as_str().unwrap();

    app.email.fail.store(true, Ordering::SeqCst);
    let outcome = parse_body(
        app.public_post(&format!("/api/v1/bookings/{}/confirm", booking_id), json!({})).await,
    )
    .await;
    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["email_sent"], false);

    // Booking is completed even though the mail bounced.
    let detail = parse_body(app.admin_get(&format!("/api/v1/admin/bookings/{}", booking_id)).await).await;
    assert_eq!(detail["booking"]["payment_status"], "COMPLETED");
    assert_eq!(detail["booking"]["confirmation_sent"], false);

    // A retry once the mail service recovers sends the email.
    app.email.fail.store(false, Ordering::SeqCst);
    let retry = parse_body(
        app.public_post(&format!("/api/v1/bookings/{}/confirm", booking_id), json!({})).await,
    )
    .await;
    assert_eq!(retry["email_sent"], true);
    assert_eq!(app.email.sent_count(), 1);

    // Aggregates were still applied exactly once across the retries.
    let customers = parse_body(app.admin_get("/api/v1/admin/customers").await).await;
    assert_eq!(customers[0]["total_bookings"], 1);
}

#[tokio::test]
async fn test_calendar_failure_is_soft() {
    let app = TestApp::new().await;
    let event_id = create_active_event(&app, "No Calendar", 4500, 10).await;
    let booking = book_tickets(&app, &event_id, "ada@test.local", 1).await;
    let booking_id = booking["booking"]["id"].as_str().unwrap();

    app.calendar.fail.store(true, Ordering::SeqCst);
    let outcome = parse_body(
        app.public_post(&format!("/api/v1/bookings/{}/confirm", booking_id), json!({})).await,
    )
    .await;
    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["email_sent"], true);
    assert_eq!(outcome["calendar_updated"], false);
}

#[tokio::test]
async fn test_second_confirmation_updates_existing_calendar_entry() {
    let app = TestApp::new().await;
    let event_id = create_active_event(&app, "Growing Party", 4500, 10).await;

    let first = book_tickets(&app, &event_id, "one@test.local", 1).await;
    app.public_post(
        &format!("/api/v1/bookings/{}/confirm", first["booking"]["id"].as_str().unwrap()),
        json!({}),
    )
    .await;

    let second = book_tickets(&app, &event_id, "two@test.local", 1).await;
    app.public_post(
        &format!("/api/v1/bookings/{}/confirm", second["booking"]["id"].as_str().unwrap()),
        json!({}),
    )
    .await;

    // First confirmation creates the entry, later ones update it.
    assert_eq!(app.calendar.creates.load(Ordering::SeqCst), 1);
    assert_eq!(app.calendar.updates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_confirm_unknown_booking_is_404() {
    let app = TestApp::new().await;
    let res = app.public_post("/api/v1/bookings/no-such-id/confirm", json!({})).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
