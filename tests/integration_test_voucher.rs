mod common;

use axum::http::StatusCode;
use common::{book_tickets, create_active_event, parse_body, purchase_paid_voucher, TestApp};
use serde_json::json;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_voucher_purchase_and_delivery() {
    let app = TestApp::new().await;

    let res = app
        .public_post(
            "/api/v1/vouchers",
            json!({
                "amount_cents": 5000,
                "purchaser_name": "Giver",
                "purchaser_email": "giver@test.local",
                "recipient_name": "Getter",
                "recipient_email": "getter@test.local",
                "personal_message": "Happy birthday!"
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = parse_body(res).await;

    let code = body["voucher"]["code"].as_str().unwrap();
    assert!(code.starts_with("GV-"));
    assert_eq!(code.len(), 13);
    assert_eq!(body["voucher"]["payment_status"], "PENDING");
    assert_eq!(body["voucher"]["current_balance_cents"], 5000);
    assert!(body["payment_session_url"].as_str().is_some());

    // Unpaid vouchers validate as inactive.
    let check = parse_body(app.public_post("/api/v1/vouchers/validate", json!({ "code": code })).await).await;
    assert_eq!(check["valid"], false);
    assert_eq!(check["reason"], "inactive");

    // Payment confirmation triggers immediate delivery.
    let voucher_id = body["voucher"]["id"].as_str().unwrap();
    let confirm = parse_body(
        app.public_post(&format!("/api/v1/vouchers/{}/confirm", voucher_id), json!({})).await,
    )
    .await;
    assert_eq!(confirm["success"], true);
    assert_eq!(confirm["delivery_sent"], true);

    let sent = app.email.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "getter@test.local");
    assert!(sent[0].body.contains(code));
    assert!(sent[0].body.contains("Happy birthday!"));
}

#[tokio::test]
async fn test_voucher_confirm_is_idempotent() {
    let app = TestApp::new().await;
    let (voucher_id, _) = purchase_paid_voucher(&app, 4000).await;

    let again = parse_body(
        app.public_post(&format!("/api/v1/vouchers/{}/confirm", voucher_id), json!({})).await,
    )
    .await;
    assert_eq!(again["success"], true);
    assert_eq!(again["delivery_sent"], false);
    assert_eq!(app.email.sent_count(), 1);
}

#[tokio::test]
async fn test_voucher_amount_limits() {
    let app = TestApp::new().await;

    for amount in [0, -100, 50_001] {
        let res = app
            .public_post(
                "/api/v1/vouchers",
                json!({
                    "amount_cents": amount,
                    "purchaser_name": "G",
                    "purchaser_email": "g@test.local",
                    "recipient_name": "R",
                    "recipient_email": "r@test.local"
                }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "amount {} must be rejected", amount);
    }
}

#[tokio::test]
async fn test_partial_redemption_and_balance() {
    let app = TestApp::new().await;
    let event_id = create_active_event(&app, "Voucher Night", 6000, 10).await;
    let (_, code) = purchase_paid_voucher(&app, 4000).await;

    // 1 ticket at 60.00, voucher covers 40.00.
    let res = app
        .public_post(
            &format!("/api/v1/events/{}/book", event_id),
            json!({
                "customer_name": "A",
                "customer_email": "a@test.local",
                "quantity": 1,
                "voucher_code": code
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = parse_body(res).await;
    assert_eq!(body["voucher_applied_cents"], 4000);
    assert_eq!(body["booking"]["voucher_amount_cents"], 4000);
    assert_eq!(body["booking"]["payment_method"], "mixed");
    // Remainder still goes through checkout.
    assert!(body["payment_session_url"].as_str().is_some());

    // Balance is exhausted, voucher flips to REDEEMED.
    let check = parse_body(app.public_post("/api/v1/vouchers/validate", json!({ "code": code })).await).await;
    assert_eq!(check["valid"], false);
    assert_eq!(check["reason"], "inactive");
}

#[tokio::test]
async fn test_redemption_clamps_to_remainder() {
    let app = TestApp::new().await;
    let event_id = create_active_event(&app, "Cheap Seats", 2000, 10).await;
    let (_, code) = purchase_paid_voucher(&app, 5000).await;

    // Ticket costs 20.00 against a 50.00 voucher: only 20.00 is drawn.
    let res = app
        .public_post(
            &format!("/api/v1/events/{}/book", event_id),
            json!({
                "customer_name": "A",
                "customer_email": "a@test.local",
                "quantity": 1,
                "voucher_code": code
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = parse_body(res).await;
    assert_eq!(body["voucher_applied_cents"], 2000);
    assert_eq!(body["booking"]["payment_method"], "voucher");
    // Fully covered: no checkout session, booking confirmed on the spot.
    assert!(body["payment_session_url"].is_null());
    assert_eq!(body["booking"]["payment_status"], "COMPLETED");

    let check = parse_body(app.public_post("/api/v1/vouchers/validate", json!({ "code": code })).await).await;
    assert_eq!(check["valid"], true);
    assert_eq!(check["balance_cents"], 3000);
}

#[tokio::test]
async fn test_redeem_endpoint_replay_is_idempotent() {
    let app = TestApp::new().await;
    let event_id = create_active_event(&app, "Replay Night", 8000, 10).await;
    let (_, code) = purchase_paid_voucher(&app, 3000).await;

    let booking = book_tickets(&app, &event_id, "a@test.local", 1).await;
    let booking_id = booking["booking"]["id"].as_str().unwrap();

    let first = parse_body(
        app.public_post(
            "/api/v1/vouchers/redeem",
            json!({ "code": code, "amount_cents": 3000, "booking_id": booking_id }),
        )
        .await,
    )
    .await;
    assert_eq!(first["applied_amount_cents"], 3000);
    assert_eq!(first["remaining_balance_cents"], 0);

    // Replaying the same pair reports the original application, not a second draw.
    let replay = parse_body(
        app.public_post(
            "/api/v1/vouchers/redeem",
            json!({ "code": code, "amount_cents": 3000, "booking_id": booking_id }),
        )
        .await,
    )
    .await;
    assert_eq!(replay["applied_amount_cents"], 3000);
    assert_eq!(replay["remaining_balance_cents"], 0);

    // The booking was only reconciled once.
    let detail = parse_body(app.admin_get(&format!("/api/v1/admin/bookings/{}", booking_id)).await).await;
    assert_eq!(detail["booking"]["voucher_amount_cents"], 3000);
}

#[tokio::test]
async fn test_expired_voucher_is_rejected_at_use_time() {
    let app = TestApp::new().await;
    let (voucher_id, code) = purchase_paid_voucher(&app, 3000).await;

    sqlx::query("UPDATE gift_vouchers SET expiry_date = ? WHERE id = ?")
        .bind(chrono::Utc::now() - chrono::Duration::days(1))
        .bind(&voucher_id)
        .execute(&app.pool)
        .await
        .unwrap();

    let check = parse_body(app.public_post("/api/v1/vouchers/validate", json!({ "code": code })).await).await;
    assert_eq!(check["valid"], false);
    assert_eq!(check["reason"], "expired");

    let event_id = create_active_event(&app, "Too Late", 2000, 10).await;
    let booking = book_tickets(&app, &event_id, "a@test.local", 1).await;
    let res = app
        .public_post(
            "/api/v1/vouchers/redeem",
            json!({ "code": code, "amount_cents": 1000, "booking_id": booking["booking"]["id"] }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_voucher_reason() {
    let app = TestApp::new().await;
    let check = parse_body(
        app.public_post("/api/v1/vouchers/validate", json!({ "code": "GV-DOESNOTEXIST" })).await,
    )
    .await;
    assert_eq!(check["valid"], false);
    assert_eq!(check["reason"], "not_found");
}

#[tokio::test]
async fn test_failed_delivery_is_retried_on_next_confirm() {
    let app = TestApp::new().await;

    let res = app
        .public_post(
            "/api/v1/vouchers",
            json!({
                "amount_cents": 3000,
                "purchaser_name": "Giver",
                "purchaser_email": "giver@test.local",
                "recipient_name": "Getter",
                "recipient_email": "getter@test.local"
            }),
        )
        .await;
    let voucher_id = parse_body(res).await["voucher"]["id"].as_str().unwrap().to_string();

    // Mail service is down when the payment callback first lands.
    app.email.fail.store(true, Ordering::SeqCst);
    let confirm = parse_body(
        app.public_post(&format!("/api/v1/vouchers/{}/confirm", voucher_id), json!({})).await,
    )
    .await;
    assert_eq!(confirm["success"], true);
    assert_eq!(confirm["delivery_sent"], false);
    assert_eq!(app.email.sent_count(), 0);

    // A retried callback delivers once the mail service is back.
    app.email.fail.store(false, Ordering::SeqCst);
    let retry = parse_body(
        app.public_post(&format!("/api/v1/vouchers/{}/confirm", voucher_id), json!({})).await,
    )
    .await;
    assert_eq!(retry["success"], true);
    assert_eq!(retry["delivery_sent"], true);
    assert_eq!(app.email.sent_count(), 1);
    assert_eq!(app.email.sent.lock().unwrap()[0].recipient, "getter@test.local");

    // Further callbacks stay a no-op.
    let third = parse_body(
        app.public_post(&format!("/api/v1/vouchers/{}/confirm", voucher_id), json!({})).await,
    )
    .await;
    assert_eq!(third["delivery_sent"], false);
    assert_eq!(app.email.sent_count(), 1);
}

#[tokio::test]
async fn test_drained_voucher_at_apply_time_releases_booking() {
    let app = TestApp::new().await;
    let event_id = create_active_event(&app, "Drained Night", 5000, 10).await;
    let (voucher_id, code) = purchase_paid_voucher(&app, 3000).await;

    // Balance disappears between the pre-check and the apply, as a
    // concurrent redemption would make it.
    sqlx::query("UPDATE gift_vouchers SET current_balance_cents = 0 WHERE id = ?")
        .bind(&voucher_id)
        .execute(&app.pool)
        .await
        .unwrap();

    let res = app
        .public_post(
            &format!("/api/v1/events/{}/book", event_id),
            json!({
                "customer_name": "A",
                "customer_email": "a@test.local",
                "quantity": 2,
                "voucher_code": code
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // The held inventory was released and the booking closed out.
    let event = parse_body(app.public_get(&format!("/api/v1/events/{}", event_id)).await).await;
    assert_eq!(event["available_tickets"], 10);
    let bookings = parse_body(app.admin_get("/api/v1/admin/bookings").await).await;
    let bookings = bookings.as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["payment_status"], "FAILED");
}

#[tokio::test]
async fn test_redeem_against_cancelled_booking_is_rejected() {
    let app = TestApp::new().await;
    let event_id = create_active_event(&app, "Cancelled Plans", 4000, 10).await;
    let (_, code) = purchase_paid_voucher(&app, 3000).await;

    let booking = book_tickets(&app, &event_id, "a@test.local", 1).await;
    let booking_id = booking["booking"]["id"].as_str().unwrap().to_string();
    let res = app
        .admin_post(&format!("/api/v1/admin/bookings/{}/cancel", booking_id), json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .public_post(
            "/api/v1/vouchers/redeem",
            json!({ "code": code, "amount_cents": 3000, "booking_id": booking_id }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Nothing was drawn from the voucher.
    let check = parse_body(app.public_post("/api/v1/vouchers/validate", json!({ "code": code })).await).await;
    assert_eq!(check["valid"], true);
    assert_eq!(check["balance_cents"], 3000);
}

#[tokio::test]
async fn test_booking_with_invalid_voucher_writes_nothing() {
    let app = TestApp::new().await;
    let event_id = create_active_event(&app, "Guarded Door", 3000, 10).await;

    let res = app
        .public_post(
            &format!("/api/v1/events/{}/book", event_id),
            json!({
                "customer_name": "A",
                "customer_email": "a@test.local",
                "quantity": 1,
                "voucher_code": "GV-DOESNOTEXIST"
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Inventory untouched, no booking row created.
    let event = parse_body(app.public_get(&format!("/api/v1/events/{}", event_id)).await).await;
    assert_eq!(event["available_tickets"], 10);
    let bookings = parse_body(app.admin_get("/api/v1/admin/bookings").await).await;
    assert!(bookings.as_array().unwrap().is_empty());
}
