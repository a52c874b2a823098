use ticketing_backend::{
    api::router::create_router,
    config::{Config, DataSourceKind},
    domain::ports::{CalendarService, CheckoutSession, EmailService, EventRepository, PaymentGateway},
    domain::models::event::Event,
    error::AppError,
    infra::repositories::{
        fixture_event_repo::FixtureEventRepo, sqlite_booking_repo::SqliteBookingRepo,
        sqlite_communication_repo::SqliteCommunicationRepo, sqlite_customer_repo::SqliteCustomerRepo,
        sqlite_event_repo::SqliteEventRepo, sqlite_voucher_repo::SqliteVoucherRepo,
    },
    state::AppState,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const CRON_SECRET: &str = "test-cron-secret";

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct SentMail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachment_name: Option<String>,
}

/// Email double that records every send and can be toggled to fail.
pub struct RecordingEmailService {
    pub sent: Mutex<Vec<SentMail>>,
    pub fail: AtomicBool,
}

impl RecordingEmailService {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    #[allow(dead_code)]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        _attachment_data: Option<&[u8]>,
    ) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable("mail service down".into()));
        }
        self.sent.lock().unwrap().push(SentMail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
            attachment_name: attachment_name.map(|s| s.to_string()),
        });
        Ok(())
    }
}

/// Payment double that hands out deterministic sessions, or fails on demand.
pub struct MockPaymentGateway {
    pub fail: AtomicBool,
    pub sessions_created: AtomicUsize,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            sessions_created: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(
        &self,
        reference: &str,
        _amount_cents: i64,
        _customer_email: &str,
    ) -> Result<CheckoutSession, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable("gateway down".into()));
        }
        let n = self.sessions_created.fetch_add(1, Ordering::SeqCst);
        Ok(CheckoutSession {
            id: format!("sess_{}_{}", reference, n),
            url: format!("https://pay.test/checkout/{}", reference),
        })
    }
}

pub struct MockCalendarService {
    pub fail: AtomicBool,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
}

impl MockCalendarService {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            creates: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CalendarService for MockCalendarService {
    async fn create_entry(&self, event: &Event, _attendees: i32) -> Result<String, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable("calendar down".into()));
        }
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(format!("cal_{}", event.id))
    }

    async fn update_entry(&self, _entry_id: &str, _event: &Event, _attendees: i32) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable("calendar down".into()));
        }
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub email: Arc<RecordingEmailService>,
    pub gateway: Arc<MockPaymentGateway>,
    pub calendar: Arc<MockCalendarService>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_data_source(DataSourceKind::Live).await
    }

    #[allow(dead_code)]
    pub async fn fixture() -> Self {
        Self::with_data_source(DataSourceKind::Fixture).await
    }

    async fn with_data_source(data_source: DataSourceKind) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            data_source,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            payment_gateway_url: "http://localhost".to_string(),
            payment_gateway_key: "key".to_string(),
            checkout_return_url: "http://localhost/return".to_string(),
            calendar_service_url: "http://localhost".to_string(),
            calendar_service_token: "token".to_string(),
            admin_token: ADMIN_TOKEN.to_string(),
            cron_secret: CRON_SECRET.to_string(),
            ops_alert_email: "ops@test.local".to_string(),
        };

        let email = Arc::new(RecordingEmailService::new());
        let gateway = Arc::new(MockPaymentGateway::new());
        let calendar = Arc::new(MockCalendarService::new());

        let event_repo: Arc<dyn EventRepository> = match data_source {
            DataSourceKind::Live => Arc::new(SqliteEventRepo::new(pool.clone())),
            DataSourceKind::Fixture => Arc::new(FixtureEventRepo::new()),
        };

        let state = Arc::new(AppState::new(
            config,
            event_repo,
            Arc::new(SqliteCustomerRepo::new(pool.clone())),
            Arc::new(SqliteBookingRepo::new(pool.clone())),
            Arc::new(SqliteVoucherRepo::new(pool.clone())),
            Arc::new(SqliteCommunicationRepo::new(pool.clone())),
            email.clone(),
            gateway.clone(),
            calendar.clone(),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            email,
            gateway,
            calendar,
        }
    }

    pub async fn request(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    #[allow(dead_code)]
    pub async fn public_post(&self, uri: &str, body: Value) -> axum::response::Response {
        self.request("POST", uri, None, Some(body)).await
    }

    #[allow(dead_code)]
    pub async fn public_get(&self, uri: &str) -> axum::response::Response {
        self.request("GET", uri, None, None).await
    }

    #[allow(dead_code)]
    pub async fn admin_post(&self, uri: &str, body: Value) -> axum::response::Response {
        self.request("POST", uri, Some(ADMIN_TOKEN), Some(body)).await
    }

    #[allow(dead_code)]
    pub async fn admin_put(&self, uri: &str, body: Value) -> axum::response::Response {
        self.request("PUT", uri, Some(ADMIN_TOKEN), Some(body)).await
    }

    #[allow(dead_code)]
    pub async fn admin_get(&self, uri: &str) -> axum::response::Response {
        self.request("GET", uri, Some(ADMIN_TOKEN), None).await
    }

    #[allow(dead_code)]
    pub async fn admin_delete(&self, uri: &str) -> axum::response::Response {
        self.request("DELETE", uri, Some(ADMIN_TOKEN), None).await
    }

    #[allow(dead_code)]
    pub async fn cron_post(&self, uri: &str) -> axum::response::Response {
        self.request("POST", uri, Some(CRON_SECRET), None).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

#[allow(dead_code)]
pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Creates an ACTIVE event through the admin API and returns its id.
#[allow(dead_code)]
pub async fn create_active_event(app: &TestApp, title: &str, price_cents: i64, capacity: i32) -> String {
    let starts_at = (chrono::Utc::now() + chrono::Duration::days(14)).to_rfc3339();
    let res = app
        .admin_post(
            "/api/v1/admin/events",
            serde_json::json!({
                "title": title,
                "category": "murder_mystery",
                "description": "A night of intrigue",
                "location": "The Old Theatre",
                "starts_at": starts_at,
                "duration_min": 120,
                "price_cents": price_cents,
                "capacity": capacity,
                "status": "ACTIVE"
            }),
        )
        .await;
    assert_eq!(res.status(), axum::http::StatusCode::CREATED);
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

/// Books `quantity` tickets on the event and returns the created booking JSON.
#[allow(dead_code)]
pub async fn book_tickets(app: &TestApp, event_id: &str, email: &str, quantity: i32) -> Value {
    let res = app
        .public_post(
            &format!("/api/v1/events/{}/book", event_id),
            serde_json::json!({
                "customer_name": "Test Customer",
                "customer_email": email,
                "quantity": quantity
            }),
        )
        .await;
    assert_eq!(res.status(), axum::http::StatusCode::CREATED);
    parse_body(res).await
}

/// Purchases a voucher and confirms payment; returns (voucher_id, code).
#[allow(dead_code)]
pub async fn purchase_paid_voucher(app: &TestApp, amount_cents: i64) -> (String, String) {
    let res = app
        .public_post(
            "/api/v1/vouchers",
            serde_json::json!({
                "amount_cents": amount_cents,
                "purchaser_name": "Giver",
                "purchaser_email": "giver@test.local",
                "recipient_name": "Getter",
                "recipient_email": "getter@test.local"
            }),
        )
        .await;
    assert_eq!(res.status(), axum::http::StatusCode::CREATED);
    let body = parse_body(res).await;
    let voucher_id = body["voucher"]["id"].as_str().unwrap().to_string();
    let code = body["voucher"]["code"].as_str().unwrap().to_string();

    let confirm = app
        .public_post(&format!("/api/v1/vouchers/{}/confirm", voucher_id), serde_json::json!({}))
        .await;
    assert_eq!(confirm.status(), axum::http::StatusCode::OK);

    (voucher_id, code)
}
