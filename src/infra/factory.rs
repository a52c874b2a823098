use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::{Config, DataSourceKind};
use crate::domain::ports::EventRepository;
use crate::infra::calendar::http_calendar_service::HttpCalendarService;
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::payment::http_payment_gateway::HttpPaymentGateway;
use crate::infra::repositories::{
    fixture_event_repo::FixtureEventRepo, sqlite_booking_repo::SqliteBookingRepo,
    sqlite_communication_repo::SqliteCommunicationRepo, sqlite_customer_repo::SqliteCustomerRepo,
    sqlite_event_repo::SqliteEventRepo, sqlite_voucher_repo::SqliteVoucherRepo,
};
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> AppState {
    info!("Initializing SQLite connection with WAL mode...");

    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid SQLite connection string")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .expect("Failed to connect to SQLite");

    run_sqlite_migrations(&pool).await;

    let event_repo: Arc<dyn EventRepository> = match config.data_source {
        DataSourceKind::Live => Arc::new(SqliteEventRepo::new(pool.clone())),
        DataSourceKind::Fixture => {
            info!("Event catalogue running from fixture data (read-only)");
            Arc::new(FixtureEventRepo::new())
        }
    };

    AppState::new(
        config.clone(),
        event_repo,
        Arc::new(SqliteCustomerRepo::new(pool.clone())),
        Arc::new(SqliteBookingRepo::new(pool.clone())),
        Arc::new(SqliteVoucherRepo::new(pool.clone())),
        Arc::new(SqliteCommunicationRepo::new(pool.clone())),
        Arc::new(HttpEmailService::new(
            config.mail_service_url.clone(),
            config.mail_service_token.clone(),
        )),
        Arc::new(HttpPaymentGateway::new(
            config.payment_gateway_url.clone(),
            config.payment_gateway_key.clone(),
            config.checkout_return_url.clone(),
        )),
        Arc::new(HttpCalendarService::new(
            config.calendar_service_url.clone(),
            config.calendar_service_token.clone(),
        )),
    )
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
