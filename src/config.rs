use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub data_source: DataSourceKind,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub payment_gateway_url: String,
    pub payment_gateway_key: String,
    pub checkout_return_url: String,
    pub calendar_service_url: String,
    pub calendar_service_token: String,
    pub admin_token: String,
    pub cron_secret: String,
    pub ops_alert_email: String,
}

/// Which event data source the process is wired to: the live SQLite store or
/// the read-only fixture catalogue. Selected by configuration, never by
/// catching a failure on the live path.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DataSourceKind {
    Live,
    Fixture,
}

impl Config {
    pub fn from_env() -> Self {
        let data_source = match env::var("DATA_SOURCE").unwrap_or_else(|_| "live".to_string()).as_str() {
            "fixture" => DataSourceKind::Fixture,
            _ => DataSourceKind::Live,
        };

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            data_source,
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            payment_gateway_url: env::var("PAYMENT_GATEWAY_URL").unwrap_or_else(|_| "https://api.payments.local".to_string()),
            payment_gateway_key: env::var("PAYMENT_GATEWAY_KEY").expect("PAYMENT_GATEWAY_KEY must be set"),
            checkout_return_url: env::var("CHECKOUT_RETURN_URL").unwrap_or_else(|_| "https://mystery-events.local/checkout".to_string()),
            calendar_service_url: env::var("CALENDAR_SERVICE_URL").unwrap_or_else(|_| "https://api.calendar.local".to_string()),
            calendar_service_token: env::var("CALENDAR_SERVICE_TOKEN").unwrap_or_default(),
            admin_token: env::var("ADMIN_TOKEN").expect("ADMIN_TOKEN must be set"),
            cron_secret: env::var("CRON_SECRET").expect("CRON_SECRET must be set"),
            ops_alert_email: env::var("OPS_ALERT_EMAIL").unwrap_or_else(|_| "ops@mystery-events.local".to_string()),
        }
    }
}
