use crate::domain::{
    models::event::{Event, EventFormField},
    ports::EventRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Read-only event source backed by built-in sample data. Used when the
/// service runs without a live database, e.g. for demos and frontend
/// development. Every mutation is rejected with a 503.
pub struct FixtureEventRepo {
    events: Vec<Event>,
}

fn sample_event(title: &str, category: &str, location: &str, days_ahead: i64, price_cents: i64, capacity: i32) -> Event {
    let starts_at = Utc::now() + Duration::days(days_ahead);
    Event {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        category: category.to_string(),
        description: format!("Sample listing for {}", title),
        location: location.to_string(),
        starts_at,
        duration_min: 120,
        price_cents,
        capacity,
        available_tickets: capacity,
        status: "ACTIVE".to_string(),
        calendar_event_id: None,
        low_stock_alert_sent: false,
        created_at: Utc::now(),
    }
}

impl FixtureEventRepo {
    pub fn new() -> Self {
        Self {
            events: vec![
                sample_event("The Vanishing Violinist", "murder_mystery", "The Old Theatre, York", 14, 3500, 40),
                sample_event("Cipher Night", "puzzle_hunt", "Riverside Hall, Leeds", 21, 2800, 30),
                sample_event("The Last Seance", "immersive", "Blackwell House, Manchester", 30, 4200, 25),
            ],
        }
    }

    fn read_only<T>(&self) -> Result<T, AppError> {
        Err(AppError::Unavailable("Event catalogue is read-only in fixture mode".into()))
    }
}

impl Default for FixtureEventRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventRepository for FixtureEventRepo {
    async fn create(&self, _event: &Event) -> Result<Event, AppError> {
        self.read_only()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        Ok(self.events.iter().find(|e| e.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Event>, AppError> {
        Ok(self.events.clone())
    }

    async fn list_public(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AppError> {
        let mut upcoming: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.starts_at > now)
            .cloned()
            .collect();
        upcoming.sort_by_key(|e| e.starts_at);
        Ok(upcoming)
    }

    async fn update(&self, _event: &Event) -> Result<Event, AppError> {
        self.read_only()
    }

    async fn delete(&self, _id: &str) -> Result<(), AppError> {
        self.read_only()
    }

    async fn set_calendar_ref(&self, _id: &str, _calendar_event_id: &str) -> Result<(), AppError> {
        self.read_only()
    }

    async fn find_low_stock(&self, _now: DateTime<Utc>) -> Result<Vec<Event>, AppError> {
        Ok(Vec::new())
    }

    async fn claim_low_stock_alert(&self, _id: &str) -> Result<bool, AppError> {
        self.read_only()
    }

    async fn clear_low_stock_alert(&self, _id: &str) -> Result<(), AppError> {
        self.read_only()
    }

    async fn replace_form_fields(&self, _event_id: &str, _fields: &[EventFormField]) -> Result<Vec<EventFormField>, AppError> {
        self.read_only()
    }

    async fn list_form_fields(&self, _event_id: &str) -> Result<Vec<EventFormField>, AppError> {
        Ok(Vec::new())
    }
}
