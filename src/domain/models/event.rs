use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub duration_min: i32,
    pub price_cents: i64,
    pub capacity: i32,
    pub available_tickets: i32,
    pub status: String,
    pub calendar_event_id: Option<String>,
    pub low_stock_alert_sent: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewEventParams {
    pub title: String,
    pub category: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub duration_min: i32,
    pub price_cents: i64,
    pub capacity: i32,
    pub status: String,
}

impl Event {
    pub fn new(params: NewEventParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: params.title,
            category: params.category,
            description: params.description,
            location: params.location,
            starts_at: params.starts_at,
            duration_min: params.duration_min,
            price_cents: params.price_cents,
            capacity: params.capacity,
            available_tickets: params.capacity,
            status: params.status,
            calendar_event_id: None,
            low_stock_alert_sent: false,
            created_at: Utc::now(),
        }
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.starts_at + chrono::Duration::minutes(self.duration_min as i64)
    }

    pub fn booked_tickets(&self) -> i32 {
        self.capacity - self.available_tickets
    }
}

/// Custom form schema attached to an event. The `options` column is stored
/// as JSON text and parsed at the repository edge; malformed JSON degrades
/// to an empty list.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EventFormField {
    pub id: String,
    pub event_id: String,
    pub label: String,
    pub field_type: String,
    pub required: bool,
    pub options: Vec<String>,
    pub sort_order: i32,
}

impl EventFormField {
    pub fn new(event_id: String, label: String, field_type: String, required: bool, options: Vec<String>, sort_order: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            label,
            field_type,
            required,
            options,
            sort_order,
        }
    }
}
