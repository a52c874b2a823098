use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::services::codes;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub booking_code: String,
    pub event_id: String,
    pub customer_id: String,
    pub quantity: i32,
    pub total_amount_cents: i64,
    pub voucher_amount_cents: i64,
    pub payment_status: String,
    pub payment_method: String,
    pub confirmation_sent: bool,
    pub reminder_sent: bool,
    pub payment_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub event_id: String,
    pub customer_id: String,
    pub quantity: i32,
    pub total_amount_cents: i64,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_code: codes::booking_code(),
            event_id: params.event_id,
            customer_id: params.customer_id,
            quantity: params.quantity,
            total_amount_cents: params.total_amount_cents,
            voucher_amount_cents: 0,
            payment_status: "PENDING".to_string(),
            payment_method: "card".to_string(),
            confirmation_sent: false,
            reminder_sent: false,
            payment_session_id: None,
            created_at: Utc::now(),
        }
    }

    /// Issues one ticket per quantity unit, ordinals starting at 1.
    pub fn issue_tickets(&self) -> Vec<Ticket> {
        (1..=self.quantity)
            .map(|ordinal| Ticket {
                id: Uuid::new_v4().to_string(),
                booking_id: self.id.clone(),
                ticket_code: codes::ticket_code(&self.booking_code, ordinal as u32),
                status: "VALID".to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Ticket {
    pub id: String,
    pub booking_id: String,
    pub ticket_code: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct FormFieldResponse {
    pub id: String,
    pub booking_id: String,
    pub field_id: String,
    pub value: String,
}

impl FormFieldResponse {
    pub fn new(booking_id: String, field_id: String, value: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id,
            field_id,
            value,
        }
    }
}
