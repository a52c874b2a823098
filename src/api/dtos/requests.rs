use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub duration_min: i32,
    pub price_cents: i64,
    pub capacity: i32,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub duration_min: Option<i32>,
    pub price_cents: Option<i64>,
    pub capacity: Option<i32>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct FormFieldInput {
    pub label: String,
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Deserialize)]
pub struct ReplaceFormFieldsRequest {
    pub fields: Vec<FormFieldInput>,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub quantity: i32,
    pub voucher_code: Option<String>,
    #[serde(default)]
    pub form_answers: HashMap<String, String>,
}

#[derive(Deserialize)]
pub struct PurchaseVoucherRequest {
    pub amount_cents: i64,
    pub purchaser_name: String,
    pub purchaser_email: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub personal_message: Option<String>,
    pub scheduled_delivery: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct ValidateVoucherRequest {
    pub code: String,
}

#[derive(Deserialize)]
pub struct RedeemVoucherRequest {
    pub code: String,
    pub amount_cents: i64,
    pub booking_id: String,
}

#[derive(Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub subject: String,
    pub body_html: String,
    #[serde(default)]
    pub variables: Vec<String>,
}

#[derive(Deserialize)]
pub struct UpdateTemplateRequest {
    pub subject: Option<String>,
    pub body_html: Option<String>,
    pub variables: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct PreviewTemplateRequest {
    pub context: serde_json::Value,
}

#[derive(Deserialize)]
pub struct MailLogQuery {
    pub recipient: Option<String>,
}
