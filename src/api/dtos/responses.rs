use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::models::{
    booking::{Booking, FormFieldResponse, Ticket},
    customer::Customer,
    event::{Event, EventFormField},
    voucher::GiftVoucher,
};

#[derive(Serialize)]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: Event,
    pub form_fields: Vec<EventFormField>,
}

#[derive(Serialize)]
pub struct BookingCreatedResponse {
    pub booking: Booking,
    pub tickets: Vec<Ticket>,
    pub voucher_applied_cents: i64,
    pub payment_session_url: Option<String>,
}

#[derive(Serialize)]
pub struct BookingDetailResponse {
    pub booking: Booking,
    pub tickets: Vec<Ticket>,
    pub form_responses: Vec<FormFieldResponse>,
}

#[derive(Serialize)]
pub struct CustomerDetailResponse {
    #[serde(flatten)]
    pub customer: Customer,
    pub bookings: Vec<Booking>,
}

#[derive(Serialize)]
pub struct VoucherPurchasedResponse {
    pub voucher: GiftVoucher,
    pub payment_session_url: Option<String>,
}

#[derive(Serialize)]
pub struct VoucherConfirmationResponse {
    pub success: bool,
    pub delivery_sent: bool,
}

#[derive(Serialize)]
pub struct VoucherValidationResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

#[derive(Serialize)]
pub struct TemplatePreviewResponse {
    pub subject: String,
    pub body_html: String,
}
