use crate::domain::models::{
    booking::{Booking, FormFieldResponse, Ticket},
    communication::{EmailTemplate, MailLog},
    customer::Customer,
    event::{Event, EventFormField},
    voucher::{GiftVoucher, RedemptionOutcome},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn list(&self) -> Result<Vec<Event>, AppError>;
    /// Public catalogue: future events that are ACTIVE or SOLDOUT.
    async fn list_public(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AppError>;
    async fn update(&self, event: &Event) -> Result<Event, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;

    async fn set_calendar_ref(&self, id: &str, calendar_event_id: &str) -> Result<(), AppError>;

    /// Active future events at or past the low-stock threshold whose alert
    /// has not yet been claimed.
    async fn find_low_stock(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AppError>;
    async fn claim_low_stock_alert(&self, id: &str) -> Result<bool, AppError>;
    async fn clear_low_stock_alert(&self, id: &str) -> Result<(), AppError>;

    async fn replace_form_fields(&self, event_id: &str, fields: &[EventFormField]) -> Result<Vec<EventFormField>, AppError>;
    async fn list_form_fields(&self, event_id: &str) -> Result<Vec<EventFormField>, AppError>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Create-or-update keyed by email: name is always patched, phone only
    /// when the caller supplied one.
    async fn upsert(&self, email: &str, name: &str, phone: Option<&str>) -> Result<Customer, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, AppError>;
    async fn list(&self) -> Result<Vec<Customer>, AppError>;
    async fn apply_booking_totals(&self, id: &str, amount_cents: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persists the booking, its tickets and form responses, and decrements
    /// event inventory, as one all-or-nothing transaction. The decrement is
    /// a conditional update; when it affects no row the transaction rolls
    /// back and the failure is classified (not found / not bookable /
    /// insufficient inventory).
    async fn create_with_tickets(
        &self,
        booking: &Booking,
        tickets: &[Ticket],
        responses: &[FormFieldResponse],
    ) -> Result<Booking, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>, AppError>;
    async fn list(&self) -> Result<Vec<Booking>, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn count_by_event(&self, event_id: &str) -> Result<i64, AppError>;
    async fn list_tickets(&self, booking_id: &str) -> Result<Vec<Ticket>, AppError>;
    async fn list_form_responses(&self, booking_id: &str) -> Result<Vec<FormFieldResponse>, AppError>;

    async fn set_payment_session(&self, id: &str, session_id: &str) -> Result<(), AppError>;
    /// Conditional PENDING -> COMPLETED transition; returns whether this
    /// call won the transition.
    async fn mark_completed(&self, id: &str) -> Result<bool, AppError>;
    async fn set_confirmation_sent(&self, id: &str) -> Result<(), AppError>;

    async fn find_due_reminders(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
    async fn claim_reminder(&self, id: &str) -> Result<bool, AppError>;
    async fn clear_reminder(&self, id: &str) -> Result<(), AppError>;

    /// Marks the booking FAILED, cancels its tickets and restores event
    /// inventory in one transaction. Already-failed bookings are a no-op.
    async fn cancel(&self, id: &str) -> Result<Booking, AppError>;
}

#[async_trait]
pub trait VoucherRepository: Send + Sync {
    async fn create(&self, voucher: &GiftVoucher) -> Result<GiftVoucher, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<GiftVoucher>, AppError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<GiftVoucher>, AppError>;
    async fn list(&self) -> Result<Vec<GiftVoucher>, AppError>;

    async fn set_payment_session(&self, id: &str, session_id: &str) -> Result<(), AppError>;
    async fn mark_paid(&self, id: &str) -> Result<bool, AppError>;

    /// Applies up to `requested_cents` of balance against the booking.
    /// Clamping, the conditional balance decrement, the REDEEMED flip, the
    /// redemption record and the booking-side reconciliation all run in one
    /// transaction. A replayed `(voucher, booking)` pair short-circuits to
    /// the originally applied amount.
    async fn apply(&self, voucher_id: &str, booking_id: &str, requested_cents: i64) -> Result<RedemptionOutcome, AppError>;

    async fn find_due_delivery(&self, now: DateTime<Utc>) -> Result<Vec<GiftVoucher>, AppError>;
    async fn claim_delivery(&self, id: &str) -> Result<bool, AppError>;
    async fn clear_delivery(&self, id: &str) -> Result<(), AppError>;

    async fn find_expiring(&self, now: DateTime<Utc>, within_days: i64) -> Result<Vec<GiftVoucher>, AppError>;
    async fn claim_expiry_reminder(&self, id: &str) -> Result<bool, AppError>;
    async fn clear_expiry_reminder(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait CommunicationRepository: Send + Sync {
    async fn create_template(&self, template: &EmailTemplate) -> Result<EmailTemplate, AppError>;
    async fn get_template(&self, id: &str) -> Result<Option<EmailTemplate>, AppError>;
    async fn find_template_by_name(&self, name: &str) -> Result<Option<EmailTemplate>, AppError>;
    async fn list_templates(&self) -> Result<Vec<EmailTemplate>, AppError>;
    async fn update_template(&self, template: &EmailTemplate) -> Result<EmailTemplate, AppError>;
    async fn delete_template(&self, id: &str) -> Result<(), AppError>;

    async fn log_mail(&self, log: &MailLog) -> Result<(), AppError>;
    async fn has_mail_been_sent(&self, recipient: &str, template_name: &str, context_hash: &str) -> Result<bool, AppError>;
    async fn list_logs(&self, recipient: Option<&str>) -> Result<Vec<MailLog>, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        attachment_data: Option<&[u8]>,
    ) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        reference: &str,
        amount_cents: i64,
        customer_email: &str,
    ) -> Result<CheckoutSession, AppError>;
}

#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Creates the external calendar entry for an event; returns the
    /// external entry id.
    async fn create_entry(&self, event: &Event, attendees: i32) -> Result<String, AppError>;
    async fn update_entry(&self, entry_id: &str, event: &Event, attendees: i32) -> Result<(), AppError>;
}
