use std::sync::Arc;

use crate::domain::models::{booking::Booking, event::Event};
use crate::domain::ports::{BookingRepository, CalendarService, CustomerRepository, EventRepository};
use crate::domain::services::communication_service::CommunicationService;
use crate::domain::services::ics::generate_ics;
use crate::error::AppError;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct ConfirmationOutcome {
    pub success: bool,
    pub email_sent: bool,
    pub calendar_updated: bool,
}

/// Post-payment finalization: completes the booking, updates customer
/// aggregates, sends the confirmation email and syncs the event to the
/// external calendar. Idempotent per booking; the email and calendar steps
/// are fail-soft and reported as flags rather than errors.
pub struct ConfirmationService {
    booking_repo: Arc<dyn BookingRepository>,
    event_repo: Arc<dyn EventRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    calendar: Arc<dyn CalendarService>,
    comm: Arc<CommunicationService>,
}

impl ConfirmationService {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        event_repo: Arc<dyn EventRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        calendar: Arc<dyn CalendarService>,
        comm: Arc<CommunicationService>,
    ) -> Self {
        Self {
            booking_repo,
            event_repo,
            customer_repo,
            calendar,
            comm,
        }
    }

    pub async fn confirm(&self, booking_id: &str) -> Result<ConfirmationOutcome, AppError> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or(AppError::NotFound("Booking not found".into()))?;

        if booking.confirmation_sent {
            info!("Booking {} already confirmed, skipping", booking.booking_code);
            return Ok(ConfirmationOutcome {
                success: true,
                email_sent: false,
                calendar_updated: false,
            });
        }

        let event = self
            .event_repo
            .find_by_id(&booking.event_id)
            .await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        // Only the invocation that wins the PENDING -> COMPLETED transition
        // updates customer aggregates.
        let first_completion = self.booking_repo.mark_completed(&booking.id).await?;
        if first_completion {
            if let Err(e) = self
                .customer_repo
                .apply_booking_totals(&booking.customer_id, booking.total_amount_cents)
                .await
            {
                warn!("Failed to update customer aggregates for {}: {:?}", booking.customer_id, e);
            }
        }

        let email_sent = self.send_confirmation_email(&booking, &event).await;
        let calendar_updated = self.sync_calendar(&event).await;

        Ok(ConfirmationOutcome {
            success: true,
            email_sent,
            calendar_updated,
        })
    }

    async fn send_confirmation_email(&self, booking: &Booking, event: &Event) -> bool {
        let customer = match self.customer_repo.find_by_id(&booking.customer_id).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                warn!("Customer {} missing for booking {}", booking.customer_id, booking.id);
                return false;
            }
            Err(e) => {
                warn!("Customer lookup failed for booking {}: {:?}", booking.id, e);
                return false;
            }
        };

        let context = json!({
            "customer_name": customer.name,
            "event_title": event.title,
            "event_category": event.category,
            "location": event.location,
            "starts_at": event.starts_at.format("%Y-%m-%d %H:%M").to_string(),
            "quantity": booking.quantity,
            "booking_code": booking.booking_code,
            "total_amount": format_pence(booking.total_amount_cents),
        });

        let ics = generate_ics(event, booking);

        match self
            .comm
            .send_templated("booking_confirmation", &customer.email, &context, Some(("event.ics", ics.into_bytes())))
            .await
        {
            Ok(_) => {
                if let Err(e) = self.booking_repo.set_confirmation_sent(&booking.id).await {
                    warn!("Failed to flag confirmation_sent on {}: {:?}", booking.id, e);
                }
                true
            }
            Err(e) => {
                warn!("Confirmation email failed for booking {}: {:?}", booking.booking_code, e);
                false
            }
        }
    }

    /// Creates the calendar entry on the event's first confirmation and
    /// updates attendee totals afterwards. Never fatal to the booking.
    async fn sync_calendar(&self, event: &Event) -> bool {
        // Re-read so the attendee count reflects the decrement this booking made.
        let current = match self.event_repo.find_by_id(&event.id).await {
            Ok(Some(e)) => e,
            _ => event.clone(),
        };
        let attendees = current.booked_tickets();

        let result = match &current.calendar_event_id {
            None => match self.calendar.create_entry(&current, attendees).await {
                Ok(entry_id) => self.event_repo.set_calendar_ref(&current.id, &entry_id).await,
                Err(e) => Err(e),
            },
            Some(entry_id) => self.calendar.update_entry(entry_id, &current, attendees).await,
        };

        match result {
            Ok(_) => true,
            Err(e) => {
                warn!("Calendar sync failed for event {}: {:?}", current.id, e);
                false
            }
        }
    }
}

pub fn format_pence(cents: i64) -> String {
    format!("\u{00a3}{}.{:02}", cents / 100, cents % 100)
}
