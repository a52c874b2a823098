use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::models::booking::{Booking, FormFieldResponse, NewBookingParams};
use crate::domain::ports::{BookingRepository, CustomerRepository, EventRepository, PaymentGateway};
use crate::domain::services::confirmation::ConfirmationService;
use crate::domain::services::voucher_service::{looks_like_email, VoucherService};
use crate::error::AppError;
use tracing::{info, warn};

pub const MAX_TICKETS_PER_BOOKING: i32 = 8;

pub struct CreateBookingInput {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub quantity: i32,
    pub voucher_code: Option<String>,
    pub form_answers: HashMap<String, String>,
}

pub struct BookingReceipt {
    pub booking: Booking,
    pub voucher_applied_cents: i64,
    pub payment_session_url: Option<String>,
}

/// Checkout orchestration: customer upsert, atomic booking + ticket +
/// inventory write, optional voucher application, payment-session creation.
pub struct BookingService {
    event_repo: Arc<dyn EventRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    payment_gateway: Arc<dyn PaymentGateway>,
    voucher_service: Arc<VoucherService>,
    confirmation_service: Arc<ConfirmationService>,
}

impl BookingService {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        payment_gateway: Arc<dyn PaymentGateway>,
        voucher_service: Arc<VoucherService>,
        confirmation_service: Arc<ConfirmationService>,
    ) -> Self {
        Self {
            event_repo,
            customer_repo,
            booking_repo,
            payment_gateway,
            voucher_service,
            confirmation_service,
        }
    }

    pub async fn create(&self, event_id: &str, input: CreateBookingInput) -> Result<BookingReceipt, AppError> {
        if input.quantity < 1 || input.quantity > MAX_TICKETS_PER_BOOKING {
            return Err(AppError::Validation(format!(
                "Quantity must be between 1 and {}",
                MAX_TICKETS_PER_BOOKING
            )));
        }
        if input.customer_name.trim().is_empty() {
            return Err(AppError::Validation("Customer name is required".into()));
        }
        if !looks_like_email(&input.customer_email) {
            return Err(AppError::Validation("A valid customer email is required".into()));
        }

        let event = self
            .event_repo
            .find_by_id(event_id)
            .await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        // An invalid voucher aborts before anything is written; races on the
        // balance are handled by the ledger at apply time.
        if let Some(code) = &input.voucher_code {
            if let Err(problem) = self.voucher_service.validate(code).await? {
                return Err(AppError::Validation(format!("Voucher rejected: {}", problem.reason())));
            }
        }

        let customer = self
            .customer_repo
            .upsert(&input.customer_email, input.customer_name.trim(), input.customer_phone.as_deref())
            .await?;

        let total_amount_cents = event.price_cents * input.quantity as i64;

        let booking = Booking::new(NewBookingParams {
            event_id: event.id.clone(),
            customer_id: customer.id.clone(),
            quantity: input.quantity,
            total_amount_cents,
        });
        let tickets = booking.issue_tickets();
        let responses = self.collect_form_responses(&event.id, &booking.id, &input.form_answers).await?;

        // One transaction: inventory decrement, booking, tickets, answers.
        let created = self.booking_repo.create_with_tickets(&booking, &tickets, &responses).await?;
        info!(
            "Booking created: {} ({} x {} for event {})",
            created.booking_code, created.quantity, event.price_cents, event.id
        );

        let mut voucher_applied_cents = 0;
        if let Some(code) = &input.voucher_code {
            match self.voucher_service.redeem(code, total_amount_cents, &created.id).await {
                Ok(outcome) => voucher_applied_cents = outcome.applied_amount_cents,
                Err(e) => {
                    // The balance moved between the pre-check and apply.
                    // Release the committed booking so it does not hold
                    // inventory with no path to completion.
                    warn!(
                        "Voucher redemption failed for booking {}, releasing it: {:?}",
                        created.booking_code, e
                    );
                    self.booking_repo.cancel(&created.id).await?;
                    return Err(e);
                }
            }
        }

        let remainder_cents = total_amount_cents - voucher_applied_cents;

        let payment_session_url = if remainder_cents == 0 {
            // Fully voucher-funded: nothing for the gateway to collect, so
            // the confirmation workflow runs immediately.
            let outcome = self.confirmation_service.confirm(&created.id).await?;
            info!(
                "Booking {} fully covered by voucher (email_sent={})",
                created.booking_code, outcome.email_sent
            );
            None
        } else {
            match self
                .payment_gateway
                .create_checkout_session(&created.booking_code, remainder_cents, &customer.email)
                .await
            {
                Ok(session) => {
                    self.booking_repo.set_payment_session(&created.id, &session.id).await?;
                    Some(session.url)
                }
                Err(e) => {
                    // Non-fatal: booking stays PENDING, caller may retry.
                    warn!("Checkout session failed for booking {}: {:?}", created.booking_code, e);
                    None
                }
            }
        };

        let booking = self.booking_repo.find_by_id(&created.id).await?.unwrap_or(created);

        Ok(BookingReceipt {
            booking,
            voucher_applied_cents,
            payment_session_url,
        })
    }

    async fn collect_form_responses(
        &self,
        event_id: &str,
        booking_id: &str,
        answers: &HashMap<String, String>,
    ) -> Result<Vec<FormFieldResponse>, AppError> {
        let fields = self.event_repo.list_form_fields(event_id).await?;

        for (field_id, _) in answers {
            if !fields.iter().any(|f| &f.id == field_id) {
                return Err(AppError::Validation(format!("Unknown form field: {}", field_id)));
            }
        }

        let mut responses = Vec::new();
        for field in &fields {
            match answers.get(&field.id) {
                Some(value) if !value.trim().is_empty() => {
                    responses.push(FormFieldResponse::new(
                        booking_id.to_string(),
                        field.id.clone(),
                        value.clone(),
                    ));
                }
                _ if field.required => {
                    return Err(AppError::Validation(format!("Missing answer for required field '{}'", field.label)));
                }
                _ => {}
            }
        }
        Ok(responses)
    }
}
