use std::sync::Arc;

use crate::domain::ports::{BookingRepository, CustomerRepository, EventRepository, VoucherRepository};
use crate::domain::services::communication_service::CommunicationService;
use crate::domain::services::confirmation::format_pence;
use crate::domain::services::voucher_service::VoucherService;
use crate::error::AppError;
use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

/// Expiry reminders go out this many days before a voucher lapses.
const EXPIRY_REMINDER_DAYS: i64 = 7;

#[derive(Debug, Default, Serialize)]
pub struct SweepReport {
    pub examined: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Cron-triggered sweeps. Every send is claimed through a conditional flag
/// update immediately before acting, so overlapping invocations stay
/// at-most-once; a failure for one row never aborts the rest of the sweep.
pub struct NotificationService {
    booking_repo: Arc<dyn BookingRepository>,
    event_repo: Arc<dyn EventRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    voucher_repo: Arc<dyn VoucherRepository>,
    voucher_service: Arc<VoucherService>,
    comm: Arc<CommunicationService>,
    ops_alert_email: String,
}

impl NotificationService {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        event_repo: Arc<dyn EventRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        voucher_repo: Arc<dyn VoucherRepository>,
        voucher_service: Arc<VoucherService>,
        comm: Arc<CommunicationService>,
        ops_alert_email: String,
    ) -> Self {
        Self {
            booking_repo,
            event_repo,
            customer_repo,
            voucher_repo,
            voucher_service,
            comm,
            ops_alert_email,
        }
    }

    /// Completed bookings whose event starts within the next 24 hours and
    /// have not been reminded yet.
    pub async fn reminder_sweep(&self) -> Result<SweepReport, AppError> {
        let now = Utc::now();
        let bookings = self.booking_repo.find_due_reminders(now, now + Duration::hours(24)).await?;

        let mut report = SweepReport::default();
        for booking in bookings {
            report.examined += 1;

            if !self.booking_repo.claim_reminder(&booking.id).await? {
                continue;
            }

            let sent = async {
                let event = self
                    .event_repo
                    .find_by_id(&booking.event_id)
                    .await?
                    .ok_or(AppError::NotFound("Event vanished mid-sweep".into()))?;
                let customer = self
                    .customer_repo
                    .find_by_id(&booking.customer_id)
                    .await?
                    .ok_or(AppError::NotFound("Customer vanished mid-sweep".into()))?;

                let context = json!({
                    "customer_name": customer.name,
                    "event_title": event.title,
                    "location": event.location,
                    "starts_at": event.starts_at.format("%Y-%m-%d %H:%M").to_string(),
                    "quantity": booking.quantity,
                    "booking_code": booking.booking_code,
                });
                self.comm
                    .send_templated("booking_reminder", &customer.email, &context, None)
                    .await
            }
            .await;

            match sent {
                Ok(_) => report.sent += 1,
                Err(e) => {
                    warn!("Reminder failed for booking {}: {:?}", booking.booking_code, e);
                    self.booking_repo.clear_reminder(&booking.id).await?;
                    report.failed += 1;
                }
            }
        }

        info!("Reminder sweep: {:?}", report);
        Ok(report)
    }

    /// Active future events at >= 80% occupancy or with five or fewer
    /// tickets left; alerts the operations address once per event.
    pub async fn low_inventory_sweep(&self) -> Result<SweepReport, AppError> {
        let events = self.event_repo.find_low_stock(Utc::now()).await?;

        let mut report = SweepReport::default();
        for event in events {
            report.examined += 1;

            if !self.event_repo.claim_low_stock_alert(&event.id).await? {
                continue;
            }

            let occupancy_pct = if event.capacity > 0 {
                event.booked_tickets() as i64 * 100 / event.capacity as i64
            } else {
                100
            };
            let context = json!({
                "event_title": event.title,
                "starts_at": event.starts_at.format("%Y-%m-%d %H:%M").to_string(),
                "available_tickets": event.available_tickets,
                "capacity": event.capacity,
                "occupancy_pct": occupancy_pct,
            });

            match self
                .comm
                .send_templated("low_inventory", &self.ops_alert_email, &context, None)
                .await
            {
                Ok(_) => report.sent += 1,
                Err(e) => {
                    warn!("Low-inventory alert failed for event {}: {:?}", event.id, e);
                    self.event_repo.clear_low_stock_alert(&event.id).await?;
                    report.failed += 1;
                }
            }
        }

        info!("Low-inventory sweep: {:?}", report);
        Ok(report)
    }

    /// Paid vouchers whose scheduled delivery time has arrived.
    pub async fn voucher_delivery_sweep(&self) -> Result<SweepReport, AppError> {
        let vouchers = self.voucher_repo.find_due_delivery(Utc::now()).await?;

        let mut report = SweepReport::default();
        for voucher in vouchers {
            report.examined += 1;

            if !self.voucher_repo.claim_delivery(&voucher.id).await? {
                continue;
            }

            match self.voucher_service.send_delivery_email(&voucher).await {
                Ok(_) => report.sent += 1,
                Err(e) => {
                    warn!("Scheduled delivery failed for voucher {}: {:?}", voucher.code, e);
                    self.voucher_repo.clear_delivery(&voucher.id).await?;
                    report.failed += 1;
                }
            }
        }

        info!("Voucher delivery sweep: {:?}", report);
        Ok(report)
    }

    /// Active vouchers expiring within the reminder window. Status is not
    /// rewritten here; expiry stays a use-time check.
    pub async fn voucher_expiry_sweep(&self) -> Result<SweepReport, AppError> {
        let vouchers = self.voucher_repo.find_expiring(Utc::now(), EXPIRY_REMINDER_DAYS).await?;

        let mut report = SweepReport::default();
        for voucher in vouchers {
            report.examined += 1;

            if !self.voucher_repo.claim_expiry_reminder(&voucher.id).await? {
                continue;
            }

            let context = json!({
                "recipient_name": voucher.recipient_name,
                "voucher_code": voucher.code,
                "balance": format_pence(voucher.current_balance_cents),
                "expiry_date": voucher.expiry_date.format("%Y-%m-%d").to_string(),
            });

            match self
                .comm
                .send_templated("voucher_expiry", &voucher.recipient_email, &context, None)
                .await
            {
                Ok(_) => report.sent += 1,
                Err(e) => {
                    warn!("Expiry reminder failed for voucher {}: {:?}", voucher.code, e);
                    self.voucher_repo.clear_expiry_reminder(&voucher.id).await?;
                    report.failed += 1;
                }
            }
        }

        info!("Voucher expiry sweep: {:?}", report);
        Ok(report)
    }
}
