use std::sync::Arc;

use crate::domain::models::voucher::{GiftVoucher, NewVoucherParams, RedemptionOutcome};
use crate::domain::ports::{BookingRepository, PaymentGateway, VoucherRepository};
use crate::domain::services::communication_service::CommunicationService;
use crate::domain::services::confirmation::format_pence;
use crate::error::AppError;
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

/// Maximum purchasable voucher value (in cents).
const MAX_VOUCHER_CENTS: i64 = 500_00;

pub struct VoucherPurchase {
    pub voucher: GiftVoucher,
    pub payment_session_url: Option<String>,
}

pub struct VoucherConfirmation {
    pub success: bool,
    pub delivery_sent: bool,
}

/// Why a voucher cannot be used right now. Expiry is evaluated at use-time
/// against `expiry_date`, regardless of the stored status.
pub enum VoucherProblem {
    NotFound,
    Expired,
    Inactive,
}

impl VoucherProblem {
    pub fn reason(&self) -> &'static str {
        match self {
            VoucherProblem::NotFound => "not_found",
            VoucherProblem::Expired => "expired",
            VoucherProblem::Inactive => "inactive",
        }
    }
}

pub struct VoucherService {
    voucher_repo: Arc<dyn VoucherRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    payment_gateway: Arc<dyn PaymentGateway>,
    comm: Arc<CommunicationService>,
}

impl VoucherService {
    pub fn new(
        voucher_repo: Arc<dyn VoucherRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        payment_gateway: Arc<dyn PaymentGateway>,
        comm: Arc<CommunicationService>,
    ) -> Self {
        Self {
            voucher_repo,
            booking_repo,
            payment_gateway,
            comm,
        }
    }

    pub async fn purchase(&self, params: NewVoucherParams) -> Result<VoucherPurchase, AppError> {
        if params.amount_cents <= 0 || params.amount_cents > MAX_VOUCHER_CENTS {
            return Err(AppError::Validation(format!(
                "Voucher amount must be between 1 and {} cents",
                MAX_VOUCHER_CENTS
            )));
        }
        if !looks_like_email(&params.purchaser_email) || !looks_like_email(&params.recipient_email) {
            return Err(AppError::Validation("A valid purchaser and recipient email is required".into()));
        }

        let voucher = self.voucher_repo.create(&GiftVoucher::new(params)).await?;
        info!("Voucher created: {} ({})", voucher.code, format_pence(voucher.original_amount_cents));

        let payment_session_url = match self
            .payment_gateway
            .create_checkout_session(&voucher.code, voucher.original_amount_cents, &voucher.purchaser_email)
            .await
        {
            Ok(session) => {
                self.voucher_repo.set_payment_session(&voucher.id, &session.id).await?;
                Some(session.url)
            }
            Err(e) => {
                // Non-fatal: the voucher stays payment-pending and the
                // caller may retry checkout.
                warn!("Checkout session failed for voucher {}: {:?}", voucher.code, e);
                None
            }
        };

        Ok(VoucherPurchase {
            voucher,
            payment_session_url,
        })
    }

    /// Payment-callback step: marks the voucher paid and sends the delivery
    /// email unless delivery is scheduled for later (the cron sweep owns it
    /// then). A retried confirm whose earlier delivery attempt failed still
    /// reaches the delivery block; `claim_delivery` keeps the send
    /// at-most-once.
    pub async fn confirm_purchase(&self, voucher_id: &str) -> Result<VoucherConfirmation, AppError> {
        let voucher = self
            .voucher_repo
            .find_by_id(voucher_id)
            .await?
            .ok_or(AppError::NotFound("Voucher not found".into()))?;

        let first_completion = self.voucher_repo.mark_paid(&voucher.id).await?;
        if !first_completion && voucher.delivery_sent {
            return Ok(VoucherConfirmation {
                success: true,
                delivery_sent: false,
            });
        }

        let now = Utc::now();
        let deliver_now = match voucher.scheduled_delivery {
            Some(at) => at <= now,
            None => true,
        };

        let mut delivery_sent = false;
        if deliver_now && self.voucher_repo.claim_delivery(&voucher.id).await? {
            match self.send_delivery_email(&voucher).await {
                Ok(_) => delivery_sent = true,
                Err(e) => {
                    warn!("Voucher delivery email failed for {}: {:?}", voucher.code, e);
                    self.voucher_repo.clear_delivery(&voucher.id).await?;
                }
            }
        }

        Ok(VoucherConfirmation {
            success: true,
            delivery_sent,
        })
    }

    pub async fn send_delivery_email(&self, voucher: &GiftVoucher) -> Result<bool, AppError> {
        let context = json!({
            "recipient_name": voucher.recipient_name,
            "purchaser_name": voucher.purchaser_name,
            "voucher_code": voucher.code,
            "amount": format_pence(voucher.original_amount_cents),
            "personal_message": voucher.personal_message.clone().unwrap_or_default(),
            "expiry_date": voucher.expiry_date.format("%Y-%m-%d").to_string(),
        });
        self.comm
            .send_templated("voucher_delivery", &voucher.recipient_email, &context, None)
            .await
    }

    /// Use-time validation: NotFound / Expired / Inactive, else a snapshot
    /// of the voucher.
    pub async fn validate(&self, code: &str) -> Result<Result<GiftVoucher, VoucherProblem>, AppError> {
        let Some(voucher) = self.voucher_repo.find_by_code(code).await? else {
            return Ok(Err(VoucherProblem::NotFound));
        };
        if voucher.is_expired(Utc::now()) {
            return Ok(Err(VoucherProblem::Expired));
        }
        if voucher.status != "ACTIVE" || voucher.payment_status != "COMPLETED" {
            return Ok(Err(VoucherProblem::Inactive));
        }
        Ok(Ok(voucher))
    }

    /// Applies voucher balance to a booking: `applied = min(requested,
    /// balance)`. Idempotent per `(voucher, booking)` pair.
    pub async fn redeem(&self, code: &str, requested_cents: i64, booking_id: &str) -> Result<RedemptionOutcome, AppError> {
        if requested_cents <= 0 {
            return Err(AppError::Validation("Redemption amount must be positive".into()));
        }

        let voucher = match self.validate(code).await? {
            Ok(v) => v,
            Err(VoucherProblem::NotFound) => return Err(AppError::NotFound("Voucher not found".into())),
            Err(VoucherProblem::Expired) => return Err(AppError::Conflict("Voucher has expired".into())),
            Err(VoucherProblem::Inactive) => return Err(AppError::Conflict("Voucher is not active".into())),
        };

        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or(AppError::NotFound("Booking not found".into()))?;
        if booking.payment_status == "FAILED" {
            return Err(AppError::Conflict("Booking has been cancelled".into()));
        }

        let outcome = self.voucher_repo.apply(&voucher.id, booking_id, requested_cents).await?;
        if outcome.replayed {
            info!(
                "Redemption replay for voucher {} / booking {}: {} already applied",
                voucher.code, booking_id, outcome.applied_amount_cents
            );
        } else {
            info!(
                "Voucher {} applied {} to booking {} (remaining {})",
                voucher.code, outcome.applied_amount_cents, booking_id, outcome.remaining_balance_cents
            );
        }
        Ok(outcome)
    }
}

pub fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
