use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::services::codes;

/// Gift vouchers are valid for twelve months from purchase.
const VALIDITY_DAYS: i64 = 365;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct GiftVoucher {
    pub id: String,
    pub code: String,
    pub voucher_type: String,
    pub original_amount_cents: i64,
    pub current_balance_cents: i64,
    pub purchaser_name: String,
    pub purchaser_email: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub personal_message: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub expiry_date: DateTime<Utc>,
    pub scheduled_delivery: Option<DateTime<Utc>>,
    pub delivery_sent: bool,
    pub expiry_reminder_sent: bool,
    pub payment_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewVoucherParams {
    pub amount_cents: i64,
    pub purchaser_name: String,
    pub purchaser_email: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub personal_message: Option<String>,
    pub scheduled_delivery: Option<DateTime<Utc>>,
}

impl GiftVoucher {
    pub fn new(params: NewVoucherParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            code: codes::voucher_code(),
            voucher_type: "AMOUNT".to_string(),
            original_amount_cents: params.amount_cents,
            current_balance_cents: params.amount_cents,
            purchaser_name: params.purchaser_name,
            purchaser_email: params.purchaser_email,
            recipient_name: params.recipient_name,
            recipient_email: params.recipient_email,
            personal_message: params.personal_message,
            status: "ACTIVE".to_string(),
            payment_status: "PENDING".to_string(),
            expiry_date: now + Duration::days(VALIDITY_DAYS),
            scheduled_delivery: params.scheduled_delivery,
            delivery_sent: false,
            expiry_reminder_sent: false,
            payment_session_id: None,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_date
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct VoucherRedemption {
    pub id: String,
    pub voucher_id: String,
    pub booking_id: String,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Result of applying voucher balance against a booking. `replayed` marks a
/// repeat of an already-recorded `(voucher, booking)` pair, which returns
/// the original amount without touching the balance again.
#[derive(Debug, Clone, Serialize)]
pub struct RedemptionOutcome {
    pub applied_amount_cents: i64,
    pub remaining_balance_cents: i64,
    #[serde(skip)]
    pub replayed: bool,
}
