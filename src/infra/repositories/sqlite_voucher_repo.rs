use crate::domain::{
    models::voucher::{GiftVoucher, RedemptionOutcome, VoucherRedemption},
    ports::VoucherRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

pub struct SqliteVoucherRepo {
    pool: SqlitePool,
}

impl SqliteVoucherRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VoucherRepository for SqliteVoucherRepo {
    async fn create(&self, voucher: &GiftVoucher) -> Result<GiftVoucher, AppError> {
        sqlx::query_as::<_, GiftVoucher>(
            r#"INSERT INTO gift_vouchers (
                id, code, voucher_type, original_amount_cents, current_balance_cents,
                purchaser_name, purchaser_email, recipient_name, recipient_email,
                personal_message, status, payment_status, expiry_date, scheduled_delivery,
                delivery_sent, expiry_reminder_sent, payment_session_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *"#,
        )
            .bind(&voucher.id)
            .bind(&voucher.code)
            .bind(&voucher.voucher_type)
            .bind(voucher.original_amount_cents)
            .bind(voucher.current_balance_cents)
            .bind(&voucher.purchaser_name)
            .bind(&voucher.purchaser_email)
            .bind(&voucher.recipient_name)
            .bind(&voucher.recipient_email)
            .bind(&voucher.personal_message)
            .bind(&voucher.status)
            .bind(&voucher.payment_status)
            .bind(voucher.expiry_date)
            .bind(voucher.scheduled_delivery)
            .bind(voucher.delivery_sent)
            .bind(voucher.expiry_reminder_sent)
            .bind(&voucher.payment_session_id)
            .bind(voucher.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<GiftVoucher>, AppError> {
        sqlx::query_as::<_, GiftVoucher>("SELECT * FROM gift_vouchers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<GiftVoucher>, AppError> {
        sqlx::query_as::<_, GiftVoucher>("SELECT * FROM gift_vouchers WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<GiftVoucher>, AppError> {
        sqlx::query_as::<_, GiftVoucher>("SELECT * FROM gift_vouchers ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn set_payment_session(&self, id: &str, session_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE gift_vouchers SET payment_session_id = ? WHERE id = ?")
            .bind(session_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn mark_paid(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE gift_vouchers SET payment_status = 'COMPLETED'
             WHERE id = ? AND payment_status = 'PENDING'",
        )
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn apply(&self, voucher_id: &str, booking_id: &str, requested_cents: i64) -> Result<RedemptionOutcome, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Replay guard: the unique (voucher, booking) pair makes redemption
        // idempotent per booking.
        let existing = sqlx::query_as::<_, VoucherRedemption>(
            "SELECT * FROM voucher_redemptions WHERE voucher_id = ? AND booking_id = ?",
        )
            .bind(voucher_id)
            .bind(booking_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if let Some(redemption) = existing {
            let voucher = sqlx::query_as::<_, GiftVoucher>("SELECT * FROM gift_vouchers WHERE id = ?")
                .bind(voucher_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            return Ok(RedemptionOutcome {
                applied_amount_cents: redemption.amount_cents,
                remaining_balance_cents: voucher.current_balance_cents,
                replayed: true,
            });
        }

        let voucher = sqlx::query_as::<_, GiftVoucher>("SELECT * FROM gift_vouchers WHERE id = ?")
            .bind(voucher_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Voucher not found".into()))?;

        let applied = requested_cents.min(voucher.current_balance_cents);
        if applied == 0 {
            return Err(AppError::Conflict("Voucher has no remaining balance".into()));
        }

        // Conditional decrement: double-spend protection under concurrent
        // redemption attempts.
        let debited = sqlx::query(
            "UPDATE gift_vouchers SET current_balance_cents = current_balance_cents - ?1
             WHERE id = ?2 AND status = 'ACTIVE' AND current_balance_cents >= ?1",
        )
            .bind(applied)
            .bind(voucher_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if debited.rows_affected() == 0 {
            return Err(AppError::Conflict("Voucher balance changed, redemption aborted".into()));
        }

        sqlx::query(
            "UPDATE gift_vouchers SET status = 'REDEEMED'
             WHERE id = ? AND current_balance_cents = 0 AND status = 'ACTIVE'",
        )
            .bind(voucher_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query(
            "INSERT INTO voucher_redemptions (id, voucher_id, booking_id, amount_cents, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
            .bind(Uuid::new_v4().to_string())
            .bind(voucher_id)
            .bind(booking_id)
            .bind(applied)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        // Booking-side reconciliation of the mixed payment split.
        sqlx::query(
            "UPDATE bookings SET
                voucher_amount_cents = voucher_amount_cents + ?1,
                payment_method = CASE
                    WHEN voucher_amount_cents + ?1 >= total_amount_cents THEN 'voucher'
                    ELSE 'mixed'
                END
             WHERE id = ?2",
        )
            .bind(applied)
            .bind(booking_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        Ok(RedemptionOutcome {
            applied_amount_cents: applied,
            remaining_balance_cents: voucher.current_balance_cents - applied,
            replayed: false,
        })
    }

    async fn find_due_delivery(&self, now: DateTime<Utc>) -> Result<Vec<GiftVoucher>, AppError> {
        sqlx::query_as::<_, GiftVoucher>(
            "SELECT * FROM gift_vouchers
             WHERE payment_status = 'COMPLETED' AND status = 'ACTIVE'
               AND delivery_sent = 0
               AND (scheduled_delivery IS NULL OR scheduled_delivery <= ?)",
        )
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn claim_delivery(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE gift_vouchers SET delivery_sent = 1 WHERE id = ? AND delivery_sent = 0")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn clear_delivery(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE gift_vouchers SET delivery_sent = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn find_expiring(&self, now: DateTime<Utc>, within_days: i64) -> Result<Vec<GiftVoucher>, AppError> {
        sqlx::query_as::<_, GiftVoucher>(
            "SELECT * FROM gift_vouchers
             WHERE status = 'ACTIVE' AND payment_status = 'COMPLETED'
               AND expiry_reminder_sent = 0
               AND expiry_date > ? AND expiry_date <= ?",
        )
            .bind(now)
            .bind(now + Duration::days(within_days))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn claim_expiry_reminder(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE gift_vouchers SET expiry_reminder_sent = 1 WHERE id = ? AND expiry_reminder_sent = 0",
        )
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn clear_expiry_reminder(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE gift_vouchers SET expiry_reminder_sent = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
