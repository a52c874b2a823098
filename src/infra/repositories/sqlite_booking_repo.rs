use crate::domain::{
    models::booking::{Booking, FormFieldResponse, Ticket},
    ports::BookingRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_with_tickets(
        &self,
        booking: &Booking,
        tickets: &[Ticket],
        responses: &[FormFieldResponse],
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Conditional decrement: serializes concurrent reservations on the
        // same event and rejects oversell without a separate hold stage.
        let reserved = sqlx::query(
            "UPDATE events SET available_tickets = available_tickets - ?1
             WHERE id = ?2 AND status = 'ACTIVE' AND available_tickets >= ?1",
        )
            .bind(booking.quantity)
            .bind(&booking.event_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if reserved.rows_affected() == 0 {
            let row = sqlx::query("SELECT status, available_tickets FROM events WHERE id = ?")
                .bind(&booking.event_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            return Err(match row {
                None => AppError::NotFound("Event not found".into()),
                Some(row) => {
                    let status: String = row.get("status");
                    if status != "ACTIVE" {
                        AppError::Conflict("Event is not open for booking".into())
                    } else {
                        AppError::Conflict("Insufficient tickets available".into())
                    }
                }
            });
        }

        sqlx::query(
            "UPDATE events SET status = 'SOLDOUT'
             WHERE id = ? AND available_tickets = 0 AND status = 'ACTIVE'",
        )
            .bind(&booking.event_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Booking>(
            r#"INSERT INTO bookings (
                id, booking_code, event_id, customer_id, quantity, total_amount_cents,
                voucher_amount_cents, payment_status, payment_method, confirmation_sent,
                reminder_sent, payment_session_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *"#,
        )
            .bind(&booking.id)
            .bind(&booking.booking_code)
            .bind(&booking.event_id)
            .bind(&booking.customer_id)
            .bind(booking.quantity)
            .bind(booking.total_amount_cents)
            .bind(booking.voucher_amount_cents)
            .bind(&booking.payment_status)
            .bind(&booking.payment_method)
            .bind(booking.confirmation_sent)
            .bind(booking.reminder_sent)
            .bind(&booking.payment_session_id)
            .bind(booking.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for ticket in tickets {
            sqlx::query("INSERT INTO tickets (id, booking_id, ticket_code, status) VALUES (?, ?, ?, ?)")
                .bind(&ticket.id)
                .bind(&ticket.booking_id)
                .bind(&ticket.ticket_code)
                .bind(&ticket.status)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        for response in responses {
            sqlx::query("INSERT INTO form_responses (id, booking_id, field_id, value) VALUES (?, ?, ?, ?)")
                .bind(&response.id)
                .bind(&response.booking_id)
                .bind(&response.field_id)
                .bind(&response.value)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE booking_code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE event_id = ? ORDER BY created_at DESC")
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE customer_id = ? ORDER BY created_at DESC")
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_by_event(&self, event_id: &str) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM bookings WHERE event_id = ?")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count"))
    }

    async fn list_tickets(&self, booking_id: &str) -> Result<Vec<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE booking_id = ? ORDER BY ticket_code ASC")
            .bind(booking_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_form_responses(&self, booking_id: &str) -> Result<Vec<FormFieldResponse>, AppError> {
        sqlx::query_as::<_, FormFieldResponse>("SELECT * FROM form_responses WHERE booking_id = ?")
            .bind(booking_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn set_payment_session(&self, id: &str, session_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET payment_session_id = ? WHERE id = ?")
            .bind(session_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn mark_completed(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE bookings SET payment_status = 'COMPLETED' WHERE id = ? AND payment_status = 'PENDING'",
        )
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_confirmation_sent(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET confirmation_sent = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn find_due_reminders(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT b.* FROM bookings b
             JOIN events e ON e.id = b.event_id
             WHERE b.payment_status = 'COMPLETED' AND b.reminder_sent = 0
               AND e.starts_at > ? AND e.starts_at <= ?",
        )
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn claim_reminder(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE bookings SET reminder_sent = 1 WHERE id = ? AND reminder_sent = 0")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn clear_reminder(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET reminder_sent = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn cancel(&self, id: &str) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))?;

        if booking.payment_status == "FAILED" {
            return Ok(booking);
        }

        let cancelled = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET payment_status = 'FAILED' WHERE id = ? RETURNING *",
        )
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query("UPDATE tickets SET status = 'CANCELLED' WHERE booking_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        // Restore inventory, guarded so available never exceeds capacity.
        sqlx::query(
            "UPDATE events SET available_tickets = available_tickets + ?1
             WHERE id = ?2 AND available_tickets + ?1 <= capacity",
        )
            .bind(booking.quantity)
            .bind(&booking.event_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query(
            "UPDATE events SET status = 'ACTIVE'
             WHERE id = ? AND status = 'SOLDOUT' AND available_tickets > 0",
        )
            .bind(&booking.event_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(cancelled)
    }
}
