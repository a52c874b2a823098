use crate::domain::{models::customer::Customer, ports::CustomerRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

pub struct SqliteCustomerRepo {
    pool: SqlitePool,
}

impl SqliteCustomerRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for SqliteCustomerRepo {
    async fn upsert(&self, email: &str, name: &str, phone: Option<&str>) -> Result<Customer, AppError> {
        sqlx::query_as::<_, Customer>(
            r#"INSERT INTO customers (id, email, name, phone, total_bookings, total_spent_cents, created_at)
               VALUES (?, ?, ?, ?, 0, 0, ?)
               ON CONFLICT(email) DO UPDATE SET
                   name = excluded.name,
                   phone = COALESCE(excluded.phone, customers.phone)
               RETURNING *"#,
        )
            .bind(Uuid::new_v4().to_string())
            .bind(email)
            .bind(name)
            .bind(phone)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, AppError> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Customer>, AppError> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn apply_booking_totals(&self, id: &str, amount_cents: i64) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE customers SET total_bookings = total_bookings + 1,
                                  total_spent_cents = total_spent_cents + ?
             WHERE id = ?",
        )
            .bind(amount_cents)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
