use crate::domain::{
    models::event::{Event, EventFormField},
    ports::EventRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_form_field(row: sqlx::sqlite::SqliteRow) -> EventFormField {
    // options live in a JSON text column; malformed JSON degrades to an
    // empty list instead of failing the read.
    let options_json: String = row.get("options_json");
    EventFormField {
        id: row.get("id"),
        event_id: row.get("event_id"),
        label: row.get("label"),
        field_type: row.get("field_type"),
        required: row.get("required"),
        options: serde_json::from_str(&options_json).unwrap_or_default(),
        sort_order: row.get("sort_order"),
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            r#"INSERT INTO events (
                id, title, category, description, location, starts_at, duration_min,
                price_cents, capacity, available_tickets, status, calendar_event_id,
                low_stock_alert_sent, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *"#,
        )
            .bind(&event.id)
            .bind(&event.title)
            .bind(&event.category)
            .bind(&event.description)
            .bind(&event.location)
            .bind(event.starts_at)
            .bind(event.duration_min)
            .bind(event.price_cents)
            .bind(event.capacity)
            .bind(event.available_tickets)
            .bind(&event.status)
            .bind(&event.calendar_event_id)
            .bind(event.low_stock_alert_sent)
            .bind(event.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY starts_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_public(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>(
            "SELECT * FROM events
             WHERE status IN ('ACTIVE', 'SOLDOUT') AND starts_at > ?
             ORDER BY starts_at ASC",
        )
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            r#"UPDATE events SET
                title=?, category=?, description=?, location=?, starts_at=?,
                duration_min=?, price_cents=?, capacity=?, available_tickets=?,
                status=?, low_stock_alert_sent=?
               WHERE id=? RETURNING *"#,
        )
            .bind(&event.title)
            .bind(&event.category)
            .bind(&event.description)
            .bind(&event.location)
            .bind(event.starts_at)
            .bind(event.duration_min)
            .bind(event.price_cents)
            .bind(event.capacity)
            .bind(event.available_tickets)
            .bind(&event.status)
            .bind(event.low_stock_alert_sent)
            .bind(&event.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(())
    }

    async fn set_calendar_ref(&self, id: &str, calendar_event_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE events SET calendar_event_id = ? WHERE id = ?")
            .bind(calendar_event_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn find_low_stock(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>(
            "SELECT * FROM events
             WHERE status = 'ACTIVE' AND starts_at > ? AND low_stock_alert_sent = 0
               AND (available_tickets <= 5
                    OR (capacity - available_tickets) * 100 >= capacity * 80)",
        )
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn claim_low_stock_alert(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE events SET low_stock_alert_sent = 1 WHERE id = ? AND low_stock_alert_sent = 0",
        )
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn clear_low_stock_alert(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE events SET low_stock_alert_sent = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn replace_form_fields(&self, event_id: &str, fields: &[EventFormField]) -> Result<Vec<EventFormField>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM event_form_fields WHERE event_id = ?")
            .bind(event_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for field in fields {
            let options_json = serde_json::to_string(&field.options).unwrap_or_else(|_| "[]".to_string());
            sqlx::query(
                "INSERT INTO event_form_fields (id, event_id, label, field_type, required, options_json, sort_order)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
                .bind(&field.id)
                .bind(event_id)
                .bind(&field.label)
                .bind(&field.field_type)
                .bind(field.required)
                .bind(options_json)
                .bind(field.sort_order)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        self.list_form_fields(event_id).await
    }

    async fn list_form_fields(&self, event_id: &str) -> Result<Vec<EventFormField>, AppError> {
        let rows = sqlx::query("SELECT * FROM event_form_fields WHERE event_id = ? ORDER BY sort_order ASC")
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(rows.into_iter().map(row_to_form_field).collect())
    }
}
