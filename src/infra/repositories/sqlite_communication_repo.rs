use crate::domain::{
    models::communication::{EmailTemplate, MailLog},
    ports::CommunicationRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

pub struct SqliteCommunicationRepo {
    pool: SqlitePool,
}

impl SqliteCommunicationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_template(row: sqlx::sqlite::SqliteRow) -> EmailTemplate {
    // Declared variable list is JSON text; malformed JSON degrades to an
    // empty list instead of failing the read.
    let variables_json: String = row.get("variables_json");
    EmailTemplate {
        id: row.get("id"),
        name: row.get("name"),
        subject: row.get("subject"),
        body_html: row.get("body_html"),
        variables: serde_json::from_str(&variables_json).unwrap_or_default(),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl CommunicationRepository for SqliteCommunicationRepo {
    async fn create_template(&self, template: &EmailTemplate) -> Result<EmailTemplate, AppError> {
        let variables_json = serde_json::to_string(&template.variables).unwrap_or_else(|_| "[]".to_string());
        let row = sqlx::query(
            r#"INSERT INTO email_templates (id, name, subject, body_html, variables_json, is_active, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#,
        )
            .bind(&template.id)
            .bind(&template.name)
            .bind(&template.subject)
            .bind(&template.body_html)
            .bind(variables_json)
            .bind(template.is_active)
            .bind(template.created_at)
            .bind(template.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(row_to_template(row))
    }

    async fn get_template(&self, id: &str) -> Result<Option<EmailTemplate>, AppError> {
        let row = sqlx::query("SELECT * FROM email_templates WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(row.map(row_to_template))
    }

    async fn find_template_by_name(&self, name: &str) -> Result<Option<EmailTemplate>, AppError> {
        let row = sqlx::query("SELECT * FROM email_templates WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(row.map(row_to_template))
    }

    async fn list_templates(&self) -> Result<Vec<EmailTemplate>, AppError> {
        let rows = sqlx::query("SELECT * FROM email_templates ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(rows.into_iter().map(row_to_template).collect())
    }

    async fn update_template(&self, template: &EmailTemplate) -> Result<EmailTemplate, AppError> {
        let variables_json = serde_json::to_string(&template.variables).unwrap_or_else(|_| "[]".to_string());
        let row = sqlx::query(
            r#"UPDATE email_templates SET
                subject = ?, body_html = ?, variables_json = ?, is_active = ?, updated_at = ?
               WHERE id = ? RETURNING *"#,
        )
            .bind(&template.subject)
            .bind(&template.body_html)
            .bind(variables_json)
            .bind(template.is_active)
            .bind(template.updated_at)
            .bind(&template.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(row_to_template(row))
    }

    async fn delete_template(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM email_templates WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Template not found".into()));
        }
        Ok(())
    }

    async fn log_mail(&self, log: &MailLog) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO mail_logs (id, recipient, template_name, context_hash, status, sent_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
            .bind(&log.id)
            .bind(&log.recipient)
            .bind(&log.template_name)
            .bind(&log.context_hash)
            .bind(&log.status)
            .bind(log.sent_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn has_mail_been_sent(&self, recipient: &str, template_name: &str, context_hash: &str) -> Result<bool, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM mail_logs
             WHERE recipient = ? AND template_name = ? AND context_hash = ? AND status = 'SENT'",
        )
            .bind(recipient)
            .bind(template_name)
            .bind(context_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn list_logs(&self, recipient: Option<&str>) -> Result<Vec<MailLog>, AppError> {
        match recipient {
            Some(recipient) => sqlx::query_as::<_, MailLog>(
                "SELECT * FROM mail_logs WHERE recipient = ? ORDER BY sent_at DESC",
            )
                .bind(recipient)
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database),
            None => sqlx::query_as::<_, MailLog>("SELECT * FROM mail_logs ORDER BY sent_at DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database),
        }
    }
}
