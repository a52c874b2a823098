use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Admin-managed email template. `variables` declares the `{{placeholder}}`
/// names the body expects; it is stored as JSON text and parsed at the
/// repository edge (malformed JSON degrades to an empty list).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmailTemplate {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub body_html: String,
    pub variables: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmailTemplate {
    pub fn new(name: String, subject: String, body_html: String, variables: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            subject,
            body_html,
            variables,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct MailLog {
    pub id: String,
    pub recipient: String,
    pub template_name: String,
    pub context_hash: String,
    pub status: String,
    pub sent_at: DateTime<Utc>,
}

impl MailLog {
    pub fn new(recipient: String, template_name: String, context_hash: String, status: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recipient,
            template_name,
            context_hash,
            status,
            sent_at: Utc::now(),
        }
    }
}
