use std::sync::Arc;

use crate::domain::models::communication::MailLog;
use crate::domain::ports::{CommunicationRepository, EmailService};
use crate::domain::services::defaults;
use crate::error::AppError;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tera::{Context, Tera};
use tracing::info;

/// Renders templated mail and guards every send with the persisted mail
/// ledger: a `(recipient, template, context-hash)` triple is sent at most
/// once, so retried webhooks and overlapping cron invocations cannot
/// duplicate mail.
pub struct CommunicationService {
    repo: Arc<dyn CommunicationRepository>,
    email: Arc<dyn EmailService>,
}

impl CommunicationService {
    pub fn new(repo: Arc<dyn CommunicationRepository>, email: Arc<dyn EmailService>) -> Self {
        Self { repo, email }
    }

    /// Sends a templated email. Returns Ok(true) when a mail actually went
    /// out, Ok(false) when the ledger suppressed a duplicate.
    pub async fn send_templated(
        &self,
        template_name: &str,
        recipient: &str,
        context_data: &Value,
        attachment: Option<(&str, Vec<u8>)>,
    ) -> Result<bool, AppError> {
        let (subject_src, body_src) = self.resolve_template(template_name).await?;

        let hash = context_hash(template_name, context_data);

        if self.repo.has_mail_been_sent(recipient, template_name, &hash).await? {
            info!("Email skipped (idempotency). Recipient: {}, Template: {}", recipient, template_name);
            let log = MailLog::new(
                recipient.to_string(),
                template_name.to_string(),
                hash,
                "SKIPPED_DUPLICATE".to_string(),
            );
            self.repo.log_mail(&log).await?;
            return Ok(false);
        }

        let (subject, body) = render(template_name, &subject_src, &body_src, context_data)?;

        let (attachment_name, attachment_data) = match &attachment {
            Some((name, data)) => (Some(*name), Some(data.as_slice())),
            None => (None, None),
        };

        self.email.send(recipient, &subject, &body, attachment_name, attachment_data).await?;

        let log = MailLog::new(
            recipient.to_string(),
            template_name.to_string(),
            hash,
            "SENT".to_string(),
        );
        self.repo.log_mail(&log).await?;
        Ok(true)
    }

    /// Admin-managed template by name if one is active, otherwise the
    /// built-in default.
    async fn resolve_template(&self, template_name: &str) -> Result<(String, String), AppError> {
        if let Some(template) = self.repo.find_template_by_name(template_name).await? {
            if template.is_active {
                return Ok((template.subject, template.body_html));
            }
        }
        Ok((
            defaults::get_default_subject(template_name).to_string(),
            defaults::get_default_template(template_name),
        ))
    }
}

pub fn render(
    template_name: &str,
    subject_src: &str,
    body_src: &str,
    context_data: &Value,
) -> Result<(String, String), AppError> {
    let context = Context::from_value(context_data.clone())
        .map_err(|_| AppError::Validation("Template context must be a JSON object".into()))?;

    let mut tera = Tera::default();
    tera.add_raw_template(template_name, body_src)
        .map_err(|e| AppError::InternalWithMsg(format!("Template parse error: {:?}", e)))?;
    let body = tera
        .render(template_name, &context)
        .map_err(|e| AppError::InternalWithMsg(format!("Template render error: {:?}", e)))?;

    let subject_tmpl_name = format!("{}_subject", template_name);
    tera.add_raw_template(&subject_tmpl_name, subject_src)
        .map_err(|e| AppError::InternalWithMsg(format!("Subject parse error: {:?}", e)))?;
    let subject = tera
        .render(&subject_tmpl_name, &context)
        .map_err(|e| AppError::InternalWithMsg(format!("Subject render error: {:?}", e)))?;

    Ok((subject, body))
}

fn context_hash(template_name: &str, context_data: &Value) -> String {
    let context_json = serde_json::to_string(context_data).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(template_name.as_bytes());
    hasher.update(context_json.as_bytes());
    hex::encode(hasher.finalize())
}
