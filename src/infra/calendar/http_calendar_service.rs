use crate::domain::{models::event::Event, ports::CalendarService};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

pub struct HttpCalendarService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpCalendarService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }

    fn entry_payload(event: &Event, attendees: i32) -> CalendarEntryPayload {
        CalendarEntryPayload {
            title: event.title.clone(),
            location: event.location.clone(),
            starts_at: event.starts_at.to_rfc3339(),
            ends_at: event.ends_at().to_rfc3339(),
            attendee_count: attendees,
        }
    }
}

#[derive(Serialize)]
struct CalendarEntryPayload {
    title: String,
    location: String,
    starts_at: String,
    ends_at: String,
    attendee_count: i32,
}

#[derive(Deserialize)]
struct CalendarEntryResponse {
    entry_id: String,
}

#[async_trait]
impl CalendarService for HttpCalendarService {
    async fn create_entry(&self, event: &Event, attendees: i32) -> Result<String, AppError> {
        let res = self
            .client
            .post(format!("{}/entries", self.api_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&Self::entry_payload(event, attendees))
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Calendar service connection error: {}", e);
                error!("{}", msg);
                AppError::Unavailable(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Calendar service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Unavailable(msg));
        }

        let body: CalendarEntryResponse = res.json().await.map_err(|e| {
            let msg = format!("Calendar service returned malformed entry: {}", e);
            error!("{}", msg);
            AppError::Unavailable(msg)
        })?;

        Ok(body.entry_id)
    }

    async fn update_entry(&self, entry_id: &str, event: &Event, attendees: i32) -> Result<(), AppError> {
        let res = self
            .client
            .put(format!("{}/entries/{}", self.api_url, entry_id))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&Self::entry_payload(event, attendees))
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Calendar service connection error: {}", e);
                error!("{}", msg);
                AppError::Unavailable(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Calendar service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Unavailable(msg));
        }

        Ok(())
    }
}
