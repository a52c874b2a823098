use crate::domain::ports::{CheckoutSession, PaymentGateway};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

pub struct HttpPaymentGateway {
    client: Client,
    api_url: String,
    api_key: String,
    return_url: String,
}

impl HttpPaymentGateway {
    pub fn new(api_url: String, api_key: String, return_url: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
            return_url,
        }
    }
}

#[derive(Serialize)]
struct CheckoutRequest {
    reference: String,
    amount_cents: i64,
    currency: String,
    customer_email: String,
    return_url: String,
}

#[derive(Deserialize)]
struct CheckoutResponse {
    session_id: String,
    checkout_url: String,
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_checkout_session(
        &self,
        reference: &str,
        amount_cents: i64,
        customer_email: &str,
    ) -> Result<CheckoutSession, AppError> {
        let payload = CheckoutRequest {
            reference: reference.to_string(),
            amount_cents,
            currency: "GBP".to_string(),
            customer_email: customer_email.to_string(),
            return_url: self.return_url.clone(),
        };

        let res = self
            .client
            .post(format!("{}/checkout/sessions", self.api_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Payment gateway connection error: {}", e);
                error!("{}", msg);
                AppError::Unavailable(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Payment gateway failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Unavailable(msg));
        }

        let body: CheckoutResponse = res.json().await.map_err(|e| {
            let msg = format!("Payment gateway returned malformed session: {}", e);
            error!("{}", msg);
            AppError::Unavailable(msg)
        })?;

        Ok(CheckoutSession {
            id: body.session_id,
            url: body.checkout_url,
        })
    }
}
