use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::{
    entities::contact::{DeliveryReceipt, OutboundEmail},
    errors::DeliveryError,
    repositories::mailer::Mailer,
    settings::AppConfig,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error object returned by the Resend API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResendErrorBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status_code: Option<u16>,
}

/// Delivers through the Resend HTTP API.
#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    api_url: String,
    api_key: Zeroizing<String>,
}

impl ResendMailer {
    pub fn new(api_url: &str, api_key: &str) -> Result<Self, DeliveryError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(ResendMailer {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: Zeroizing::new(api_key.to_string()),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, DeliveryError> {
        Self::new(&config.resend_api_url, &config.resend_api_key)
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, DeliveryError> {
        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(self.api_key.as_str())
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<DeliveryReceipt>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let error: ResendErrorBody = serde_json::from_str(&body).unwrap_or(ResendErrorBody {
            name: None,
            message: Some(body),
            status_code: None,
        });

        Err(DeliveryError::Rejected {
            name: error.name.unwrap_or_else(|| "resend_error".to_string()),
            message: error.message.unwrap_or_default(),
            status: error.status_code.unwrap_or(status.as_u16()),
        })
    }
}

impl fmt::Debug for ResendMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResendMailer")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
