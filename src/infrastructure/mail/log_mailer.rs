use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::contact::{DeliveryReceipt, OutboundEmail},
    errors::DeliveryError,
    repositories::mailer::Mailer,
};

/// Writes messages to the log instead of sending them. Development only.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, DeliveryError> {
        let id = Uuid::new_v4().to_string();
        tracing::info!(
            id = %id,
            to = %email.to,
            reply_to = %email.reply_to,
            subject = %email.subject,
            "Email not sent, no delivery API key configured"
        );
        tracing::debug!("Email body: {}", email.html);
        Ok(DeliveryReceipt { id })
    }
}
