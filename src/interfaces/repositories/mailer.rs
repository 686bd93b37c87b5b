use async_trait::async_trait;

use crate::{
    entities::contact::{DeliveryReceipt, OutboundEmail},
    errors::DeliveryError,
};

/// Outbound email delivery service.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, DeliveryError>;
}
