use async_trait::async_trait;

use crate::types::{DeliveryResult, MessageRequest};

/// Send a message over one delivery channel.
///
/// Implementations own exactly one wire format and perform exactly one
/// remote call per request. Provider-reported failures are normalized into
/// `DeliveryResult { success: false, .. }`; only transport-level failures
/// surface as errors.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Channel identifier (e.g. "whatsapp", "sms").
    fn channel(&self) -> &'static str;

    async fn send(&self, request: &MessageRequest) -> anyhow::Result<DeliveryResult>;
}
