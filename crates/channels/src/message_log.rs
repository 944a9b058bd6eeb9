use async_trait::async_trait;

use crate::Result;

/// A logged outbound send: what was attempted, over which channel, and how
/// the provider answered.
#[derive(Debug, Clone)]
pub struct OutgoingMessageEntry {
    pub id: i64,
    pub recipient: String,
    pub content: String,
    pub channel: String,
    pub provider_message_id: Option<String>,
    pub status: String,
    pub raw_response: Option<String>,
    pub created_at: i64,
}

/// A logged inbound message received via the platform webhook.
#[derive(Debug, Clone)]
pub struct IncomingMessageEntry {
    pub id: i64,
    pub provider_message_id: String,
    pub sender: String,
    pub body: String,
    pub received_at: i64,
}

/// A delivery-status update for a previously sent message.
#[derive(Debug, Clone)]
pub struct StatusUpdateEntry {
    pub id: i64,
    pub provider_message_id: String,
    pub recipient: String,
    pub status: String,
    pub occurred_at: i64,
}

/// Persistent log of message traffic at the platform boundary.
///
/// The dispatcher writes here best-effort: a log failure never fails the
/// dispatch, and the webhook receiver never fails a batch because one entry
/// could not be persisted.
#[async_trait]
pub trait MessageLog: Send + Sync {
    async fn log_outgoing(&self, entry: OutgoingMessageEntry) -> Result<()>;
    async fn log_incoming(&self, entry: IncomingMessageEntry) -> Result<()>;
    async fn log_status(&self, entry: StatusUpdateEntry) -> Result<()>;

    async fn list_outgoing(&self, limit: u32) -> Result<Vec<OutgoingMessageEntry>>;
    async fn list_incoming(&self, limit: u32) -> Result<Vec<IncomingMessageEntry>>;
}
