//! Wire types for the platform bridge API and its webhook.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WindowStateRequest<'a> {
    pub phone_number: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WindowStateResponse {
    pub in_window: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct TextSendRequest<'a> {
    pub to: &'a str,
    pub message: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TemplateSendRequest<'a> {
    pub to: &'a str,
    pub template_name: &'a str,
    pub language: &'a str,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub components: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendResponse {
    #[serde(default)]
    pub message_id: Option<String>,
}

/// Rejection bodies arrive as `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub message: String,
}

/// A template resolved for one send attempt.
#[derive(Debug, Clone)]
pub struct TemplateSpec {
    pub name: String,
    pub language: String,
    /// Ordered substitution values; empty for templates without parameters.
    pub components: Vec<String>,
}

// ── Webhook payload ─────────────────────────────────────────────────────────

/// Batched inbound events pushed by the platform.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
    #[serde(default)]
    pub statuses: Vec<StatusEvent>,
}

/// A member message received by the business number.
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub from: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// A delivery-status transition for a previously sent message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub id: String,
    pub recipient: String,
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
}
