use serde::{Deserialize, Serialize};

/// What drives the outbound payload shape: exactly one of a free-form body
/// or a pre-approved template. The enum makes mixing the two unrepresentable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessagePayload {
    /// Free-form conversational text. Only deliverable while the recipient's
    /// session window is open (the dispatcher enforces this, not the adapter).
    Text { body: String },
    /// A pre-approved template with ordered substitution values. Deliverable
    /// regardless of window state.
    Template {
        name: String,
        language: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        components: Vec<String>,
    },
}

/// A single outbound send request, constructed per call and discarded once
/// the [`DeliveryResult`] is produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    /// Channel-specific recipient address (phone number, member id, ...).
    pub to: String,
    #[serde(flatten)]
    pub payload: MessagePayload,
}

impl MessageRequest {
    #[must_use]
    pub fn text(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            payload: MessagePayload::Text { body: body.into() },
        }
    }

    #[must_use]
    pub fn template(
        to: impl Into<String>,
        name: impl Into<String>,
        language: impl Into<String>,
        components: Vec<String>,
    ) -> Self {
        Self {
            to: to.into(),
            payload: MessagePayload::Template {
                name: name.into(),
                language: language.into(),
                components,
            },
        }
    }
}

/// Uniform outcome of a dispatch. Always well-formed, including on failure —
/// the dispatcher never leaves a caller without a structured answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResult {
    pub success: bool,
    /// Human-readable delivery message or failure reason, surfaced to the
    /// UI layer as-is.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    /// True when the template strategy executed (rather than a direct send).
    #[serde(default)]
    pub used_template: bool,
    /// True when the default fallback template was substituted.
    #[serde(default)]
    pub used_fallback: bool,
}

impl DeliveryResult {
    /// A successful send, optionally carrying the provider's message id.
    #[must_use]
    pub fn delivered(message: impl Into<String>, provider_message_id: Option<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            provider_message_id,
            used_template: false,
            used_fallback: false,
        }
    }

    /// A failed send with a human-readable reason.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            provider_message_id: None,
            used_template: false,
            used_fallback: false,
        }
    }

    /// Annotate which strategy actually executed.
    #[must_use]
    pub fn with_template(mut self, used_template: bool) -> Self {
        self.used_template = used_template;
        self
    }

    /// Mark that the default fallback template was substituted.
    #[must_use]
    pub fn with_fallback(mut self) -> Self {
        self.used_fallback = true;
        self
    }
}
