use std::sync::Arc;

use {
    secrecy::ExposeSecret,
    serde::Serialize,
    tracing::{debug, warn},
};

use {gymflow_channels::DeliveryResult, gymflow_config::WhatsAppAccountConfig};

use crate::{
    auth::TokenManager,
    error::{Error, Result},
    types::{ErrorBody, SendResponse, TemplateSendRequest, TemplateSpec, TextSendRequest},
};

/// Outbound wire adapters for the platform bridge.
///
/// Each send performs exactly one POST. Provider rejections come back as a
/// failed [`DeliveryResult`]; only transport failures surface as errors.
#[derive(Clone)]
pub struct WhatsAppOutbound {
    http: reqwest::Client,
    config: Arc<WhatsAppAccountConfig>,
    tokens: Arc<TokenManager>,
}

impl WhatsAppOutbound {
    pub fn new(
        http: reqwest::Client,
        config: Arc<WhatsAppAccountConfig>,
        tokens: Arc<TokenManager>,
    ) -> Self {
        Self {
            http,
            config,
            tokens,
        }
    }

    /// Free-form conversational send. Only valid while the recipient's
    /// session window is open; the dispatcher enforces that, not this
    /// adapter.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<DeliveryResult> {
        self.post_message("messages/text", &TextSendRequest { to, message: body }, to)
            .await
    }

    /// Templated send, valid regardless of window state.
    pub async fn send_template(&self, to: &str, template: &TemplateSpec) -> Result<DeliveryResult> {
        let payload = TemplateSendRequest {
            to,
            template_name: &template.name,
            language: &template.language,
            components: &template.components,
        };
        self.post_message("messages/template", &payload, to).await
    }

    async fn post_message<T: Serialize>(
        &self,
        path: &str,
        payload: &T,
        to: &str,
    ) -> Result<DeliveryResult> {
        let token = self.tokens.token().await?;
        let url = format!("{}/{path}", self.config.api_base.trim_end_matches('/'));
        let resp = self
            .http
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = rejection_detail(resp).await;
            warn!(to, %status, detail, "platform rejected send");
            let rejection = Error::provider_rejected(status.as_u16(), detail);
            return Ok(DeliveryResult::failed(rejection.to_string()));
        }

        let body: SendResponse = resp.json().await.unwrap_or(SendResponse { message_id: None });
        debug!(to, message_id = ?body.message_id, "message accepted by platform");
        Ok(DeliveryResult::delivered(
            "accepted by platform",
            body.message_id,
        ))
    }
}

/// Pull the human-readable reason out of a rejection body, falling back to
/// the raw text when it is not the usual `{"error": {"message": ...}}`.
async fn rejection_detail(resp: reqwest::Response) -> String {
    let text = resp.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&text)
        .map(|b| b.error.message)
        .unwrap_or(text)
}
