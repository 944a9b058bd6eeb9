use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    tracing::{debug, warn},
};

use {
    gymflow_channels::{
        ChannelAdapter, DeliveryResult, MessageLog, MessagePayload, MessageRequest,
        OutgoingMessageEntry,
    },
    gymflow_config::WhatsAppAccountConfig,
};

use crate::{
    auth::TokenManager,
    error::Result,
    fallback::TemplateFallbackResolver,
    outbound::WhatsAppOutbound,
    types::TemplateSpec,
    window::WindowChecker,
};

/// The smart dispatcher: window check first, then the direct or template
/// strategy.
///
/// `CheckingWindow → {DirectSend | TemplateSend} → Done`. The terminal state
/// always carries a structured [`DeliveryResult`] — every error thrown by a
/// collaborator is caught at this boundary, and a failed window check aborts
/// the dispatch without attempting a send (fail-closed).
pub struct SmartDispatcher {
    config: Arc<WhatsAppAccountConfig>,
    window: WindowChecker,
    outbound: WhatsAppOutbound,
    templates: TemplateFallbackResolver,
    message_log: Option<Arc<dyn MessageLog>>,
}

impl SmartDispatcher {
    pub fn new(config: WhatsAppAccountConfig) -> Result<Self> {
        let config = Arc::new(config);
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let tokens = Arc::new(TokenManager::new(http.clone(), Arc::clone(&config)));
        let window = WindowChecker::new(http.clone(), Arc::clone(&config), Arc::clone(&tokens));
        let outbound = WhatsAppOutbound::new(http, Arc::clone(&config), tokens);
        let templates = TemplateFallbackResolver::new(outbound.clone(), &config);

        Ok(Self {
            config,
            window,
            outbound,
            templates,
            message_log: None,
        })
    }

    pub fn with_message_log(mut self, log: Arc<dyn MessageLog>) -> Self {
        self.message_log = Some(log);
        self
    }

    /// Deliver `body` to `to`, choosing the strategy from the session window:
    /// direct text while the window is open, the caller's template (or the
    /// configured fallback) once it has closed.
    pub async fn dispatch(
        &self,
        to: &str,
        body: &str,
        template: Option<&str>,
        language: Option<&str>,
    ) -> DeliveryResult {
        let result = match self.try_dispatch(to, body, template, language).await {
            Ok(result) => result,
            Err(e) => {
                warn!(to, error = %e, "dispatch failed");
                DeliveryResult::failed(e.to_string())
            },
        };
        self.log_outgoing(to, body, &result).await;
        result
    }

    async fn try_dispatch(
        &self,
        to: &str,
        body: &str,
        template: Option<&str>,
        language: Option<&str>,
    ) -> Result<DeliveryResult> {
        if self.window.window_open(to).await? {
            debug!(to, "window open, sending direct message");
            let result = self.outbound.send_text(to, body).await?;
            return Ok(result.with_template(false));
        }

        debug!(to, "window closed, sending template");
        let spec = TemplateSpec {
            name: template.unwrap_or(&self.config.fallback_template).into(),
            language: language.unwrap_or(&self.config.default_language).into(),
            components: Vec::new(),
        };
        let result = self.templates.send_template(to, &spec).await?;
        Ok(result.with_template(true))
    }

    /// Direct template send, window-independent — templates are the
    /// platform's mechanism for initiating contact outside the window.
    pub async fn send_template(&self, to: &str, spec: &TemplateSpec) -> DeliveryResult {
        let result = match self.templates.send_template(to, spec).await {
            Ok(result) => result.with_template(true),
            Err(e) => {
                warn!(to, error = %e, "template send failed");
                DeliveryResult::failed(e.to_string())
            },
        };
        self.log_outgoing(to, &format!("template:{}", spec.name), &result)
            .await;
        result
    }

    async fn log_outgoing(&self, to: &str, content: &str, result: &DeliveryResult) {
        let Some(log) = self.message_log.as_ref() else {
            return;
        };
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        let entry = OutgoingMessageEntry {
            id: 0,
            recipient: to.into(),
            content: content.into(),
            channel: "whatsapp".into(),
            provider_message_id: result.provider_message_id.clone(),
            status: if result.success { "sent" } else { "failed" }.into(),
            raw_response: Some(result.message.clone()),
            created_at: now,
        };
        if let Err(e) = log.log_outgoing(entry).await {
            warn!(to, "failed to log outgoing message: {e}");
        }
    }
}

#[async_trait]
impl ChannelAdapter for SmartDispatcher {
    fn channel(&self) -> &'static str {
        "whatsapp"
    }

    async fn send(&self, request: &MessageRequest) -> anyhow::Result<DeliveryResult> {
        match &request.payload {
            MessagePayload::Text { body } => Ok(self.dispatch(&request.to, body, None, None).await),
            MessagePayload::Template {
                name,
                language,
                components,
            } => {
                let spec = TemplateSpec {
                    name: name.clone(),
                    language: language.clone(),
                    components: components.clone(),
                };
                Ok(self.send_template(&request.to, &spec).await)
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {secrecy::Secret, serde_json::json};

    use super::*;

    fn dispatcher(api_base: String) -> SmartDispatcher {
        SmartDispatcher::new(WhatsAppAccountConfig {
            api_base,
            api_key: Secret::new("test-key".into()),
            ..Default::default()
        })
        .unwrap()
    }

    async fn mock_token(server: &mut mockito::Server) -> mockito::Mock {
        server
            .mock("GET", "/auth/token")
            .with_status(200)
            .with_body(r#"{"access_token": "tok-1", "expires_in": 3600}"#)
            .create_async()
            .await
    }

    async fn mock_window(server: &mut mockito::Server, open: bool) -> mockito::Mock {
        server
            .mock("POST", "/conversations/window")
            .with_status(200)
            .with_body(format!(r#"{{"inWindow": {open}}}"#))
            .create_async()
            .await
    }

    #[tokio::test]
    async fn open_window_uses_direct_adapter_only() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;
        mock_window(&mut server, true).await;
        let text = server
            .mock("POST", "/messages/text")
            .match_body(mockito::Matcher::Json(
                json!({"to": "+10000000001", "message": "Hello"}),
            ))
            .with_status(200)
            .with_body(r#"{"messageId": "wamid.1"}"#)
            .expect(1)
            .create_async()
            .await;
        let template = server
            .mock("POST", "/messages/template")
            .expect(0)
            .create_async()
            .await;

        let result = dispatcher(server.url())
            .dispatch("+10000000001", "Hello", None, None)
            .await;

        assert!(result.success);
        assert!(!result.used_template);
        assert!(!result.used_fallback);
        text.assert_async().await;
        template.assert_async().await;
    }

    #[tokio::test]
    async fn closed_window_uses_template_path() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;
        mock_window(&mut server, false).await;
        let template = server
            .mock("POST", "/messages/template")
            .match_body(mockito::Matcher::Json(json!({
                "to": "+10000000002",
                "templateName": "hello_world",
                "language": "en_US",
            })))
            .with_status(200)
            .with_body(r#"{"messageId": "wamid.2"}"#)
            .expect(1)
            .create_async()
            .await;
        let text = server
            .mock("POST", "/messages/text")
            .expect(0)
            .create_async()
            .await;

        let result = dispatcher(server.url())
            .dispatch("+10000000002", "Hello", None, None)
            .await;

        assert!(result.success);
        assert!(result.used_template);
        template.assert_async().await;
        text.assert_async().await;
    }

    #[tokio::test]
    async fn failed_window_check_aborts_without_sending() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;
        server
            .mock("POST", "/conversations/window")
            .with_status(500)
            .with_body("policy service down")
            .create_async()
            .await;
        let text = server
            .mock("POST", "/messages/text")
            .expect(0)
            .create_async()
            .await;
        let template = server
            .mock("POST", "/messages/template")
            .expect(0)
            .create_async()
            .await;

        let result = dispatcher(server.url())
            .dispatch("+10000000001", "Hello", None, None)
            .await;

        assert!(!result.success);
        assert!(result.message.contains("window check failed"));
        text.assert_async().await;
        template.assert_async().await;
    }

    #[tokio::test]
    async fn credential_failure_becomes_failed_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/auth/token")
            .with_status(503)
            .with_body("nope")
            .create_async()
            .await;

        let result = dispatcher(server.url())
            .dispatch("+10000000001", "Hello", None, None)
            .await;

        assert!(!result.success);
        assert!(result.message.contains("credential refresh failed"));
    }

    #[tokio::test]
    async fn rejected_template_falls_back_within_dispatch() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;
        mock_window(&mut server, false).await;
        let rejected = server
            .mock("POST", "/messages/template")
            .match_body(mockito::Matcher::PartialJson(
                json!({"templateName": "promo_q1"}),
            ))
            .with_status(404)
            .with_body(r#"{"error": {"message": "template not found"}}"#)
            .expect(1)
            .create_async()
            .await;
        let fallback = server
            .mock("POST", "/messages/template")
            .match_body(mockito::Matcher::PartialJson(
                json!({"templateName": "hello_world"}),
            ))
            .with_status(200)
            .with_body(r#"{"messageId": "wamid.3"}"#)
            .expect(1)
            .create_async()
            .await;

        let result = dispatcher(server.url())
            .dispatch("+10000000002", "Hello", Some("promo_q1"), None)
            .await;

        assert!(result.success);
        assert!(result.used_template);
        assert!(result.used_fallback);
        rejected.assert_async().await;
        fallback.assert_async().await;
    }

    #[tokio::test]
    async fn adapter_trait_routes_template_payloads_past_the_window() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;
        let window = server
            .mock("POST", "/conversations/window")
            .expect(0)
            .create_async()
            .await;
        server
            .mock("POST", "/messages/template")
            .with_status(200)
            .with_body(r#"{"messageId": "wamid.4"}"#)
            .create_async()
            .await;

        let request =
            MessageRequest::template("+10000000003", "renewal_reminder", "en_US", vec![]);
        let result = dispatcher(server.url()).send(&request).await.unwrap();

        assert!(result.success);
        assert!(result.used_template);
        window.assert_async().await;
    }
}
