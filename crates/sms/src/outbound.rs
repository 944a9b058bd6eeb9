use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    secrecy::ExposeSecret,
    serde::Deserialize,
    tracing::{debug, warn},
};

use {
    gymflow_channels::{ChannelAdapter, DeliveryResult, MessagePayload, MessageRequest},
    gymflow_config::SmsAccountConfig,
};

#[derive(Debug, Deserialize)]
struct SmsResponse {
    #[serde(default)]
    sid: Option<String>,
}

/// Outbound sender for the SMS gateway.
pub struct SmsOutbound {
    http: reqwest::Client,
    config: Arc<SmsAccountConfig>,
}

impl SmsOutbound {
    pub fn new(config: SmsAccountConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Send one SMS. Gateway rejections are normalized into a failed result;
    /// only transport failures surface as errors.
    pub async fn send_sms(&self, to: &str, body: &str) -> anyhow::Result<DeliveryResult> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        );
        let form = [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];

        let resp = self
            .http
            .post(url)
            .basic_auth(
                &self.config.account_sid,
                Some(self.config.auth_token.expose_secret()),
            )
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            warn!(to, %status, detail, "SMS gateway rejected send");
            return Ok(DeliveryResult::failed(format!(
                "SMS gateway rejected the request ({status}): {detail}"
            )));
        }

        let body: SmsResponse = resp.json().await.unwrap_or(SmsResponse { sid: None });
        debug!(to, sid = ?body.sid, "SMS accepted by gateway");
        Ok(DeliveryResult::delivered("accepted by SMS gateway", body.sid))
    }
}

#[async_trait]
impl ChannelAdapter for SmsOutbound {
    fn channel(&self) -> &'static str {
        "sms"
    }

    async fn send(&self, request: &MessageRequest) -> anyhow::Result<DeliveryResult> {
        match &request.payload {
            MessagePayload::Text { body } => self.send_sms(&request.to, body).await,
            MessagePayload::Template { .. } => Ok(DeliveryResult::failed(
                "SMS channel does not support template sends",
            )),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use secrecy::Secret;

    use super::*;

    fn outbound(api_base: String) -> SmsOutbound {
        SmsOutbound::new(SmsAccountConfig {
            api_base,
            account_sid: "AC123".into(),
            auth_token: Secret::new("token".into()),
            from_number: "+15550001111".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn sends_form_encoded_sms_with_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/Accounts/AC123/Messages.json")
            // base64("AC123:token")
            .match_header("authorization", "Basic QUMxMjM6dG9rZW4=")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("To".into(), "+10000000001".into()),
                mockito::Matcher::UrlEncoded("From".into(), "+15550001111".into()),
                mockito::Matcher::UrlEncoded("Body".into(), "See you at 6pm".into()),
            ]))
            .with_status(201)
            .with_body(r#"{"sid": "SM1"}"#)
            .expect(1)
            .create_async()
            .await;

        let result = outbound(server.url())
            .send_sms("+10000000001", "See you at 6pm")
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.provider_message_id.as_deref(), Some("SM1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn gateway_rejection_becomes_failed_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/Accounts/AC123/Messages.json")
            .with_status(400)
            .with_body(r#"{"message": "invalid 'To' number"}"#)
            .create_async()
            .await;

        let result = outbound(server.url())
            .send_sms("not-a-number", "hi")
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.message.contains("invalid 'To' number"));
    }

    #[tokio::test]
    async fn template_payloads_are_not_supported() {
        let outbound = outbound("http://127.0.0.1:9".into());
        let request = MessageRequest::template("+1", "hello_world", "en_US", vec![]);

        let result = outbound.send(&request).await.unwrap();
        assert!(!result.success);
    }
}
