use std::sync::Arc;

use {secrecy::ExposeSecret, tracing::debug};

use gymflow_config::WhatsAppAccountConfig;

use crate::{
    auth::TokenManager,
    error::{Error, Result},
    types::{WindowStateRequest, WindowStateResponse},
};

/// Asks the platform whether a recipient's session window is currently open.
///
/// The window state is derived per call and never cached.
pub struct WindowChecker {
    http: reqwest::Client,
    config: Arc<WhatsAppAccountConfig>,
    tokens: Arc<TokenManager>,
}

impl WindowChecker {
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

    /// One remote call; a non-2xx or malformed answer maps to
    /// [`Error::PolicyCheck`]. The dispatcher treats that fail-closed — it
    /// never guesses a default window state.
    pub async fn window_open(&self, recipient: &str) -> Result<bool> {
        let token = self.tokens.token().await?;
        let url = format!(
            "{}/conversations/window",
            self.config.api_base.trim_end_matches('/')
        );
        let resp = self
            .http
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(&WindowStateRequest {
                phone_number: recipient,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::policy_check(format!(
                "window endpoint returned {status}: {body}"
            )));
        }

        let body: WindowStateResponse = resp
            .json()
            .await
            .map_err(|e| Error::policy_check(format!("malformed window response: {e}")))?;
        debug!(recipient, in_window = body.in_window, "checked session window");
        Ok(body.in_window)
    }
}
