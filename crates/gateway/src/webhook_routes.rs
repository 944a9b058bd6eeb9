//! Platform webhook routes.

use {
    axum::{
        Router,
        body::Bytes,
        extract::{Query, State},
        http::{HeaderMap, StatusCode},
        routing::get,
    },
    secrecy::ExposeSecret,
    serde::Deserialize,
    tracing::{debug, warn},
};

use gymflow_whatsapp::{types::WebhookPayload, webhook};

use crate::state::AppState;

/// Subscription handshake query parameters.
#[derive(Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

/// GET handshake: echo the challenge when the verify token matches.
async fn verify_handler(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Result<String, StatusCode> {
    let Some(ref config) = state.whatsapp_config else {
        return Err(StatusCode::NOT_IMPLEMENTED);
    };

    webhook::verify_webhook_subscription(
        params.mode.as_deref(),
        params.verify_token.as_deref(),
        params.challenge.as_deref(),
        config,
    )
    .ok_or(StatusCode::FORBIDDEN)
}

/// POST events: verify the signature over the raw body, then process the
/// batch. Once the signature checks out the batch is always acknowledged
/// with 200; per-item failures are logged, not retried.
async fn receive_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(ref config) = state.whatsapp_config else {
        return StatusCode::NOT_IMPLEMENTED;
    };

    let signature = headers
        .get("x-hub-signature-256")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !webhook::verify_signature(&body, signature, config.app_secret.expose_secret()) {
        warn!("webhook signature verification failed");
        return StatusCode::UNAUTHORIZED;
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "malformed webhook payload");
            return StatusCode::OK;
        },
    };

    debug!(
        messages = payload.messages.len(),
        statuses = payload.statuses.len(),
        "processing webhook batch"
    );
    webhook::process_webhook(payload, state.message_log.as_ref()).await;
    StatusCode::OK
}

/// Create the webhook router.
pub fn webhook_router() -> Router<AppState> {
    Router::new().route("/whatsapp", get(verify_handler).post(receive_handler))
}
