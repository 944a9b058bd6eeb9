//! Platform webhook handling.

use std::sync::Arc;

use {
    hmac::{Hmac, Mac},
    sha2::Sha256,
    tracing::{debug, warn},
};

use {
    gymflow_channels::{IncomingMessageEntry, MessageLog, StatusUpdateEntry},
    gymflow_config::WhatsAppAccountConfig,
};

use crate::types::WebhookPayload;

type HmacSha256 = Hmac<Sha256>;

/// Verify the webhook signature from the platform.
///
/// The signature is sent in the `X-Hub-Signature-256` header as `sha256=<hex>`.
pub fn verify_signature(body: &[u8], signature_header: &str, app_secret: &str) -> bool {
    let expected = match signature_header.strip_prefix("sha256=") {
        Some(hex) => hex,
        None => {
            warn!("invalid signature header format (missing sha256= prefix)");
            return false;
        },
    };

    let mut mac = match HmacSha256::new_from_slice(app_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("failed to create HMAC");
            return false;
        },
    };

    mac.update(body);
    let computed = hex::encode(mac.finalize().into_bytes());

    // Constant-time comparison to prevent timing attacks.
    constant_time_eq(&computed, expected)
}

/// Constant-time string comparison.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Process a webhook batch.
///
/// Every message and status event is handled independently: a per-item log
/// failure is recorded and skipped, never propagated, so the caller can
/// always acknowledge the batch.
pub async fn process_webhook(payload: WebhookPayload, log: Option<&Arc<dyn MessageLog>>) {
    for msg in payload.messages {
        let Some(body) = msg.body else {
            debug!(id = %msg.id, "ignoring non-text inbound message");
            continue;
        };
        debug!(id = %msg.id, from = %msg.from, "inbound message");

        let Some(log) = log else { continue };
        let entry = IncomingMessageEntry {
            id: 0,
            provider_message_id: msg.id.clone(),
            sender: msg.from,
            body,
            received_at: msg.timestamp.unwrap_or_else(unix_now),
        };
        if let Err(e) = log.log_incoming(entry).await {
            warn!(id = %msg.id, "failed to log inbound message: {e}");
        }
    }

    for status in payload.statuses {
        debug!(id = %status.id, status = %status.status, "delivery status update");

        let Some(log) = log else { continue };
        let entry = StatusUpdateEntry {
            id: 0,
            provider_message_id: status.id.clone(),
            recipient: status.recipient,
            status: status.status,
            occurred_at: status.timestamp.unwrap_or_else(unix_now),
        };
        if let Err(e) = log.log_status(entry).await {
            warn!(id = %status.id, "failed to log status update: {e}");
        }
    }
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Verify webhook subscription (GET request).
///
/// The platform sends a GET request with:
/// - `hub.mode=subscribe`
/// - `hub.verify_token=<your_verify_token>`
/// - `hub.challenge=<random_string>`
///
/// Returns `Some(challenge)` if verification succeeds.
pub fn verify_webhook_subscription(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&str>,
    config: &WhatsAppAccountConfig,
) -> Option<String> {
    let mode = mode?;
    let token = token?;
    let challenge = challenge?;

    if mode == "subscribe" && token == config.verify_token {
        Some(challenge.to_string())
    } else {
        None
    }
}
