//! Push subscription API routes.

use {
    axum::{
        Json, Router,
        extract::State,
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
    },
    chrono::Utc,
    serde::{Deserialize, Serialize},
};

use gymflow_push::PushSubscription;

use crate::state::AppState;

/// Response with the VAPID public key.
#[derive(Serialize)]
struct VapidKeyResponse {
    public_key: String,
}

/// Request to subscribe to push notifications.
#[derive(Deserialize)]
pub struct SubscribeRequest {
    pub member_id: String,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Request to unsubscribe from push notifications.
#[derive(Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

/// A subscription summary for display.
#[derive(Serialize)]
struct SubscriptionSummary {
    member_id: String,
    /// The full subscription endpoint (for deletion).
    endpoint: String,
    /// When the subscription was created (ISO 8601).
    created_at: String,
}

/// Status response.
#[derive(Serialize)]
struct PushStatusResponse {
    enabled: bool,
    subscription_count: usize,
    subscriptions: Vec<SubscriptionSummary>,
}

/// Get the VAPID public key for push subscription.
async fn vapid_key_handler(
    State(state): State<AppState>,
) -> Result<Json<VapidKeyResponse>, StatusCode> {
    let Some(ref push_service) = state.push else {
        return Err(StatusCode::NOT_IMPLEMENTED);
    };

    let public_key = push_service
        .vapid_public_key()
        .await
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(VapidKeyResponse { public_key }))
}

/// Subscribe a member's browser to push notifications.
async fn subscribe_handler(
    State(state): State<AppState>,
    Json(req): Json<SubscribeRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let Some(ref push_service) = state.push else {
        return Err(StatusCode::NOT_IMPLEMENTED);
    };

    let subscription = PushSubscription {
        member_id: req.member_id,
        endpoint: req.endpoint,
        p256dh: req.keys.p256dh,
        auth: req.keys.auth,
        created_at: Utc::now(),
    };

    push_service
        .add_subscription(subscription)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(StatusCode::CREATED)
}

/// Unsubscribe from push notifications.
async fn unsubscribe_handler(
    State(state): State<AppState>,
    Json(req): Json<UnsubscribeRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let Some(ref push_service) = state.push else {
        return Err(StatusCode::NOT_IMPLEMENTED);
    };

    push_service
        .remove_subscription(&req.endpoint)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(StatusCode::OK)
}

/// Get push notification status.
async fn status_handler(State(state): State<AppState>) -> Json<PushStatusResponse> {
    let (enabled, subscription_count, subscriptions) = if let Some(ref push_service) = state.push {
        let subs = push_service.list_subscriptions().await;
        let count = subs.len();
        let summaries: Vec<SubscriptionSummary> = subs
            .into_iter()
            .map(|s| SubscriptionSummary {
                member_id: s.member_id,
                endpoint: s.endpoint,
                created_at: s.created_at.to_rfc3339(),
            })
            .collect();
        (true, count, summaries)
    } else {
        (false, 0, Vec::new())
    };

    Json(PushStatusResponse {
        enabled,
        subscription_count,
        subscriptions,
    })
}

/// Create the push notification router.
pub fn push_router() -> Router<AppState> {
    Router::new()
        .route("/vapid-key", get(vapid_key_handler))
        .route("/subscribe", post(subscribe_handler))
        .route("/unsubscribe", post(unsubscribe_handler))
        .route("/status", get(status_handler))
}
