#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use {
    axum::{
        body::Body,
        http::{Request, StatusCode},
    },
    secrecy::Secret,
    serde_json::json,
    tower::ServiceExt,
};

use {
    gymflow_config::WhatsAppAccountConfig,
    gymflow_gateway::{AppState, build_app},
    gymflow_whatsapp::SmartDispatcher,
};

fn empty_state() -> AppState {
    AppState {
        whatsapp_config: None,
        dispatcher: None,
        sms: None,
        push: None,
        push_icon: None,
        message_log: None,
    }
}

async fn post_notify(app: axum::Router, payload: serde_json::Value) -> serde_json::Value {
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/notify")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn unconfigured_channel_yields_failed_result() {
    let result = post_notify(
        build_app(empty_state()),
        json!({"channel": "whatsapp", "to": "+10000000001", "body": "Hello"}),
    )
    .await;

    assert_eq!(result["success"], false);
    assert!(
        result["message"]
            .as_str()
            .unwrap()
            .contains("not configured")
    );
}

#[tokio::test]
async fn whatsapp_dispatch_round_trips_through_the_bridge() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/auth/token")
        .with_status(200)
        .with_body(r#"{"access_token": "tok-1", "expires_in": 3600}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/conversations/window")
        .with_status(200)
        .with_body(r#"{"inWindow": true}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/messages/text")
        .with_status(200)
        .with_body(r#"{"messageId": "wamid.77"}"#)
        .create_async()
        .await;

    let config = WhatsAppAccountConfig {
        api_base: server.url(),
        api_key: Secret::new("k".into()),
        ..Default::default()
    };
    let state = AppState {
        whatsapp_config: Some(Arc::new(config.clone())),
        dispatcher: Some(Arc::new(SmartDispatcher::new(config).unwrap())),
        sms: None,
        push: None,
        push_icon: None,
        message_log: None,
    };

    let result = post_notify(
        build_app(state),
        json!({"channel": "whatsapp", "to": "+10000000001", "body": "Hello"}),
    )
    .await;

    assert_eq!(result["success"], true);
    assert_eq!(result["usedTemplate"], false);
    assert_eq!(result["providerMessageId"], "wamid.77");
}

#[tokio::test]
async fn body_or_template_is_required() {
    let server = mockito::Server::new_async().await;
    let config = WhatsAppAccountConfig {
        api_base: server.url(),
        api_key: Secret::new("k".into()),
        ..Default::default()
    };
    let state = AppState {
        whatsapp_config: Some(Arc::new(config.clone())),
        dispatcher: Some(Arc::new(SmartDispatcher::new(config).unwrap())),
        sms: None,
        push: None,
        push_icon: None,
        message_log: None,
    };

    let result = post_notify(
        build_app(state),
        json!({"channel": "whatsapp", "to": "+10000000001"}),
    )
    .await;

    assert_eq!(result["success"], false);
}

#[tokio::test]
async fn push_without_subscriptions_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let push = gymflow_push::PushService::new(dir.path()).await.unwrap();
    let state = AppState {
        push: Some(push),
        ..empty_state()
    };

    let result = post_notify(
        build_app(state),
        json!({"channel": "push", "to": "member-1", "body": "Class is starting"}),
    )
    .await;

    assert_eq!(result["success"], false);
    assert!(
        result["message"]
            .as_str()
            .unwrap()
            .contains("no push subscriptions")
    );
}
