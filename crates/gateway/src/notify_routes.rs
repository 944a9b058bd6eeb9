//! Channel-routed send endpoint.

use {
    axum::{Json, extract::State},
    serde::Deserialize,
    tracing::warn,
};

use {
    gymflow_channels::DeliveryResult,
    gymflow_push::{PushData, PushPayload},
    gymflow_whatsapp::TemplateSpec,
};

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Whatsapp,
    Sms,
    Push,
}

/// One outbound notification, as submitted by the admin UI.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    pub channel: Channel,
    /// Phone number for whatsapp/sms, member id for push.
    pub to: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Push notification title.
    #[serde(default)]
    pub title: Option<String>,
    /// Push click-through URL.
    #[serde(default)]
    pub url: Option<String>,
}

/// Dispatch one notification. Always answers with a structured
/// [`DeliveryResult`]; an unconfigured channel or a failed send is a failed
/// result, never an error status.
pub async fn notify_handler(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Json<DeliveryResult> {
    let result = match req.channel {
        Channel::Whatsapp => notify_whatsapp(&state, &req).await,
        Channel::Sms => notify_sms(&state, &req).await,
        Channel::Push => notify_push(&state, &req).await,
    };
    Json(result)
}

async fn notify_whatsapp(state: &AppState, req: &NotifyRequest) -> DeliveryResult {
    let Some(ref dispatcher) = state.dispatcher else {
        return DeliveryResult::failed("whatsapp channel is not configured");
    };

    match (&req.body, &req.template) {
        (Some(body), template) => {
            dispatcher
                .dispatch(&req.to, body, template.as_deref(), req.language.as_deref())
                .await
        },
        // No body: a pure template send, independent of the session window.
        (None, Some(template)) => {
            let language = req.language.clone().or_else(|| {
                state
                    .whatsapp_config
                    .as_ref()
                    .map(|c| c.default_language.clone())
            });
            let spec = TemplateSpec {
                name: template.clone(),
                language: language.unwrap_or_else(|| "en_US".into()),
                components: Vec::new(),
            };
            dispatcher.send_template(&req.to, &spec).await
        },
        (None, None) => DeliveryResult::failed("either body or template is required"),
    }
}

async fn notify_sms(state: &AppState, req: &NotifyRequest) -> DeliveryResult {
    let Some(ref sms) = state.sms else {
        return DeliveryResult::failed("sms channel is not configured");
    };
    let Some(ref body) = req.body else {
        return DeliveryResult::failed("sms sends require a body");
    };

    match sms.send_sms(&req.to, body).await {
        Ok(result) => result,
        Err(e) => {
            warn!(to = %req.to, error = %e, "sms send failed");
            DeliveryResult::failed(e.to_string())
        },
    }
}

async fn notify_push(state: &AppState, req: &NotifyRequest) -> DeliveryResult {
    let Some(ref push) = state.push else {
        return DeliveryResult::failed("push channel is not configured");
    };
    let Some(ref body) = req.body else {
        return DeliveryResult::failed("push sends require a body");
    };

    let payload = PushPayload {
        title: req.title.clone().unwrap_or_else(|| "gymflow".into()),
        body: body.clone(),
        icon: state.push_icon.clone(),
        data: PushData {
            url: req.url.clone().unwrap_or_else(|| "/".into()),
        },
    };

    match push.send_to_member(&req.to, &payload).await {
        Ok(0) => DeliveryResult::failed("member has no push subscriptions"),
        Ok(sent) => DeliveryResult::delivered(format!("pushed to {sent} subscriptions"), None),
        Err(e) => {
            warn!(member_id = %req.to, error = %e, "push send failed");
            DeliveryResult::failed(e.to_string())
        },
    }
}
