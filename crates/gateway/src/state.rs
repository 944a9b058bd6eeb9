use std::sync::Arc;

use {
    gymflow_channels::MessageLog,
    gymflow_config::{GymflowConfig, WhatsAppAccountConfig},
    gymflow_push::PushService,
    gymflow_sms::SmsOutbound,
    gymflow_whatsapp::SmartDispatcher,
};

/// Shared application state for all gateway routes.
///
/// Channels are optional: an unconfigured channel simply answers
/// "unavailable" instead of keeping the whole gateway from starting.
#[derive(Clone)]
pub struct AppState {
    pub whatsapp_config: Option<Arc<WhatsAppAccountConfig>>,
    pub dispatcher: Option<Arc<SmartDispatcher>>,
    pub sms: Option<Arc<SmsOutbound>>,
    pub push: Option<Arc<PushService>>,
    /// Default icon for push notifications that do not set one.
    pub push_icon: Option<String>,
    pub message_log: Option<Arc<dyn MessageLog>>,
}

impl AppState {
    /// Build the runtime state from config, wiring the message log into
    /// every channel that records traffic.
    pub async fn from_config(
        config: &GymflowConfig,
        data_dir: &std::path::Path,
        message_log: Option<Arc<dyn MessageLog>>,
    ) -> anyhow::Result<Self> {
        let whatsapp_config = config.whatsapp.clone().map(Arc::new);

        let dispatcher = match config.whatsapp.clone() {
            Some(wa) => {
                let mut dispatcher = SmartDispatcher::new(wa)?;
                if let Some(ref log) = message_log {
                    dispatcher = dispatcher.with_message_log(Arc::clone(log));
                }
                Some(Arc::new(dispatcher))
            },
            None => None,
        };

        let sms = match config.sms.clone() {
            Some(sms) => Some(Arc::new(SmsOutbound::new(sms)?)),
            None => None,
        };

        let push = if config.push.enabled {
            Some(PushService::new(data_dir).await?)
        } else {
            None
        };

        Ok(Self {
            whatsapp_config,
            dispatcher,
            sms,
            push,
            push_icon: config.push.icon.clone(),
            message_log,
        })
    }
}
