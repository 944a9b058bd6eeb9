//! Config schema types (gateway, channel accounts, push).

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Top-level gymflow configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GymflowConfig {
    pub gateway: GatewayConfig,
    /// Messaging-platform bridge account (conversational + template sends).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<WhatsAppAccountConfig>,
    /// SMS gateway account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms: Option<SmsAccountConfig>,
    pub push: PushConfig,
}

/// Gateway server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Address to bind to.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Data directory for the message log and push store. Defaults to the
    /// platform data dir (`~/.local/share/gymflow` on Linux).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<std::path::PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8931,
            data_dir: None,
        }
    }
}

/// Configuration for the messaging-platform bridge account.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsAppAccountConfig {
    /// Base URL of the platform bridge API.
    pub api_base: String,

    /// API key presented when refreshing the bearer token.
    #[serde(serialize_with = "serialize_secret")]
    pub api_key: Secret<String>,

    /// Template substituted when the requested one is rejected as unknown.
    pub fallback_template: String,

    /// Language tag used when a send does not specify one.
    pub default_language: String,

    /// Token echoed back during the webhook subscription handshake.
    pub verify_token: String,

    /// Shared secret for webhook payload signatures.
    #[serde(serialize_with = "serialize_secret")]
    pub app_secret: Secret<String>,

    /// Per-request timeout for every platform call, in seconds.
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for WhatsAppAccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppAccountConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"[REDACTED]")
            .field("fallback_template", &self.fallback_template)
            .field("default_language", &self.default_language)
            .field("verify_token", &self.verify_token)
            .field("app_secret", &"[REDACTED]")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for WhatsAppAccountConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_key: Secret::new(String::new()),
            fallback_template: "hello_world".into(),
            default_language: "en_US".into(),
            verify_token: String::new(),
            app_secret: Secret::new(String::new()),
            request_timeout_secs: 15,
        }
    }
}

/// Configuration for the SMS gateway account.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsAccountConfig {
    /// Base URL of the SMS gateway API.
    pub api_base: String,

    /// Account identifier, also the basic-auth username.
    pub account_sid: String,

    /// Auth secret, the basic-auth password.
    #[serde(serialize_with = "serialize_secret")]
    pub auth_token: Secret<String>,

    /// Sender identity (the gym's SMS number).
    pub from_number: String,

    /// Per-request timeout, in seconds.
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for SmsAccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsAccountConfig")
            .field("api_base", &self.api_base)
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("from_number", &self.from_number)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for SmsAccountConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.twilio.com/2010-04-01".into(),
            account_sid: String::new(),
            auth_token: Secret::new(String::new()),
            from_number: String::new(),
            request_timeout_secs: 15,
        }
    }
}

/// Web-push settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub enabled: bool,
    /// Default icon URL attached to notifications that do not set one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            icon: None,
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let cfg = GymflowConfig::default();
        assert_eq!(cfg.gateway.bind, "127.0.0.1");
        assert_eq!(cfg.gateway.port, 8931);
        assert!(cfg.whatsapp.is_none());
        assert!(cfg.push.enabled);
    }

    #[test]
    fn whatsapp_defaults() {
        let wa = WhatsAppAccountConfig::default();
        assert_eq!(wa.fallback_template, "hello_world");
        assert_eq!(wa.default_language, "en_US");
        assert_eq!(wa.request_timeout_secs, 15);
    }

    #[test]
    fn debug_redacts_secrets() {
        let wa = WhatsAppAccountConfig {
            api_key: Secret::new("super-secret".into()),
            ..Default::default()
        };
        let debug = format!("{wa:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: GymflowConfig = toml::from_str(
            r#"
            [gateway]
            port = 9000

            [whatsapp]
            api_base = "https://bridge.local/v1"
            api_key = "k"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.gateway.port, 9000);
        let wa = cfg.whatsapp.unwrap();
        assert_eq!(wa.api_base, "https://bridge.local/v1");
        assert_eq!(wa.fallback_template, "hello_world");
    }
}
