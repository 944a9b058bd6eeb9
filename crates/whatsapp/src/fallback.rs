use tracing::warn;

use {gymflow_channels::DeliveryResult, gymflow_config::WhatsAppAccountConfig};

use crate::{error::Result, outbound::WhatsAppOutbound, types::TemplateSpec};

/// Default-template substitution around the template adapter.
///
/// At most two adapter calls ever happen: the requested template, and — when
/// the rejection matches the unknown-template signature — one send of the
/// configured fallback with an empty component list. There is no recursion;
/// the bound is the control flow itself.
pub struct TemplateFallbackResolver {
    outbound: WhatsAppOutbound,
    fallback_template: String,
    default_language: String,
}

impl TemplateFallbackResolver {
    pub fn new(outbound: WhatsAppOutbound, config: &WhatsAppAccountConfig) -> Self {
        Self {
            outbound,
            fallback_template: config.fallback_template.clone(),
            default_language: config.default_language.clone(),
        }
    }

    /// Send a template, substituting the fallback once if the platform does
    /// not recognize the requested one. A second failure is returned as-is.
    pub async fn send_template(&self, to: &str, template: &TemplateSpec) -> Result<DeliveryResult> {
        let first = self.outbound.send_template(to, template).await?;
        if first.success
            || !is_unknown_template(&first.message)
            || template.name == self.fallback_template
        {
            return Ok(first);
        }

        warn!(
            to,
            template = %template.name,
            fallback = %self.fallback_template,
            "template rejected as unknown, substituting fallback"
        );
        // The fallback template takes no substitutions.
        let fallback = TemplateSpec {
            name: self.fallback_template.clone(),
            language: self.default_language.clone(),
            components: Vec::new(),
        };
        let second = self.outbound.send_template(to, &fallback).await?;
        Ok(second.with_fallback())
    }
}

/// Rejection signatures the platform uses for unapproved or unknown
/// templates.
fn is_unknown_template(detail: &str) -> bool {
    let detail = detail.to_ascii_lowercase();
    detail.contains("template not found")
        || detail.contains("template not approved")
        || detail.contains("unknown template")
}
