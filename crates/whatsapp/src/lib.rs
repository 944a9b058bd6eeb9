//! Messaging-platform bridge channel: the smart dispatcher.
//!
//! Decides how a message reaches a member — a free-form conversational send
//! while the member's session window is open, or a pre-approved template
//! (with bounded fallback to a default template) once it has closed — and
//! owns the platform bearer token shared by every call.

pub mod auth;
pub mod error;
pub mod fallback;
pub mod outbound;
pub mod router;
pub mod types;
pub mod webhook;
pub mod window;

pub use {
    auth::TokenManager,
    error::{Error, Result},
    fallback::TemplateFallbackResolver,
    outbound::WhatsAppOutbound,
    router::SmartDispatcher,
    types::TemplateSpec,
    window::WindowChecker,
};
