//! Web-push delivery for member browsers.
//!
//! Handles VAPID key generation/storage, member subscription management, and
//! sending notifications through the standard browser Push API envelope —
//! this channel does not touch the messaging platform at all.

pub mod service;

pub use service::{PushData, PushPayload, PushService, PushSubscription, VapidKeys};
