//! Channel abstraction layer.
//!
//! Each delivery channel (WhatsApp-style platform bridge, SMS gateway, web
//! push) exposes an adapter that turns a [`MessageRequest`] into exactly one
//! outbound provider call and normalizes the outcome into a
//! [`DeliveryResult`]. The gateway persists every send and every inbound
//! webhook event through the [`MessageLog`] trait.

pub mod adapter;
pub mod error;
pub mod message_log;
pub mod types;

pub use {
    adapter::ChannelAdapter,
    error::{Error, Result},
    message_log::{IncomingMessageEntry, MessageLog, OutgoingMessageEntry, StatusUpdateEntry},
    types::{DeliveryResult, MessagePayload, MessageRequest},
};
