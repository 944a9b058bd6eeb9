//! SMS gateway channel.
//!
//! A thin adapter over the SMS provider's REST API: one form-encoded POST
//! per message, authenticated with the account sid and auth token.

pub mod outbound;

pub use outbound::SmsOutbound;
