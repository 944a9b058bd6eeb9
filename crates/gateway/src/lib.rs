//! The gymflow gateway: HTTP surface for the notification core.
//!
//! Routes: platform webhook (subscription handshake + signed event batches),
//! push subscription management, and the channel-routed `/api/notify` send
//! endpoint. The sqlite message log store lives here too.

pub mod message_log_store;
pub mod notify_routes;
pub mod push_routes;
pub mod server;
pub mod state;
pub mod webhook_routes;

pub use {
    message_log_store::SqliteMessageLog,
    server::{build_app, serve},
    state::AppState,
};
