//! Configuration loading, validation, and env substitution.
//!
//! Config files: `gymflow.toml` or `gymflow.json`, searched in `./` then
//! `~/.config/gymflow/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, data_dir, discover_and_load, load_config},
    schema::{GatewayConfig, GymflowConfig, PushConfig, SmsAccountConfig, WhatsAppAccountConfig},
};
