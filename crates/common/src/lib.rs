//! Shared error definitions and utilities used across all gymflow crates.

pub mod error;

pub use error::{Error, FromMessage, Result};
