//! Shared configuration and error types for SignGate.
//!
//! SignGate authenticates HTTP requests signed with the `SignedRequest`
//! HMAC-SHA1 scheme. This crate holds the pieces every other crate in the
//! workspace leans on: the environment-driven configuration and the core
//! error type.

mod config;
mod error;

pub use config::{DEFAULT_LISTEN, DEFAULT_MAX_BODY_SIZE, SignGateConfig};
pub use error::{SignGateError, SignGateResult};
