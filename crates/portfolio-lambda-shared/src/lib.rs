//! Shared infrastructure for the portfolio AWS Lambda functions.
//!
//! This crate provides common functionality used across both Lambda handlers:
//!
//! - [`GatewayRequest`] / [`GatewayResponse`]: API Gateway proxy event shapes
//! - [`CorsPolicy`]: static CORS headers attached to every response
//! - [`MessageBody`]: the `{ "message": ..., "error": ... }` JSON body
//! - [`config`]: environment lookup helpers and [`ConfigError`]
//! - [`error_chain()`]: failure text including nested error sources
//! - [`init_tracing`]: JSON-formatted tracing for CloudWatch Logs
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides event builders and mock contexts for Lambda
//! handler testing. Enable the `test-utils` feature to access it from dependent crates.

#![deny(warnings)]

pub mod config;
mod cors;
mod error_chain;
mod gateway;
mod response;
mod tracing_init;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ConfigError, EnvLookup};
pub use cors::{CorsPolicy, DEFAULT_ALLOWED_ORIGIN};
pub use error_chain::error_chain;
pub use gateway::{GatewayRequest, GatewayResponse, PREFLIGHT_METHOD};
pub use response::MessageBody;
pub use tracing_init::{init_tracing, LogFormat};
