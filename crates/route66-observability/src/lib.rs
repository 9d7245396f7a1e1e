//! Observability infrastructure for the Route 66 storefront.
//!
//! This crate provides:
//! - `init_logging` - Installs the `tracing` subscriber (JSON or human output)
//! - `LogConfig` - Level and format, usually read from `route66.toml`
//! - `RequestId` - Per-request correlation id carried in `x-request-id`

mod logging;
mod request;

pub use logging::*;
pub use request::*;
