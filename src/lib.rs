//! HTTP client core
//!
//! Provider-agnostic request/response pipeline: the interceptor chain and
//! call lifecycle, the authentication refresh coordinator, and the HTTP
//! cache engine, plus the supporting deduplication, retry, metrics,
//! certificate pinning, and WebSocket transport subsystems that plug into
//! the same interceptor and transport seams.
//!
//! The fluent request builder, typed decoding helpers, and a configuration
//! facade are deliberately out of scope here; this crate is the engine a
//! facade crate would be built on top of.
#![deny(unsafe_code)]

pub mod auth;
pub mod cache;
pub mod call;
pub mod dedup;
pub mod error;
pub mod interceptor;
pub mod metrics;
pub mod model;
pub mod retry;
pub mod transport;
pub mod utils;

pub use call::{Call, CallState};
pub use error::ClientError;
