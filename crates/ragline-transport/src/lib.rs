//! HTTP transport adapter for the Ragline client.
//!
//! Provides the reqwest-based implementation of the core transport trait
//! plus backend endpoint configuration. Controllers never see this crate's
//! types directly; they hold an `Arc<dyn QaTransport>`.

pub mod config;
pub mod http;

pub use config::{BackendConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use http::HttpBackend;
