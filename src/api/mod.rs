//! Rollbar REST API: transport, envelope decoding, normalization and the
//! client operations built on top of them.

pub mod client;
pub mod envelope;
pub mod json_path;
pub mod normalize;
pub mod transport;

pub use client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, RollbarClient};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, Transport};
