//! HTTP seam between the client and the network.
//!
//! The client only ever builds an [`HttpRequest`] and hands it to a
//! [`Transport`]; one call is one attempt.

use std::time::Duration;

use tracing::debug;

use crate::error::{Result, RollbarError};

pub const ACCESS_TOKEN_HEADER: &str = "X-Rollbar-Access-Token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Patch,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Patch => "PATCH",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Fully built URL, query string included.
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Blocking reqwest transport with a per-call timeout.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rollbar-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RollbarError::Transport(format!("building http client: {e}")))?;
        Ok(Self { client, timeout })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Patch => self.client.patch(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                RollbarError::Transport(format!("request timed out after {:?}", self.timeout))
            } else {
                RollbarError::Transport(format!("request failed: {e}"))
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| RollbarError::Transport(format!("read response: {e}")))?
            .to_vec();
        debug!(status, bytes = body.len(), "response received");

        Ok(HttpResponse { status, body })
    }
}
