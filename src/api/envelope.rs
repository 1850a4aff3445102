//! Decoding of the `{err, message, result}` wrapper every endpoint returns.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, RollbarError};

#[derive(Debug, Deserialize)]
struct Envelope {
    /// Absent reads as 0.
    #[serde(default)]
    err: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Value,
}

/// A successfully decoded response.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// The `result` member, `Value::Null` when absent.
    pub result: Value,
    /// The whole response body, kept for raw JSON output.
    pub raw: Value,
}

/// Validate status and envelope, then split out `result`.
pub fn decode(status: u16, body: &[u8]) -> Result<Decoded> {
    if !(200..300).contains(&status) {
        return Err(RollbarError::status(status, body));
    }

    let raw: Value = serde_json::from_slice(body)
        .map_err(|e| RollbarError::MalformedResponse(format!("parse response: {e}")))?;

    let envelope = Envelope::deserialize(&raw)
        .map_err(|e| RollbarError::MalformedResponse(format!("parse envelope: {e}")))?;

    if envelope.err != 0 {
        let message = envelope
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(RollbarError::Api {
            code: envelope.err,
            message,
        });
    }

    Ok(Decoded {
        result: envelope.result,
        raw,
    })
}
