//! Reshape loosely-typed API objects into [`Item`], [`ItemInstance`] and
//! [`StackFrame`].
//!
//! Nothing here fails. The API is inconsistent about which summary fields it
//! promotes to the top level, so each field is read from the top level first
//! and only falls back to nested locations while it still holds its zero
//! value. Precedence lives in the constant tables below.

use serde_json::{Map, Value};

use super::json_path::{first_i64, first_str, lookup, path_i64, path_str};
use crate::model::types::{Item, ItemInstance, StackFrame};

/// Nested paths consulted, in order, when an item has no top-level title.
const TITLE_FALLBACK_PATHS: &[&[&str]] = &[
    &["last_occurrence", "body", "trace", "exception", "message"],
    &["last_occurrence", "body", "message", "body"],
];
const LEVEL_FALLBACK_PATH: &[&str] = &["last_occurrence", "level"];
const ENVIRONMENT_FALLBACK_PATH: &[&str] = &["last_occurrence", "environment"];
const TIMESTAMP_FALLBACK_PATH: &[&str] = &["last_occurrence", "timestamp"];

const FRAME_FILENAME_KEYS: &[&str] = &["filename", "abs_path", "path", "file"];
const FRAME_LINE_KEYS: &[&str] = &["lineno", "line", "line_number"];
const FRAME_METHOD_KEYS: &[&str] = &["method", "function"];

/// Top-level instance keys copied verbatim into [`ItemInstance::payload`].
pub const PAYLOAD_KEYS: &[&str] = &[
    "body", "request", "server", "client", "person", "custom", "data", "notifier",
];

fn string_at(value: &Value, path: &[&str]) -> String {
    path_str(value, path).unwrap_or_default().to_string()
}

fn int_at(value: &Value, path: &[&str]) -> i64 {
    path_i64(value, path).unwrap_or_default()
}

/// Normalize one item object. `null` and non-objects yield `Item::default()`.
pub fn normalize_item(value: &Value) -> Item {
    if !value.is_object() {
        return Item::default();
    }

    let mut item = Item {
        id: int_at(value, &["id"]),
        counter: int_at(value, &["counter"]),
        title: string_at(value, &["title"]),
        level: string_at(value, &["level"]),
        status: string_at(value, &["status"]),
        environment: string_at(value, &["environment"]),
        total_occurrences: int_at(value, &["total_occurrences"]),
        last_occurrence_timestamp: int_at(value, &["last_occurrence_timestamp"]),
    };

    if item.title.is_empty()
        && let Some(title) = TITLE_FALLBACK_PATHS
            .iter()
            .find_map(|path| path_str(value, path))
    {
        item.title = title.to_string();
    }
    if item.level.is_empty() {
        item.level = string_at(value, LEVEL_FALLBACK_PATH);
    }
    if item.environment.is_empty() {
        item.environment = string_at(value, ENVIRONMENT_FALLBACK_PATH);
    }
    if item.last_occurrence_timestamp == 0 {
        item.last_occurrence_timestamp = int_at(value, TIMESTAMP_FALLBACK_PATH);
    }

    item
}

/// Get and update both answer either with the item itself or with
/// `{"item": {...}}`; unwrap the latter.
pub fn unwrap_item_result(result: &Value) -> &Value {
    match result.get("item") {
        Some(nested) if nested.is_object() => nested,
        _ => result,
    }
}

/// Normalize one occurrence object.
pub fn normalize_instance(value: &Value) -> ItemInstance {
    if !value.is_object() {
        return ItemInstance::default();
    }

    ItemInstance {
        id: int_at(value, &["id"]),
        uuid: string_at(value, &["uuid"]),
        level: string_at(value, &["level"]),
        environment: string_at(value, &["environment"]),
        timestamp: int_at(value, &["timestamp"]),
        stack_frames: extract_stack_frames(value),
        payload: extract_payload(value),
    }
}

/// Frames from `body.trace` first, then every trace in `body.trace_chain` in
/// chain order. Frame order inside each trace is preserved.
pub fn extract_stack_frames(instance: &Value) -> Vec<StackFrame> {
    let Some(body) = lookup(instance, &["body"]).filter(|b| b.is_object()) else {
        return Vec::new();
    };

    let single = body.get("trace").into_iter();
    let chain = body
        .get("trace_chain")
        .and_then(Value::as_array)
        .into_iter()
        .flatten();

    single.chain(chain).flat_map(trace_frames).collect()
}

fn trace_frames(trace: &Value) -> Vec<StackFrame> {
    let Some(frames) = trace.get("frames").and_then(Value::as_array) else {
        return Vec::new();
    };

    frames
        .iter()
        .filter(|frame| frame.is_object())
        .map(normalize_frame)
        .filter(|frame| !frame.is_empty())
        .collect()
}

/// Resolve one frame through the candidate key lists.
pub fn normalize_frame(frame: &Value) -> StackFrame {
    StackFrame {
        filename: first_str(frame, FRAME_FILENAME_KEYS)
            .unwrap_or_default()
            .to_string(),
        line: first_i64(frame, FRAME_LINE_KEYS).unwrap_or_default(),
        method: first_str(frame, FRAME_METHOD_KEYS)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Copy allow-listed keys verbatim. `None` when none are present.
pub fn extract_payload(instance: &Value) -> Option<Map<String, Value>> {
    let object = instance.as_object()?;
    let payload: Map<String, Value> = PAYLOAD_KEYS
        .iter()
        .filter_map(|key| object.get(*key).map(|v| ((*key).to_string(), v.clone())))
        .collect();
    (!payload.is_empty()).then_some(payload)
}
