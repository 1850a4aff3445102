//! Normalized entity structs.

use serde_json::{Map, Value};
use std::str::FromStr;

/// One tracked error group.
///
/// Every field has a zero value standing in for "absent"; the API is not
/// consistent about which fields it includes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub counter: i64,
    pub title: String,
    pub level: String,
    pub status: String,
    pub environment: String,
    pub total_occurrences: i64,
    /// Epoch seconds, 0 when unknown.
    pub last_occurrence_timestamp: i64,
}

/// One frame of a stack trace. `line` is 1-based, 0 when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackFrame {
    pub filename: String,
    pub line: i64,
    pub method: String,
}

impl StackFrame {
    pub fn is_empty(&self) -> bool {
        self.filename.is_empty() && self.line == 0 && self.method.is_empty()
    }
}

/// One raw occurrence of an item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemInstance {
    pub id: i64,
    pub uuid: String,
    pub level: String,
    pub environment: String,
    pub timestamp: i64,
    pub stack_frames: Vec<StackFrame>,
    /// Selected raw sub-objects kept verbatim for display. `None` when the
    /// occurrence carried none of them.
    pub payload: Option<Map<String, Value>>,
}

/// Severity accepted by the update endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
}

impl ItemLevel {
    pub const ALL: [ItemLevel; 5] = [
        ItemLevel::Critical,
        ItemLevel::Error,
        ItemLevel::Warning,
        ItemLevel::Info,
        ItemLevel::Debug,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemLevel::Critical => "critical",
            ItemLevel::Error => "error",
            ItemLevel::Warning => "warning",
            ItemLevel::Info => "info",
            ItemLevel::Debug => "debug",
        }
    }
}

impl FromStr for ItemLevel {
    type Err = ();

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or(())
    }
}

/// Workflow status of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Active,
    Resolved,
    Muted,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 3] = [ItemStatus::Active, ItemStatus::Resolved, ItemStatus::Muted];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Resolved => "resolved",
            ItemStatus::Muted => "muted",
        }
    }
}

impl FromStr for ItemStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or(())
    }
}

/// Filters for the list endpoint. `page <= 0` leaves the page unset.
#[derive(Debug, Clone, Default)]
pub struct ListItemsOptions {
    pub page: i64,
    pub status: Option<String>,
    pub environment: Option<String>,
    pub levels: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ListItemsResponse {
    pub items: Vec<Item>,
    /// Entire decoded response body, envelope included.
    pub raw: Value,
}

#[derive(Debug, Clone)]
pub struct GetItemResponse {
    pub item: Item,
    pub raw: Value,
}

#[derive(Debug, Clone)]
pub struct ListItemInstancesResponse {
    pub instances: Vec<ItemInstance>,
    pub raw: Value,
}

#[derive(Debug, Clone)]
pub struct UpdateItemResponse {
    /// Echoed entity; zero-valued when the service did not echo one.
    pub item: Item,
    pub raw: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parse_is_case_insensitive_and_trimmed() {
        assert_eq!(" Critical ".parse::<ItemLevel>(), Ok(ItemLevel::Critical));
        assert_eq!("DEBUG".parse::<ItemLevel>(), Ok(ItemLevel::Debug));
        assert!("fatal".parse::<ItemLevel>().is_err());
    }

    #[test]
    fn status_parse_rejects_unknown() {
        assert_eq!("resolved".parse::<ItemStatus>(), Ok(ItemStatus::Resolved));
        assert_eq!("MUTED\n".parse::<ItemStatus>(), Ok(ItemStatus::Muted));
        assert!("bad".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn empty_frame_detection() {
        assert!(StackFrame::default().is_empty());
        let only_method = StackFrame {
            method: "run".into(),
            ..StackFrame::default()
        };
        assert!(!only_method.is_empty());
    }
}
