//! Plain-text and JSON renderers.

use std::io::{self, Write};

use chrono::{DateTime, SecondsFormat};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::model::types::{Item, ItemInstance, StackFrame};

const COLUMN_GAP: usize = 2;
pub const ITEM_COLUMNS: [&str; 6] = [
    "COUNTER",
    "LEVEL",
    "STATUS",
    "ENVIRONMENT",
    "LAST_SEEN",
    "TITLE",
];

/// `-` for empty strings.
pub fn fallback(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

/// Epoch seconds as UTC RFC 3339, `-` when unknown.
pub fn format_unix(ts: i64) -> String {
    if ts <= 0 {
        return "-".to_string();
    }
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "-".to_string())
}

/// Cells for one table row, in [`ITEM_COLUMNS`] order.
pub fn item_row(item: &Item) -> [String; 6] {
    [
        item.counter.to_string(),
        fallback(&item.level).to_string(),
        fallback(&item.status).to_string(),
        fallback(&item.environment).to_string(),
        format_unix(item.last_occurrence_timestamp),
        fallback(&item.title).to_string(),
    ]
}

/// Fixed-width columnar table; the last column is not padded.
pub fn write_items_plain<W: Write>(w: &mut W, items: &[Item]) -> io::Result<()> {
    let header = ITEM_COLUMNS.map(str::to_string);
    let rows: Vec<[String; 6]> = items.iter().map(item_row).collect();

    let mut widths = [0usize; 6];
    for row in std::iter::once(&header).chain(rows.iter()) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    for row in std::iter::once(&header).chain(rows.iter()) {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i + 1 == row.len() {
                line.push_str(cell);
            } else {
                line.push_str(cell);
                let pad = widths[i] - cell.width() + COLUMN_GAP;
                line.extend(std::iter::repeat_n(' ', pad));
            }
        }
        writeln!(w, "{}", line.trim_end())?;
    }
    Ok(())
}

/// Labeled key-value view of one item.
pub fn write_item<W: Write>(w: &mut W, item: &Item) -> io::Result<()> {
    writeln!(w, "ID: {}", item.id)?;
    writeln!(w, "Counter: {}", item.counter)?;
    writeln!(w, "Title: {}", fallback(&item.title))?;
    writeln!(w, "Level: {}", fallback(&item.level))?;
    writeln!(w, "Status: {}", fallback(&item.status))?;
    writeln!(w, "Environment: {}", fallback(&item.environment))?;
    writeln!(w, "Total Occurrences: {}", item.total_occurrences)?;
    writeln!(w, "Last Seen: {}", format_unix(item.last_occurrence_timestamp))?;
    Ok(())
}

/// `path:line (method)`; the `:line` part is omitted when the line is unknown.
pub fn format_frame(frame: &StackFrame) -> String {
    let location = if frame.line > 0 {
        format!("{}:{}", fallback(&frame.filename), frame.line)
    } else {
        fallback(&frame.filename).to_string()
    };
    format!("{location} ({})", fallback(&frame.method))
}

pub fn write_instances<W: Write>(w: &mut W, instances: &[ItemInstance]) -> io::Result<()> {
    writeln!(w, "Instances: {}", instances.len())?;
    for (i, instance) in instances.iter().enumerate() {
        writeln!(w)?;
        writeln!(w, "Instance #{}", i + 1)?;
        writeln!(w, "  ID: {}", instance.id)?;
        writeln!(w, "  UUID: {}", fallback(&instance.uuid))?;
        writeln!(w, "  Level: {}", fallback(&instance.level))?;
        writeln!(w, "  Environment: {}", fallback(&instance.environment))?;
        writeln!(w, "  Timestamp: {}", format_unix(instance.timestamp))?;

        writeln!(w, "  Stack Frames:")?;
        if instance.stack_frames.is_empty() {
            writeln!(w, "    -")?;
        }
        for frame in &instance.stack_frames {
            writeln!(w, "    {}", format_frame(frame))?;
        }

        writeln!(w, "  Payload:")?;
        match instance.payload.as_ref().filter(|p| !p.is_empty()) {
            None => writeln!(w, "    -")?,
            Some(payload) => {
                let pretty = serde_json::to_string_pretty(payload).map_err(io::Error::other)?;
                writeln!(w, "{}", indent_lines(&pretty, "    "))?;
            }
        }
    }
    Ok(())
}

/// Pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value).map_err(io::Error::other)?;
    writeln!(w)
}

fn indent_lines(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
