//! `items list|get|update` handlers.
//!
//! Handlers take the client and an output writer so they can be driven
//! from tests without a terminal. Everything that can be checked locally
//! (output format, identifier, update fields) is checked before the first
//! request goes out.

use std::fmt;
use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::api::{RollbarClient, Transport};
use crate::error::RollbarError;
use crate::model::types::{ItemLevel, ItemStatus, ListItemsOptions};
use crate::ui::{self, render};

const RESOLVED_IN_VERSION_MAX: usize = 40;
const TITLE_MAX: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// `-o/--output` and its `--json` shortcut.
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format: text|json
    #[arg(short = 'o', long, default_value = "text", value_name = "FORMAT")]
    pub output: String,

    /// Shortcut for --output json
    #[arg(long)]
    pub json: bool,
}

impl Default for OutputArgs {
    fn default() -> Self {
        Self {
            output: "text".to_string(),
            json: false,
        }
    }
}

impl OutputArgs {
    pub fn format(&self) -> Result<OutputFormat, RollbarError> {
        if self.json {
            return Ok(OutputFormat::Json);
        }
        match self.output.as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(RollbarError::validation(format!(
                "invalid --output {other:?} (expected: text|json)"
            ))),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Page number
    #[arg(long, default_value_t = 1)]
    pub page: i64,

    /// Filter by item status (e.g. active, resolved)
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by environment
    #[arg(long)]
    pub environment: Option<String>,

    /// Filter by level; repeat or comma-separate for several
    #[arg(long = "level", value_delimiter = ',')]
    pub levels: Vec<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// One item, named by a positional id-or-uuid, `--id` or `--uuid`.
#[derive(Args, Debug, Clone, Default)]
pub struct ItemSelector {
    /// Numeric item id or occurrence UUID
    #[arg(value_name = "ID_OR_UUID")]
    pub target: Option<String>,

    /// Item ID
    #[arg(long)]
    pub id: Option<i64>,

    /// Occurrence UUID
    #[arg(long)]
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    Id(i64),
    Uuid(String),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Id(id) => write!(f, "{id}"),
            ItemRef::Uuid(uuid) => f.write_str(uuid),
        }
    }
}

impl ItemSelector {
    /// Exactly one source must be set; `--id` counts only when positive. A
    /// positional value that parses as a positive integer is an id; anything
    /// else is a UUID.
    pub fn resolve(&self) -> Result<ItemRef, RollbarError> {
        let target = self
            .target
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let uuid = self
            .uuid
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let id = self.id.filter(|id| *id > 0);

        let given = [target.is_some(), id.is_some(), uuid.is_some()]
            .iter()
            .filter(|set| **set)
            .count();
        if given == 0 {
            return Err(RollbarError::validation(
                "missing item identifier: pass [id-or-uuid], --id, or --uuid",
            ));
        }
        if given > 1 {
            return Err(RollbarError::validation(
                "provide only one item identifier: [id-or-uuid], --id, or --uuid",
            ));
        }

        if let Some(target) = target {
            return Ok(match target.parse::<i64>() {
                Ok(id) if id > 0 => ItemRef::Id(id),
                _ => ItemRef::Uuid(target.to_string()),
            });
        }
        if let Some(id) = id {
            return Ok(ItemRef::Id(id));
        }
        Ok(ItemRef::Uuid(uuid.unwrap_or_default().to_string()))
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct GetArgs {
    #[command(flatten)]
    pub selector: ItemSelector,

    /// Also list the item's occurrences
    #[arg(long)]
    pub instances: bool,

    /// Page of occurrences to fetch with --instances
    #[arg(long, default_value_t = 1, requires = "instances")]
    pub instances_page: i64,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Fields an update may change. `None` means "leave as is"; the
/// `clear_*` switches send an explicit `null`.
#[derive(Args, Debug, Clone, Default)]
pub struct ItemUpdateFields {
    /// New status: active|resolved|muted
    #[arg(long)]
    pub status: Option<String>,

    /// Resolved version (max 40 chars)
    #[arg(long)]
    pub resolved_in_version: Option<String>,

    /// New title (1-255 chars)
    #[arg(long)]
    pub title: Option<String>,

    /// New level: critical|error|warning|info|debug
    #[arg(long)]
    pub level: Option<String>,

    /// Assign to user ID
    #[arg(long, value_name = "USER_ID")]
    pub assigned_user_id: Option<i64>,

    /// Clear assigned user
    #[arg(long)]
    pub clear_assigned_user: bool,

    /// Assign to team ID
    #[arg(long, value_name = "TEAM_ID")]
    pub assigned_team_id: Option<i64>,

    /// Clear assigned team
    #[arg(long)]
    pub clear_assigned_team: bool,

    /// Set snooze enabled state
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub snooze_enabled: Option<bool>,

    /// Snooze expiration in seconds
    #[arg(long, value_name = "SECONDS")]
    pub snooze_expiration_seconds: Option<i64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub selector: ItemSelector,

    #[command(flatten)]
    pub fields: ItemUpdateFields,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Sparse PATCH body for the provided fields.
pub fn build_update_body(fields: &ItemUpdateFields) -> Result<Map<String, Value>, RollbarError> {
    let mut body = Map::new();

    if let Some(raw) = &fields.status {
        let status: ItemStatus = raw.parse().map_err(|()| {
            RollbarError::validation(format!(
                "invalid --status {raw:?} (expected: {})",
                expected(ItemStatus::ALL.map(ItemStatus::as_str))
            ))
        })?;
        body.insert("status".into(), json!(status.as_str()));
    }

    if let Some(version) = &fields.resolved_in_version {
        if version.chars().count() > RESOLVED_IN_VERSION_MAX {
            return Err(RollbarError::validation(format!(
                "--resolved-in-version cannot exceed {RESOLVED_IN_VERSION_MAX} characters"
            )));
        }
        body.insert("resolved_in_version".into(), json!(version));
    }

    if let Some(title) = &fields.title {
        let len = title.chars().count();
        if len == 0 || len > TITLE_MAX {
            return Err(RollbarError::validation(format!(
                "--title must be between 1 and {TITLE_MAX} characters"
            )));
        }
        body.insert("title".into(), json!(title));
    }

    if let Some(raw) = &fields.level {
        let level: ItemLevel = raw.parse().map_err(|()| {
            RollbarError::validation(format!(
                "invalid --level {raw:?} (expected: {})",
                expected(ItemLevel::ALL.map(ItemLevel::as_str))
            ))
        })?;
        body.insert("level".into(), json!(level.as_str()));
    }

    assignment(
        &mut body,
        "assigned_user_id",
        fields.assigned_user_id,
        fields.clear_assigned_user,
        ("--assigned-user-id", "--clear-assigned-user"),
    )?;
    assignment(
        &mut body,
        "assigned_team_id",
        fields.assigned_team_id,
        fields.clear_assigned_team,
        ("--assigned-team-id", "--clear-assigned-team"),
    )?;

    if let Some(enabled) = fields.snooze_enabled {
        body.insert("snooze_enabled".into(), json!(enabled));
    }

    if let Some(seconds) = fields.snooze_expiration_seconds {
        if seconds <= 0 {
            return Err(RollbarError::validation(
                "--snooze-expiration-seconds must be > 0",
            ));
        }
        body.insert("snooze_expiration_in_seconds".into(), json!(seconds));
    }

    if body.is_empty() {
        return Err(RollbarError::validation(
            "no updates provided: set at least one update flag",
        ));
    }
    Ok(body)
}

fn assignment(
    body: &mut Map<String, Value>,
    key: &str,
    id: Option<i64>,
    clear: bool,
    (id_flag, clear_flag): (&str, &str),
) -> Result<(), RollbarError> {
    match (id, clear) {
        (Some(_), true) => Err(RollbarError::validation(format!(
            "use either {id_flag} or {clear_flag}, not both"
        ))),
        (Some(id), false) if id <= 0 => Err(RollbarError::validation(format!(
            "{id_flag} must be > 0"
        ))),
        (Some(id), false) => {
            body.insert(key.to_string(), json!(id));
            Ok(())
        }
        (None, true) => {
            body.insert(key.to_string(), Value::Null);
            Ok(())
        }
        (None, false) => Ok(()),
    }
}

fn expected<const N: usize>(names: [&str; N]) -> String {
    names.join("|")
}

/// `items list`. `interactive` selects the scrollable table over the plain one.
pub fn list<T: Transport, W: Write>(
    client: &RollbarClient<T>,
    args: &ListArgs,
    interactive: bool,
    out: &mut W,
) -> Result<()> {
    let format = args.output.format()?;
    let response = client.list_items(&ListItemsOptions {
        page: args.page,
        status: args.status.clone(),
        environment: args.environment.clone(),
        levels: args.levels.clone(),
    })?;

    match format {
        OutputFormat::Json => render::write_json(out, &response.raw)?,
        OutputFormat::Text => ui::render_items(out, &response.items, interactive)?,
    }
    Ok(())
}

/// `items get`, optionally followed by one page of instances.
pub fn get<T: Transport, W: Write>(
    client: &RollbarClient<T>,
    args: &GetArgs,
    out: &mut W,
) -> Result<()> {
    let format = args.output.format()?;
    let target = args.selector.resolve()?;

    let item = match &target {
        ItemRef::Id(id) => client.get_item_by_id(*id)?,
        ItemRef::Uuid(uuid) => client.get_item_by_uuid(uuid)?,
    };
    let instances = if args.instances {
        Some(client.list_item_instances(&target.to_string(), args.instances_page)?)
    } else {
        None
    };

    match (format, instances) {
        (OutputFormat::Json, None) => render::write_json(out, &item.raw)?,
        (OutputFormat::Json, Some(instances)) => render::write_json(
            out,
            &json!({ "item": item.raw, "instances": instances.raw }),
        )?,
        (OutputFormat::Text, instances) => {
            render::write_item(out, &item.item)?;
            if let Some(instances) = instances {
                writeln!(out)?;
                render::write_instances(out, &instances.instances)?;
            }
        }
    }
    Ok(())
}

/// `items update`. A UUID is resolved to its item id before patching.
pub fn update<T: Transport, W: Write>(
    client: &RollbarClient<T>,
    args: &UpdateArgs,
    out: &mut W,
) -> Result<()> {
    let format = args.output.format()?;
    let body = build_update_body(&args.fields)?;
    let target = args.selector.resolve()?;

    let id = match target {
        ItemRef::Id(id) => id,
        ItemRef::Uuid(uuid) => {
            let resolved = client.get_item_by_uuid(&uuid)?.item.id;
            if resolved <= 0 {
                return Err(RollbarError::validation(format!(
                    "could not resolve UUID {uuid:?} to a valid item id"
                ))
                .into());
            }
            debug!(%uuid, id = resolved, "resolved occurrence UUID");
            resolved
        }
    };

    let response = client.update_item_by_id(id, &body)?;
    if format == OutputFormat::Json {
        render::write_json(out, &response.raw)?;
        return Ok(());
    }

    if response.item.id > 0 {
        render::write_item(out, &response.item)?;
        return Ok(());
    }
    match client.get_item_by_id(id) {
        Ok(refetched) if refetched.item.id > 0 => render::write_item(out, &refetched.item)?,
        Ok(_) => writeln!(out, "Item {id} updated.")?,
        Err(e) => {
            debug!(error = %e, "re-fetch after update failed");
            writeln!(out, "Item {id} updated.")?;
        }
    }
    Ok(())
}
