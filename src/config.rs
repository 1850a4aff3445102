//! Connection settings: flags, environment, optional config file.
//!
//! Precedence per setting is flag > environment > config file > default.
//! The timeout has no environment variable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::debug;

use crate::api::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

pub const TOKEN_ENV: &str = "ROLLBAR_ACCESS_TOKEN";
pub const BASE_URL_ENV: &str = "ROLLBAR_BASE_URL";
pub const CONFIG_PATH_ENV: &str = "ROLLBAR_CLI_CONFIG";

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub config_path: Option<PathBuf>,
}

/// On-disk `config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }
}

/// Resolve against the process environment (a `.env` file included).
pub fn resolve(overrides: &Overrides) -> Result<ClientConfig> {
    resolve_with(overrides, |key| dotenvy::var(key).ok(), default_config_path())
}

/// Resolution with injectable environment lookup and default file location.
pub fn resolve_with(
    overrides: &Overrides,
    env: impl Fn(&str) -> Option<String>,
    default_path: Option<PathBuf>,
) -> Result<ClientConfig> {
    let explicit_path = overrides
        .config_path
        .clone()
        .or_else(|| non_empty(env(CONFIG_PATH_ENV)).map(PathBuf::from));

    let file = match (explicit_path, default_path) {
        (Some(path), _) => {
            debug!(path = %path.display(), "loading config file");
            FileConfig::load(&path)?
        }
        (None, Some(path)) if path.is_file() => {
            debug!(path = %path.display(), "loading default config file");
            FileConfig::load(&path)?
        }
        _ => FileConfig::default(),
    };

    let access_token = non_empty(overrides.token.clone())
        .or_else(|| non_empty(env(TOKEN_ENV)))
        .or_else(|| non_empty(file.token.clone()))
        .unwrap_or_default();

    let base_url = non_empty(overrides.base_url.clone())
        .or_else(|| non_empty(env(BASE_URL_ENV)))
        .or_else(|| non_empty(file.base_url.clone()))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let timeout = match (overrides.timeout, file.timeout.as_deref()) {
        (Some(timeout), _) => timeout,
        (None, Some(raw)) => {
            parse_duration(raw).map_err(|e| anyhow::anyhow!("config file timeout: {e}"))?
        }
        (None, None) => DEFAULT_TIMEOUT,
    };

    Ok(ClientConfig {
        access_token,
        base_url: base_url.trim_end_matches('/').to_string(),
        timeout,
    })
}

/// `<config dir>/rollbar-cli/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "rollbar", "rollbar-cli")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `15s`, `500ms`, `2m`, `1h`, `1m30s` or bare seconds.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let input = input.trim();
    if input.is_empty() {
        bail!("empty duration");
    }
    if let Ok(secs) = input.parse::<u64>() {
        return positive(Duration::from_secs(secs), input);
    }

    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        if digits == 0 {
            bail!("invalid duration {input:?}: expected a number");
        }
        let (number, tail) = rest.split_at(digits);
        let value: f64 = number
            .parse()
            .with_context(|| format!("invalid duration {input:?}"))?;
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let secs = match unit {
            "ms" => value / 1000.0,
            "s" => value,
            "m" => value * 60.0,
            "h" => value * 3600.0,
            "" => bail!("invalid duration {input:?}: missing unit"),
            other => bail!("invalid duration {input:?}: unknown unit {other:?}"),
        };
        let part = Duration::try_from_secs_f64(secs)
            .with_context(|| format!("invalid duration {input:?}"))?;
        total = total
            .checked_add(part)
            .with_context(|| format!("invalid duration {input:?}: too large"))?;
        rest = tail;
    }
    positive(total, input)
}

fn positive(duration: Duration, input: &str) -> Result<Duration> {
    if duration.is_zero() {
        bail!("invalid duration {input:?}: must be > 0");
    }
    Ok(duration)
}

/// clap value parser for `--timeout`.
pub fn parse_timeout_arg(input: &str) -> Result<Duration, String> {
    parse_duration(input).map_err(|e| e.to_string())
}
