pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use tracing::debug;

use api::RollbarClient;
use commands::items::{self, GetArgs, ListArgs, UpdateArgs};
use config::Overrides;
use error::RollbarError;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "rollbar-cli",
    version,
    about = "A CLI for querying Rollbar data",
    long_about = "rollbar-cli queries Rollbar items and renders them as text, \
                  an interactive table, or raw JSON."
)]
pub struct Cli {
    /// Rollbar access token (or set ROLLBAR_ACCESS_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Rollbar API base URL [default: https://api.rollbar.com]
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// HTTP timeout, e.g. 15s, 500ms, 2m [default: 15s]
    #[arg(long, global = true, value_parser = config::parse_timeout_arg)]
    pub timeout: Option<Duration>,

    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More diagnostics on stderr (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Query and update Rollbar items
    Items {
        #[command(subcommand)]
        command: ItemsCommand,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

#[derive(Subcommand, Debug)]
pub enum ItemsCommand {
    /// List items in a Rollbar project
    List(ListArgs),
    /// Get a single Rollbar item by ID or UUID
    Get(GetArgs),
    /// Update a Rollbar item
    Update(UpdateArgs),
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Items { command } => {
            let overrides = Overrides {
                token: cli.token,
                base_url: cli.base_url,
                timeout: cli.timeout,
                config_path: cli.config,
            };
            run_items(&overrides, command)
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "rollbar-cli", &mut io::stdout());
            Ok(())
        }
        Commands::Man => {
            let man = clap_mangen::Man::new(Cli::command());
            man.render(&mut io::stdout())?;
            Ok(())
        }
    }
}

fn run_items(overrides: &Overrides, command: ItemsCommand) -> Result<()> {
    let config = config::resolve(overrides)?;
    if config.access_token.is_empty() {
        return Err(RollbarError::Auth.into());
    }
    let client = RollbarClient::new(&config)?;
    debug!(base_url = client.base_url(), timeout = ?config.timeout, "resolved connection settings");
    let mut out = io::stdout();
    match command {
        ItemsCommand::List(args) => items::list(&client, &args, ui::is_interactive(), &mut out),
        ItemsCommand::Get(args) => items::get(&client, &args, &mut out),
        ItemsCommand::Update(args) => items::update(&client, &args, &mut out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "rollbar-cli",
            "items",
            "list",
            "--token",
            "t",
            "--timeout",
            "500ms",
            "-vv",
            "--level",
            "error,critical",
            "--level",
            "info",
        ])
        .unwrap();
        assert_eq!(cli.token.as_deref(), Some("t"));
        assert_eq!(cli.timeout, Some(Duration::from_millis(500)));
        assert_eq!(cli.verbose, 2);
        let Commands::Items {
            command: ItemsCommand::List(args),
        } = cli.command
        else {
            panic!("expected items list");
        };
        assert_eq!(args.levels, ["error", "critical", "info"]);
        assert_eq!(args.page, 1);
    }

    #[test]
    fn snooze_flag_takes_optional_value() {
        let parse = |extra: &[&str]| {
            let mut argv = vec!["rollbar-cli", "items", "update", "5"];
            argv.extend_from_slice(extra);
            match Cli::try_parse_from(argv).unwrap().command {
                Commands::Items {
                    command: ItemsCommand::Update(args),
                } => args.fields.snooze_enabled,
                other => panic!("unexpected {other:?}"),
            }
        };
        assert_eq!(parse(&["--snooze-enabled"]), Some(true));
        assert_eq!(parse(&["--snooze-enabled=false"]), Some(false));
        assert_eq!(parse(&[]), None);
    }

    #[test]
    fn bad_timeout_is_a_usage_error() {
        let err = Cli::try_parse_from(["rollbar-cli", "--timeout", "soon", "items", "list"])
            .unwrap_err();
        assert!(err.to_string().contains("invalid duration"));
    }
}
