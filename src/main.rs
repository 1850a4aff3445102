use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use rollbar_cli::error::RollbarError;
use rollbar_cli::{Cli, logging, run};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version come through here too.
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            return code;
        }
    };

    logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(kind) = e.downcast_ref::<RollbarError>().map(RollbarError::kind) {
                tracing::debug!(kind, "command failed");
            }
            let prefix = if std::io::stderr().is_terminal() {
                "error:".red().bold().to_string()
            } else {
                "error:".to_string()
            };
            eprintln!("{prefix} {e:#}");
            ExitCode::FAILURE
        }
    }
}
