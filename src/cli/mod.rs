//! Command-line front end over the subscription engine.

pub mod handlers;
pub mod output;

use std::{env, path::PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use crate::errors::SubscriptionError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] SubscriptionError),
    #[error("Invalid input: {0}")]
    Input(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Month,
    Budget,
    Reminders,
    AddCheck,
    Version,
    Help,
}

impl Command {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "list" => Some(Command::List),
            "month" => Some(Command::Month),
            "budget" => Some(Command::Budget),
            "reminders" => Some(Command::Reminders),
            "add-check" => Some(Command::AddCheck),
            "version" | "--version" => Some(Command::Version),
            "help" | "--help" | "-h" => Some(Command::Help),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: Command,
    pub file: Option<PathBuf>,
    pub date: Option<NaiveDate>,
    pub full_month: bool,
}

impl CliArgs {
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let command = match args.next() {
            Some(raw) => Command::parse(&raw)
                .ok_or_else(|| CliError::Input(format!("unknown command `{raw}`")))?,
            None => Command::Help,
        };
        let mut parsed = CliArgs {
            command,
            file: None,
            date: None,
            full_month: false,
        };
        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--file" => {
                    let value = args
                        .next()
                        .ok_or_else(|| CliError::Input("`--file` needs a path".into()))?;
                    parsed.file = Some(PathBuf::from(value));
                }
                "--date" => {
                    let value = args
                        .next()
                        .ok_or_else(|| CliError::Input("`--date` needs YYYY-MM-DD".into()))?;
                    let date = NaiveDate::parse_from_str(&value, DATE_FORMAT)
                        .map_err(|_| CliError::Input(format!("invalid date `{value}`")))?;
                    parsed.date = Some(date);
                }
                "--full-month" => parsed.full_month = true,
                other => return Err(CliError::Input(format!("unknown option `{other}`"))),
            }
        }
        Ok(parsed)
    }
}

/// Parses process arguments and runs the selected command.
pub fn run_cli() -> Result<(), CliError> {
    let args = CliArgs::parse(env::args().skip(1))?;
    run(&args)
}

pub fn run(args: &CliArgs) -> Result<(), CliError> {
    tracing::info!(command = ?args.command, "running command");
    match args.command {
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::Version => {
            handlers::version();
            Ok(())
        }
        command => {
            let context = handlers::CliContext::load(args)?;
            match command {
                Command::List => handlers::list(&context),
                Command::Month => handlers::month(&context, args.full_month),
                Command::Budget => handlers::budget(&context),
                Command::Reminders => handlers::reminders(&context),
                Command::AddCheck => handlers::add_check(&context)?,
                Command::Help | Command::Version => {}
            }
            Ok(())
        }
    }
}

pub fn print_usage() {
    println!(
        "Usage: subscription_core_cli <command> [--file <subscriptions.json>] [--date YYYY-MM-DD]\n\
         Commands:\n  \
         list                      subscriptions with next and previous bills\n  \
         month [--full-month]      cost still due this month\n  \
         budget                    this month's bill against the budget\n  \
         reminders                 upcoming reminder notifications\n  \
         add-check                 whether another subscription fits the plan\n  \
         version                   build information"
    );
}
