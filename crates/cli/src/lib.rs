pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "timeclock",
    about = "Timeclock operator CLI",
    long_about = "Inspect Timeclock bot readiness, effective configuration, and the employee roster.",
    after_help = "Examples:\n  timeclock doctor --json\n  timeclock config\n  timeclock roster --path roster.toml"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, roster readiness, and the configured time zone")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Print the employee roster grouped by select-menu page")]
    Roster {
        #[arg(long, help = "Roster TOML file; defaults to roster.path or the built-in roster")]
        path: Option<PathBuf>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::CommandResult::text(commands::config::run()),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Roster { path } => commands::roster::run(path.as_deref()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
