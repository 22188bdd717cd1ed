pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::commands::customers::CustomersArgs;

#[derive(Debug, Parser)]
#[command(
    name = "beacon",
    about = "Beacon customer-success CLI",
    long_about = "Inspect upstream readiness, effective config, and the derived customer portfolio.",
    after_help = "Examples:\n  beacon doctor --json\n  beacon config\n  beacon customers --city madison --sort name\n  beacon segments"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Validate config and probe the upstream owner endpoints")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "List customers from the upstream source with optional filters and sort")]
    Customers(CustomersArgs),
    #[command(about = "Classify every customer into vip, active, or at-risk")]
    Segments,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Config => commands::config::run(),
        Command::Customers(args) => commands::customers::run(&args),
        Command::Segments => commands::segments::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
