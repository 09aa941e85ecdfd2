pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "aria",
    about = "ARIA operator CLI",
    long_about = "Inspect configuration, check ERP and database readiness, apply migrations, and ask one-off questions.",
    after_help = "Examples:\n  aria doctor --json\n  aria config\n  aria ask \"¿Cómo van las ventas?\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, database connectivity, and ERP authentication")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run the assistant pipeline once and print the reply as JSON")]
    Ask {
        #[arg(required = true, num_args = 1.., help = "Question, in Spanish")]
        question: Vec<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Ask { question } => commands::ask::run(&question.join(" ")),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
