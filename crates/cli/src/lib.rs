pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "maitred",
    about = "Maitred operator CLI",
    long_about = "Inspect Maitred configuration, run readiness checks, and exercise the \
                  assistant from the terminal.",
    after_help = "Examples:\n  maitred doctor --json\n  maitred config\n  maitred chat \"pay 1000 for table 5 by card\""
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
    #[command(about = "Validate config, LLM credential readiness, and DB connectivity checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Send one message through the assistant and print the reply")]
    Chat {
        #[arg(help = "The user message to send")]
        message: String,
        #[arg(long, help = "Continue an existing conversation instead of starting a new one")]
        conversation_id: Option<String>,
        #[arg(long, help = "Attribute the message to this user id")]
        user_id: Option<String>,
        #[arg(long, help = "Scope the conversation to this restaurant id")]
        restaurant_id: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Chat { message, conversation_id, user_id, restaurant_id } => {
            commands::chat::run(&message, conversation_id, user_id, restaurant_id)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
