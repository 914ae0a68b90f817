//! recall - retrieve the transcript chunks most similar to a question

use anyhow::Result;
use clap::Parser as _;
use cli::{Cli, Commands};
use recall_cli::logging;
use std::io::{self, Write as _};
use std::process::ExitCode;

mod cli;
mod handlers;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // One line: context followed by each cause, colon separated
            let _ignored = writeln!(io::stderr().lock(), "{error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.global.verbose, cli.global.log_file.as_deref())?;
    let config = handlers::resolve_config(&cli.global)?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => handlers::handle_chat(&config).await,
        Commands::Ask { question } => handlers::handle_ask(&config, &question).await,
        Commands::Inspect => handlers::handle_inspect(&config).await,
    }
}
