use anyhow::Result;
use colored::Colorize;

use chess_league_tracker::cli::Command;
use chess_league_tracker::{handle_detect, handle_status, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Detect(args) => {
            let summary = handle_detect(args)?;
            println!(
                "{} {} new early resignation(s), {} pending player(s), {} remote call(s)",
                "Done:".green().bold(),
                summary.records_appended,
                summary.players_pending,
                summary.remote_calls()
            );
            Ok(())
        }
        Command::Status(args) => handle_status(args),
    }
}
