//! CLI command-name contract for logging.

use crate::cli::parse::Commands;

/// Command name recorded on the command's log events.
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Play { .. } => "play",
        Commands::Inspect { .. } => "inspect",
        Commands::Config { .. } => "config",
    }
}
