//! CLI domain: parse, route, output and presentation only.
//! No playback logic; the route table drives the engine through a console host.

mod console_host;
mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use console_host::ConsoleHost;
pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{format_play_summary, format_streams, PlaySummary, StreamRow};
pub use route::RunContext;
