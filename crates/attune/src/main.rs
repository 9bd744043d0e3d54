mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // stdout belongs to the hooks; diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Status => commands::status::run(),
        Commands::Pool(args) => commands::pool::run(&args),
        Commands::Version => commands::version::run(),
        Commands::HookUserPromptSubmit => commands::hooks::hook_user_prompt_submit(),
        Commands::HookSessionStart => commands::hooks::hook_session_start(),
        Commands::HookStop => commands::hooks::hook_stop(),
    }
}
