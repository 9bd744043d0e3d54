use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "attune")]
#[command(version)]
#[command(about = "Attention-scored context injection and cross-instance coordination")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show current attention tiers as JSON
    Status,

    /// Query the coordination pool
    Pool(PoolArgs),

    /// Print version information
    Version,

    /// Hook: score the prompt and print injected context
    #[command(name = "hook:user-prompt-submit")]
    HookUserPromptSubmit,

    /// Hook: print recent activity from other instances
    #[command(name = "hook:session-start")]
    HookSessionStart,

    /// Hook: publish pool entries found in the transcript
    #[command(name = "hook:stop")]
    HookStop,
}

#[derive(Args, Debug, Clone)]
pub struct PoolArgs {
    /// Time window, e.g. 30m, 1h, 2d
    #[arg(short, long, default_value = "24h")]
    pub since: String,

    /// Only entries from this instance
    #[arg(short, long)]
    pub instance: Option<String>,

    /// Only entries with this action
    #[arg(short, long)]
    pub action: Option<String>,

    /// Print matching entries as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Print only the number of matching entries
    #[arg(short, long)]
    pub count: bool,
}
