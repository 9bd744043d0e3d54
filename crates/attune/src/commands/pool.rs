use crate::cli::PoolArgs;
use attune_pool::{format_entry, parse_window, PoolEntry, PoolLog, PoolQuery, QUERY_LIMIT};
use attune_telemetry::Paths;
use chrono::{DateTime, Utc};

fn query_from_args(args: &PoolArgs) -> PoolQuery {
    PoolQuery {
        since: parse_window(&args.since),
        instance: args.instance.clone(),
        action: args.action.clone(),
    }
}

/// Render query results as the command prints them
pub fn render(
    entries: Vec<PoolEntry>,
    args: &PoolArgs,
    now: DateTime<Utc>,
) -> anyhow::Result<String> {
    let matched = query_from_args(args).apply(entries, now);

    if args.count {
        return Ok(format!("Entries: {}", matched.len()));
    }
    // Every match, and `[]` when there are none
    if args.json {
        return Ok(serde_json::to_string_pretty(&matched)?);
    }
    if matched.is_empty() {
        return Ok("No pool entries found".to_string());
    }

    let mut out = format!("=== Pool Entries ({}) ===\n", matched.len());
    for entry in matched.iter().take(QUERY_LIMIT) {
        out.push('\n');
        out.push_str(&format_entry(entry));
        out.push('\n');
    }
    Ok(out)
}

pub fn run(args: &PoolArgs) -> anyhow::Result<()> {
    let paths = Paths::discover()?;
    let entries = PoolLog::new(paths.pool_file()).entries()?;
    println!("{}", render(entries, args, Utc::now())?);
    Ok(())
}
