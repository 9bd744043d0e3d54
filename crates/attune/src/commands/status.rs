use attune_core::{JsonStateStore, Router, RuleConfig, StateStore};
use attune_telemetry::Paths;

/// Current tiers without running a turn
pub fn report(paths: &Paths) -> serde_json::Value {
    let router = Router::new(RuleConfig::load(&paths.config_file()));
    let state = JsonStateStore::new(paths.attn_state_file()).load_or_default();
    let partition = router.partition(&state);

    serde_json::json!({
        "turn_count": state.turn_count,
        "hot": partition.hot,
        "warm": partition.warm,
        "cold": partition.cold,
    })
}

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::discover()?;
    println!("{}", serde_json::to_string_pretty(&report(&paths))?);
    Ok(())
}
