use attune_core::{
    build_injection, record_turn, FsDocuments, HistoryRecord, JsonStateStore, Router, RuleConfig,
    StateStore,
};
use attune_pool::{render_digest, Extractor, Identity, PoolLog, PoolReader};
use attune_telemetry::Paths;
use chrono::{DateTime, Utc};
use std::io::{self, Read, Write};

/// Prompt text from the hook payload: the `prompt` field of a JSON object,
/// otherwise the raw input.
fn prompt_from_input(input: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(input) {
        Ok(serde_json::Value::Object(map)) => map
            .get("prompt")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => input.to_string(),
    }
}

/// Run one scoring turn and return the context to inject
pub fn user_prompt_submit(paths: &Paths, input: &str) -> String {
    let prompt = prompt_from_input(input);
    if prompt.is_empty() || !paths.exists() {
        return String::new();
    }

    let config = RuleConfig::load(&paths.config_file());
    let max_chars = config.thresholds.max_chars;
    let router = Router::new(config);

    let store = JsonStateStore::new(paths.attn_state_file());
    let mut state = store.load_or_default();

    router.update_attention(&mut state, &prompt);
    let partition = router.partition(&state);
    let injection = build_injection(
        &partition,
        &state,
        &FsDocuments::new(paths.clone()),
        max_chars,
    );

    if let Err(e) = store.save(&state) {
        tracing::warn!(error = %e, "failed to save attention state");
    }
    record_turn(
        &paths.history_file(),
        &HistoryRecord::new(&state, &partition, &prompt),
    );

    injection.text
}

/// Digest of other instances' recent pool activity
pub fn session_start(paths: &Paths, consumer: &str, now: DateTime<Utc>) -> String {
    if !paths.pool_dir().is_dir() {
        return String::new();
    }
    let log = PoolLog::new(paths.pool_file());
    let recent = PoolReader::new(&log).recent_for(consumer, now);
    render_digest(&recent, consumer)
}

/// Publish entries extracted from a transcript. Returns how many were written.
pub fn stop(
    paths: &Paths,
    transcript: &str,
    identity: &Identity,
    now: DateTime<Utc>,
) -> anyhow::Result<usize> {
    let entries: Vec<_> = Extractor::new()
        .extract(transcript)
        .into_iter()
        .map(|candidate| candidate.stamp(identity, now))
        .collect();
    if entries.is_empty() {
        return Ok(0);
    }

    let log = PoolLog::new(paths.pool_file());
    let written = log.append_all(&entries);
    log.enforce_retention()?;
    tracing::debug!(written, instance = %identity.instance_id, "pool entries published");
    Ok(written)
}

fn read_stdin() -> anyhow::Result<String> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    Ok(input)
}

fn emit(output: &str) -> anyhow::Result<()> {
    if output.is_empty() {
        return Ok(());
    }
    let mut stdout = io::stdout();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Hooks never fail the host session
fn swallow(hook: &str, result: anyhow::Result<()>) -> anyhow::Result<()> {
    if let Err(e) = result {
        tracing::warn!(hook, error = %e, "hook failed");
    }
    Ok(())
}

pub fn hook_user_prompt_submit() -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<()> {
        let input = read_stdin()?;
        let paths = Paths::discover()?;
        emit(&user_prompt_submit(&paths, &input))
    })();
    swallow("user-prompt-submit", result)
}

pub fn hook_session_start() -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<()> {
        let paths = Paths::discover()?;
        let identity = Identity::from_env();
        emit(&session_start(&paths, &identity.instance_id, Utc::now()))
    })();
    swallow("session-start", result)
}

pub fn hook_stop() -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<()> {
        let transcript = read_stdin()?;
        let paths = Paths::discover()?;
        stop(&paths, &transcript, &Identity::from_env(), Utc::now()).map(|_| ())
    })();
    swallow("stop", result)
}
