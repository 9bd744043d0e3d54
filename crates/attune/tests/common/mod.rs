#![allow(dead_code)]

use attune_telemetry::Paths;
use tempfile::TempDir;

/// A docs root with three agent documents and a rule config
pub fn docs_root() -> (TempDir, Paths) {
    let temp = TempDir::new().unwrap();
    let paths = Paths::from_root(temp.path());

    std::fs::create_dir_all(paths.document("agents")).unwrap();
    std::fs::write(
        paths.config_file(),
        serde_json::json!({
            "keywords": {
                "agents/auth.md": ["login", "oauth"],
                "agents/billing.md": ["invoice"]
            },
            "co_activation": {
                "agents/auth.md": ["agents/security.md"]
            },
            "pinned": ["agents/conventions.md"],
            "thresholds": {"max_chars": 4000}
        })
        .to_string(),
    )
    .unwrap();

    for (doc, body) in [
        ("agents/auth.md", "# Auth\n\nTokens live in the session store.\n"),
        ("agents/billing.md", "# Billing\n\nInvoices are generated nightly.\n"),
        ("agents/security.md", "# Security\n\nNever log secrets.\n"),
        ("agents/conventions.md", "# Conventions\n\nUse snake_case.\n"),
    ] {
        std::fs::write(paths.document(doc), body).unwrap();
    }

    (temp, paths)
}
